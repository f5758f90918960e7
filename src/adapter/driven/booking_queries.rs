use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    BookingDetail, BookingId, BookingStatus, BookingSummary, HotelId, Money, PaymentId,
    PaymentStatus, PaymentView, RoomId, UserId,
};
use crate::domain::port::{BookingQueries, RepositoryError};
use async_trait::async_trait;
use sqlx::{MySql, Pool, Row};

/// MySQL予約クエリ
/// 予約・決済テーブルと部屋テーブルを結合した読み取り専用ビューを提供する
pub struct MySqlBookingQueries {
    pool: Pool<MySql>,
}

impl MySqlBookingQueries {
    /// 新しいMySQL予約クエリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// データベースの行から予約サマリービューを構築する
fn build_summary(row: &sqlx::mysql::MySqlRow) -> Result<BookingSummary, RepositoryError> {
    let booking_id = BookingId::from_string(row.get("id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
    })?;
    let room_id = RoomId::from_string(row.get("room_id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("部屋IDの解析に失敗しました: {}", e))
    })?;
    let hotel_id = HotelId::from_string(row.get("hotel_id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("ホテルIDの解析に失敗しました: {}", e))
    })?;
    let status = BookingStatus::from_string(row.get("status")).map_err(|e| {
        RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
    })?;
    let payment_status = PaymentStatus::from_string(row.get("payment_status")).map_err(|e| {
        RepositoryError::FetchFailed(format!("決済ステータスの解析に失敗しました: {}", e))
    })?;
    let total_price = Money::new(row.get("total_amount"), row.get("total_currency"))
        .map_err(|e| RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e)))?;

    Ok(BookingSummary {
        booking_id,
        reference: row.get("booking_reference"),
        room_id,
        room_name: row.get("room_name"),
        hotel_id,
        check_in: row.get("check_in"),
        check_out: row.get("check_out"),
        status,
        payment_status,
        total_price,
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl BookingQueries for MySqlBookingQueries {
    async fn find_detail(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<BookingDetail>, RepositoryError> {
        // 予約・部屋・決済レコードをJOINして非正規化ビューを構築する
        let row = sqlx::query(
            r#"
            SELECT
                b.id, b.user_id, b.room_id, b.hotel_id, b.check_in, b.check_out,
                b.adults, b.children, b.total_amount, b.total_currency,
                b.booking_reference, b.status, b.payment_status, b.created_at,
                r.name AS room_name,
                p.id AS payment_id, p.provider_token, p.amount AS payment_amount,
                p.currency AS payment_currency, p.status AS payment_record_status
            FROM bookings b
            INNER JOIN rooms r ON b.room_id = r.id
            LEFT JOIN payment_records p ON p.booking_id = b.id
            WHERE b.id = ?
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "予約詳細の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let summary = build_summary(&row)?;
        let user_id = UserId::from_string(row.get("user_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("利用者IDの解析に失敗しました: {}", e))
        })?;

        let payment = match row.get::<Option<String>, _>("payment_id") {
            Some(payment_id_str) => {
                let payment_id = PaymentId::from_string(&payment_id_str).map_err(|e| {
                    RepositoryError::FetchFailed(format!("決済IDの解析に失敗しました: {}", e))
                })?;
                let amount = Money::new(
                    row.get("payment_amount"),
                    row.get("payment_currency"),
                )
                .map_err(|e| {
                    RepositoryError::FetchFailed(format!("決済金額の構築に失敗しました: {}", e))
                })?;
                let status = PaymentStatus::from_string(row.get("payment_record_status"))
                    .map_err(|e| {
                        RepositoryError::FetchFailed(format!(
                            "決済ステータスの解析に失敗しました: {}",
                            e
                        ))
                    })?;
                Some(PaymentView {
                    payment_id,
                    provider_token: row.get("provider_token"),
                    amount,
                    status,
                })
            }
            None => None,
        };

        Ok(Some(BookingDetail {
            booking_id: summary.booking_id,
            reference: summary.reference,
            user_id,
            room_id: summary.room_id,
            room_name: summary.room_name,
            hotel_id: summary.hotel_id,
            check_in: summary.check_in,
            check_out: summary.check_out,
            adults: row.get::<u32, _>("adults"),
            children: row.get::<u32, _>("children"),
            status: summary.status,
            payment_status: summary.payment_status,
            total_price: summary.total_price,
            payment,
            created_at: summary.created_at,
        }))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<BookingSummary>, RepositoryError> {
        // 作成日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT
                b.id, b.room_id, b.hotel_id, b.check_in, b.check_out,
                b.total_amount, b.total_currency,
                b.booking_reference, b.status, b.payment_status, b.created_at,
                r.name AS room_name
            FROM bookings b
            INNER JOIN rooms r ON b.room_id = r.id
            WHERE b.user_id = ?
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "利用者の予約履歴の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        rows.iter().map(build_summary).collect()
    }

    async fn find_by_hotel(
        &self,
        hotel_id: HotelId,
    ) -> Result<Vec<BookingSummary>, RepositoryError> {
        // 作成日時の降順で並べる
        let rows = sqlx::query(
            r#"
            SELECT
                b.id, b.room_id, b.hotel_id, b.check_in, b.check_out,
                b.total_amount, b.total_currency,
                b.booking_reference, b.status, b.payment_status, b.created_at,
                r.name AS room_name
            FROM bookings b
            INNER JOIN rooms r ON b.room_id = r.id
            WHERE b.hotel_id = ?
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(hotel_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "ホテルの予約一覧の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        rows.iter().map(build_summary).collect()
    }
}
