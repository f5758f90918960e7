use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{
    AvailabilityDay, Booking, BookingId, BookingReference, BookingStatus, GuestCounts, HotelId,
    Money, PaymentRecord, PaymentStatus, RoomId, StayWindow, UserId,
};
use crate::domain::port::{RepositoryError, ReservationStore};
use async_trait::async_trait;
use sqlx::{MySql, Pool, Row, Transaction};

/// MySQL予約ストア
/// 空室カレンダー・予約・決済レコードを単一トランザクションで操作する
///
/// 相互排他は availability_days の行ロック（SELECT ... FOR UPDATE）で実現する。
/// InnoDBは主キー (room_id, day) のインデックス順でロックを取得するため、
/// 日付昇順のロック取得は全トランザクションで同一の全順序になる。
pub struct MySqlReservationStore {
    pool: Pool<MySql>,
}

impl MySqlReservationStore {
    /// 新しいMySQL予約ストアを作成
    ///
    /// # Arguments
    /// * `pool` - MySQLコネクションプール
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// データベースの行からカレンダー行を再構築する
    fn build_availability_day(row: &sqlx::mysql::MySqlRow) -> Result<AvailabilityDay, RepositoryError> {
        let room_id = RoomId::from_string(row.get("room_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部屋IDの解析に失敗しました: {}", e))
        })?;

        let override_price = match (
            row.get::<Option<i64>, _>("override_price_amount"),
            row.get::<Option<String>, _>("override_price_currency"),
        ) {
            (Some(amount), Some(currency)) => Some(Money::new(amount, currency).map_err(|e| {
                RepositoryError::FetchFailed(format!("上書き価格の構築に失敗しました: {}", e))
            })?),
            _ => None,
        };

        Ok(AvailabilityDay::reconstruct(
            room_id,
            row.get("day"),
            row.get::<u32, _>("available_units"),
            override_price,
            row.get("is_blocked"),
        ))
    }

    /// データベースの行から予約集約を再構築する
    fn build_booking(row: &sqlx::mysql::MySqlRow) -> Result<Booking, RepositoryError> {
        let id = BookingId::from_string(row.get("id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約IDの解析に失敗しました: {}", e))
        })?;
        let user_id = UserId::from_string(row.get("user_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("利用者IDの解析に失敗しました: {}", e))
        })?;
        let room_id = RoomId::from_string(row.get("room_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("部屋IDの解析に失敗しました: {}", e))
        })?;
        let hotel_id = HotelId::from_string(row.get("hotel_id")).map_err(|e| {
            RepositoryError::FetchFailed(format!("ホテルIDの解析に失敗しました: {}", e))
        })?;
        let window = StayWindow::new(row.get("check_in"), row.get("check_out")).map_err(|e| {
            RepositoryError::FetchFailed(format!("宿泊期間の構築に失敗しました: {}", e))
        })?;
        let guests = GuestCounts::new(
            row.get::<u32, _>("adults"),
            row.get::<u32, _>("children"),
        )
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("宿泊人数の構築に失敗しました: {}", e))
        })?;
        let total_price = Money::new(row.get("total_amount"), row.get("total_currency"))
            .map_err(|e| {
                RepositoryError::FetchFailed(format!("金額の構築に失敗しました: {}", e))
            })?;
        let reference = BookingReference::new(row.get("booking_reference")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約参照番号の解析に失敗しました: {}", e))
        })?;
        let status = BookingStatus::from_string(row.get("status")).map_err(|e| {
            RepositoryError::FetchFailed(format!("予約ステータスの解析に失敗しました: {}", e))
        })?;
        let payment_status =
            PaymentStatus::from_string(row.get("payment_status")).map_err(|e| {
                RepositoryError::FetchFailed(format!("決済ステータスの解析に失敗しました: {}", e))
            })?;

        Ok(Booking::reconstruct(
            id,
            user_id,
            room_id,
            hotel_id,
            window,
            guests,
            total_price,
            reference,
            status,
            payment_status,
        ))
    }
}

#[async_trait]
impl ReservationStore for MySqlReservationStore {
    type Tx = Transaction<'static, MySql>;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        self.pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)
    }

    async fn read_window(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT room_id, day, available_units, override_price_amount, override_price_currency, is_blocked
            FROM availability_days
            WHERE room_id = ? AND day >= ? AND day < ?
            ORDER BY day ASC
            "#,
        )
        .bind(room_id.to_string())
        .bind(window.check_in())
        .bind(window.check_out())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "カレンダー行の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_availability_day).collect()
    }

    async fn lock_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError> {
        // 日付昇順の FOR UPDATE で期間内の全行を排他ロックする
        // 存在しない日の行はロックも返却もされない
        let rows = sqlx::query(
            r#"
            SELECT room_id, day, available_units, override_price_amount, override_price_currency, is_blocked
            FROM availability_days
            WHERE room_id = ? AND day >= ? AND day < ?
            ORDER BY day ASC
            FOR UPDATE
            "#,
        )
        .bind(room_id.to_string())
        .bind(window.check_in())
        .bind(window.check_out())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "カレンダー行のロックに失敗しました"))
        .map_err(RepositoryError::from)?;

        rows.iter().map(Self::build_availability_day).collect()
    }

    async fn decrement_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
        units: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE availability_days
            SET available_units = available_units - ?
            WHERE room_id = ? AND day >= ? AND day < ?
              AND is_blocked = FALSE AND available_units >= ?
            "#,
        )
        .bind(units)
        .bind(room_id.to_string())
        .bind(window.check_in())
        .bind(window.check_out())
        .bind(units)
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "在庫の減算に失敗しました"))
        .map_err(RepositoryError::from)?;

        // 呼び出し元がロック下で検証済みのため、全行が更新されるはず
        // 一致しない場合はトランザクション全体を失敗させる
        if result.rows_affected() != window.nights() as u64 {
            return Err(RepositoryError::OperationFailed(format!(
                "在庫の減算が不完全です: {}泊中{}行のみ更新されました",
                window.nights(),
                result.rows_affected()
            )));
        }
        Ok(())
    }

    async fn increment_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
        units: u32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE availability_days
            SET available_units = available_units + ?
            WHERE room_id = ? AND day >= ? AND day < ?
            "#,
        )
        .bind(units)
        .bind(room_id.to_string())
        .bind(window.check_in())
        .bind(window.check_out())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "在庫の解放に失敗しました"))
        .map_err(RepositoryError::from)?;

        if result.rows_affected() != window.nights() as u64 {
            return Err(RepositoryError::OperationFailed(format!(
                "在庫の解放が不完全です: {}泊中{}行のみ更新されました",
                window.nights(),
                result.rows_affected()
            )));
        }
        Ok(())
    }

    async fn insert_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, room_id, hotel_id, check_in, check_out,
                adults, children, total_amount, total_currency,
                booking_reference, status, payment_status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(booking.id().to_string())
        .bind(booking.user_id().to_string())
        .bind(booking.room_id().to_string())
        .bind(booking.hotel_id().to_string())
        .bind(booking.window().check_in())
        .bind(booking.window().check_out())
        .bind(booking.guests().adults())
        .bind(booking.guests().children())
        .bind(booking.total_price().amount())
        .bind(booking.total_price().currency())
        .bind(booking.reference().as_str())
        .bind(booking.status().to_string())
        .bind(booking.payment_status().to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "予約の保存に失敗しました"))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn insert_payment(
        &self,
        tx: &mut Self::Tx,
        payment: &PaymentRecord,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO payment_records (id, booking_id, provider_token, amount, currency, status)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.id().to_string())
        .bind(payment.booking_id().to_string())
        .bind(payment.provider_token())
        .bind(payment.amount().amount())
        .bind(payment.amount().currency())
        .bind(payment.status().to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "決済レコードの保存に失敗しました"))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn find_booking_for_update(
        &self,
        tx: &mut Self::Tx,
        booking_id: BookingId,
    ) -> Result<Option<Booking>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, room_id, hotel_id, check_in, check_out,
                   adults, children, total_amount, total_currency,
                   booking_reference, status, payment_status
            FROM bookings
            WHERE id = ?
            FOR UPDATE
            "#,
        )
        .bind(booking_id.to_string())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "予約の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        row.as_ref().map(Self::build_booking).transpose()
    }

    async fn update_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, payment_status = ?
            WHERE id = ?
            "#,
        )
        .bind(booking.status().to_string())
        .bind(booking.payment_status().to_string())
        .bind(booking.id().to_string())
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "予約の更新に失敗しました"))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), RepositoryError> {
        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepositoryError> {
        tx.rollback()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのロールバックに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)
    }
}
