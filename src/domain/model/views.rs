use crate::domain::model::{
    BookingId, BookingStatus, HotelId, Money, PaymentId, PaymentStatus, RoomId, UserId,
};
use chrono::{DateTime, NaiveDate, Utc};

// 読み取り専用ビューモデル
// 予約テーブルと部屋ディレクトリを結合した非正規化ビュー
// コアの正当性の議論には関与しない、読み取り側コンシューマー向けの出力

/// 予約サマリービュー（利用者履歴・マネージャーダッシュボード用）
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSummary {
    pub booking_id: BookingId,
    pub reference: String,
    pub room_id: RoomId,
    pub room_name: String,
    pub hotel_id: HotelId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Money,
    pub created_at: DateTime<Utc>,
}

/// 決済ビュー
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub payment_id: PaymentId,
    pub provider_token: String,
    pub amount: Money,
    pub status: PaymentStatus,
}

/// 予約詳細ビュー（所有者情報・決済レコード付き）
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDetail {
    pub booking_id: BookingId,
    pub reference: String,
    pub user_id: UserId,
    pub room_id: RoomId,
    pub room_name: String,
    pub hotel_id: HotelId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub total_price: Money,
    pub payment: Option<PaymentView>,
    pub created_at: DateTime<Utc>,
}
