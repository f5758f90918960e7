use crate::domain::model::{
    BookingId, BookingReference, BookingStatus, Money, RoomId, StayWindow, UserId,
};
use chrono::{DateTime, Utc};

/// ドメインイベント列挙型
/// ビジネス上の重要なイベントを表現する
/// 予約トランザクションのコミット後にのみ発行される
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// 予約が確定された
    ReservationConfirmed(ReservationConfirmed),
    /// 予約のステータスが遷移した
    BookingStatusChanged(BookingStatusChanged),
}

/// 予約確定イベント
#[derive(Debug, Clone)]
pub struct ReservationConfirmed {
    /// 予約ID
    pub booking_id: BookingId,
    /// 予約参照番号
    pub reference: BookingReference,
    /// 利用者ID
    pub user_id: UserId,
    /// 部屋ID
    pub room_id: RoomId,
    /// 宿泊期間
    pub window: StayWindow,
    /// 合計金額
    pub total_price: Money,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl ReservationConfirmed {
    /// 新しい予約確定イベントを作成
    pub fn new(
        booking_id: BookingId,
        reference: BookingReference,
        user_id: UserId,
        room_id: RoomId,
        window: StayWindow,
        total_price: Money,
    ) -> Self {
        Self {
            booking_id,
            reference,
            user_id,
            room_id,
            window,
            total_price,
            occurred_at: Utc::now(),
        }
    }
}

/// 予約ステータス遷移イベント
/// キャンセル・完了・返金など、外部ワークフローによる遷移を通知する
#[derive(Debug, Clone)]
pub struct BookingStatusChanged {
    /// 予約ID
    pub booking_id: BookingId,
    /// 予約参照番号
    pub reference: BookingReference,
    /// 遷移前のステータス
    pub from: BookingStatus,
    /// 遷移後のステータス
    pub to: BookingStatus,
    /// 在庫が解放されたか
    pub inventory_released: bool,
    /// イベント発生日時
    pub occurred_at: DateTime<Utc>,
}

impl BookingStatusChanged {
    /// 新しいステータス遷移イベントを作成
    pub fn new(
        booking_id: BookingId,
        reference: BookingReference,
        from: BookingStatus,
        to: BookingStatus,
        inventory_released: bool,
    ) -> Self {
        Self {
            booking_id,
            reference,
            from,
            to,
            inventory_released,
            occurred_at: Utc::now(),
        }
    }
}
