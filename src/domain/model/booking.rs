use crate::domain::error::DomainError;
use crate::domain::model::{
    BookingId, BookingReference, BookingStatus, GuestCounts, HotelId, Money, PaymentId,
    PaymentStatus, RoomId, StayWindow, UserId,
};

/// 予約集約
/// 予約のライフサイクルを管理し、状態遷移ルールを適用する
/// 作成は予約コーディネーターのみが行う
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    id: BookingId,
    user_id: UserId,
    room_id: RoomId,
    hotel_id: HotelId,
    window: StayWindow,
    guests: GuestCounts,
    total_price: Money,
    reference: BookingReference,
    status: BookingStatus,
    payment_status: PaymentStatus,
}

impl Booking {
    /// 確定済み予約を作成
    /// 決済認可は上流で完了している前提のため、
    /// status=Confirmed, payment_status=Paid で作成される
    #[allow(clippy::too_many_arguments)]
    pub fn confirmed(
        id: BookingId,
        user_id: UserId,
        room_id: RoomId,
        hotel_id: HotelId,
        window: StayWindow,
        guests: GuestCounts,
        total_price: Money,
        reference: BookingReference,
    ) -> Self {
        Self {
            id,
            user_id,
            room_id,
            hotel_id,
            window,
            guests,
            total_price,
            reference,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
        }
    }

    /// データベースから取得したデータで予約を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookingId,
        user_id: UserId,
        room_id: RoomId,
        hotel_id: HotelId,
        window: StayWindow,
        guests: GuestCounts,
        total_price: Money,
        reference: BookingReference,
        status: BookingStatus,
        payment_status: PaymentStatus,
    ) -> Self {
        Self {
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
        }
    }

    /// 予約IDを取得
    pub fn id(&self) -> BookingId {
        self.id
    }

    /// 利用者IDを取得
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// 部屋IDを取得
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// ホテルIDを取得（部屋から非正規化）
    pub fn hotel_id(&self) -> HotelId {
        self.hotel_id
    }

    /// 宿泊期間を取得
    pub fn window(&self) -> StayWindow {
        self.window
    }

    /// 宿泊人数を取得
    pub fn guests(&self) -> GuestCounts {
        self.guests
    }

    /// 合計金額を取得
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// 予約参照番号を取得
    pub fn reference(&self) -> &BookingReference {
        &self.reference
    }

    /// 予約ステータスを取得
    pub fn status(&self) -> BookingStatus {
        self.status
    }

    /// 決済ステータスを取得
    pub fn payment_status(&self) -> PaymentStatus {
        self.payment_status
    }

    /// 予約参照番号を差し替える
    /// 参照番号の衝突時にコーディネーターが再生成するために使用
    pub fn replace_reference(&mut self, reference: BookingReference) {
        self.reference = reference;
    }

    /// ステータスを遷移させる
    /// 遷移は前進のみ許可される（BookingStatus::can_transition_to）
    /// Refundedへの遷移時は決済ステータスも返金済みに更新される
    pub fn transition_to(&mut self, next: BookingStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidBookingState(format!(
                "{}から{}への遷移は許可されていません",
                self.status, next
            )));
        }
        self.status = next;
        if next == BookingStatus::Refunded {
            self.payment_status = PaymentStatus::Refunded;
        }
        Ok(())
    }
}

/// 決済レコード
/// 予約と同一トランザクションで原子的に作成される（1:1）
/// 決済ゲートウェイのプロトコルは扱わず、不透明なトークン参照のみ保持する
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecord {
    id: PaymentId,
    booking_id: BookingId,
    provider_token: String,
    amount: Money,
    status: PaymentStatus,
}

impl PaymentRecord {
    /// 支払い済みの決済レコードを作成
    pub fn paid(id: PaymentId, booking_id: BookingId, provider_token: String, amount: Money) -> Self {
        Self {
            id,
            booking_id,
            provider_token,
            amount,
            status: PaymentStatus::Paid,
        }
    }

    /// データベースから取得したデータで決済レコードを再構築
    pub fn reconstruct(
        id: PaymentId,
        booking_id: BookingId,
        provider_token: String,
        amount: Money,
        status: PaymentStatus,
    ) -> Self {
        Self {
            id,
            booking_id,
            provider_token,
            amount,
            status,
        }
    }

    /// 決済IDを取得
    pub fn id(&self) -> PaymentId {
        self.id
    }

    /// 予約IDを取得
    pub fn booking_id(&self) -> BookingId {
        self.booking_id
    }

    /// 決済プロバイダーのトークン参照を取得
    pub fn provider_token(&self) -> &str {
        &self.provider_token
    }

    /// 金額を取得
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// 決済ステータスを取得
    pub fn status(&self) -> PaymentStatus {
        self.status
    }
}
