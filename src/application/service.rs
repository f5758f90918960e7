pub mod booking_query_service;

use crate::application::ApplicationError;
use crate::domain::event::{BookingStatusChanged, DomainEvent, ReservationConfirmed};
use crate::domain::model::{
    AvailabilityDay, BookingId, BookingStatus, HotelId, Money, Room, RoomId, StayWindow,
};
use crate::domain::port::{EventPublisher, Logger, ReservationStore, RoomProvisioning};
use crate::domain::service::{
    ConfirmedReservation, ReservationCoordinator, ReservationRequest, StatusUpdate,
    WindowAvailability,
};
use std::sync::Arc;

const COMPONENT: &str = "ReservationApplicationService";

/// 予約アプリケーションサービス
/// 予約コーディネーターをラップし、コミット済みのユースケースに対して
/// ドメインイベントを発行する
pub struct ReservationApplicationService<S>
where
    S: ReservationStore,
{
    coordinator: ReservationCoordinator<S>,
    event_publisher: Arc<dyn EventPublisher>,
    logger: Arc<dyn Logger>,
}

impl<S> ReservationApplicationService<S>
where
    S: ReservationStore,
{
    /// 新しい予約アプリケーションサービスを作成
    ///
    /// # Arguments
    /// * `coordinator` - 予約コーディネーター
    /// * `event_publisher` - イベント発行者
    /// * `logger` - ロガー
    pub fn new(
        coordinator: ReservationCoordinator<S>,
        event_publisher: Arc<dyn EventPublisher>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            coordinator,
            event_publisher,
            logger,
        }
    }

    /// 予約を作成する
    /// コミット成功後に予約確定イベントを発行する。イベント発行の失敗は
    /// 予約の成否に影響しない（予約は既に確定済みのため）
    ///
    /// # Returns
    /// * `Ok(ConfirmedReservation)` - 確定した予約と決済レコード
    /// * `Err(ApplicationError)` - 予約失敗（全ロールバック済み）
    pub async fn make_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<ConfirmedReservation, ApplicationError> {
        let confirmed = self.coordinator.reserve(request).await?;

        let event = ReservationConfirmed::new(
            confirmed.booking.id(),
            confirmed.booking.reference().clone(),
            confirmed.booking.user_id(),
            confirmed.booking.room_id(),
            confirmed.booking.window(),
            confirmed.booking.total_price(),
        );
        self.publish(DomainEvent::ReservationConfirmed(event));

        Ok(confirmed)
    }

    /// 予約のステータスを遷移させる
    ///
    /// # Returns
    /// * `Ok(StatusUpdate)` - 遷移成功
    /// * `Err(ApplicationError::NotFound)` - 予約が見つからなかった
    /// * `Err(ApplicationError)` - 遷移失敗
    pub async fn change_booking_status(
        &self,
        booking_id: BookingId,
        next: BookingStatus,
    ) -> Result<StatusUpdate, ApplicationError> {
        let update = self
            .coordinator
            .update_status(booking_id, next)
            .await?
            .ok_or_else(|| {
                ApplicationError::NotFound(format!("予約が見つかりません: {}", booking_id))
            })?;

        let event = BookingStatusChanged::new(
            update.booking.id(),
            update.booking.reference().clone(),
            update.previous,
            update.booking.status(),
            update.inventory_released,
        );
        self.publish(DomainEvent::BookingStatusChanged(event));

        Ok(update)
    }

    /// 指定されたステータス文字列へ予約を遷移させる
    ///
    /// # Arguments
    /// * `booking_id` - 予約ID
    /// * `status_str` - 遷移先のステータス文字列
    pub async fn change_booking_status_string(
        &self,
        booking_id: BookingId,
        status_str: &str,
    ) -> Result<StatusUpdate, ApplicationError> {
        let status = BookingStatus::from_string(status_str)
            .map_err(ApplicationError::DomainError)?;
        self.change_booking_status(booking_id, status).await
    }

    /// 予約をキャンセルする
    /// アクティブな予約のキャンセルは宿泊期間の在庫を解放する
    pub async fn cancel_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<StatusUpdate, ApplicationError> {
        self.change_booking_status(booking_id, BookingStatus::Cancelled)
            .await
    }

    /// 期間の空室状況をロックなしで確認する（楽観的プレチェック）
    pub async fn check_availability(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<WindowAvailability, ApplicationError> {
        self.coordinator
            .check_window(room_id, window)
            .await
            .map_err(ApplicationError::from)
    }

    /// コミット済みイベントを発行する。失敗はログに記録するのみ
    fn publish(&self, event: DomainEvent) {
        if let Err(err) = self.event_publisher.publish(&event) {
            self.logger.warn(
                COMPONENT,
                &format!("イベントの発行に失敗しました: {}", err),
                None,
                None,
            );
        }
    }
}

/// 部屋プロビジョニングサービス
/// 部屋の登録と空室カレンダー行の実体化を行う
/// （本来は外部のプロビジョニング工程。運用のために同居させている）
pub struct RoomProvisioningService {
    provisioning: Arc<dyn RoomProvisioning>,
}

impl RoomProvisioningService {
    /// 新しい部屋プロビジョニングサービスを作成
    pub fn new(provisioning: Arc<dyn RoomProvisioning>) -> Self {
        Self { provisioning }
    }

    /// 部屋を登録する
    pub async fn register_room(
        &self,
        hotel_id: HotelId,
        name: String,
        total_units: u32,
        base_rate: Money,
    ) -> Result<Room, ApplicationError> {
        let room = Room::new(RoomId::new(), hotel_id, name, total_units, base_rate, true);
        self.provisioning.insert_room(&room).await?;
        Ok(room)
    }

    /// 期間のカレンダー行を実体化する
    /// 既存の行は指定値で上書きされる。予約可能にしたい全日に
    /// 行を用意するのはプロビジョニング側の責務
    pub async fn publish_calendar(
        &self,
        room_id: RoomId,
        window: &StayWindow,
        available_units: u32,
        override_price: Option<Money>,
        is_blocked: bool,
    ) -> Result<Vec<AvailabilityDay>, ApplicationError> {
        let days: Vec<AvailabilityDay> = window
            .days()
            .map(|day| {
                let mut row = AvailabilityDay::new(room_id, day, available_units);
                row.set_override_price(override_price);
                row.set_blocked(is_blocked);
                row
            })
            .collect();
        self.provisioning.upsert_availability_days(&days).await?;
        Ok(days)
    }
}
