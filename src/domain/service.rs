// ドメインサービス
// 予約受付の排他制御とトランザクション遷移ロジックを実装する

use crate::domain::error::ReservationError;
use crate::domain::model::{
    AvailabilityDay, Booking, BookingId, BookingReference, BookingStatus, GuestCounts, Money,
    PaymentId, PaymentRecord, Room, RoomId, StayWindow, UserId, REFERENCE_BODY_LEN,
    REFERENCE_PREFIX,
};
use crate::domain::port::{
    Logger, ReferenceGenerator, RepositoryError, ReservationStore, RoomDirectory,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// 参照番号の衝突時に挿入を再試行する最大回数
/// 超過した場合は予約全体をロールバックして内部エラーとする
const MAX_REFERENCE_ATTEMPTS: u32 = 5;

const COMPONENT: &str = "ReservationCoordinator";

/// 予約リクエスト
/// 利用者IDと決済トークンは上流（認証・決済認可）で検証済みの不透明な値
#[derive(Debug, Clone)]
pub struct ReservationRequest {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub window: StayWindow,
    pub guests: GuestCounts,
    pub payment_token: String,
}

/// 確定済み予約（コミット後にのみ返される）
#[derive(Debug, Clone)]
pub struct ConfirmedReservation {
    pub booking: Booking,
    pub payment: PaymentRecord,
}

/// ステータス遷移の結果
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub booking: Booking,
    pub previous: BookingStatus,
    pub inventory_released: bool,
}

/// 期間の空室状況（楽観的プレチェックの結果）
#[derive(Debug, Clone)]
pub struct WindowAvailability {
    pub days: Vec<AvailabilityDay>,
    pub unavailable_dates: Vec<NaiveDate>,
}

impl WindowAvailability {
    /// 期間内の全日が予約可能か
    pub fn is_bookable(&self) -> bool {
        self.unavailable_dates.is_empty()
    }
}

/// 予約コーディネーター
/// 空室カレンダーの検証・減算と、予約・決済レコードの永続化を
/// 単一のトランザクションとして実行する。カレンダーを変更できるのは
/// このコーディネーターのみ
pub struct ReservationCoordinator<S: ReservationStore> {
    store: Arc<S>,
    room_directory: Arc<dyn RoomDirectory>,
    reference_generator: Arc<dyn ReferenceGenerator>,
    logger: Arc<dyn Logger>,
}

impl<S: ReservationStore> ReservationCoordinator<S> {
    /// 新しい予約コーディネーターを作成
    pub fn new(
        store: Arc<S>,
        room_directory: Arc<dyn RoomDirectory>,
        reference_generator: Arc<dyn ReferenceGenerator>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            store,
            room_directory,
            reference_generator,
            logger,
        }
    }

    /// 期間の空室状況をロックなしで確認する（楽観的プレチェック）
    /// 結果は助言的なものであり、予約の可否はトランザクション内の
    /// ロック付き再チェックのみが決定する
    pub async fn check_window(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<WindowAvailability, ReservationError> {
        if self
            .room_directory
            .get_room(room_id)
            .await
            .map_err(Self::map_store_error)?
            .filter(|room| room.is_active())
            .is_none()
        {
            return Err(ReservationError::RoomNotFound(room_id));
        }

        let days = self
            .store
            .read_window(room_id, window)
            .await
            .map_err(Self::map_store_error)?;
        let unavailable_dates = unavailable_dates(window, &days, 1);
        Ok(WindowAvailability {
            days,
            unavailable_dates,
        })
    }

    /// 予約を作成する
    ///
    /// アルゴリズム（単一トランザクション、全体が原子的）:
    /// 1. 部屋の存在・アクティブ確認（ロック取得前に拒否）
    /// 2. トランザクション開始
    /// 3. 期間の全カレンダー行を日付順に排他ロック
    /// 4. ロック下で空室を再チェック。不可ならロールバックして OutOfInventory
    /// 5. 全日の在庫を減算（部分減算なし）
    /// 6. 参照番号を生成して予約行を挿入。衝突時は番号のみ再生成して再試行
    /// 7. 決済レコードを挿入
    /// 8. コミット。コミット後にのみ結果を返す
    pub async fn reserve(
        &self,
        request: ReservationRequest,
    ) -> Result<ConfirmedReservation, ReservationError> {
        let correlation_id = Uuid::new_v4();

        let room = self
            .room_directory
            .get_room(request.room_id)
            .await
            .map_err(Self::map_store_error)?
            .filter(|room| room.is_active())
            .ok_or(ReservationError::RoomNotFound(request.room_id))?;

        let mut tx = self.store.begin().await.map_err(Self::map_store_error)?;

        match self
            .reserve_in_tx(&mut tx, &room, &request, correlation_id)
            .await
        {
            Ok(confirmed) => {
                self.store
                    .commit(tx)
                    .await
                    .map_err(Self::map_store_error)?;
                self.logger.info(
                    COMPONENT,
                    &format!(
                        "予約を確定しました: {} (部屋: {}, {} 〜 {})",
                        confirmed.booking.reference(),
                        confirmed.booking.room_id(),
                        confirmed.booking.window().check_in(),
                        confirmed.booking.window().check_out(),
                    ),
                    Some(correlation_id),
                    None,
                );
                Ok(confirmed)
            }
            Err(err) => {
                // 失敗時は必ず全体をロールバックする
                // 部分的に適用された予約・決済・減算は決して残らない
                if let Err(rollback_err) = self.store.rollback(tx).await {
                    self.logger.error(
                        COMPONENT,
                        &format!("ロールバックに失敗しました: {}", rollback_err),
                        Some(correlation_id),
                        None,
                    );
                }
                Err(err)
            }
        }
    }

    /// トランザクション内の予約処理本体
    /// エラーを返した場合、呼び出し元がトランザクション全体をロールバックする
    async fn reserve_in_tx(
        &self,
        tx: &mut S::Tx,
        room: &Room,
        request: &ReservationRequest,
        correlation_id: Uuid,
    ) -> Result<ConfirmedReservation, ReservationError> {
        // ロック前の読み取りは信頼しない。ロックを取得してから再チェックする
        let locked_days = self
            .store
            .lock_window(tx, room.id(), &request.window)
            .await
            .map_err(Self::map_store_error)?;

        let unavailable = unavailable_dates(&request.window, &locked_days, 1);
        if !unavailable.is_empty() {
            self.logger.info(
                COMPONENT,
                &format!(
                    "在庫不足のため予約を拒否しました: 部屋 {} の {:?}",
                    room.id(),
                    unavailable
                ),
                Some(correlation_id),
                None,
            );
            return Err(ReservationError::OutOfInventory {
                room_id: room.id(),
                dates: unavailable,
            });
        }

        self.store
            .decrement_window(tx, room.id(), &request.window, 1)
            .await
            .map_err(Self::map_store_error)?;

        let total_price = price_stay(room, &request.window, &locked_days)?;
        let booking_id = BookingId::new();
        let mut booking = Booking::confirmed(
            booking_id,
            request.user_id,
            room.id(),
            room.hotel_id(),
            request.window,
            request.guests,
            total_price,
            self.reference_generator.generate(),
        );

        // 参照番号の衝突時は在庫減算を巻き戻さず、
        // 番号の再生成と挿入のみを再試行する（回数上限あり）
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.store.insert_booking(tx, &booking).await {
                Ok(()) => break,
                Err(RepositoryError::DuplicateKey(_)) if attempts < MAX_REFERENCE_ATTEMPTS => {
                    self.logger.warn(
                        COMPONENT,
                        &format!(
                            "参照番号が衝突しました。再生成します: {} (試行 {})",
                            booking.reference(),
                            attempts
                        ),
                        Some(correlation_id),
                        None,
                    );
                    booking.replace_reference(self.reference_generator.generate());
                }
                Err(RepositoryError::DuplicateKey(msg)) => {
                    return Err(ReservationError::Internal(format!(
                        "参照番号の衝突が{}回連続しました: {}",
                        MAX_REFERENCE_ATTEMPTS, msg
                    )));
                }
                Err(err) => return Err(Self::map_store_error(err)),
            }
        }

        let payment = PaymentRecord::paid(
            PaymentId::new(),
            booking_id,
            request.payment_token.clone(),
            total_price,
        );
        self.store
            .insert_payment(tx, &payment)
            .await
            .map_err(Self::map_store_error)?;

        Ok(ConfirmedReservation { booking, payment })
    }

    /// 予約のステータスを遷移させる（マネージャー承認・キャンセル・完了・返金）
    /// 独立したトランザクションとして実行される。アクティブな予約の
    /// キャンセル時は、減算と同じ行ロック規律で在庫を解放する
    ///
    /// # Returns
    /// * `Ok(Some(StatusUpdate))` - 遷移成功
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(ReservationError)` - 遷移失敗（全ロールバック済み）
    pub async fn update_status(
        &self,
        booking_id: BookingId,
        next: BookingStatus,
    ) -> Result<Option<StatusUpdate>, ReservationError> {
        let correlation_id = Uuid::new_v4();
        let mut tx = self.store.begin().await.map_err(Self::map_store_error)?;

        match self.update_status_in_tx(&mut tx, booking_id, next).await {
            Ok(Some(update)) => {
                self.store
                    .commit(tx)
                    .await
                    .map_err(Self::map_store_error)?;
                self.logger.info(
                    COMPONENT,
                    &format!(
                        "予約 {} のステータスを {} から {} に変更しました (在庫解放: {})",
                        update.booking.reference(),
                        update.previous,
                        next,
                        update.inventory_released
                    ),
                    Some(correlation_id),
                    None,
                );
                Ok(Some(update))
            }
            Ok(None) => {
                let _ = self.store.rollback(tx).await;
                Ok(None)
            }
            Err(err) => {
                if let Err(rollback_err) = self.store.rollback(tx).await {
                    self.logger.error(
                        COMPONENT,
                        &format!("ロールバックに失敗しました: {}", rollback_err),
                        Some(correlation_id),
                        None,
                    );
                }
                Err(err)
            }
        }
    }

    async fn update_status_in_tx(
        &self,
        tx: &mut S::Tx,
        booking_id: BookingId,
        next: BookingStatus,
    ) -> Result<Option<StatusUpdate>, ReservationError> {
        let booking = self
            .store
            .find_booking_for_update(tx, booking_id)
            .await
            .map_err(Self::map_store_error)?;
        let mut booking = match booking {
            Some(booking) => booking,
            None => return Ok(None),
        };

        let previous = booking.status();
        booking
            .transition_to(next)
            .map_err(|e| ReservationError::Validation(e.to_string()))?;

        // 在庫を解放するのはアクティブな予約のキャンセルのみ
        // （返金はキャンセル済みまたは完了済みからの遷移で、解放済みか消費済み）
        let inventory_released = previous.is_active() && next == BookingStatus::Cancelled;
        if inventory_released {
            let window = booking.window();
            self.store
                .lock_window(tx, booking.room_id(), &window)
                .await
                .map_err(Self::map_store_error)?;
            self.store
                .increment_window(tx, booking.room_id(), &window, 1)
                .await
                .map_err(Self::map_store_error)?;
        }

        self.store
            .update_booking(tx, &booking)
            .await
            .map_err(Self::map_store_error)?;

        Ok(Some(StatusUpdate {
            booking,
            previous,
            inventory_released,
        }))
    }

    /// ストアエラーを予約エラーに変換する
    /// ロック待機タイムアウトのみ呼び出し元がリトライ可能なエラーとして区別する
    fn map_store_error(err: RepositoryError) -> ReservationError {
        match err {
            RepositoryError::LockTimeout(_) => ReservationError::LockTimeout,
            other => ReservationError::Internal(other.to_string()),
        }
    }
}

/// 期間内で予約不可能な日を列挙する
/// 行が存在しない日は「予約不可」として扱う（無限在庫と解釈しない）
fn unavailable_dates(
    window: &StayWindow,
    days: &[AvailabilityDay],
    units: u32,
) -> Vec<NaiveDate> {
    let by_day: HashMap<NaiveDate, &AvailabilityDay> =
        days.iter().map(|day| (day.day(), day)).collect();
    window
        .days()
        .filter(|date| {
            by_day
                .get(date)
                .map_or(true, |row| !row.is_bookable(units))
        })
        .collect()
}

/// 宿泊料金を計算する（日ごとの上書き価格、なければ基本料金の合計）
fn price_stay(
    room: &Room,
    window: &StayWindow,
    days: &[AvailabilityDay],
) -> Result<Money, ReservationError> {
    let by_day: HashMap<NaiveDate, &AvailabilityDay> =
        days.iter().map(|day| (day.day(), day)).collect();
    let mut total = Money::usd(0);
    for date in window.days() {
        let rate = by_day
            .get(&date)
            .map(|row| row.nightly_rate(room.base_rate()))
            .unwrap_or_else(|| room.base_rate());
        total = total
            .add(&rate)
            .map_err(|e| ReservationError::Internal(e.to_string()))?;
    }
    Ok(total)
}

/// ランダム予約参照番号生成器
/// `BKG-` + 6文字のbase36。UUID v4のエントロピーから導出する
/// この長さでは大規模運用で衝突が起こり得るため、一意性の保証は
/// ユニーク制約とコーディネーターの再試行ループに委ねる
pub struct RandomReferenceGenerator;

impl RandomReferenceGenerator {
    /// 新しい生成器を作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceGenerator for RandomReferenceGenerator {
    fn generate(&self) -> BookingReference {
        const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let mut value = Uuid::new_v4().as_u128();
        let mut body = String::with_capacity(REFERENCE_BODY_LEN);
        for _ in 0..REFERENCE_BODY_LEN {
            body.push(ALPHABET[(value % 36) as usize] as char);
            value /= 36;
        }
        BookingReference::new(format!("{}{}", REFERENCE_PREFIX, body))
            .expect("生成された参照番号は常に有効な形式")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, d).unwrap()
    }

    #[test]
    fn test_generated_reference_format() {
        let generator = RandomReferenceGenerator::new();
        for _ in 0..1000 {
            let reference = generator.generate();
            let value = reference.as_str();
            assert!(value.starts_with(REFERENCE_PREFIX));
            let body = &value[REFERENCE_PREFIX.len()..];
            assert_eq!(body.len(), REFERENCE_BODY_LEN);
            assert!(body
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_unavailable_dates_missing_row_is_not_bookable() {
        let room_id = RoomId::new();
        let window = StayWindow::new(date(10), date(13)).unwrap();
        // 11日の行が存在しない
        let days = vec![
            AvailabilityDay::new(room_id, date(10), 1),
            AvailabilityDay::new(room_id, date(12), 1),
        ];
        let unavailable = unavailable_dates(&window, &days, 1);
        assert_eq!(unavailable, vec![date(11)]);
    }

    #[test]
    fn test_unavailable_dates_exhausted_and_blocked() {
        let room_id = RoomId::new();
        let window = StayWindow::new(date(10), date(13)).unwrap();
        let mut blocked = AvailabilityDay::new(room_id, date(12), 1);
        blocked.set_blocked(true);
        let days = vec![
            AvailabilityDay::new(room_id, date(10), 1),
            AvailabilityDay::new(room_id, date(11), 0), // 在庫切れ
            blocked,
        ];
        let unavailable = unavailable_dates(&window, &days, 1);
        assert_eq!(unavailable, vec![date(11), date(12)]);
    }

    #[test]
    fn test_unavailable_dates_all_bookable() {
        let room_id = RoomId::new();
        let window = StayWindow::new(date(10), date(12)).unwrap();
        let days = vec![
            AvailabilityDay::new(room_id, date(10), 1),
            AvailabilityDay::new(room_id, date(11), 2),
        ];
        assert!(unavailable_dates(&window, &days, 1).is_empty());
    }

    #[test]
    fn test_price_stay_uses_override_price() {
        let room = Room::new(
            RoomId::new(),
            crate::domain::model::HotelId::new(),
            "スタンダード".to_string(),
            3,
            Money::usd(10000),
            true,
        );
        let window = StayWindow::new(date(10), date(12)).unwrap();
        let mut discounted = AvailabilityDay::new(room.id(), date(11), 3);
        discounted.set_override_price(Some(Money::usd(8000)));
        let days = vec![AvailabilityDay::new(room.id(), date(10), 3), discounted];

        let total = price_stay(&room, &window, &days).unwrap();
        assert_eq!(total, Money::usd(18000));
    }
}
