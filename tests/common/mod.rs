// テスト共通のインメモリアダプター実装
// MySQLアダプターと同じポート契約を満たし、トランザクションの
// 原子性（コミット時のみ書き込みが観測される）を再現する

use async_trait::async_trait;
use chrono::NaiveDate;
use hotel_reservation_management::domain::event::DomainEvent;
use hotel_reservation_management::domain::model::{
    AvailabilityDay, Booking, BookingDetail, BookingId, BookingReference, BookingSummary, HotelId,
    Money, PaymentRecord, PaymentView, Room, RoomId, StayWindow, UserId,
};
use hotel_reservation_management::domain::port::{
    BookingQueries, EventPublisher, PublisherError, ReferenceGenerator, RepositoryError,
    ReservationStore, RoomDirectory, RoomProvisioning,
};
use hotel_reservation_management::domain::service::RandomReferenceGenerator;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// コミット済みのストア状態
#[derive(Debug, Clone, Default)]
pub struct InMemoryState {
    pub rooms: HashMap<RoomId, Room>,
    pub days: HashMap<(RoomId, NaiveDate), AvailabilityDay>,
    pub bookings: HashMap<BookingId, Booking>,
    pub payments: HashMap<BookingId, PaymentRecord>,
    pub references: HashSet<String>,
}

/// インメモリトランザクション
/// begin時に状態ロックを取得してスナップショットを作り、
/// コミット時にのみスナップショットを書き戻す
pub struct InMemoryTx {
    guard: OwnedMutexGuard<InMemoryState>,
    snapshot: InMemoryState,
}

/// インメモリ予約ストア
/// トランザクション中は状態全体のロックを保持するため、
/// 行ロックの相互排他よりも保守的な直列化になる
pub struct InMemoryReservationStore {
    state: Arc<Mutex<InMemoryState>>,
    fail_payment_insert: AtomicBool,
}

impl InMemoryReservationStore {
    pub fn new(state: Arc<Mutex<InMemoryState>>) -> Self {
        Self {
            state,
            fail_payment_insert: AtomicBool::new(false),
        }
    }

    /// 決済レコードの挿入を強制的に失敗させる（原子性テスト用）
    pub fn fail_next_payment_inserts(&self, fail: bool) {
        self.fail_payment_insert.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, RepositoryError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let snapshot = guard.clone();
        Ok(InMemoryTx { guard, snapshot })
    }

    async fn read_window(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(window
            .days()
            .filter_map(|day| state.days.get(&(room_id, day)).cloned())
            .collect())
    }

    async fn lock_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError> {
        Ok(window
            .days()
            .filter_map(|day| tx.snapshot.days.get(&(room_id, day)).cloned())
            .collect())
    }

    async fn decrement_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
        units: u32,
    ) -> Result<(), RepositoryError> {
        for day in window.days() {
            let row = tx.snapshot.days.get_mut(&(room_id, day)).ok_or_else(|| {
                RepositoryError::OperationFailed(format!("カレンダー行がありません: {}", day))
            })?;
            if row.is_blocked() || row.available_units() < units {
                return Err(RepositoryError::OperationFailed(format!(
                    "在庫の減算に失敗しました: {}",
                    day
                )));
            }
            let updated = AvailabilityDay::reconstruct(
                row.room_id(),
                row.day(),
                row.available_units() - units,
                row.override_price(),
                row.is_blocked(),
            );
            tx.snapshot.days.insert((room_id, day), updated);
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
        for day in window.days() {
            let row = tx.snapshot.days.get_mut(&(room_id, day)).ok_or_else(|| {
                RepositoryError::OperationFailed(format!("カレンダー行がありません: {}", day))
            })?;
            let updated = AvailabilityDay::reconstruct(
                row.room_id(),
                row.day(),
                row.available_units() + units,
                row.override_price(),
                row.is_blocked(),
            );
            tx.snapshot.days.insert((room_id, day), updated);
        }
        Ok(())
    }

    async fn insert_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        let reference = booking.reference().as_str().to_string();
        if tx.snapshot.references.contains(&reference) {
            return Err(RepositoryError::DuplicateKey(format!(
                "booking_reference: {}",
                reference
            )));
        }
        tx.snapshot.references.insert(reference);
        tx.snapshot.bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn insert_payment(
        &self,
        tx: &mut Self::Tx,
        payment: &PaymentRecord,
    ) -> Result<(), RepositoryError> {
        if self.fail_payment_insert.load(Ordering::SeqCst) {
            return Err(RepositoryError::OperationFailed(
                "決済レコードの保存に失敗しました (注入された障害)".to_string(),
            ));
        }
        tx.snapshot.payments.insert(payment.booking_id(), payment.clone());
        Ok(())
    }

    async fn find_booking_for_update(
        &self,
        tx: &mut Self::Tx,
        booking_id: BookingId,
    ) -> Result<Option<Booking>, RepositoryError> {
        Ok(tx.snapshot.bookings.get(&booking_id).cloned())
    }

    async fn update_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError> {
        tx.snapshot.bookings.insert(booking.id(), booking.clone());
        Ok(())
    }

    async fn commit(&self, tx: Self::Tx) -> Result<(), RepositoryError> {
        let InMemoryTx { mut guard, snapshot } = tx;
        *guard = snapshot;
        Ok(())
    }

    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepositoryError> {
        drop(tx);
        Ok(())
    }
}

/// インメモリ部屋ディレクトリ
pub struct InMemoryRoomDirectory {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRoomDirectory {
    pub fn new(state: Arc<Mutex<InMemoryState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.rooms.get(&room_id).cloned())
    }
}

/// インメモリ部屋プロビジョニング
pub struct InMemoryRoomProvisioning {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRoomProvisioning {
    pub fn new(state: Arc<Mutex<InMemoryState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl RoomProvisioning for InMemoryRoomProvisioning {
    async fn insert_room(&self, room: &Room) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        state.rooms.insert(room.id(), room.clone());
        Ok(())
    }

    async fn upsert_availability_days(
        &self,
        days: &[AvailabilityDay],
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.lock().await;
        for day in days {
            state.days.insert((day.room_id(), day.day()), day.clone());
        }
        Ok(())
    }
}

/// インメモリ予約クエリ
pub struct InMemoryBookingQueries {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryBookingQueries {
    pub fn new(state: Arc<Mutex<InMemoryState>>) -> Self {
        Self { state }
    }
}

fn summary_of(state: &InMemoryState, booking: &Booking) -> BookingSummary {
    let room_name = state
        .rooms
        .get(&booking.room_id())
        .map(|room| room.name().to_string())
        .unwrap_or_default();
    BookingSummary {
        booking_id: booking.id(),
        reference: booking.reference().as_str().to_string(),
        room_id: booking.room_id(),
        room_name,
        hotel_id: booking.hotel_id(),
        check_in: booking.window().check_in(),
        check_out: booking.window().check_out(),
        status: booking.status(),
        payment_status: booking.payment_status(),
        total_price: booking.total_price(),
        created_at: chrono::Utc::now(),
    }
}

#[async_trait]
impl BookingQueries for InMemoryBookingQueries {
    async fn find_detail(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<BookingDetail>, RepositoryError> {
        let state = self.state.lock().await;
        let booking = match state.bookings.get(&booking_id) {
            Some(booking) => booking,
            None => return Ok(None),
        };
        let summary = summary_of(&state, booking);
        let payment = state.payments.get(&booking_id).map(|payment| PaymentView {
            payment_id: payment.id(),
            provider_token: payment.provider_token().to_string(),
            amount: payment.amount(),
            status: payment.status(),
        });

        Ok(Some(BookingDetail {
            booking_id: summary.booking_id,
            reference: summary.reference,
            user_id: booking.user_id(),
            room_id: summary.room_id,
            room_name: summary.room_name,
            hotel_id: summary.hotel_id,
            check_in: summary.check_in,
            check_out: summary.check_out,
            adults: booking.guests().adults(),
            children: booking.guests().children(),
            status: summary.status,
            payment_status: summary.payment_status,
            total_price: summary.total_price,
            payment,
            created_at: summary.created_at,
        }))
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<BookingSummary>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .filter(|booking| booking.user_id() == user_id)
            .map(|booking| summary_of(&state, booking))
            .collect())
    }

    async fn find_by_hotel(
        &self,
        hotel_id: HotelId,
    ) -> Result<Vec<BookingSummary>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .bookings
            .values()
            .filter(|booking| booking.hotel_id() == hotel_id)
            .map(|booking| summary_of(&state, booking))
            .collect())
    }
}

/// 発行されたイベントを記録するテスト用パブリッシャー
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: StdMutex<Vec<DomainEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// 事前に決められた参照番号を順に返し、尽きたらランダム生成に
/// フォールバックする生成器（衝突リトライのテスト用）
pub struct ScriptedReferenceGenerator {
    scripted: StdMutex<VecDeque<BookingReference>>,
    fallback: RandomReferenceGenerator,
}

impl ScriptedReferenceGenerator {
    pub fn new(scripted: Vec<BookingReference>) -> Self {
        Self {
            scripted: StdMutex::new(scripted.into_iter().collect()),
            fallback: RandomReferenceGenerator::new(),
        }
    }
}

impl ReferenceGenerator for ScriptedReferenceGenerator {
    fn generate(&self) -> BookingReference {
        let mut scripted = self.scripted.lock().unwrap();
        match scripted.pop_front() {
            Some(reference) => reference,
            None => self.fallback.generate(),
        }
    }
}

/// 何も出力しないテスト用ロガー
pub struct SilentLogger;

impl hotel_reservation_management::domain::port::Logger for SilentLogger {
    fn debug(
        &self,
        _component: &str,
        _message: &str,
        _correlation_id: Option<uuid::Uuid>,
        _context: Option<HashMap<String, String>>,
    ) {
    }

    fn info(
        &self,
        _component: &str,
        _message: &str,
        _correlation_id: Option<uuid::Uuid>,
        _context: Option<HashMap<String, String>>,
    ) {
    }

    fn warn(
        &self,
        _component: &str,
        _message: &str,
        _correlation_id: Option<uuid::Uuid>,
        _context: Option<HashMap<String, String>>,
    ) {
    }

    fn error(
        &self,
        _component: &str,
        _message: &str,
        _correlation_id: Option<uuid::Uuid>,
        _context: Option<HashMap<String, String>>,
    ) {
    }
}

/// テスト用の部屋をコミット済み状態に登録する
pub async fn seed_room(
    state: &Arc<Mutex<InMemoryState>>,
    total_units: u32,
    base_rate: Money,
) -> Room {
    let room = Room::new(
        RoomId::new(),
        HotelId::new(),
        "スタンダードルーム".to_string(),
        total_units,
        base_rate,
        true,
    );
    state.lock().await.rooms.insert(room.id(), room.clone());
    room
}

/// テスト用のカレンダー行をコミット済み状態に登録する
pub async fn seed_days(
    state: &Arc<Mutex<InMemoryState>>,
    room_id: RoomId,
    window: &StayWindow,
    available_units: u32,
) {
    let mut guard = state.lock().await;
    for day in window.days() {
        guard
            .days
            .insert((room_id, day), AvailabilityDay::new(room_id, day, available_units));
    }
}
