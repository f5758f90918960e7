use crate::domain::error::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

/// 部屋の一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(Uuid);

impl RoomId {
    /// 新しい一意のRoomIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから RoomId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からRoomIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

/// ホテルの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotelId(Uuid);

impl HotelId {
    /// 新しい一意のHotelIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから HotelId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からHotelIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for HotelId {
    fn default() -> Self {
        Self::new()
    }
}

/// 利用者の一意識別子
/// 認証済みユーザーIDとして外部から渡される不透明な値
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// 新しい一意のUserIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから UserId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からUserIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

/// 予約の一意識別子（内部ID、人間向けの参照番号とは別物）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(Uuid);

impl BookingId {
    /// 新しい一意のBookingIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから BookingId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からBookingIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for BookingId {
    fn default() -> Self {
        Self::new()
    }
}

/// 決済レコードの一意識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentId(Uuid);

impl PaymentId {
    /// 新しい一意のPaymentIdを生成
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// UUIDから PaymentId を作成
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// 文字列からPaymentIdを作成
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        let uuid = Uuid::parse_str(s)?;
        Ok(Self(uuid))
    }

    /// 内部のUUIDを取得
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

/// 通貨
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    /// 米ドル
    #[allow(clippy::upper_case_acronyms)]
    USD,
}

/// 金額を表す値オブジェクト（セント単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// 金額と通貨から作成
    pub fn new(amount: i64, currency: String) -> Result<Self, DomainError> {
        let currency = match currency.as_str() {
            "USD" => Currency::USD,
            _ => {
                return Err(DomainError::InvalidValue(format!(
                    "サポートされていない通貨: {}",
                    currency
                )))
            }
        };
        Ok(Self { amount, currency })
    }

    /// 米ドルの金額を作成（セント単位）
    pub fn usd(amount: i64) -> Self {
        Self {
            amount,
            currency: Currency::USD,
        }
    }

    /// 金額を取得
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// 通貨を文字列として取得
    pub fn currency(&self) -> String {
        match self.currency {
            Currency::USD => "USD".to_string(),
        }
    }

    /// 金額を加算
    pub fn add(&self, other: &Money) -> Result<Money, DomainError> {
        if self.currency != other.currency {
            return Err(DomainError::CurrencyMismatch);
        }
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency,
        })
    }

    /// 金額を乗算
    pub fn multiply(&self, factor: u32) -> Money {
        Money {
            amount: self.amount * factor as i64,
            currency: self.currency,
        }
    }
}

/// 宿泊期間を表す値オブジェクト
/// 半開区間 [check_in, check_out) — チェックアウト日は在庫を消費しない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayWindow {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayWindow {
    /// 新しい宿泊期間を作成
    /// チェックアウトはチェックインより後である必要がある（最低1泊）
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, DomainError> {
        if check_out <= check_in {
            return Err(DomainError::InvalidStayWindow(format!(
                "チェックアウト({})はチェックイン({})より後である必要があります",
                check_out, check_in
            )));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// チェックイン日を取得
    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// チェックアウト日を取得（この日は在庫を消費しない）
    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// 宿泊数を取得
    pub fn nights(&self) -> u32 {
        (self.check_out - self.check_in).num_days() as u32
    }

    /// 在庫を消費する日を昇順で列挙する
    /// check_in は含み、check_out は含まない
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let check_out = self.check_out;
        std::iter::successors(Some(self.check_in), move |d| {
            d.succ_opt().filter(|next| *next < check_out)
        })
    }

    /// 指定された日がこの期間に含まれるか（半開区間）
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.check_in <= day && day < self.check_out
    }
}

/// 宿泊人数を表す値オブジェクト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCounts {
    adults: u32,
    children: u32,
}

impl GuestCounts {
    /// 新しい宿泊人数を作成
    /// 大人は1名以上である必要がある
    pub fn new(adults: u32, children: u32) -> Result<Self, DomainError> {
        if adults == 0 {
            return Err(DomainError::InvalidGuestCount(
                "大人は1名以上である必要があります".to_string(),
            ));
        }
        Ok(Self { adults, children })
    }

    /// 大人の人数を取得
    pub fn adults(&self) -> u32 {
        self.adults
    }

    /// 子供の人数を取得
    pub fn children(&self) -> u32 {
        self.children
    }

    /// 合計人数を取得
    pub fn total(&self) -> u32 {
        self.adults + self.children
    }
}

/// 予約参照番号のプレフィックス
pub const REFERENCE_PREFIX: &str = "BKG-";

/// 予約参照番号の本体の文字数（base36）
pub const REFERENCE_BODY_LEN: usize = 6;

/// 人間向けの予約参照番号を表す値オブジェクト
/// 形式: `BKG-` + 6文字のbase36（0-9A-Z）
/// 一意性の最終的な保証者はデータベースのユニーク制約
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingReference(String);

impl BookingReference {
    /// 文字列から予約参照番号を作成
    /// 形式バリデーション: `BKG-` + 6文字の英大文字・数字
    pub fn new(value: String) -> Result<Self, DomainError> {
        let body = match value.strip_prefix(REFERENCE_PREFIX) {
            Some(body) => body,
            None => {
                return Err(DomainError::InvalidReference(format!(
                    "参照番号は{}で始まる必要があります: {}",
                    REFERENCE_PREFIX, value
                )))
            }
        };
        if body.len() != REFERENCE_BODY_LEN
            || !body.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        {
            return Err(DomainError::InvalidReference(format!(
                "参照番号の本体は{}文字のbase36である必要があります: {}",
                REFERENCE_BODY_LEN, value
            )));
        }
        Ok(Self(value))
    }

    /// 文字列表現を取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 予約のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    /// 保留中（マネージャー承認待ち）
    Pending,
    /// 確定済み（在庫消費中）
    Confirmed,
    /// キャンセル済み（在庫解放済み）
    Cancelled,
    /// 宿泊完了
    Completed,
    /// 返金済み
    Refunded,
}

impl BookingStatus {
    /// 在庫を消費中のステータスか（保留中・確定済み）
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// 指定されたステータスへの遷移が許可されているか
    /// 遷移は前進のみ:
    /// Pending → Confirmed | Cancelled
    /// Confirmed → Cancelled | Completed
    /// Completed → Refunded
    /// Cancelled → Refunded
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
                | (Completed, Refunded)
                | (Cancelled, Refunded)
        )
    }

    /// 文字列からBookingStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            "Completed" => Ok(BookingStatus::Completed),
            "Refunded" => Ok(BookingStatus::Refunded),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な予約ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
            BookingStatus::Refunded => "Refunded",
        };
        write!(f, "{}", status_str)
    }
}

/// 決済のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// 未払い
    Pending,
    /// 支払い済み
    Paid,
    /// 一部支払い済み
    PartiallyPaid,
    /// 返金済み
    Refunded,
}

impl PaymentStatus {
    /// 文字列からPaymentStatusを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            "PartiallyPaid" => Ok(PaymentStatus::PartiallyPaid),
            "Refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(DomainError::InvalidValue(format!(
                "無効な決済ステータス: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status_str = match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::PartiallyPaid => "PartiallyPaid",
            PaymentStatus::Refunded => "Refunded",
        };
        write!(f, "{}", status_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_booking_id_creation() {
        let id1 = BookingId::new();
        let id2 = BookingId::new();
        assert_ne!(id1, id2, "Each BookingId should be unique");
    }

    #[test]
    fn test_money_addition() {
        let money1 = Money::usd(10000);
        let money2 = Money::usd(5000);
        let result = money1.add(&money2).unwrap();
        assert_eq!(result.amount(), 15000);
    }

    #[test]
    fn test_money_multiplication() {
        let money = Money::usd(100);
        let result = money.multiply(5);
        assert_eq!(result.amount(), 500);
    }

    #[test]
    fn test_stay_window_half_open_days() {
        // 2026-04-10 〜 2026-04-12 は2泊（10日と11日のみ消費）
        let window = StayWindow::new(date(2026, 4, 10), date(2026, 4, 12)).unwrap();
        assert_eq!(window.nights(), 2);
        let days: Vec<NaiveDate> = window.days().collect();
        assert_eq!(days, vec![date(2026, 4, 10), date(2026, 4, 11)]);
        assert!(!window.contains(date(2026, 4, 12)));
    }

    #[test]
    fn test_stay_window_single_night() {
        let window = StayWindow::new(date(2026, 4, 12), date(2026, 4, 13)).unwrap();
        assert_eq!(window.nights(), 1);
        assert_eq!(window.days().count(), 1);
    }

    #[test]
    fn test_stay_window_rejects_empty_range() {
        let result = StayWindow::new(date(2026, 4, 10), date(2026, 4, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_stay_window_rejects_inverted_range() {
        let result = StayWindow::new(date(2026, 4, 12), date(2026, 4, 10));
        assert!(result.is_err());
    }

    #[test]
    fn test_guest_counts_requires_adult() {
        assert!(GuestCounts::new(0, 2).is_err());
        let guests = GuestCounts::new(2, 1).unwrap();
        assert_eq!(guests.total(), 3);
    }

    #[test]
    fn test_booking_reference_valid() {
        let reference = BookingReference::new("BKG-A1B2C3".to_string()).unwrap();
        assert_eq!(reference.as_str(), "BKG-A1B2C3");
    }

    #[test]
    fn test_booking_reference_invalid_prefix() {
        assert!(BookingReference::new("RES-A1B2C3".to_string()).is_err());
    }

    #[test]
    fn test_booking_reference_invalid_body() {
        assert!(BookingReference::new("BKG-a1b2c3".to_string()).is_err()); // 小文字
        assert!(BookingReference::new("BKG-A1B2".to_string()).is_err()); // 短すぎる
        assert!(BookingReference::new("BKG-A1B2C3D".to_string()).is_err()); // 長すぎる
    }

    #[test]
    fn test_booking_status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Refunded));
        assert!(Cancelled.can_transition_to(Refunded));

        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Confirmed));
        assert!(!Refunded.can_transition_to(Pending));
        assert!(!Confirmed.can_transition_to(Pending));
    }

    #[test]
    fn test_booking_status_from_string() {
        assert!(BookingStatus::from_string("Pending").is_ok());
        assert!(BookingStatus::from_string("Confirmed").is_ok());
        assert!(BookingStatus::from_string("Cancelled").is_ok());
        assert!(BookingStatus::from_string("Completed").is_ok());
        assert!(BookingStatus::from_string("Refunded").is_ok());
        assert!(BookingStatus::from_string("pending").is_err()); // 大文字小文字が違う
        assert!(BookingStatus::from_string("").is_err());
    }

    #[test]
    fn test_payment_status_round_trip() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::PartiallyPaid,
            PaymentStatus::Refunded,
        ] {
            let parsed = PaymentStatus::from_string(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
    }
}
