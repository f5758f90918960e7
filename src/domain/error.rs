use crate::domain::model::RoomId;
use chrono::NaiveDate;

/// ドメイン層のエラー型
/// ビジネスルール違反を表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 無効な宿泊期間（例: チェックアウトがチェックインより前）
    InvalidStayWindow(String),
    /// 無効な宿泊人数（例: 大人0名）
    InvalidGuestCount(String),
    /// 無効な予約状態遷移（例: 完了済みの予約をキャンセルしようとした）
    InvalidBookingState(String),
    /// 在庫切れ（該当日の空室ユニットが0）
    NoUnitsAvailable,
    /// 該当日が手動ブロックされている（メンテナンスなど）
    DayBlocked,
    /// 無効なユニット数（例: 0ユニット）
    InvalidQuantity,
    /// 無効な予約参照番号
    InvalidReference(String),
    /// 通貨の不一致
    CurrencyMismatch,
    /// 無効な値
    InvalidValue(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidStayWindow(msg) => write!(f, "Invalid stay window: {}", msg),
            DomainError::InvalidGuestCount(msg) => write!(f, "Invalid guest count: {}", msg),
            DomainError::InvalidBookingState(msg) => write!(f, "Invalid booking state: {}", msg),
            DomainError::NoUnitsAvailable => write!(f, "No units available"),
            DomainError::DayBlocked => write!(f, "Day is blocked"),
            DomainError::InvalidQuantity => write!(f, "Invalid quantity"),
            DomainError::InvalidReference(msg) => write!(f, "Invalid booking reference: {}", msg),
            DomainError::CurrencyMismatch => write!(f, "Currency mismatch"),
            DomainError::InvalidValue(msg) => write!(f, "Invalid value: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

/// 予約処理のエラー型
/// 予約コーディネーターが呼び出し元に返すエラー分類
#[derive(Debug, Clone, PartialEq)]
pub enum ReservationError {
    /// リクエストの検証失敗（ロック取得前に拒否される）
    Validation(String),
    /// 指定された部屋が存在しない、または非アクティブ
    RoomNotFound(RoomId),
    /// 期間内の少なくとも1日が在庫切れまたはブロック済み
    /// 呼び出し元は別の日付・部屋でリトライ可能
    OutOfInventory {
        room_id: RoomId,
        dates: Vec<NaiveDate>,
    },
    /// ロック待機のタイムアウト
    /// 何も書き込まれていないため、同一リクエストで安全にリトライ可能
    LockTimeout,
    /// その他の内部エラー（常に全ロールバック済み）
    Internal(String),
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReservationError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            ReservationError::RoomNotFound(room_id) => write!(f, "Room not found: {}", room_id),
            ReservationError::OutOfInventory { room_id, dates } => {
                write!(f, "Out of inventory for room {} on {:?}", room_id, dates)
            }
            ReservationError::LockTimeout => write!(f, "Lock wait timeout"),
            ReservationError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ReservationError {}

impl From<DomainError> for ReservationError {
    fn from(err: DomainError) -> Self {
        ReservationError::Validation(err.to_string())
    }
}
