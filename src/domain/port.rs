// 出力ポート
// ドメイン層が外部に依存する機能をトレイトとして定義
// アダプター層でこれらのトレイトを実装する

use crate::domain::event::DomainEvent;
use crate::domain::model::{
    AvailabilityDay, Booking, BookingDetail, BookingId, BookingReference, BookingSummary, HotelId,
    PaymentRecord, Room, RoomId, StayWindow, UserId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

/// ログレベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// ロガートレイト
/// ログ出力を抽象化するポート
pub trait Logger: Send + Sync {
    /// デバッグレベルのログを出力
    fn debug(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 情報レベルのログを出力
    fn info(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// 警告レベルのログを出力
    fn warn(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );

    /// エラーレベルのログを出力
    fn error(
        &self,
        component: &str,
        message: &str,
        correlation_id: Option<Uuid>,
        context: Option<HashMap<String, String>>,
    );
}

/// リポジトリエラー型
/// 永続化ストアの操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// データベース接続に失敗
    ConnectionFailed(String),
    /// 操作に失敗
    OperationFailed(String),
    /// データの取得に失敗
    FetchFailed(String),
    /// 行ロックの待機がタイムアウトした
    LockTimeout(String),
    /// ユニーク制約違反（予約参照番号の衝突など）
    DuplicateKey(String),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepositoryError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            RepositoryError::OperationFailed(msg) => write!(f, "Operation failed: {}", msg),
            RepositoryError::FetchFailed(msg) => write!(f, "Fetch failed: {}", msg),
            RepositoryError::LockTimeout(msg) => write!(f, "Lock wait timeout: {}", msg),
            RepositoryError::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// 予約ストアトレイト
/// 予約コーディネーターのトランザクション境界を抽象化する
///
/// 同一部屋の重複する日付範囲に対する相互排他は、
/// `lock_window` が取得する行ロック（SELECT ... FOR UPDATE 相当）に委譲される。
/// ロックなしの read-then-write は競合するため明示的に禁止。
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// トランザクションハンドル
    type Tx: Send;

    /// トランザクションを開始する
    async fn begin(&self) -> Result<Self::Tx, RepositoryError>;

    /// 半開区間 [check_in, check_out) のカレンダー行をロックなしで読み取る
    /// 楽観的なプレチェック専用。予約トランザクション内の判定には
    /// `lock_window` の結果のみを信頼すること
    async fn read_window(
        &self,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError>;

    /// 半開区間 [check_in, check_out) の全カレンダー行を
    /// 日付昇順（単一の全順序）で排他ロックし、ロック下の値を返す
    ///
    /// 存在しない日の行は返されない。行の不在は「予約不可」を意味し、
    /// 返された行数と宿泊数の照合は呼び出し元（コーディネーター）が行う。
    async fn lock_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
    ) -> Result<Vec<AvailabilityDay>, RepositoryError>;

    /// 期間内の全日の available_units を減算する
    /// 1日でも減算できない場合は操作全体が失敗する（部分減算なし）
    async fn decrement_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
        units: u32,
    ) -> Result<(), RepositoryError>;

    /// 期間内の全日の available_units を加算する（キャンセル・返金時の解放）
    async fn increment_window(
        &self,
        tx: &mut Self::Tx,
        room_id: RoomId,
        window: &StayWindow,
        units: u32,
    ) -> Result<(), RepositoryError>;

    /// 予約行を挿入する
    /// 参照番号のユニーク制約違反は `RepositoryError::DuplicateKey` として返す
    async fn insert_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError>;

    /// 決済レコード行を挿入する
    async fn insert_payment(
        &self,
        tx: &mut Self::Tx,
        payment: &PaymentRecord,
    ) -> Result<(), RepositoryError>;

    /// 予約を排他ロック付きで取得する（ステータス遷移用）
    async fn find_booking_for_update(
        &self,
        tx: &mut Self::Tx,
        booking_id: BookingId,
    ) -> Result<Option<Booking>, RepositoryError>;

    /// 予約のステータス・決済ステータスを更新する
    async fn update_booking(
        &self,
        tx: &mut Self::Tx,
        booking: &Booking,
    ) -> Result<(), RepositoryError>;

    /// トランザクションをコミットする
    /// コミット成功後にのみ書き込みが観測可能になる
    async fn commit(&self, tx: Self::Tx) -> Result<(), RepositoryError>;

    /// トランザクションをロールバックする
    async fn rollback(&self, tx: Self::Tx) -> Result<(), RepositoryError>;
}

/// 部屋ディレクトリトレイト
/// 外部の部屋カタログへの読み取り専用アクセス
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// 部屋IDで部屋を取得する
    ///
    /// # Returns
    /// * `Ok(Some(Room))` - 部屋が見つかった
    /// * `Ok(None)` - 部屋が見つからなかった
    /// * `Err(RepositoryError)` - 取得失敗
    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError>;
}

/// 部屋プロビジョニングトレイト
/// 部屋の登録と空室カレンダー行の実体化（外部のプロビジョニング工程）
#[async_trait]
pub trait RoomProvisioning: Send + Sync {
    /// 部屋を登録する
    async fn insert_room(&self, room: &Room) -> Result<(), RepositoryError>;

    /// カレンダー行を一括でUPSERTする
    /// 予約可能な全日に行が存在することがカレンダーモデルの前提
    async fn upsert_availability_days(
        &self,
        days: &[AvailabilityDay],
    ) -> Result<(), RepositoryError>;
}

/// 予約クエリトレイト（読み取り側）
/// 予約・決済テーブルと部屋ディレクトリを結合した純粋な読み取りビュー
#[async_trait]
pub trait BookingQueries: Send + Sync {
    /// 予約IDで詳細ビューを取得する
    async fn find_detail(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<BookingDetail>, RepositoryError>;

    /// 利用者の予約履歴を取得する
    /// 作成日時の降順で並べて返す
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<BookingSummary>, RepositoryError>;

    /// ホテル（マネージャーダッシュボード）の予約一覧を取得する
    /// 作成日時の降順で並べて返す
    async fn find_by_hotel(
        &self,
        hotel_id: HotelId,
    ) -> Result<Vec<BookingSummary>, RepositoryError>;
}

/// 予約参照番号生成トレイト
/// 短い人間向けトークンを生成する。衝突の最終的な解決は
/// 生成器単体では不可能なため、コーディネーターの再試行ループが担う
pub trait ReferenceGenerator: Send + Sync {
    /// 新しい予約参照番号を生成する
    fn generate(&self) -> BookingReference;
}

/// イベント発行エラー
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("Event publishing failed: {0}")]
    PublishingFailed(String),
}

/// イベント発行者トレイト
/// コミット済みのドメインイベントを下流のコンシューマーへ通知するポート
pub trait EventPublisher: Send + Sync {
    /// イベントを発行する
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError>;
}
