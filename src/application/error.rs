use crate::domain::error::{DomainError, ReservationError};
use crate::domain::port::RepositoryError;

/// アプリケーション層のエラー型
/// 予約エラー、ドメインエラー、リポジトリエラーをラップする
#[derive(Debug)]
pub enum ApplicationError {
    /// 予約処理のエラー（検証・在庫不足・ロックタイムアウトなど）
    ReservationError(ReservationError),
    /// ドメインエラー（ビジネスルール違反）
    DomainError(DomainError),
    /// リポジトリエラー（永続化の失敗）
    RepositoryError(RepositoryError),
    /// エンティティが見つからない
    NotFound(String),
}

impl std::fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationError::ReservationError(err) => write!(f, "Reservation error: {}", err),
            ApplicationError::DomainError(err) => write!(f, "Domain error: {}", err),
            ApplicationError::RepositoryError(err) => write!(f, "Repository error: {}", err),
            ApplicationError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for ApplicationError {}

// From実装でエラー変換を簡潔に
impl From<ReservationError> for ApplicationError {
    fn from(err: ReservationError) -> Self {
        ApplicationError::ReservationError(err)
    }
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        ApplicationError::DomainError(err)
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(err: RepositoryError) -> Self {
        ApplicationError::RepositoryError(err)
    }
}
