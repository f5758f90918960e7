use sqlx::error::ErrorKind;

/// データベースエラー型
/// データベース操作で発生するエラーを表現する
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseError {
    /// データベース接続エラー
    ConnectionError(String),
    /// SQLクエリエラー
    QueryError(String),
    /// マイグレーションエラー
    MigrationError(String),
    /// 行ロックの待機タイムアウト
    LockTimeout(String),
    /// ユニーク制約違反
    DuplicateKey(String),
}

impl DatabaseError {
    /// sqlxのエラーを分類して変換する
    /// ユニーク制約違反とロック待機タイムアウトは呼び出し元で
    /// 回復可能なエラーとして扱われるため、専用のバリアントに割り当てる
    pub fn from_sqlx(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.kind() == ErrorKind::UniqueViolation {
                return DatabaseError::DuplicateKey(format!("{}: {}", context, db_err));
            }
            // MySQLのエラー1205 (ER_LOCK_WAIT_TIMEOUT)
            let message = db_err.message();
            if message.contains("Lock wait timeout") {
                return DatabaseError::LockTimeout(format!("{}: {}", context, message));
            }
        }
        DatabaseError::QueryError(format!("{}: {}", context, err))
    }
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::ConnectionError(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::QueryError(msg) => write!(f, "Database query error: {}", msg),
            DatabaseError::MigrationError(msg) => write!(f, "Migration error: {}", msg),
            DatabaseError::LockTimeout(msg) => write!(f, "Lock wait timeout: {}", msg),
            DatabaseError::DuplicateKey(msg) => write!(f, "Duplicate key: {}", msg),
        }
    }
}

impl std::error::Error for DatabaseError {}

/// DatabaseErrorからRepositoryErrorへの変換
impl From<DatabaseError> for crate::domain::port::RepositoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionError(msg) => {
                crate::domain::port::RepositoryError::ConnectionFailed(msg)
            }
            DatabaseError::QueryError(msg) => {
                crate::domain::port::RepositoryError::OperationFailed(msg)
            }
            DatabaseError::MigrationError(msg) => {
                crate::domain::port::RepositoryError::OperationFailed(msg)
            }
            DatabaseError::LockTimeout(msg) => {
                crate::domain::port::RepositoryError::LockTimeout(msg)
            }
            DatabaseError::DuplicateKey(msg) => {
                crate::domain::port::RepositoryError::DuplicateKey(msg)
            }
        }
    }
}
