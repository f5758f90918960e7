// アプリケーション層
// ユースケースの調整役。ドメインサービスの呼び出しとイベント発行を担う

pub mod error;
pub mod service;

pub use error::ApplicationError;
