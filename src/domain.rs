// ドメイン層
// ビジネスロジックの中核。外部への依存はポート経由のみ

pub mod error;
pub mod event;
pub mod model;
pub mod port;
pub mod service;
