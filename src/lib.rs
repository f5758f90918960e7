// ホテル予約管理システム
// 空室カレンダーを唯一の真実として予約の受け入れ可否を判定する

pub mod adapter;
pub mod application;
pub mod domain;
