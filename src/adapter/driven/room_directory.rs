use crate::adapter::database_error::DatabaseError;
use crate::domain::model::{AvailabilityDay, HotelId, Money, Room, RoomId};
use crate::domain::port::{RepositoryError, RoomDirectory, RoomProvisioning};
use async_trait::async_trait;
use sqlx::{MySql, Pool, Row};

/// MySQL部屋ディレクトリ
/// 部屋カタログへの読み取り専用アクセスを提供する
pub struct MySqlRoomDirectory {
    pool: Pool<MySql>,
}

impl MySqlRoomDirectory {
    /// 新しいMySQL部屋ディレクトリを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

/// データベースの行から部屋を再構築する
fn build_room(row: &sqlx::mysql::MySqlRow) -> Result<Room, RepositoryError> {
    let id = RoomId::from_string(row.get("id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("部屋IDの解析に失敗しました: {}", e))
    })?;
    let hotel_id = HotelId::from_string(row.get("hotel_id")).map_err(|e| {
        RepositoryError::FetchFailed(format!("ホテルIDの解析に失敗しました: {}", e))
    })?;
    let base_rate = Money::new(row.get("base_rate_amount"), row.get("base_rate_currency"))
        .map_err(|e| {
            RepositoryError::FetchFailed(format!("基本料金の構築に失敗しました: {}", e))
        })?;

    Ok(Room::new(
        id,
        hotel_id,
        row.get("name"),
        row.get::<u32, _>("total_units"),
        base_rate,
        row.get("is_active"),
    ))
}

#[async_trait]
impl RoomDirectory for MySqlRoomDirectory {
    async fn get_room(&self, room_id: RoomId) -> Result<Option<Room>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, hotel_id, name, total_units, base_rate_amount, base_rate_currency, is_active
            FROM rooms
            WHERE id = ?
            "#,
        )
        .bind(room_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "部屋の取得に失敗しました"))
        .map_err(RepositoryError::from)?;

        row.as_ref().map(build_room).transpose()
    }
}

/// MySQL部屋プロビジョニング
/// 部屋の登録とカレンダー行の実体化を行う
pub struct MySqlRoomProvisioning {
    pool: Pool<MySql>,
}

impl MySqlRoomProvisioning {
    /// 新しいMySQL部屋プロビジョニングを作成
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomProvisioning for MySqlRoomProvisioning {
    async fn insert_room(&self, room: &Room) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO rooms (id, hotel_id, name, total_units, base_rate_amount, base_rate_currency, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(room.id().to_string())
        .bind(room.hotel_id().to_string())
        .bind(room.name())
        .bind(room.total_units())
        .bind(room.base_rate().amount())
        .bind(room.base_rate().currency())
        .bind(room.is_active())
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_sqlx(e, "部屋の保存に失敗しました"))
        .map_err(RepositoryError::from)?;

        Ok(())
    }

    async fn upsert_availability_days(
        &self,
        days: &[AvailabilityDay],
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| {
                DatabaseError::ConnectionError(format!(
                    "トランザクション開始に失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        for day in days {
            sqlx::query(
                r#"
                INSERT INTO availability_days (room_id, day, available_units, override_price_amount, override_price_currency, is_blocked)
                VALUES (?, ?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    available_units = VALUES(available_units),
                    override_price_amount = VALUES(override_price_amount),
                    override_price_currency = VALUES(override_price_currency),
                    is_blocked = VALUES(is_blocked)
                "#,
            )
            .bind(day.room_id().to_string())
            .bind(day.day())
            .bind(day.available_units())
            .bind(day.override_price().map(|p| p.amount()))
            .bind(day.override_price().map(|p| p.currency()))
            .bind(day.is_blocked())
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_sqlx(e, "カレンダー行の保存に失敗しました"))
            .map_err(RepositoryError::from)?;
        }

        tx.commit()
            .await
            .map_err(|e| {
                DatabaseError::QueryError(format!(
                    "トランザクションのコミットに失敗しました: {}",
                    e
                ))
            })
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
