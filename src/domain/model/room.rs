use crate::domain::model::{HotelId, Money, RoomId};

/// 部屋（外部の部屋ディレクトリからの読み取り専用ビュー）
/// 予約処理の間は不変として扱う
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    hotel_id: HotelId,
    name: String,
    total_units: u32,
    base_rate: Money,
    is_active: bool,
}

impl Room {
    /// 新しい部屋を作成
    pub fn new(
        id: RoomId,
        hotel_id: HotelId,
        name: String,
        total_units: u32,
        base_rate: Money,
        is_active: bool,
    ) -> Self {
        Self {
            id,
            hotel_id,
            name,
            total_units,
            base_rate,
            is_active,
        }
    }

    /// 部屋IDを取得
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// ホテルIDを取得
    pub fn hotel_id(&self) -> HotelId {
        self.hotel_id
    }

    /// 表示名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// この部屋タイプの物理ユニット総数を取得
    pub fn total_units(&self) -> u32 {
        self.total_units
    }

    /// 1泊の基本料金を取得
    pub fn base_rate(&self) -> Money {
        self.base_rate
    }

    /// 予約受付中かを取得
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
