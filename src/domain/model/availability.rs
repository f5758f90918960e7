use crate::domain::error::DomainError;
use crate::domain::model::{Money, RoomId};
use chrono::NaiveDate;

/// 空室カレンダー集約
/// (部屋, 日) ごとの在庫ユニット数の台帳
/// 「部屋Rは日Dに何ユニット空いているか」の唯一の真実
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityDay {
    room_id: RoomId,
    day: NaiveDate,
    available_units: u32,
    override_price: Option<Money>,
    is_blocked: bool,
}

impl AvailabilityDay {
    /// 新しいカレンダー行を作成（部屋のプロビジョニング時）
    pub fn new(room_id: RoomId, day: NaiveDate, available_units: u32) -> Self {
        Self {
            room_id,
            day,
            available_units,
            override_price: None,
            is_blocked: false,
        }
    }

    /// データベースから取得したデータでカレンダー行を再構築
    /// リポジトリでの使用を想定
    pub fn reconstruct(
        room_id: RoomId,
        day: NaiveDate,
        available_units: u32,
        override_price: Option<Money>,
        is_blocked: bool,
    ) -> Self {
        Self {
            room_id,
            day,
            available_units,
            override_price,
            is_blocked,
        }
    }

    /// 部屋IDを取得
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// 日付を取得
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// 空きユニット数を取得
    pub fn available_units(&self) -> u32 {
        self.available_units
    }

    /// 上書き価格を取得
    pub fn override_price(&self) -> Option<Money> {
        self.override_price
    }

    /// 手動ブロックされているかを取得
    pub fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    /// 上書き価格を設定
    pub fn set_override_price(&mut self, price: Option<Money>) {
        self.override_price = price;
    }

    /// 手動ブロックを設定（メンテナンスなど）
    pub fn set_blocked(&mut self, blocked: bool) {
        self.is_blocked = blocked;
    }

    /// この日に指定ユニット数を予約可能かチェック
    pub fn is_bookable(&self, units: u32) -> bool {
        !self.is_blocked && self.available_units >= units
    }

    /// この日の宿泊料金を取得（上書き価格がなければ基本料金）
    pub fn nightly_rate(&self, base_rate: Money) -> Money {
        self.override_price.unwrap_or(base_rate)
    }

    /// ユニットを予約する（在庫を減算）
    ///
    /// # Returns
    /// * `Ok(())` - 予約成功
    /// * `Err(DomainError::DayBlocked)` - ブロック済み
    /// * `Err(DomainError::NoUnitsAvailable)` - 在庫不足
    pub fn reserve_units(&mut self, units: u32) -> Result<(), DomainError> {
        if units == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if self.is_blocked {
            return Err(DomainError::DayBlocked);
        }
        if self.available_units < units {
            return Err(DomainError::NoUnitsAvailable);
        }
        self.available_units -= units;
        Ok(())
    }

    /// ユニットを解放する（キャンセル・返金時）
    pub fn release_units(&mut self, units: u32) -> Result<(), DomainError> {
        if units == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        self.available_units += units;
        Ok(())
    }
}
