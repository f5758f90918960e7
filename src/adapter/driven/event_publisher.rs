use crate::domain::event::DomainEvent;
use crate::domain::port::{EventPublisher, PublisherError};

/// コンソールイベント発行者
/// ドメインイベントをコンソールに出力する
pub struct ConsoleEventPublisher;

impl ConsoleEventPublisher {
    /// 新しいコンソールイベント発行者を作成
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleEventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for ConsoleEventPublisher {
    fn publish(&self, event: &DomainEvent) -> Result<(), PublisherError> {
        match event {
            DomainEvent::ReservationConfirmed(e) => {
                println!("🏨 [イベント] 予約確定");
                println!("  予約ID: {}", e.booking_id);
                println!("  参照番号: {}", e.reference);
                println!("  利用者ID: {}", e.user_id);
                println!("  部屋ID: {}", e.room_id);
                println!(
                    "  宿泊期間: {} 〜 {} ({}泊)",
                    e.window.check_in(),
                    e.window.check_out(),
                    e.window.nights()
                );
                println!(
                    "  合計金額: {} {}",
                    e.total_price.amount(),
                    e.total_price.currency()
                );
                println!("  発生日時: {}", e.occurred_at.format("%Y-%m-%d %H:%M:%S"));
            }
            DomainEvent::BookingStatusChanged(e) => {
                println!("🔄 [イベント] 予約ステータス遷移");
                println!("  予約ID: {}", e.booking_id);
                println!("  参照番号: {}", e.reference);
                println!("  遷移: {} → {}", e.from, e.to);
                if e.inventory_released {
                    println!("  在庫を解放しました");
                }
                println!("  発生日時: {}", e.occurred_at.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        println!(); // 空行を追加
        Ok(())
    }
}
