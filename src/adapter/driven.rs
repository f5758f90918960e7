// 駆動される側アダプター（リポジトリ実装など）

mod booking_queries;
mod console_logger;
mod event_publisher;
mod reservation_store;
mod room_directory;

pub use booking_queries::MySqlBookingQueries;
pub use console_logger::ConsoleLogger;
pub use event_publisher::ConsoleEventPublisher;
pub use reservation_store::MySqlReservationStore;
pub use room_directory::{MySqlRoomDirectory, MySqlRoomProvisioning};
