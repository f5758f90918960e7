// ドメインモデル
// 集約・値オブジェクト・読み取りビューをまとめて公開する

mod availability;
mod booking;
mod room;
mod value_objects;
mod views;

pub use availability::AvailabilityDay;
pub use booking::{Booking, PaymentRecord};
pub use room::Room;
pub use value_objects::{
    BookingId, BookingReference, BookingStatus, Currency, GuestCounts, HotelId, Money, PaymentId,
    PaymentStatus, RoomId, StayWindow, UserId, REFERENCE_BODY_LEN, REFERENCE_PREFIX,
};
pub use views::{BookingDetail, BookingSummary, PaymentView};
