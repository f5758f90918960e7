use crate::domain::model::{AvailabilityDay, BookingDetail, BookingSummary, PaymentView, Room};
use crate::domain::service::{ConfirmedReservation, StatusUpdate, WindowAvailability};
use chrono::NaiveDate;
use serde::Serialize;

/// 予約確定用のレスポンスDTO
#[derive(Serialize)]
pub struct ReservationResponse {
    pub booking_id: String,
    pub booking_reference: String,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
    pub payment_status: String,
    pub total_amount: i64,
    pub total_currency: String,
}

impl ReservationResponse {
    /// 確定済み予約からReservationResponseを作成
    pub fn from_confirmed(confirmed: &ConfirmedReservation) -> Self {
        let booking = &confirmed.booking;
        Self {
            booking_id: booking.id().to_string(),
            booking_reference: booking.reference().to_string(),
            room_id: booking.room_id().to_string(),
            check_in: booking.window().check_in(),
            check_out: booking.window().check_out(),
            status: booking.status().to_string(),
            payment_status: booking.payment_status().to_string(),
            total_amount: booking.total_price().amount(),
            total_currency: booking.total_price().currency(),
        }
    }
}

/// ステータス遷移用のレスポンスDTO
#[derive(Serialize)]
pub struct StatusUpdateResponse {
    pub booking_id: String,
    pub booking_reference: String,
    pub previous_status: String,
    pub status: String,
    pub inventory_released: bool,
}

impl StatusUpdateResponse {
    /// ステータス遷移結果からStatusUpdateResponseを作成
    pub fn from_update(update: &StatusUpdate) -> Self {
        Self {
            booking_id: update.booking.id().to_string(),
            booking_reference: update.booking.reference().to_string(),
            previous_status: update.previous.to_string(),
            status: update.booking.status().to_string(),
            inventory_released: update.inventory_released,
        }
    }
}

/// 予約一覧用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingSummaryResponse {
    pub booking_id: String,
    pub booking_reference: String,
    pub room_id: String,
    pub room_name: String,
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: String,
    pub payment_status: String,
    pub total_amount: i64,
    pub total_currency: String,
    pub created_at: String,
}

impl BookingSummaryResponse {
    /// 読み取りビューからBookingSummaryResponseを作成
    pub fn from_summary(summary: &BookingSummary) -> Self {
        Self {
            booking_id: summary.booking_id.to_string(),
            booking_reference: summary.reference.clone(),
            room_id: summary.room_id.to_string(),
            room_name: summary.room_name.clone(),
            hotel_id: summary.hotel_id.to_string(),
            check_in: summary.check_in,
            check_out: summary.check_out,
            status: summary.status.to_string(),
            payment_status: summary.payment_status.to_string(),
            total_amount: summary.total_price.amount(),
            total_currency: summary.total_price.currency(),
            created_at: summary.created_at.to_rfc3339(),
        }
    }
}

/// 決済レコード用のレスポンスDTO
#[derive(Serialize)]
pub struct PaymentResponse {
    pub payment_id: String,
    pub provider_token: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl PaymentResponse {
    /// 決済ビューからPaymentResponseを作成
    pub fn from_view(view: &PaymentView) -> Self {
        Self {
            payment_id: view.payment_id.to_string(),
            provider_token: view.provider_token.clone(),
            amount: view.amount.amount(),
            currency: view.amount.currency(),
            status: view.status.to_string(),
        }
    }
}

/// 予約詳細用のレスポンスDTO
#[derive(Serialize)]
pub struct BookingDetailResponse {
    pub booking_id: String,
    pub booking_reference: String,
    pub user_id: String,
    pub room_id: String,
    pub room_name: String,
    pub hotel_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub status: String,
    pub payment_status: String,
    pub total_amount: i64,
    pub total_currency: String,
    pub payment: Option<PaymentResponse>,
    pub created_at: String,
}

impl BookingDetailResponse {
    /// 読み取りビューからBookingDetailResponseを作成
    pub fn from_detail(detail: &BookingDetail) -> Self {
        Self {
            booking_id: detail.booking_id.to_string(),
            booking_reference: detail.reference.clone(),
            user_id: detail.user_id.to_string(),
            room_id: detail.room_id.to_string(),
            room_name: detail.room_name.clone(),
            hotel_id: detail.hotel_id.to_string(),
            check_in: detail.check_in,
            check_out: detail.check_out,
            adults: detail.adults,
            children: detail.children,
            status: detail.status.to_string(),
            payment_status: detail.payment_status.to_string(),
            total_amount: detail.total_price.amount(),
            total_currency: detail.total_price.currency(),
            payment: detail.payment.as_ref().map(PaymentResponse::from_view),
            created_at: detail.created_at.to_rfc3339(),
        }
    }
}

/// 部屋用のレスポンスDTO
#[derive(Serialize)]
pub struct RoomResponse {
    pub room_id: String,
    pub hotel_id: String,
    pub name: String,
    pub total_units: u32,
    pub base_rate_amount: i64,
    pub base_rate_currency: String,
    pub is_active: bool,
}

impl RoomResponse {
    /// ドメインオブジェクトからRoomResponseを作成
    pub fn from_room(room: &Room) -> Self {
        Self {
            room_id: room.id().to_string(),
            hotel_id: room.hotel_id().to_string(),
            name: room.name().to_string(),
            total_units: room.total_units(),
            base_rate_amount: room.base_rate().amount(),
            base_rate_currency: room.base_rate().currency(),
            is_active: room.is_active(),
        }
    }
}

/// カレンダー行用のレスポンスDTO
#[derive(Serialize)]
pub struct AvailabilityDayResponse {
    pub day: NaiveDate,
    pub available_units: u32,
    pub override_price: Option<i64>,
    pub is_blocked: bool,
}

impl AvailabilityDayResponse {
    /// ドメインオブジェクトからAvailabilityDayResponseを作成
    pub fn from_day(day: &AvailabilityDay) -> Self {
        Self {
            day: day.day(),
            available_units: day.available_units(),
            override_price: day.override_price().map(|p| p.amount()),
            is_blocked: day.is_blocked(),
        }
    }
}

/// 空室状況用のレスポンスDTO
#[derive(Serialize)]
pub struct WindowAvailabilityResponse {
    pub bookable: bool,
    pub days: Vec<AvailabilityDayResponse>,
    pub unavailable_dates: Vec<NaiveDate>,
}

impl WindowAvailabilityResponse {
    /// プレチェック結果からWindowAvailabilityResponseを作成
    pub fn from_availability(availability: &WindowAvailability) -> Self {
        Self {
            bookable: availability.is_bookable(),
            days: availability
                .days
                .iter()
                .map(AvailabilityDayResponse::from_day)
                .collect(),
            unavailable_dates: availability.unavailable_dates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        Booking, BookingId, BookingReference, GuestCounts, HotelId, Money, PaymentId,
        PaymentRecord, RoomId, StayWindow, UserId,
    };

    fn sample_confirmed() -> ConfirmedReservation {
        let window = StayWindow::new(
            NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
        )
        .unwrap();
        let booking = Booking::confirmed(
            BookingId::new(),
            UserId::new(),
            RoomId::new(),
            HotelId::new(),
            window,
            GuestCounts::new(2, 0).unwrap(),
            Money::usd(24000),
            BookingReference::new("BKG-A1B2C3".to_string()).unwrap(),
        );
        let payment = PaymentRecord::paid(
            PaymentId::new(),
            booking.id(),
            "tok_visa_4242".to_string(),
            booking.total_price(),
        );
        ConfirmedReservation { booking, payment }
    }

    #[test]
    fn test_reservation_response_from_confirmed() {
        let confirmed = sample_confirmed();
        let response = ReservationResponse::from_confirmed(&confirmed);

        assert_eq!(response.booking_id, confirmed.booking.id().to_string());
        assert_eq!(response.booking_reference, "BKG-A1B2C3");
        assert_eq!(response.status, "Confirmed");
        assert_eq!(response.payment_status, "Paid");
        assert_eq!(response.total_amount, 24000);
        assert_eq!(response.total_currency, "USD");
    }

    #[test]
    fn test_room_response_from_room() {
        let room = Room::new(
            RoomId::new(),
            HotelId::new(),
            "デラックスツイン".to_string(),
            5,
            Money::usd(12000),
            true,
        );

        let response = RoomResponse::from_room(&room);

        assert_eq!(response.name, "デラックスツイン");
        assert_eq!(response.total_units, 5);
        assert_eq!(response.base_rate_amount, 12000);
        assert!(response.is_active);
    }

    #[test]
    fn test_window_availability_response() {
        let room_id = RoomId::new();
        let day = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let availability = WindowAvailability {
            days: vec![AvailabilityDay::new(room_id, day, 3)],
            unavailable_dates: vec![],
        };

        let response = WindowAvailabilityResponse::from_availability(&availability);

        assert!(response.bookable);
        assert_eq!(response.days.len(), 1);
        assert_eq!(response.days[0].available_units, 3);
        assert!(response.unavailable_dates.is_empty());
    }
}
