use crate::application::ApplicationError;
use crate::domain::model::{BookingDetail, BookingId, BookingSummary, HotelId, UserId};
use crate::domain::port::BookingQueries;
use std::sync::Arc;

/// 予約クエリサービス
/// 読み取り専用の予約ビュー操作を提供する
pub struct BookingQueryService {
    booking_queries: Arc<dyn BookingQueries>,
}

impl BookingQueryService {
    /// 新しい予約クエリサービスを作成
    ///
    /// # Arguments
    /// * `booking_queries` - 予約クエリポート
    pub fn new(booking_queries: Arc<dyn BookingQueries>) -> Self {
        Self { booking_queries }
    }

    /// 予約IDで詳細ビューを取得
    ///
    /// # Returns
    /// * `Ok(Some(BookingDetail))` - 予約が見つかった
    /// * `Ok(None)` - 予約が見つからなかった
    /// * `Err(ApplicationError)` - 取得失敗
    pub async fn get_booking_detail(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<BookingDetail>, ApplicationError> {
        self.booking_queries
            .find_detail(booking_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// 利用者の予約履歴を取得
    /// 作成日時の降順で並べて返す
    pub async fn get_bookings_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<BookingSummary>, ApplicationError> {
        self.booking_queries
            .find_by_user(user_id)
            .await
            .map_err(ApplicationError::from)
    }

    /// ホテルの予約一覧を取得（マネージャーダッシュボード用）
    /// 作成日時の降順で並べて返す
    pub async fn get_bookings_by_hotel(
        &self,
        hotel_id: HotelId,
    ) -> Result<Vec<BookingSummary>, ApplicationError> {
        self.booking_queries
            .find_by_hotel(hotel_id)
            .await
            .map_err(ApplicationError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        BookingStatus, Money, PaymentStatus, RoomId,
    };
    use crate::domain::port::RepositoryError;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    // テスト用のモッククエリポート
    struct MockBookingQueries {
        details: Mutex<HashMap<BookingId, BookingDetail>>,
    }

    impl MockBookingQueries {
        fn new() -> Self {
            Self {
                details: Mutex::new(HashMap::new()),
            }
        }

        fn add_detail(&self, detail: BookingDetail) {
            let mut details = self.details.lock().unwrap();
            details.insert(detail.booking_id, detail);
        }
    }

    #[async_trait]
    impl BookingQueries for MockBookingQueries {
        async fn find_detail(
            &self,
            booking_id: BookingId,
        ) -> Result<Option<BookingDetail>, RepositoryError> {
            let details = self.details.lock().unwrap();
            Ok(details.get(&booking_id).cloned())
        }

        async fn find_by_user(
            &self,
            user_id: UserId,
        ) -> Result<Vec<BookingSummary>, RepositoryError> {
            let details = self.details.lock().unwrap();
            Ok(details
                .values()
                .filter(|detail| detail.user_id == user_id)
                .map(summary_of)
                .collect())
        }

        async fn find_by_hotel(
            &self,
            hotel_id: HotelId,
        ) -> Result<Vec<BookingSummary>, RepositoryError> {
            let details = self.details.lock().unwrap();
            Ok(details
                .values()
                .filter(|detail| detail.hotel_id == hotel_id)
                .map(summary_of)
                .collect())
        }
    }

    fn summary_of(detail: &BookingDetail) -> BookingSummary {
        BookingSummary {
            booking_id: detail.booking_id,
            reference: detail.reference.clone(),
            room_id: detail.room_id,
            room_name: detail.room_name.clone(),
            hotel_id: detail.hotel_id,
            check_in: detail.check_in,
            check_out: detail.check_out,
            status: detail.status,
            payment_status: detail.payment_status,
            total_price: detail.total_price,
            created_at: detail.created_at,
        }
    }

    fn sample_detail(user_id: UserId, hotel_id: HotelId) -> BookingDetail {
        BookingDetail {
            booking_id: BookingId::new(),
            reference: "BKG-A1B2C3".to_string(),
            user_id,
            room_id: RoomId::new(),
            room_name: "デラックスツイン".to_string(),
            hotel_id,
            check_in: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 4, 12).unwrap(),
            adults: 2,
            children: 0,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            total_price: Money::usd(24000),
            payment: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_get_booking_detail_found() {
        let queries = Arc::new(MockBookingQueries::new());
        let service = BookingQueryService::new(queries.clone());

        let detail = sample_detail(UserId::new(), HotelId::new());
        let booking_id = detail.booking_id;
        queries.add_detail(detail);

        let result = service.get_booking_detail(booking_id).await;
        assert!(result.is_ok());
        let found = result.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().booking_id, booking_id);
    }

    #[tokio::test]
    async fn test_get_booking_detail_not_found() {
        let queries = Arc::new(MockBookingQueries::new());
        let service = BookingQueryService::new(queries);

        let result = service.get_booking_detail(BookingId::new()).await;
        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_bookings_by_user_filters_owner() {
        let queries = Arc::new(MockBookingQueries::new());
        let service = BookingQueryService::new(queries.clone());

        let user_id = UserId::new();
        let hotel_id = HotelId::new();
        queries.add_detail(sample_detail(user_id, hotel_id));
        queries.add_detail(sample_detail(user_id, hotel_id));
        queries.add_detail(sample_detail(UserId::new(), hotel_id)); // 別の利用者

        let result = service.get_bookings_by_user(user_id).await;
        assert!(result.is_ok());
        assert_eq!(result.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_bookings_by_hotel_filters_hotel() {
        let queries = Arc::new(MockBookingQueries::new());
        let service = BookingQueryService::new(queries.clone());

        let hotel_id = HotelId::new();
        queries.add_detail(sample_detail(UserId::new(), hotel_id));
        queries.add_detail(sample_detail(UserId::new(), HotelId::new())); // 別のホテル

        let result = service.get_bookings_by_hotel(hotel_id).await;
        assert!(result.is_ok());
        let bookings = result.unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].hotel_id, hotel_id);
    }
}
