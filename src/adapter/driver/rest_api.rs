use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::adapter::driven::MySqlReservationStore;
use crate::adapter::driver::request_dto::{
    AvailabilityQueryParams, BookingsQueryParams, CreateReservationRequest, CreateRoomRequest,
    PublishCalendarRequest, UpdateBookingStatusRequest,
};
use crate::adapter::driver::response_dto::{
    AvailabilityDayResponse, BookingDetailResponse, BookingSummaryResponse, ReservationResponse,
    RoomResponse, StatusUpdateResponse, WindowAvailabilityResponse,
};
use crate::application::service::booking_query_service::BookingQueryService;
use crate::application::service::{ReservationApplicationService, RoomProvisioningService};
use crate::application::ApplicationError;
use crate::domain::error::{DomainError, ReservationError};
use crate::domain::model::{
    BookingId, GuestCounts, HotelId, Money, RoomId, StayWindow, UserId,
};
use crate::domain::port::ReservationStore;
use crate::domain::service::ReservationRequest;

/// APIエラーレスポンス
#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

// アプリケーションサービスを含む状態
// ストア実装に対してジェネリックにすることで、テストからは
// インメモリ実装を差し込める
pub struct AppStateInner<S: ReservationStore> {
    pub reservation_service: Arc<ReservationApplicationService<S>>,
    pub provisioning_service: Arc<RoomProvisioningService>,
    pub booking_query_service: Arc<BookingQueryService>,
}

impl<S: ReservationStore> Clone for AppStateInner<S> {
    fn clone(&self) -> Self {
        Self {
            reservation_service: Arc::clone(&self.reservation_service),
            provisioning_service: Arc::clone(&self.provisioning_service),
            booking_query_service: Arc::clone(&self.booking_query_service),
        }
    }
}

/// 本番構成の状態型
pub type AppState = AppStateInner<MySqlReservationStore>;

// REST APIルーターを作成
pub fn create_router<S: ReservationStore + 'static>() -> Router<AppStateInner<S>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/reservations", post(create_reservation::<S>))
        .route("/bookings", get(get_bookings::<S>))
        .route("/bookings/:booking_id", get(get_booking_by_id::<S>))
        .route("/bookings/:booking_id/status", post(update_booking_status::<S>))
        .route("/bookings/:booking_id/cancel", post(cancel_booking::<S>))
        .route("/rooms", post(create_room::<S>))
        .route("/rooms/:room_id/calendar", post(publish_calendar::<S>))
        .route("/rooms/:room_id/availability", get(get_availability::<S>))
}

// ヘルスチェックエンドポイント
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "hotel-reservation-management",
        "version": "0.1.0"
    }))
}

// 予約作成エンドポイント
async fn create_reservation<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Json(request): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), (StatusCode, Json<ApiError>)> {
    let window = match StayWindow::new(request.check_in, request.check_out) {
        Ok(window) => window,
        Err(err) => return Err(map_domain_error(err)),
    };
    let guests = match GuestCounts::new(request.adults, request.children) {
        Ok(guests) => guests,
        Err(err) => return Err(map_domain_error(err)),
    };
    if request.payment_token.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "決済トークンが指定されていません".to_string(),
                code: "VALIDATION_ERROR".to_string(),
            }),
        ));
    }

    let reservation_request = ReservationRequest {
        user_id: UserId::from_uuid(request.user_id),
        room_id: RoomId::from_uuid(request.room_id),
        window,
        guests,
        payment_token: request.payment_token,
    };

    match state
        .reservation_service
        .make_reservation(reservation_request)
        .await
    {
        Ok(confirmed) => Ok((
            StatusCode::CREATED,
            Json(ReservationResponse::from_confirmed(&confirmed)),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約詳細取得エンドポイント
async fn get_booking_by_id<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state
        .booking_query_service
        .get_booking_detail(booking_id)
        .await
    {
        Ok(Some(detail)) => Ok(Json(BookingDetailResponse::from_detail(&detail))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: "指定された予約が見つかりません".to_string(),
                code: "BOOKING_NOT_FOUND".to_string(),
            }),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約一覧取得エンドポイント（利用者履歴またはホテルダッシュボード）
async fn get_bookings<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    query: Result<Query<BookingsQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<Vec<BookingSummaryResponse>>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let summaries = match (params.user_id, params.hotel_id) {
        (Some(user_id), None) => {
            state
                .booking_query_service
                .get_bookings_by_user(UserId::from_uuid(user_id))
                .await
        }
        (None, Some(hotel_id)) => {
            state
                .booking_query_service
                .get_bookings_by_hotel(HotelId::from_uuid(hotel_id))
                .await
        }
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError {
                    error: "user_idまたはhotel_idのどちらか一方を指定してください".to_string(),
                    code: "INVALID_PARAMETER".to_string(),
                }),
            ))
        }
    };

    match summaries {
        Ok(summaries) => Ok(Json(
            summaries
                .iter()
                .map(BookingSummaryResponse::from_summary)
                .collect(),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約ステータス遷移エンドポイント
async fn update_booking_status<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state
        .reservation_service
        .change_booking_status_string(booking_id, &request.status)
        .await
    {
        Ok(update) => Ok(Json(StatusUpdateResponse::from_update(&update))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 予約キャンセルエンドポイント
async fn cancel_booking<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<StatusUpdateResponse>, (StatusCode, Json<ApiError>)> {
    let booking_id = BookingId::from_uuid(booking_id);

    match state.reservation_service.cancel_booking(booking_id).await {
        Ok(update) => Ok(Json(StatusUpdateResponse::from_update(&update))),
        Err(err) => Err(map_application_error(err)),
    }
}

// 部屋登録エンドポイント（プロビジョニング用）
async fn create_room<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), (StatusCode, Json<ApiError>)> {
    match state
        .provisioning_service
        .register_room(
            HotelId::from_uuid(request.hotel_id),
            request.name,
            request.total_units,
            Money::usd(request.base_rate),
        )
        .await
    {
        Ok(room) => Ok((StatusCode::CREATED, Json(RoomResponse::from_room(&room)))),
        Err(err) => Err(map_application_error(err)),
    }
}

// カレンダー実体化エンドポイント（プロビジョニング用）
async fn publish_calendar<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Path(room_id): Path<Uuid>,
    Json(request): Json<PublishCalendarRequest>,
) -> Result<(StatusCode, Json<Vec<AvailabilityDayResponse>>), (StatusCode, Json<ApiError>)> {
    let window = match StayWindow::new(request.from, request.to) {
        Ok(window) => window,
        Err(err) => return Err(map_domain_error(err)),
    };

    match state
        .provisioning_service
        .publish_calendar(
            RoomId::from_uuid(room_id),
            &window,
            request.available_units,
            request.override_price.map(Money::usd),
            request.is_blocked,
        )
        .await
    {
        Ok(days) => Ok((
            StatusCode::CREATED,
            Json(days.iter().map(AvailabilityDayResponse::from_day).collect()),
        )),
        Err(err) => Err(map_application_error(err)),
    }
}

// 空室状況取得エンドポイント（楽観的プレチェック）
async fn get_availability<S: ReservationStore + 'static>(
    State(state): State<AppStateInner<S>>,
    Path(room_id): Path<Uuid>,
    query: Result<Query<AvailabilityQueryParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<WindowAvailabilityResponse>, (StatusCode, Json<ApiError>)> {
    let Query(params) = query.map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効なクエリパラメータです".to_string(),
                code: "INVALID_PARAMETER".to_string(),
            }),
        )
    })?;

    let window = match StayWindow::new(params.check_in, params.check_out) {
        Ok(window) => window,
        Err(err) => return Err(map_domain_error(err)),
    };

    match state
        .reservation_service
        .check_availability(RoomId::from_uuid(room_id), &window)
        .await
    {
        Ok(availability) => Ok(Json(WindowAvailabilityResponse::from_availability(
            &availability,
        ))),
        Err(err) => Err(map_application_error(err)),
    }
}

// アプリケーションエラーをHTTPエラーにマッピング
fn map_application_error(err: ApplicationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ApplicationError::ReservationError(reservation_err) => {
            map_reservation_error(reservation_err)
        }
        ApplicationError::DomainError(domain_err) => map_domain_error(domain_err),
        ApplicationError::RepositoryError(repo_err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: format!("{}", repo_err),
                code: "REPOSITORY_ERROR".to_string(),
            }),
        ),
        ApplicationError::NotFound(msg) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: msg,
                code: "NOT_FOUND".to_string(),
            }),
        ),
    }
}

// 予約エラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_reservation_error(err: ReservationError) -> (StatusCode, Json<ApiError>) {
    match err {
        ReservationError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "VALIDATION_ERROR".to_string(),
            }),
        ),
        ReservationError::RoomNotFound(room_id) => (
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: format!("指定された部屋が見つかりません: {}", room_id),
                code: "ROOM_NOT_FOUND".to_string(),
            }),
        ),
        ReservationError::OutOfInventory { room_id, dates } => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: format!("部屋 {} は次の日付で満室です: {:?}", room_id, dates),
                code: "OUT_OF_INVENTORY".to_string(),
            }),
        ),
        ReservationError::LockTimeout => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError {
                error: "混雑のため予約を処理できませんでした。再試行してください".to_string(),
                code: "LOCK_TIMEOUT".to_string(),
            }),
        ),
        ReservationError::Internal(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError {
                error: msg,
                code: "INTERNAL_ERROR".to_string(),
            }),
        ),
    }
}

// ドメインエラーを適切なHTTPステータスコードとエラーコードにマッピング
fn map_domain_error(domain_err: DomainError) -> (StatusCode, Json<ApiError>) {
    match domain_err {
        DomainError::InvalidStayWindow(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_STAY_WINDOW".to_string(),
            }),
        ),
        DomainError::InvalidGuestCount(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_GUEST_COUNT".to_string(),
            }),
        ),
        DomainError::InvalidBookingState(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_BOOKING_STATE".to_string(),
            }),
        ),
        DomainError::NoUnitsAvailable => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "在庫不足です".to_string(),
                code: "OUT_OF_INVENTORY".to_string(),
            }),
        ),
        DomainError::DayBlocked => (
            StatusCode::CONFLICT,
            Json(ApiError {
                error: "指定された日はブロックされています".to_string(),
                code: "DAY_BLOCKED".to_string(),
            }),
        ),
        DomainError::InvalidQuantity => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "無効な数量です".to_string(),
                code: "INVALID_QUANTITY".to_string(),
            }),
        ),
        DomainError::InvalidReference(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_REFERENCE".to_string(),
            }),
        ),
        DomainError::CurrencyMismatch => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: "通貨が一致しません".to_string(),
                code: "CURRENCY_MISMATCH".to_string(),
            }),
        ),
        DomainError::InvalidValue(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: msg,
                code: "INVALID_VALUE".to_string(),
            }),
        ),
    }
}
