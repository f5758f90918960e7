use hotel_reservation_management::adapter::driven::{
    ConsoleEventPublisher, ConsoleLogger, MySqlBookingQueries, MySqlReservationStore,
    MySqlRoomDirectory, MySqlRoomProvisioning,
};
use hotel_reservation_management::adapter::driver::rest_api::{create_router, AppStateInner};
use hotel_reservation_management::adapter::{DatabaseConfig, DatabaseMigration};
use hotel_reservation_management::application::service::booking_query_service::BookingQueryService;
use hotel_reservation_management::application::service::{
    ReservationApplicationService, RoomProvisioningService,
};
use hotel_reservation_management::domain::service::{
    RandomReferenceGenerator, ReservationCoordinator,
};

use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== ホテル予約管理システム REST API ===");
    println!();

    // .envファイルから環境変数を読み込む
    dotenvy::dotenv().ok();

    // データベース設定を読み込む
    let config = DatabaseConfig::from_env()?;
    println!(
        "データベース設定を読み込みました: {}:{}",
        config.host, config.port
    );

    // 接続プールを作成
    let pool = MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.connection_string())
        .await?;
    println!("データベース接続プールを作成しました");

    // マイグレーションを実行
    let migration = DatabaseMigration::new(pool.clone());
    migration.run().await?;
    println!("データベースマイグレーションを実行しました");

    // MySQLアダプターを作成
    let store = Arc::new(MySqlReservationStore::new(pool.clone()));
    let room_directory = Arc::new(MySqlRoomDirectory::new(pool.clone()));
    let provisioning = Arc::new(MySqlRoomProvisioning::new(pool.clone()));
    let booking_queries = Arc::new(MySqlBookingQueries::new(pool.clone()));

    let logger = Arc::new(ConsoleLogger::new());
    let event_publisher = Arc::new(ConsoleEventPublisher::new());
    let reference_generator = Arc::new(RandomReferenceGenerator::new());

    // 予約コーディネーターとアプリケーションサービスを作成
    let coordinator = ReservationCoordinator::new(
        store,
        room_directory,
        reference_generator,
        logger.clone(),
    );
    let reservation_service =
        ReservationApplicationService::new(coordinator, event_publisher, logger);
    let provisioning_service = RoomProvisioningService::new(provisioning);
    let booking_query_service = BookingQueryService::new(booking_queries);

    // アプリケーション状態を作成
    let app_state = AppStateInner {
        reservation_service: Arc::new(reservation_service),
        provisioning_service: Arc::new(provisioning_service),
        booking_query_service: Arc::new(booking_query_service),
    };

    // REST APIルーターを作成
    let app = create_router()
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // サーバーを起動
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("REST APIサーバーが起動しました: http://localhost:3000");
    println!("ヘルスチェック: GET http://localhost:3000/health");
    println!("API仕様:");
    println!("  POST /reservations - 予約作成");
    println!("  GET  /bookings?user_id=|hotel_id= - 予約一覧取得");
    println!("  GET  /bookings/:id - 予約詳細取得");
    println!("  POST /bookings/:id/status - 予約ステータス遷移");
    println!("  POST /bookings/:id/cancel - 予約キャンセル");
    println!("  POST /rooms - 部屋登録（プロビジョニング用）");
    println!("  POST /rooms/:id/calendar - カレンダー実体化（プロビジョニング用）");
    println!("  GET  /rooms/:id/availability - 空室状況取得");
    println!();

    axum::serve(listener, app).await?;

    Ok(())
}
