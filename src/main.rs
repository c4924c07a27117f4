use axum::{
    routing::{get, patch, post},
    Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldforce_backend::handlers::{auth, contacts, orders};
use fieldforce_backend::jobs::payment_reminder_sync::start_payment_reminder_job;
use fieldforce_backend::services::{notifications::NotificationService, otp::OtpService};
use fieldforce_backend::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fieldforce_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let notifications = NotificationService::from_env();
    let otp = OtpService::from_env();

    let state = AppState {
        db: db.clone(),
        notifications: notifications.clone(),
        otp,
    };

    // Daily overdue-payment reminder scan
    start_payment_reminder_job(db, notifications).await;

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .route(
            "/contacts",
            post(contacts::create_contact).get(contacts::list_contacts),
        )
        .route("/contacts/{id}", get(contacts::get_contact))
        .route("/orders", post(orders::create_order).get(orders::list_orders))
        .route(
            "/orders/{id}",
            get(orders::get_order).patch(orders::update_order),
        )
        .route("/orders/{id}/status", patch(orders::update_order_status))
        .route("/orders/{id}/cancel", post(orders::cancel_order))
        .route("/orders/{id}/payments", post(orders::record_payment))
        .route("/orders/{id}/send-reminder", post(orders::send_reminder))
        .route("/auth/otp/send", post(auth::send_otp))
        .route("/auth/otp/verify", post(auth::verify_otp))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn health() -> &'static str {
    "OK"
}
