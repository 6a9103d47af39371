//! bookgate server binary.
//!
//! Wires configuration, PostgreSQL adapters, gateway adapters, and the
//! HTTP routers, then serves.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use bookgate::adapters::events::InMemoryEventBus;
use bookgate::adapters::gateways::{MomoGateway, VnpayGateway};
use bookgate::adapters::http::media::{media_router, MediaAppState};
use bookgate::adapters::http::payments::{payments_router, PaymentsAppState};
use bookgate::adapters::postgres::{
    PostgresEnrollmentStore, PostgresOrderLedger, PostgresTransactionLog,
};
use bookgate::config::AppConfig;
use bookgate::domain::access::MediaTokenService;
use bookgate::domain::orders::OrderCodeAllocator;
use bookgate::ports::GatewayRegistry;
use secrecy::ExposeSecret;

#[tokio::main]
async fn main() {
    // Missing or malformed configuration - a gateway secret above all - is
    // a fatal startup error, never a per-request failure.
    let config = AppConfig::load().expect("Failed to load configuration");
    config.validate().expect("Invalid configuration");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bookgate=info,tower_http=info")),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy(&config.database.url)
        .expect("Invalid database URL");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let ledger = Arc::new(PostgresOrderLedger::new(pool.clone()));
    let transactions = Arc::new(PostgresTransactionLog::new(pool.clone()));
    let enrollments = Arc::new(PostgresEnrollmentStore::new(pool));

    let vnpay = VnpayGateway::new(&config.payment.vnpay);
    let momo = MomoGateway::new(&config.payment.momo, reqwest::Client::new());
    let gateways = Arc::new(GatewayRegistry::new(vec![
        Arc::new(vnpay),
        Arc::new(momo),
    ]));

    let payments_state = PaymentsAppState {
        ledger,
        transactions,
        enrollments: enrollments.clone(),
        gateways,
        events: Arc::new(InMemoryEventBus::new()),
        allocator: Arc::new(OrderCodeAllocator::new()),
    };

    let media_state = MediaAppState {
        enrollments,
        tokens: Arc::new(MediaTokenService::new(
            config.media.signing_secret.expose_secret().as_bytes().to_vec(),
        )),
        issue_ttl_secs: config.media.issue_ttl_secs,
        serving_ttl_secs: config.media.serving_ttl_secs,
    };

    let app = axum::Router::new()
        .nest(
            "/api",
            payments_router()
                .with_state(payments_state)
                .merge(media_router().with_state(media_state)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");

    tracing::info!(address = %addr, "bookgate listening");

    axum::serve(listener, app).await.expect("Server error");
}
