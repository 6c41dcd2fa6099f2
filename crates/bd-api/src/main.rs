//! Blood Donation Coordination API Server

mod auth;
mod clients;
mod error;
mod generate;
mod models;
mod registry;
mod routes;
mod workers;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clients::{PaymentClient, PlacesClient};
use generate::{GeminiClient, TextGenerator};
use registry::NotificationRegistry;

/// Application state shared across handlers
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: AppConfig,
    pub registry: NotificationRegistry,
    pub http: reqwest::Client,
    pub places: PlacesClient,
    pub payments: PaymentClient,
    pub generator: Option<Arc<dyn TextGenerator>>,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub google_client_id: String,
    pub places_api_key: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub gemini_api_key: Option<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/blood_donation".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "development-secret-change-in-production".to_string()),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            places_api_key: std::env::var("FSQ_API_KEY").unwrap_or_default(),
            payment_key_id: std::env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
            payment_key_secret: std::env::var("RAZORPAY_KEY_SECRET").unwrap_or_default(),
            gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "bd_api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Blood Donation Coordination API Server");

    let config = AppConfig::default();

    // Connect to database
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");

    info!("Database migrations complete");

    let http = reqwest::Client::new();
    let places = PlacesClient::new(http.clone(), config.places_api_key.clone());
    let payments = PaymentClient::new(
        http.clone(),
        config.payment_key_id.clone(),
        config.payment_key_secret.clone(),
    );

    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(http.clone(), key.clone()))),
        None => {
            info!("GEMINI_API_KEY not set, assistant routes disabled");
            None
        }
    };

    // Create shared state
    let state = Arc::new(AppState {
        db,
        config,
        registry: NotificationRegistry::new(),
        http,
        places,
        payments,
        generator,
    });

    // Spawn the notification expiry sweeper
    workers::sweeper::spawn(state.clone());

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(routes::health_check))

        // Authentication
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/google-login", post(routes::auth::google_login))
        .route("/api/auth/profile", get(routes::auth::profile))

        // Donor advisory
        .route("/api/ai/donor/create", post(routes::donors::create_donor))
        .route("/api/ai/donor/eligibility/:donor_id", get(routes::donors::check_donor_eligibility))
        .route("/api/ai/donors/compatible/:blood_type", get(routes::donors::find_compatible))
        .route("/api/ai/suggest/donors/:blood_type", get(routes::donors::suggest_donors))

        // Inventory
        .route("/api/ai/inventory/predict", get(routes::inventory::predict))
        .route("/api/ai/inventory/seed", post(routes::inventory::seed))

        // Donation requests
        .route("/api/requests", post(routes::requests::create_request))
        .route("/api/requests", get(routes::requests::list_requests))

        // Notifications
        .route("/api/notify/send", post(routes::notify::send_reminder))
        .route("/api/notify/blood-request", post(routes::notify::send_blood_request))
        .route("/api/notify/respond", post(routes::notify::respond))
        .route("/api/notify/all", get(routes::notify::all_active))
        .route("/api/notify/emergency", get(routes::notify::emergency_active))
        .route("/api/notify/ws", get(routes::notify::ws_connect))

        // Slots
        .route("/api/slots/book", post(routes::slots::book))
        .route("/api/slots/:slot_id/confirm", put(routes::slots::confirm))
        .route("/api/slots/user/:user_id", get(routes::slots::user_slots))
        .route("/api/slots/center/:center_id", get(routes::slots::center_slots))
        .route("/api/slots/available/:center_id/:date", get(routes::slots::available))

        // Centers
        .route("/api/centers/nearby", get(routes::centers::nearby))
        .route("/api/centers/search", get(routes::centers::search))

        // Donations / payments
        .route("/api/donations/create-order", post(routes::donations::create_order))
        .route("/api/donations/verify-payment", post(routes::donations::verify_payment))

        // LLM assistant
        .route("/api/assist/donor-match/:request_id", get(routes::assist::donor_match))
        .route("/api/assist/appeal/:donor_id/:request_id", get(routes::assist::appeal))
        .route("/api/assist/forecast/explain", get(routes::assist::forecast_explain))
        .route("/api/assist/engagement/:donor_id", get(routes::assist::engagement))

        // CORS
        .layer(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))

        // Tracing
        .layer(TraceLayer::new_for_http())

        // State
        .with_state(state.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", state.config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.expect("Failed to bind");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
