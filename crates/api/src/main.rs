use axum::{
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_core::domain::pulse::PulseResult;
use pulse_core::service::{MarketPulseService, PulseError};

const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = pulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let service = MarketPulseService::from_settings(&settings)?;
    let state = AppState {
        service: Arc::new(service),
    };

    let origin = settings
        .frontend_origin
        .as_deref()
        .unwrap_or(DEFAULT_FRONTEND_ORIGIN)
        .parse::<HeaderValue>()?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/v1/market-pulse", get(get_market_pulse))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: Arc<MarketPulseService>,
}

#[derive(Debug, Deserialize)]
struct PulseQuery {
    #[serde(default)]
    ticker: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

async fn get_market_pulse(
    State(state): State<AppState>,
    Query(query): Query<PulseQuery>,
) -> Result<Json<PulseResult>, (StatusCode, Json<ErrorBody>)> {
    match state.service.market_pulse(&query.ticker).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            let status = match err {
                PulseError::EmptyTicker => StatusCode::BAD_REQUEST,
                PulseError::MissingPriceApiKey | PulseError::MissingNewsApiKey => {
                    // Operator-actionable; worth a Sentry event.
                    sentry_anyhow::capture_anyhow(&anyhow::Error::new(err.clone()));
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            Err((
                status,
                Json(ErrorBody {
                    detail: err.to_string(),
                }),
            ))
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &pulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
