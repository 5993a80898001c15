use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use profile_scout::core::config::load_engine_config;
use profile_scout::{
    DiscoveryError, ErrorResponse, ProfileDetail, ProfileDetailRequest, ProfileEngine,
    ProfileSearchRequest, ProfileSummary,
};

const DEFAULT_LIMIT: usize = 5;

/// One engine, one browser session: requests queue on the mutex.
type SharedEngine = Arc<Mutex<ProfileEngine>>;

const DEFAULT_PORT: u16 = 5000;
const PORT_ENV_VARS: [&str; 2] = ["PROFILE_SCOUT_PORT", "PORT"];

/// `--port N` / `--port=N` wins over the env vars, which win over the default.
fn resolve_port<I>(args: I, env: impl Fn(&str) -> Option<String>) -> u16
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut from_args = None;
    while let Some(arg) = args.next() {
        let value = match arg.strip_prefix("--port") {
            Some("") => args.next(),
            Some(rest) => rest.strip_prefix('=').map(str::to_string),
            None => None,
        };
        if let Some(port) = value.and_then(|v| v.parse::<u16>().ok()) {
            from_args = Some(port);
            break;
        }
    }

    from_args
        .or_else(|| {
            PORT_ENV_VARS
                .iter()
                .find_map(|k| env(k).and_then(|v| v.trim().parse::<u16>().ok()))
        })
        .unwrap_or(DEFAULT_PORT)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = load_engine_config();
    let http_client = config.http_client()?;
    let engine = ProfileEngine::builder(config).http_client(http_client).build();
    let engine: SharedEngine = Arc::new(Mutex::new(engine));

    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api/profiles/search", get(search_handler))
        .route("/api/profiles/details", get(details_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine.clone());

    let port = resolve_port(std::env::args().skip(1), |k| std::env::var(k).ok());
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(l) => l,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            anyhow::bail!(
                "Address already in use: {}. Stop the existing process or run with --port {} (or set PORT/PROFILE_SCOUT_PORT).",
                bind_addr,
                port.saturating_add(1)
            )
        }
        Err(e) => return Err(e.into()),
    };
    info!("profile-scout listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(engine.clone()))
        .await?;

    Ok(())
}

async fn shutdown_signal(engine: SharedEngine) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).ok();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = async {
                if let Some(ref mut s) = sigterm {
                    s.recv().await;
                } else {
                    futures::future::pending::<()>().await;
                }
            } => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    info!("shutting down; closing browser session");
    engine.lock().await.shutdown().await;
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "profile-scout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn reject(e: DiscoveryError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        DiscoveryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DiscoveryError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
    };
    error!("request rejected: {}", e);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

async fn search_handler(
    State(engine): State<SharedEngine>,
    Query(request): Query<ProfileSearchRequest>,
) -> Result<Json<Vec<ProfileSummary>>, (StatusCode, Json<ErrorResponse>)> {
    let limit = request.limit.unwrap_or(DEFAULT_LIMIT);
    let mut engine = engine.lock().await;
    engine
        .search(&request.query, limit)
        .await
        .map(Json)
        .map_err(reject)
}

async fn details_handler(
    State(engine): State<SharedEngine>,
    Query(request): Query<ProfileDetailRequest>,
) -> Result<Json<ProfileDetail>, (StatusCode, Json<ErrorResponse>)> {
    let mut engine = engine.lock().await;
    engine
        .fetch_detail(&request.profile_url)
        .await
        .map(Json)
        .map_err(reject)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn port_precedence() {
        let no_env = |_: &str| None;
        assert_eq!(resolve_port(args(&[]), no_env), DEFAULT_PORT);
        assert_eq!(resolve_port(args(&["--port", "8080"]), no_env), 8080);
        assert_eq!(resolve_port(args(&["--port=8081"]), no_env), 8081);
        assert_eq!(resolve_port(args(&["--port", "nope"]), no_env), DEFAULT_PORT);

        let env = |k: &str| (k == "PORT").then(|| " 7000 ".to_string());
        assert_eq!(resolve_port(args(&[]), env), 7000);
        assert_eq!(resolve_port(args(&["--port", "9000"]), env), 9000);
    }
}
