// Saju Constitution - Web Server
// Read-only lookups against a precomputed registry + on-demand classification

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use saju_constitution::input::parse_hour_text;
use saju_constitution::records::load_registry;
use saju_constitution::{analyze, Analysis, ConstitutionLabel, Registry};

#[derive(Parser)]
#[command(name = "constitution-server", version, about = "Constitution registry HTTP server")]
struct Args {
    /// Registry file written by `saju-constitution batch -o`
    #[arg(default_value = "registry.json")]
    registry: PathBuf,
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:3000")]
    addr: String,
}

/// Shared application state. The registry is immutable once loaded.
#[derive(Clone)]
struct AppState {
    registry: Arc<Registry>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Query parameters are taken as text so that every bad value is answered
/// with an `ApiResponse` error body.
#[derive(Deserialize)]
struct ClassifyParams {
    #[serde(default)]
    date: String,
    hour: Option<String>,
}

#[derive(Serialize)]
struct LookupResponse {
    id: String,
    label: ConstitutionLabel,
    code: char,
}

#[derive(Serialize)]
struct RegistryStats {
    total_entries: usize,
    label_counts: BTreeMap<ConstitutionLabel, usize>,
    digest: String,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/classify?date=YYYY-MM-DD&hour=H - Classify one birth moment
async fn classify(Query(params): Query<ClassifyParams>) -> impl IntoResponse {
    let result = params
        .hour
        .as_deref()
        .map(parse_hour_text)
        .transpose()
        .and_then(|hour| analyze(&params.date, hour));

    match result {
        Ok(analysis) => (StatusCode::OK, Json(ApiResponse::ok(analysis))).into_response(),
        Err(e) => {
            warn!(date = %params.date, hour = ?params.hour, reason = %e, "rejected classify request");
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Analysis>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/registry - Registry statistics
async fn registry_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = RegistryStats {
        total_entries: state.registry.len(),
        label_counts: state.registry.label_counts(),
        digest: state.registry.digest(),
    };
    Json(ApiResponse::ok(stats))
}

/// GET /api/registry/:id - Precomputed label for one id
async fn registry_lookup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&id) {
        Some(label) => (
            StatusCode::OK,
            Json(ApiResponse::ok(LookupResponse {
                code: label.code(),
                label,
                id,
            })),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<LookupResponse>::err(format!("Unknown id '{}'", id))),
        )
            .into_response(),
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/classify", get(classify))
        .route("/registry", get(registry_stats))
        .route("/registry/:id", get(registry_lookup))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("🚀 Starting Saju Constitution Server...");

    let args = Args::parse();
    let addr = args.addr.as_str();

    let registry = match load_registry(&args.registry, None) {
        Ok(registry) => registry,
        Err(e) => {
            error!("failed to load registry: {:#}", e);
            eprintln!("❌ Registry not loaded: {:?}", args.registry);
            eprintln!("   Run: saju-constitution batch <roster> -o {:?}", args.registry);
            std::process::exit(1);
        }
    };
    info!(entries = registry.len(), digest = %registry.digest(), "registry loaded");
    println!("✓ Registry loaded: {} entries", registry.len());

    let state = AppState {
        registry: Arc::new(registry),
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/api/classify?date=2000-01-01", addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, router(state)).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use saju_constitution::{build_registry, BirthRecord};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState {
            registry: Arc::new(build_registry(&[
                BirthRecord::new("ref", "2000-01-01"),
                BirthRecord::new("broken", "2000-02-30"),
            ])),
        }
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(test_state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_classify_endpoint() {
        let (status, json) = get_json("/api/classify?date=2000-01-01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["label"], "Beta");
        assert_eq!(json["data"]["balance"]["wood"], 34);

        let (status, json) = get_json("/api/classify?date=2000-01-01&hour=25").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_classify_bad_query_is_json() {
        let (status, json) = get_json("/api/classify?date=2000-01-01&hour=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("abc"));

        let (status, json) = get_json("/api/classify?hour=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        let (status, json) = get_json("/api/classify?date=1994-09-12&hour=17").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["label"], "Gamma");
    }

    #[test]
    fn test_args_defaults_and_overrides() {
        let args = Args::parse_from(["constitution-server"]);
        assert_eq!(args.registry, PathBuf::from("registry.json"));
        assert_eq!(args.addr, "0.0.0.0:3000");

        let args = Args::parse_from(["constitution-server", "out/reg.csv", "--addr", "127.0.0.1:8080"]);
        assert_eq!(args.registry, PathBuf::from("out/reg.csv"));
        assert_eq!(args.addr, "127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_registry_endpoints() {
        let (status, json) = get_json("/api/registry/ref").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["label"], "Beta");
        assert_eq!(json["data"]["code"], "S");

        let (status, _) = get_json("/api/registry/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = get_json("/api/registry").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_entries"], 2);
    }
}
