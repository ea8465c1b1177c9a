use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderName, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::{require_auth, AUTH_HEADER};
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone(), config))
        // Global middleware
        .layer(cors_layer(&config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/articles", get(public::articles::list))
        .route("/api/articles/:name", get(public::articles::get))
        .route("/api/me", get(public::profile::get))
        .route("/api/users", get(public::users::list))
        .route("/api/users/:uid", get(public::users::get))
        .route("/api/portfolios", get(public::portfolios::list))
        .route("/api/portfolios/:id", get(public::portfolios::get))
        .route("/api/images", get(public::images::list))
}

fn protected_routes(state: AppState, config: &AppConfig) -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/upload-image", post(protected::uploads::upload_image))
        .route("/api/upload-images", post(protected::uploads::upload_images))
        .layer(DefaultBodyLimit::max(config.upload_body_limit()));

    Router::new()
        .route("/api/articles/:name/upvote", put(protected::articles::upvote))
        .route("/api/articles/:name/comments", post(protected::articles::comment))
        .route("/api/me", put(protected::profile::update))
        .route("/api/portfolios", post(protected::portfolios::create))
        .route(
            "/api/portfolios/:id",
            put(protected::portfolios::update).delete(protected::portfolios::delete),
        )
        .route("/api/images/:id", delete(protected::uploads::delete_image))
        .merge(uploads)
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(AUTH_HEADER),
        ])
        .expose_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Portfolio API",
        "version": version,
        "description": "Portfolio backend: articles, owner profile, projects and images",
        "endpoints": {
            "articles": "/api/articles[/:name] (public), /api/articles/:name/upvote, /api/articles/:name/comments (protected)",
            "profile": "/api/me (GET public, PUT protected)",
            "users": "/api/users[/:uid] (public)",
            "portfolios": "/api/portfolios[/:id] (GET public, POST/PUT/DELETE protected)",
            "images": "/api/images (public), /api/images/:id (DELETE protected)",
            "uploads": "/api/upload-image, /api/upload-images (protected)",
            "health": "/health (public)"
        },
        "auth": format!("send the identity token in the '{}' header", AUTH_HEADER)
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
