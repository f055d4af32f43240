use std::path::PathBuf;

use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info_span, warn};

use crate::handlers::{
    admin, artworks, auth, categories, discoveries, profiles, social, system, users,
};
use crate::metrics;
use crate::state::AppState;

const REQUEST_ID: &str = "x-request-id";

/// Room for the non-file parts of a multipart upload.
const FORM_OVERHEAD: usize = 64 * 1024;

/// HTTP concerns that are not part of any service.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Directory served under `url_prefix`.
    pub upload_dir: PathBuf,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
}

/// The complete application: routes, static uploads and middleware.
pub fn router(state: AppState, settings: &HttpSettings) -> Router {
    let routes = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/metrics", get(system::metrics))
        .route("/auth/token", post(auth::token))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/users", post(users::register).get(users::list))
        .route("/users/me", get(users::me))
        .route("/users/me/role/artist", put(users::become_artist))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/artworks", post(artworks::create).get(artworks::list))
        .route("/artworks/featured", get(artworks::featured))
        .route("/artworks/categories", get(artworks::categories))
        .route("/artworks/nearby", get(artworks::nearby))
        .route("/artworks/unlock", post(artworks::unlock))
        .route(
            "/artworks/{id}",
            get(artworks::get)
                .put(artworks::update)
                .delete(artworks::delete),
        )
        .route("/artworks/{id}/categories", post(artworks::add_categories))
        .route("/artworks/{id}/like", post(social::like).delete(social::unlike))
        .route(
            "/artworks/{id}/comments",
            post(social::comment).get(social::comments),
        )
        .route("/discoveries/my", get(discoveries::mine))
        .route("/discoveries/{artwork_id}", post(discoveries::discover))
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::delete),
        )
        .route("/categories/{id}/artworks", get(categories::artworks))
        .route("/likes", get(social::liked))
        .route("/profiles/me", get(profiles::me).put(profiles::update_me))
        .route("/profiles/{username}", get(profiles::by_username))
        .route("/profiles/{username}/artworks", get(profiles::artworks))
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            metrics::track,
        ))
        .fallback(system::not_found)
        .with_state(state);

    let request_id = HeaderName::from_static(REQUEST_ID);
    routes
        .nest_service(&settings.url_prefix, ServeDir::new(&settings.upload_dir))
        .layer(DefaultBodyLimit::max(
            settings.max_upload_bytes.saturating_add(FORM_OVERHEAD),
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(REQUEST_ID)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    info_span!(
                        "http",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CompressionLayer::new())
                .layer(cors(&settings.allowed_origins)),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::users))
        .route("/users/export", get(admin::export_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/status", put(admin::set_status))
        .route("/users/{id}/ban", put(admin::ban))
        .route("/users/{id}/unban", put(admin::unban))
        .route("/artworks/{id}/feature", put(admin::feature))
        .route("/artworks/{id}/moderate", put(admin::moderate_artwork))
        .route("/comments/{id}/moderate", put(admin::moderate_comment))
        .route("/stats", get(admin::stats))
        .route("/stats/detailed", get(admin::detailed_stats))
        .route("/moderation-logs", get(admin::logs))
        .route("/moderation-logs/search", get(admin::search_logs))
}

fn cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
