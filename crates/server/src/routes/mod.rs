pub mod admin;
pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod dashboard;
pub mod feedback;
pub mod notifications;
pub mod users;
pub mod vendors;

use axum::http::{header, HeaderValue, Uri};
use axum::middleware::{self, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::{delete, get, patch, post, put};
use axum::{Extension, Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{warn, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use models::enums::{AuditAction, Role};

use crate::errors::AppError;
use crate::extract::ProxyTrust;
use crate::middleware::{
    audit_trail, rate_limit, require_auth, require_roles, track_metrics, LimiterKind, ADMINS, SUPER_ADMINS, USERS,
    VENDORS,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Prometheus text exposition of the default registry.
pub async fn metrics() -> impl IntoResponse {
    let (status, body) = common::metrics::encode_metrics();
    (status, [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"))], body)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::RouteNotFound(uri.path().to_string())
}

/// Bearer auth, then a role check.
fn guarded(router: Router<AppState>, state: &AppState, roles: &'static [Role]) -> Router<AppState> {
    router
        .route_layer(from_fn_with_state(roles, require_roles))
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn authenticated(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn limited(router: Router<AppState>, state: &AppState, kind: LimiterKind) -> Router<AppState> {
    router.route_layer(from_fn_with_state((state.limiters.clone(), kind), rate_limit))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let credentials = Router::new()
        .route("/auth/user/signup", post(auth::user_signup))
        .route("/auth/user/signup/initiate", post(auth::initiate_user_signup))
        .route("/auth/user/signup/complete", post(auth::complete_user_signup))
        .route("/auth/vendor/signup", post(auth::vendor_signup))
        .route("/auth/user/login", post(auth::user_login))
        .route("/auth/vendor/login", post(auth::vendor_login))
        .route("/auth/user/login/initiate", post(auth::initiate_user_login))
        .route("/auth/user/login/complete", post(auth::complete_user_login))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/refresh-token", post(auth::refresh_token));

    let otp = Router::new()
        .route("/auth/user/verify-otp", post(auth::verify_user_otp))
        .route("/auth/vendor/verify-otp", post(auth::verify_vendor_otp))
        .route("/auth/user/send-otp", post(auth::send_user_otp))
        .route("/auth/vendor/send-otp", post(auth::send_vendor_otp))
        .route("/auth/user/reset-pin", post(auth::reset_user_pin))
        .route("/auth/vendor/reset-pin", post(auth::reset_vendor_pin))
        .route("/auth/user/reset-pin/verify-otp", post(auth::verify_reset_otp))
        .route("/auth/user/reset-pin/complete", post(auth::complete_reset_pin));

    let admin_signup = Router::new().route("/auth/admin/signup", post(auth::admin_signup));
    let logout = Router::new().route("/auth/logout", post(auth::logout));

    limited(credentials, state, LimiterKind::Auth)
        .merge(limited(otp, state, LimiterKind::Otp))
        .merge(guarded(admin_signup, state, SUPER_ADMINS))
        .merge(authenticated(logout, state))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    let profile_audit = from_fn_with_state((state.audit.clone(), AuditAction::ProfileUpdated), audit_trail);
    let users = Router::new()
        .route(
            "/users/profile",
            get(users::get_profile).merge(patch(users::update_profile).layer(profile_audit)),
        )
        .route("/users/account", delete(users::delete_account))
        .route("/bookings", post(bookings::create))
        .route("/bookings/request-lead", post(bookings::request_lead))
        .route("/bookings/history", get(bookings::completed_history))
        .route("/bookings/:id/cancel", put(bookings::cancel))
        .route("/bookings/:id/reschedule", put(bookings::reschedule))
        .route("/bookings/:id/retry-search", post(bookings::retry_search))
        .route("/bookings/:id/dispute", post(bookings::raise_dispute))
        .route("/feedback", post(feedback::submit))
        .route("/feedback/my", get(feedback::my_feedback))
        .route("/feedback/check/:booking_id", get(feedback::check));
    guarded(users, state, USERS)
}

fn vendor_routes(state: &AppState) -> Router<AppState> {
    let vendors = Router::new()
        .route("/vendors/profile", get(vendors::get_profile))
        .route("/vendors/duty", put(vendors::toggle_duty))
        .route("/vendors/services", put(vendors::set_services))
        .route("/vendors/leads", get(vendors::open_leads))
        .route("/vendors/leads/later", get(vendors::later_leads))
        .route("/vendors/history", get(vendors::history))
        .route("/bookings/:id/accept", post(bookings::accept_lead))
        .route("/bookings/:id/reject", post(bookings::reject_lead))
        .route("/bookings/:id/later", post(bookings::mark_later))
        .route("/bookings/:id/status", put(bookings::update_status));
    guarded(vendors, state, VENDORS)
}

fn shared_routes(state: &AppState) -> Router<AppState> {
    let shared = Router::new()
        .route("/bookings/mine", get(bookings::my_bookings))
        .route("/bookings/:id", get(bookings::details))
        .route("/notifications", get(notifications::list))
        .route("/notifications/:id/read", put(notifications::mark_read))
        .route("/notifications/:id/mute", put(notifications::mute));
    authenticated(shared, state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/services/categories", get(catalog::categories))
        .route("/services/categories/:id/subcategories", get(catalog::subcategories))
        .route("/services/subcategories/:id/services", get(catalog::services))
        .route("/services/:id", get(catalog::service_details))
        .route("/feedback/vendor/:id", get(feedback::vendor_feedback))
        .route("/dashboard", get(dashboard::dashboard_data))
        .route("/dashboard/service-sections", get(dashboard::sections))
        .route("/dashboard/banners", get(dashboard::banners))
        .route("/dashboard/vendor-banners", get(dashboard::vendor_banners))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/dashboard", get(admin::dashboard_stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:id/status", put(admin::update_user_status))
        .route("/admin/audit-logs/user/:id", get(admin::user_audit_logs))
        .route("/admin/audit-logs/action/:action", get(admin::audit_logs_by_action))
        .route("/admin/vendors/:id/flags", put(admin::set_vendor_flags))
        .route("/services/admin/tree", get(catalog::tree))
        .route("/services/admin/categories", post(catalog::create_category))
        .route(
            "/services/admin/categories/:id",
            put(catalog::update_category).delete(catalog::delete_category),
        )
        .route("/services/admin/subcategories", post(catalog::create_subcategory))
        .route(
            "/services/admin/subcategories/:id",
            put(catalog::update_subcategory).delete(catalog::delete_subcategory),
        )
        .route("/services/admin/services", post(catalog::create_service))
        .route(
            "/services/admin/services/:id",
            put(catalog::update_service).delete(catalog::delete_service),
        )
        // GET on the same two collection paths stays public; merging keeps the methods apart.
        .route("/dashboard/service-sections", post(dashboard::create_section))
        .route("/dashboard/service-sections/seed", post(dashboard::seed_sections))
        .route(
            "/dashboard/service-sections/:id",
            put(dashboard::update_section).delete(dashboard::delete_section),
        )
        .route("/dashboard/banners", post(dashboard::create_banner))
        .route(
            "/dashboard/banners/:id",
            put(dashboard::update_banner).delete(dashboard::delete_banner),
        )
        .route("/dashboard/admin/service-sections", get(dashboard::all_sections))
        .route("/dashboard/admin/banners", get(dashboard::all_banners));
    guarded(admin, state, ADMINS)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
}

/// Build the full application router: versioned API, health, metrics and docs.
pub fn build_router(state: AppState) -> Router {
    let api = auth_routes(&state)
        .merge(user_routes(&state))
        .merge(vendor_routes(&state))
        .merge(shared_routes(&state))
        .merge(admin_routes(&state))
        .merge(public_routes())
        .layer(from_fn_with_state((state.limiters.clone(), LimiterKind::Api), rate_limit));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .nest(&state.config.api_prefix(), api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(Extension(ProxyTrust(state.config.server.trusted_proxies)))
        .layer(middleware::from_fn(track_metrics))
        .layer(cors_layer(&state.config.server.cors_origins))
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
        .with_state(state)
}
