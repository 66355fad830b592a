use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use configs::AppConfig;
use sea_orm::DatabaseConnection;
use server::{build_router, AppState};
use service::catalog::{self, CategoryInput, ServiceInput};

const PHONE: &str = "+919800000001";
const PIN: &str = "4821";

async fn app_with(tweak: impl FnOnce(&mut AppConfig)) -> anyhow::Result<(Router, DatabaseConnection)> {
    let db = models::db::connect_memory().await?;
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-access-secret".into();
    cfg.auth.jwt_refresh_secret = "test-refresh-secret".into();
    tweak(&mut cfg);
    Ok((build_router(AppState::new(db.clone(), cfg)), db))
}

async fn app() -> anyhow::Result<(Router, DatabaseConnection)> {
    app_with(|_| {}).await
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
        None => req.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

/// Sign up and verify a user, returning the access token.
async fn verified_user(app: &Router, phone: &str) -> anyhow::Result<String> {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/user/signup",
        None,
        Some(json!({
            "phoneNumber": phone, "name": "Asha Rao", "pin": PIN, "confirmPin": PIN,
            "acceptedTerms": true, "acceptedPrivacy": true
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["isVerified"], false);

    let (status, body) = call(
        app,
        Method::POST,
        "/api/v1/auth/user/verify-otp",
        None,
        Some(json!({ "phoneNumber": phone, "otp": "123456" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    Ok(body["data"]["accessToken"].as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn signup_verify_and_login() -> anyhow::Result<()> {
    let (app, _db) = app().await?;
    let token = verified_user(&app, PHONE).await?;
    assert!(!token.is_empty());

    let (status, body) = call(&app, Method::POST, "/api/v1/auth/user/login", None, Some(json!({ "phoneNumber": PHONE, "pin": PIN }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["tokenType"], "Bearer");

    let (status, body) = call(&app, Method::POST, "/api/v1/auth/user/login", None, Some(json!({ "phoneNumber": PHONE, "pin": "0000" }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = call(&app, Method::GET, "/api/v1/users/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phone"], PHONE);
    Ok(())
}

#[tokio::test]
async fn duplicate_phone_and_bad_fields_are_rejected() -> anyhow::Result<()> {
    let (app, _db) = app().await?;
    verified_user(&app, PHONE).await?;

    let signup = json!({
        "phoneNumber": PHONE, "name": "Asha Rao", "pin": PIN, "confirmPin": PIN,
        "acceptedTerms": true, "acceptedPrivacy": true
    });
    let (status, body) = call(&app, Method::POST, "/api/v1/auth/user/signup", None, Some(signup)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "phoneNumber already exists");

    let bad = json!({
        "phoneNumber": "12", "name": "Asha Rao", "pin": "12", "confirmPin": "34",
        "acceptedTerms": true, "acceptedPrivacy": true
    });
    let (status, body) = call(&app, Method::POST, "/api/v1/auth/user/signup", None, Some(bad)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("Invalid phone number format."), "{message}");
    assert!(message.contains("PINs do not match"), "{message}");
    Ok(())
}

#[tokio::test]
async fn unknown_route_and_malformed_json() -> anyhow::Result<()> {
    let (app, _db) = app().await?;

    let (status, body) = call(&app, Method::GET, "/api/v1/nope", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route /api/v1/nope not found");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/user/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{oops"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await?)?;
    assert_eq!(body["message"], "Invalid JSON payload");

    let (status, body) = call(&app, Method::GET, "/api/v1/services/not-a-uuid", None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Resource not found");
    Ok(())
}

#[tokio::test]
async fn bearer_token_and_role_are_enforced() -> anyhow::Result<()> {
    let (app, _db) = app().await?;

    let (status, body) = call(&app, Method::GET, "/api/v1/users/profile", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized access");

    let (status, _) = call(&app, Method::GET, "/api/v1/users/profile", Some("not-a-jwt"), None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = verified_user(&app, PHONE).await?;
    let (status, body) = call(&app, Method::GET, "/api/v1/admin/dashboard", Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, Method::GET, "/api/v1/vendors/profile", Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn otp_requests_are_rate_limited() -> anyhow::Result<()> {
    let (app, _db) = app_with(|cfg| cfg.rate_limit.otp_max = 2).await?;
    let body = json!({ "phoneNumber": "+919811111111" });

    for _ in 0..2 {
        let (status, _) = call(&app, Method::POST, "/api/v1/auth/user/send-otp", None, Some(body.clone())).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, resp) = call(&app, Method::POST, "/api/v1/auth/user/send-otp", None, Some(body)).await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp["message"], "Too many requests, please try again later");
    Ok(())
}

#[tokio::test]
async fn rotating_leading_forwarded_hops_does_not_evade_limits() -> anyhow::Result<()> {
    let (app, _db) = app_with(|cfg| cfg.rate_limit.otp_max = 2).await?;
    let body = serde_json::to_vec(&json!({ "phoneNumber": "+919811111111" }))?;

    let mut statuses = Vec::new();
    for i in 0..5 {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/auth/user/send-otp")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", format!("10.9.9.{i}, 203.0.113.7"))
            .body(Body::from(body.clone()))?;
        statuses.push(app.clone().oneshot(req).await?.status());
    }
    assert_eq!(&statuses[..2], &[StatusCode::NOT_FOUND, StatusCode::NOT_FOUND]);
    assert!(statuses[2..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS), "{statuses:?}");

    // a different client behind the same proxy has its own window
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/user/send-otp")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.8")
        .body(Body::from(body))?;
    assert_eq!(app.clone().oneshot(req).await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn booking_reschedule_stops_after_two() -> anyhow::Result<()> {
    let (app, db) = app().await?;
    let category = catalog::create_category(&db, CategoryInput { name: Some("Cleaning".into()), ..Default::default() }).await?;
    let offering = catalog::create_service(
        &db,
        ServiceInput {
            category: Some(category.id.to_string()),
            title: Some("Deep clean".into()),
            admin_price: Some(499.0),
            ..Default::default()
        },
    )
    .await?;
    let token = verified_user(&app, PHONE).await?;

    let (status, body) = call(&app, Method::POST, "/api/v1/bookings", Some(&token), Some(json!({ "services": [], "date": "2030-01-02", "time": "10:30", "address": "12 MG Road" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "At least one service is required for booking");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/v1/bookings",
        Some(&token),
        Some(json!({
            "services": [{ "serviceId": offering.id.to_string(), "quantity": 2 }],
            "date": "2030-01-02", "time": "10:30", "address": "12 MG Road"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    let uri = format!("/api/v1/bookings/{id}/reschedule");

    for day in ["2030-01-03", "2030-01-04"] {
        let (status, _) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "date": day, "time": "11:00" }))).await?;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, body) = call(&app, Method::PUT, &uri, Some(&token), Some(json!({ "date": "2030-01-05", "time": "11:00" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Maximum reschedule limit (2) reached for this booking");

    let (status, body) = call(&app, Method::GET, "/api/v1/bookings/mine", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pending"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn profile_update_is_audited_without_secrets() -> anyhow::Result<()> {
    use models::enums::AuditAction;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    let (app, db) = app().await?;
    let token = verified_user(&app, PHONE).await?;

    let (status, body) = call(&app, Method::PATCH, "/api/v1/users/profile", Some(&token), Some(json!({ "name": "Asha R" }))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["name"], "Asha R");

    let (status, body) = call(&app, Method::PATCH, "/api/v1/users/profile", Some(&token), Some(json!({ "pin": "9999" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid updates. Only name, email, and image can be updated.");

    // audit writes are detached
    let mut logs = Vec::new();
    for _ in 0..50 {
        logs = models::audit_log::Entity::find()
            .filter(models::audit_log::Column::Action.eq(AuditAction::ProfileUpdated))
            .all(&db)
            .await?;
        if !logs.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].details.as_ref().and_then(|d| d.get("name")), Some(&json!("Asha R")));
    Ok(())
}

fn admin_token() -> anyhow::Result<String> {
    let issuer = service::auth::tokens::TokenIssuer::new(
        "test-access-secret",
        "test-refresh-secret",
        std::time::Duration::from_secs(900),
        std::time::Duration::from_secs(3600),
    );
    Ok(issuer.issue_access(uuid::Uuid::new_v4(), models::enums::Role::Admin)?)
}

#[tokio::test]
async fn client_facing_paths_and_methods_are_kept() -> anyhow::Result<()> {
    let (app, _db) = app().await?;
    let token = verified_user(&app, PHONE).await?;
    let admin = admin_token()?;

    let (status, _) = call(&app, Method::PUT, "/api/v1/users/profile", Some(&token), Some(json!({ "name": "X" }))).await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, body) = call(&app, Method::GET, "/api/v1/feedback/my", Some(&token), None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = call(&app, Method::GET, "/api/v1/dashboard/service-sections", None, None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, _) = call(&app, Method::POST, "/api/v1/dashboard/service-sections", None, Some(json!({ "title": "Popular" }))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, Method::POST, "/api/v1/dashboard/service-sections", Some(&token), Some(json!({ "title": "Popular" }))).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call(&app, Method::GET, "/api/v1/dashboard/banners", None, None).await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let user_logs = format!("/api/v1/admin/audit-logs/user/{}", uuid::Uuid::new_v4());
    for uri in ["/api/v1/admin/dashboard", "/api/v1/admin/audit-logs/action/login", user_logs.as_str()] {
        let (status, body) = call(&app, Method::GET, uri, Some(&admin), None).await?;
        assert_eq!(status, StatusCode::OK, "{uri}: {body}");
        let (status, _) = call(&app, Method::GET, uri, Some(&token), None).await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn health_and_metrics_are_served() -> anyhow::Result<()> {
    let (app, _db) = app().await?;
    let (status, body) = call(&app, Method::GET, "/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let resp = app.clone().oneshot(Request::builder().uri("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), usize::MAX).await?.to_vec())?;
    assert!(text.contains("marketplace_http_requests_total"));
    Ok(())
}
