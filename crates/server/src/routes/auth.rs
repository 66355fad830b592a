use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use models::enums::AuditAction;
use models::validation::{PHONE_RE, PIN_RE};
use service::audit::{AuditEntry, RequestInfo};
use service::auth::domain::{
    AccountKind, AccountProfile, AdminSignupInput, AuthSession, LoginTicket, RefreshedToken, ResetTicket, SignupTicket,
    UserSignupInput, VendorSignupInput,
};

use crate::envelope::{created, done, ok, Envelope};
use crate::errors::AppResult;
use crate::extract::{ClientInfo, CurrentActor, ValidJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSignupRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(regex(path = *PIN_RE, message = "PIN must be exactly 4 digits"))]
    pub pin: String,
    #[validate(must_match(other = "pin", message = "PINs do not match"))]
    pub confirm_pin: String,
    #[serde(default)]
    pub accepted_terms: bool,
    #[serde(default)]
    pub accepted_privacy: bool,
}

impl From<UserSignupRequest> for UserSignupInput {
    fn from(r: UserSignupRequest) -> Self {
        Self {
            phone_number: r.phone_number,
            name: r.name.trim().to_string(),
            email: r.email,
            pin: r.pin,
            confirm_pin: r.confirm_pin,
            accepted_terms: r.accepted_terms,
            accepted_privacy: r.accepted_privacy,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorSignupRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(regex(path = *PIN_RE, message = "PIN must be exactly 4 digits"))]
    pub pin: String,
    #[validate(must_match(other = "pin", message = "PINs do not match"))]
    pub confirm_pin: String,
    #[validate(length(min = 2, message = "Work state must be at least 2 characters"))]
    pub work_state: String,
    #[validate(length(min = 2, message = "Work city must be at least 2 characters"))]
    pub work_city: String,
    #[serde(default)]
    pub work_pincodes: Vec<String>,
    #[serde(default)]
    pub accepted_terms: bool,
    #[serde(default)]
    pub accepted_privacy: bool,
}

impl From<VendorSignupRequest> for VendorSignupInput {
    fn from(r: VendorSignupRequest) -> Self {
        Self {
            phone_number: r.phone_number,
            name: r.name.trim().to_string(),
            email: r.email,
            pin: r.pin,
            confirm_pin: r.confirm_pin,
            work_state: r.work_state,
            work_city: r.work_city,
            work_pincodes: r.work_pincodes,
            accepted_terms: r.accepted_terms,
            accepted_privacy: r.accepted_privacy,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateSignupRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSignupRequest {
    #[validate(length(min = 1, message = "signupId is required"))]
    pub signup_id: String,
    #[validate(regex(path = *PIN_RE, message = "PIN must be exactly 4 digits"))]
    pub pin: String,
    #[validate(must_match(other = "pin", message = "PINs do not match"))]
    pub confirm_pin: String,
    #[serde(default)]
    pub accepted_policies: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 4, max = 6, message = "OTP must be 4 to 6 digits"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "PIN is required"))]
    pub pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InitiateLoginRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[serde(default)]
    pub accepted_policies: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLoginRequest {
    #[validate(length(min = 1, message = "loginId is required"))]
    pub login_id: String,
    #[validate(length(min = 1, message = "PIN is required"))]
    pub pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPinRequest {
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number format."))]
    pub phone_number: String,
    #[validate(length(min = 4, max = 6, message = "OTP must be 4 to 6 digits"))]
    pub otp: String,
    #[validate(regex(path = *PIN_RE, message = "PIN must be exactly 4 digits"))]
    pub new_pin: String,
    #[validate(must_match(other = "new_pin", message = "PINs do not match"))]
    pub confirm_pin: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResetRequest {
    #[validate(length(min = 1, message = "resetId is required"))]
    pub reset_id: String,
    #[validate(regex(path = *PIN_RE, message = "PIN must be exactly 4 digits"))]
    pub new_pin: String,
    #[validate(must_match(other = "new_pin", message = "PINs do not match"))]
    pub confirm_pin: String,
    #[serde(default)]
    pub accepted_policies: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminLoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSignupRequest {
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 alphanumeric characters"))]
    pub username: String,
    #[validate(length(min = 2, max = 50, message = "Name must be between 2 and 50 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

fn audit_login(state: &AppState, session: &AuthSession, request: RequestInfo) {
    let entry = AuditEntry::new(AuditAction::Login, session.user.id, session.user.role.actor_model()).request(request);
    state.audit.record_detached(entry);
}

async fn verify_otp(state: &AppState, kind: AccountKind, body: VerifyOtpRequest, request: RequestInfo) -> AppResult<Envelope<AuthSession>> {
    let session = state.auth.verify_signup_otp(kind, &body.phone_number, &body.otp).await?;
    audit_login(state, &session, request);
    Ok(ok("Phone number verified successfully", session))
}

async fn login(state: &AppState, kind: AccountKind, body: LoginRequest, request: RequestInfo) -> AppResult<Envelope<AuthSession>> {
    let session = state.auth.login(kind, &body.phone_number, &body.pin).await?;
    audit_login(state, &session, request);
    info!(event = "login", kind = kind.as_str(), id = %session.user.id);
    Ok(ok("Login successful", session))
}

async fn send_otp(state: &AppState, kind: AccountKind, body: PhoneRequest) -> AppResult<Envelope<()>> {
    state.auth.send_otp(kind, &body.phone_number).await?;
    Ok(done("OTP sent successfully"))
}

async fn reset_pin(state: &AppState, kind: AccountKind, body: ResetPinRequest) -> AppResult<Envelope<()>> {
    state
        .auth
        .reset_pin(kind, &body.phone_number, &body.otp, &body.new_pin, &body.confirm_pin)
        .await?;
    Ok(done("PIN reset successfully"))
}

#[utoipa::path(post, path = "/auth/user/signup", tag = "auth", request_body = UserSignupRequest, responses((status = 201, description = "Registered, OTP sent"), (status = 400, description = "Validation failed or phone taken")))]
pub async fn user_signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<UserSignupRequest>,
) -> AppResult<(StatusCode, Envelope<AccountProfile>)> {
    let profile = state.auth.user_signup(body.into()).await?;
    Ok(created("User registered successfully. Please verify your phone number", profile))
}

#[utoipa::path(post, path = "/auth/user/signup/initiate", tag = "auth", request_body = InitiateSignupRequest, responses((status = 200, description = "Signup handle issued"), (status = 400, description = "Validation failed or phone taken")))]
pub async fn initiate_user_signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<InitiateSignupRequest>,
) -> AppResult<Envelope<SignupTicket>> {
    let ticket = state.auth.initiate_user_signup(&body.phone_number, &body.name, body.email).await?;
    Ok(ok("Signup initiated", ticket))
}

#[utoipa::path(post, path = "/auth/user/signup/complete", tag = "auth", request_body = CompleteSignupRequest, responses((status = 201, description = "Registered, OTP sent"), (status = 400, description = "Validation failed or session expired")))]
pub async fn complete_user_signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CompleteSignupRequest>,
) -> AppResult<(StatusCode, Envelope<AccountProfile>)> {
    let profile = state
        .auth
        .complete_user_signup(&body.signup_id, &body.pin, &body.confirm_pin, body.accepted_policies)
        .await?;
    Ok(created("User registered successfully. Please verify your phone number", profile))
}

#[utoipa::path(post, path = "/auth/vendor/signup", tag = "auth", request_body = VendorSignupRequest, responses((status = 201, description = "Registered, OTP sent"), (status = 400, description = "Validation failed or phone taken")))]
pub async fn vendor_signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<VendorSignupRequest>,
) -> AppResult<(StatusCode, Envelope<AccountProfile>)> {
    let profile = state.auth.vendor_signup(body.into()).await?;
    Ok(created("Vendor registered successfully. Please verify your phone number", profile))
}

#[utoipa::path(post, path = "/auth/user/verify-otp", tag = "auth", request_body = VerifyOtpRequest, responses((status = 200, description = "Verified, session issued"), (status = 400, description = "Invalid OTP"), (status = 404, description = "Unknown phone")))]
pub async fn verify_user_otp(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<VerifyOtpRequest>,
) -> AppResult<Envelope<AuthSession>> {
    verify_otp(&state, AccountKind::User, body, request).await
}

#[utoipa::path(post, path = "/auth/vendor/verify-otp", tag = "auth", request_body = VerifyOtpRequest, responses((status = 200, description = "Verified, session issued"), (status = 400, description = "Invalid OTP"), (status = 404, description = "Unknown phone")))]
pub async fn verify_vendor_otp(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<VerifyOtpRequest>,
) -> AppResult<Envelope<AuthSession>> {
    verify_otp(&state, AccountKind::Vendor, body, request).await
}

#[utoipa::path(post, path = "/auth/user/login", tag = "auth", request_body = LoginRequest, responses((status = 200, description = "Session issued"), (status = 401, description = "Invalid credentials"), (status = 403, description = "Locked or inactive")))]
pub async fn user_login(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<LoginRequest>,
) -> AppResult<Envelope<AuthSession>> {
    login(&state, AccountKind::User, body, request).await
}

#[utoipa::path(post, path = "/auth/vendor/login", tag = "auth", request_body = LoginRequest, responses((status = 200, description = "Session issued"), (status = 401, description = "Invalid credentials"), (status = 403, description = "Locked or inactive")))]
pub async fn vendor_login(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<LoginRequest>,
) -> AppResult<Envelope<AuthSession>> {
    login(&state, AccountKind::Vendor, body, request).await
}

#[utoipa::path(post, path = "/auth/user/login/initiate", tag = "auth", request_body = InitiateLoginRequest, responses((status = 200, description = "Login handle issued"), (status = 404, description = "Unknown phone")))]
pub async fn initiate_user_login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<InitiateLoginRequest>,
) -> AppResult<Envelope<LoginTicket>> {
    let ticket = state.auth.initiate_user_login(&body.phone_number, body.accepted_policies).await?;
    Ok(ok("Login initiated", ticket))
}

#[utoipa::path(post, path = "/auth/user/login/complete", tag = "auth", request_body = CompleteLoginRequest, responses((status = 200, description = "Session issued"), (status = 400, description = "Session expired"), (status = 401, description = "Invalid credentials")))]
pub async fn complete_user_login(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<CompleteLoginRequest>,
) -> AppResult<Envelope<AuthSession>> {
    let session = state.auth.complete_user_login(&body.login_id, &body.pin).await?;
    audit_login(&state, &session, request);
    Ok(ok("Login successful", session))
}

#[utoipa::path(post, path = "/auth/user/send-otp", tag = "auth", request_body = PhoneRequest, responses((status = 200, description = "OTP sent"), (status = 404, description = "Unknown phone"), (status = 429, description = "Too many requests")))]
pub async fn send_user_otp(State(state): State<AppState>, ValidJson(body): ValidJson<PhoneRequest>) -> AppResult<Envelope<()>> {
    send_otp(&state, AccountKind::User, body).await
}

#[utoipa::path(post, path = "/auth/vendor/send-otp", tag = "auth", request_body = PhoneRequest, responses((status = 200, description = "OTP sent"), (status = 404, description = "Unknown phone"), (status = 429, description = "Too many requests")))]
pub async fn send_vendor_otp(State(state): State<AppState>, ValidJson(body): ValidJson<PhoneRequest>) -> AppResult<Envelope<()>> {
    send_otp(&state, AccountKind::Vendor, body).await
}

#[utoipa::path(post, path = "/auth/user/reset-pin", tag = "auth", request_body = ResetPinRequest, responses((status = 200, description = "PIN reset"), (status = 400, description = "Invalid OTP or PIN")))]
pub async fn reset_user_pin(State(state): State<AppState>, ValidJson(body): ValidJson<ResetPinRequest>) -> AppResult<Envelope<()>> {
    reset_pin(&state, AccountKind::User, body).await
}

#[utoipa::path(post, path = "/auth/vendor/reset-pin", tag = "auth", request_body = ResetPinRequest, responses((status = 200, description = "PIN reset"), (status = 400, description = "Invalid OTP or PIN")))]
pub async fn reset_vendor_pin(State(state): State<AppState>, ValidJson(body): ValidJson<ResetPinRequest>) -> AppResult<Envelope<()>> {
    reset_pin(&state, AccountKind::Vendor, body).await
}

#[utoipa::path(post, path = "/auth/user/reset-pin/verify-otp", tag = "auth", request_body = VerifyOtpRequest, responses((status = 200, description = "Reset handle issued"), (status = 400, description = "Invalid OTP")))]
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<VerifyOtpRequest>,
) -> AppResult<Envelope<ResetTicket>> {
    let ticket = state.auth.verify_reset_otp(&body.phone_number, &body.otp).await?;
    Ok(ok("OTP verified", ticket))
}

#[utoipa::path(post, path = "/auth/user/reset-pin/complete", tag = "auth", request_body = CompleteResetRequest, responses((status = 200, description = "PIN reset"), (status = 400, description = "Session expired or invalid PIN")))]
pub async fn complete_reset_pin(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<CompleteResetRequest>,
) -> AppResult<Envelope<()>> {
    state
        .auth
        .complete_reset_pin(&body.reset_id, &body.new_pin, &body.confirm_pin, body.accepted_policies)
        .await?;
    Ok(done("PIN reset successfully"))
}

#[utoipa::path(post, path = "/auth/admin/login", tag = "auth", request_body = AdminLoginRequest, responses((status = 200, description = "Session issued"), (status = 401, description = "Invalid credentials")))]
pub async fn admin_login(
    State(state): State<AppState>,
    ClientInfo(request): ClientInfo,
    ValidJson(body): ValidJson<AdminLoginRequest>,
) -> AppResult<Envelope<AuthSession>> {
    let session = state.auth.admin_login(&body.username, &body.password).await?;
    audit_login(&state, &session, request);
    Ok(ok("Login successful", session))
}

#[utoipa::path(post, path = "/auth/admin/signup", tag = "auth", request_body = AdminSignupRequest, security(("bearer" = [])), responses((status = 201, description = "Admin created"), (status = 400, description = "Validation failed or username taken"), (status = 403, description = "Super admin only")))]
pub async fn admin_signup(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<AdminSignupRequest>,
) -> AppResult<(StatusCode, Envelope<AccountProfile>)> {
    let input = AdminSignupInput {
        username: body.username,
        name: body.name,
        email: body.email,
        password: body.password,
        confirm_password: body.confirm_password,
    };
    let profile = state.auth.admin_signup(input).await?;
    Ok(created("Admin created successfully", profile))
}

#[utoipa::path(post, path = "/auth/refresh-token", tag = "auth", request_body = RefreshRequest, responses((status = 200, description = "New access token"), (status = 401, description = "Invalid or expired refresh token")))]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RefreshRequest>,
) -> AppResult<Envelope<RefreshedToken>> {
    let refreshed = state.auth.refresh(&body.refresh_token)?;
    Ok(ok("Token refreshed successfully", refreshed))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", security(("bearer" = [])), responses((status = 200, description = "Logged out"), (status = 401, description = "Unauthorized")))]
pub async fn logout(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> AppResult<Envelope<()>> {
    state.audit.record_detached(actor.audit(AuditAction::Logout));
    info!(event = "logout", id = %actor.id, role = actor.role.as_str());
    Ok(done("Logged out successfully"))
}
