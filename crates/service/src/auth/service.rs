use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::enums::Role;
use models::validation::{PHONE_RE, PIN_RE};

use super::domain::{
    Account, AccountKind, AccountProfile, AdminSignupInput, AuthSession, LoginTicket, NewAccount, NewAdmin,
    PendingSignup, RefreshedToken, ResetTicket, SignupTicket, UserSignupInput, VendorSignupInput,
};
use super::errors::AuthError;
use super::pin::{hash_secret, verify_secret};
use super::repository::AuthRepository;
use super::tokens::{Claims, TokenIssuer};
use crate::cache::Cache;
use crate::notify::{otp_sms, EmailSender, LogEmailSender, LogSmsSender, SmsSender};
use crate::otp::{OtpGenerator, OtpPurpose, OtpStore};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub max_failed_attempts: i32,
    pub lock_duration: chrono::Duration,
    pub otp_ttl: Duration,
    /// Lifetime of signup/login/reset handles between two steps.
    pub pending_ttl: Duration,
    pub static_otp: bool,
}

impl AuthConfig {
    pub fn from_app(cfg: &configs::AppConfig) -> Self {
        Self {
            max_failed_attempts: cfg.auth.max_failed_attempts,
            lock_duration: chrono::Duration::minutes(cfg.auth.lock_minutes),
            otp_ttl: Duration::from_secs(cfg.otp.ttl_secs),
            pending_ttl: Duration::from_secs(cfg.otp.ttl_secs),
            static_otp: cfg.otp.static_codes,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lock_duration: chrono::Duration::minutes(30),
            otp_ttl: Duration::from_secs(600),
            pending_ttl: Duration::from_secs(600),
            static_otp: true,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PendingLogin {
    phone_number: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PendingReset {
    kind: AccountKind,
    phone_number: String,
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cache: Arc<Cache>,
    otp: OtpStore,
    tokens: TokenIssuer,
    sms: Arc<dyn SmsSender>,
    email: Arc<dyn EmailSender>,
    cfg: AuthConfig,
}

fn check_phone(phone: &str) -> Result<(), AuthError> {
    if PHONE_RE.is_match(phone) { Ok(()) } else { Err(AuthError::Validation("Invalid phone number format.".into())) }
}

fn check_pin(pin: &str, confirm: &str) -> Result<(), AuthError> {
    if !PIN_RE.is_match(pin) {
        return Err(AuthError::Validation("PIN must be exactly 4 digits".into()));
    }
    if pin != confirm {
        return Err(AuthError::Validation("PINs do not match".into()));
    }
    Ok(())
}

fn check_policies(terms: bool, privacy: bool) -> Result<(), AuthError> {
    if !terms {
        return Err(AuthError::Validation("You must accept Terms & Conditions".into()));
    }
    if !privacy {
        return Err(AuthError::Validation("You must accept Privacy Policy".into()));
    }
    Ok(())
}

fn check_combined_policies(accepted: bool) -> Result<(), AuthError> {
    if accepted { Ok(()) } else { Err(AuthError::Validation("You must accept Terms & Conditions and Privacy Policy".into())) }
}

fn not_found(kind: AccountKind) -> AuthError {
    match kind {
        AccountKind::User => AuthError::NotFound("User not found".into()),
        AccountKind::Vendor => AuthError::NotFound("Vendor not found".into()),
    }
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cache: Arc<Cache>, tokens: TokenIssuer, cfg: AuthConfig) -> Self {
        let otp = OtpStore::new(cache.clone(), OtpGenerator::new(cfg.static_otp), cfg.otp_ttl);
        Self {
            repo,
            cache,
            otp,
            tokens,
            sms: Arc::new(LogSmsSender),
            email: Arc::new(LogEmailSender),
            cfg,
        }
    }

    pub fn with_sms(mut self, sms: Arc<dyn SmsSender>) -> Self {
        self.sms = sms;
        self
    }

    pub fn with_email(mut self, email: Arc<dyn EmailSender>) -> Self {
        self.email = email;
        self
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    async fn send_code(&self, purpose: OtpPurpose, kind: AccountKind, phone: &str) {
        let code = self.otp.issue(purpose, kind.as_str(), phone);
        if let Err(e) = self.sms.send_sms(phone, &otp_sms(&code)).await {
            warn!(event = "otp_sms_failed", %phone, error = %e);
        }
    }

    async fn ensure_phone_free(&self, kind: AccountKind, phone: &str) -> Result<(), AuthError> {
        if self.repo.find_account(kind, phone).await?.is_some() {
            return Err(AuthError::Conflict("phoneNumber already exists".into()));
        }
        Ok(())
    }

    fn session(&self, user: AccountProfile) -> Result<AuthSession, AuthError> {
        let pair = self.tokens.issue_pair(user.id, user.role)?;
        Ok(AuthSession {
            user,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".into(),
            expires_in: pair.expires_in,
        })
    }

    /// Register an unverified user and text them a verification code.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, tokens::TokenIssuer};
    /// use service::auth::domain::UserSignupInput;
    /// use service::cache::Cache;
    /// use std::{sync::Arc, time::Duration};
    /// let tokens = TokenIssuer::new("a", "r", Duration::from_secs(60), Duration::from_secs(600));
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), Arc::new(Cache::new()), tokens, AuthConfig::default());
    /// let input = UserSignupInput {
    ///     phone_number: "+919800000001".into(), name: "Asha".into(), email: None,
    ///     pin: "1234".into(), confirm_pin: "1234".into(), accepted_terms: true, accepted_privacy: true,
    /// };
    /// let profile = tokio_test::block_on(svc.user_signup(input)).unwrap();
    /// assert!(!profile.is_verified);
    /// ```
    #[instrument(skip(self, input), fields(phone = %input.phone_number))]
    pub async fn user_signup(&self, input: UserSignupInput) -> Result<AccountProfile, AuthError> {
        check_phone(&input.phone_number)?;
        check_pin(&input.pin, &input.confirm_pin)?;
        check_policies(input.accepted_terms, input.accepted_privacy)?;
        self.ensure_phone_free(AccountKind::User, &input.phone_number).await?;

        let account = self
            .repo
            .create_account(NewAccount {
                kind: AccountKind::User,
                phone_number: input.phone_number,
                name: input.name,
                email: input.email,
                pin_hash: hash_secret(&input.pin)?,
                work_state: None,
                work_city: None,
                work_pincodes: Vec::new(),
            })
            .await?;
        self.send_code(OtpPurpose::Verify, AccountKind::User, &account.phone_number).await;
        info!(event = "user_registered", user_id = %account.id);
        Ok(AccountProfile::from(&account))
    }

    /// First signup step: park the details under a short-lived handle.
    #[instrument(skip(self, email), fields(%phone))]
    pub async fn initiate_user_signup(&self, phone: &str, name: &str, email: Option<String>) -> Result<SignupTicket, AuthError> {
        check_phone(phone)?;
        models::validation::name(name).map_err(|e| AuthError::Validation(e.to_string()))?;
        self.ensure_phone_free(AccountKind::User, phone).await?;

        let signup_id = Uuid::new_v4().to_string();
        let pending = PendingSignup { phone_number: phone.to_string(), name: name.trim().to_string(), email };
        self.cache.set_json(format!("signup:{signup_id}"), &pending, Some(self.cfg.pending_ttl));
        Ok(SignupTicket { signup_id, phone_number: phone.to_string() })
    }

    /// Second signup step: create the user from the parked details and send the OTP.
    #[instrument(skip(self, pin, confirm_pin))]
    pub async fn complete_user_signup(
        &self,
        signup_id: &str,
        pin: &str,
        confirm_pin: &str,
        accepted_policies: bool,
    ) -> Result<AccountProfile, AuthError> {
        check_pin(pin, confirm_pin)?;
        check_combined_policies(accepted_policies)?;
        let key = format!("signup:{signup_id}");
        let pending: PendingSignup = self
            .cache
            .get_json(&key)
            .ok_or_else(|| AuthError::SessionExpired("Signup session expired. Please start again".into()))?;

        self.ensure_phone_free(AccountKind::User, &pending.phone_number).await?;
        let account = self
            .repo
            .create_account(NewAccount {
                kind: AccountKind::User,
                phone_number: pending.phone_number,
                name: pending.name,
                email: pending.email,
                pin_hash: hash_secret(pin)?,
                work_state: None,
                work_city: None,
                work_pincodes: Vec::new(),
            })
            .await?;
        self.cache.del(&key);
        self.send_code(OtpPurpose::Verify, AccountKind::User, &account.phone_number).await;
        info!(event = "user_registered", user_id = %account.id, flow = "two_step");
        Ok(AccountProfile::from(&account))
    }

    #[instrument(skip(self, input), fields(phone = %input.phone_number))]
    pub async fn vendor_signup(&self, input: VendorSignupInput) -> Result<AccountProfile, AuthError> {
        check_phone(&input.phone_number)?;
        check_pin(&input.pin, &input.confirm_pin)?;
        check_policies(input.accepted_terms, input.accepted_privacy)?;
        if input.work_state.trim().len() < 2 {
            return Err(AuthError::Validation("Work state must be at least 2 characters".into()));
        }
        if input.work_city.trim().len() < 2 {
            return Err(AuthError::Validation("Work city must be at least 2 characters".into()));
        }
        self.ensure_phone_free(AccountKind::Vendor, &input.phone_number).await?;

        let account = self
            .repo
            .create_account(NewAccount {
                kind: AccountKind::Vendor,
                phone_number: input.phone_number,
                name: input.name,
                email: input.email,
                pin_hash: hash_secret(&input.pin)?,
                work_state: Some(input.work_state.trim().to_string()),
                work_city: Some(input.work_city.trim().to_string()),
                work_pincodes: input.work_pincodes.into_iter().map(|p| p.trim().to_string()).collect(),
            })
            .await?;
        self.send_code(OtpPurpose::Verify, AccountKind::Vendor, &account.phone_number).await;
        info!(event = "vendor_registered", vendor_id = %account.id);
        Ok(AccountProfile::from(&account))
    }

    /// Confirm the signup code, mark the phone verified and open a session.
    #[instrument(skip(self, otp))]
    pub async fn verify_signup_otp(&self, kind: AccountKind, phone: &str, otp: &str) -> Result<AuthSession, AuthError> {
        let mut account = self.repo.find_account(kind, phone).await?.ok_or_else(|| not_found(kind))?;
        if !self.otp.verify(OtpPurpose::Verify, kind.as_str(), phone, otp) {
            return Err(AuthError::InvalidOtp);
        }
        self.repo.mark_verified(kind, account.id).await?;
        self.repo.record_login_success(kind, account.id, Utc::now()).await?;
        account.phone_verified = true;

        if let Some(to) = &account.email {
            if let Err(e) = self.email.send_email(to, "Welcome", &format!("Hi {}, your account is verified.", account.name)).await {
                warn!(event = "welcome_email_failed", error = %e);
            }
        }
        info!(event = "account_verified", kind = kind.as_str(), id = %account.id);
        self.session(AccountProfile::from(&account))
    }

    /// PIN login with failure counting and temporary lockout.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, tokens::TokenIssuer};
    /// use service::auth::domain::{AccountKind, UserSignupInput};
    /// use service::cache::Cache;
    /// use std::{sync::Arc, time::Duration};
    /// let tokens = TokenIssuer::new("a", "r", Duration::from_secs(60), Duration::from_secs(600));
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), Arc::new(Cache::new()), tokens, AuthConfig::default());
    /// let phone = "+919800000002";
    /// let input = UserSignupInput {
    ///     phone_number: phone.into(), name: "Ravi".into(), email: None,
    ///     pin: "4321".into(), confirm_pin: "4321".into(), accepted_terms: true, accepted_privacy: true,
    /// };
    /// tokio_test::block_on(svc.user_signup(input)).unwrap();
    /// tokio_test::block_on(svc.verify_signup_otp(AccountKind::User, phone, "123456")).unwrap();
    /// let session = tokio_test::block_on(svc.login(AccountKind::User, phone, "4321")).unwrap();
    /// assert_eq!(session.token_type, "Bearer");
    /// ```
    #[instrument(skip(self, pin))]
    pub async fn login(&self, kind: AccountKind, phone: &str, pin: &str) -> Result<AuthSession, AuthError> {
        let account = self.repo.find_account(kind, phone).await?.ok_or(AuthError::InvalidCredentials)?;
        let profile = self.authenticate(&account, pin).await?;
        info!(event = "login_succeeded", kind = kind.as_str(), id = %account.id);
        self.session(profile)
    }

    async fn authenticate(&self, account: &Account, pin: &str) -> Result<AccountProfile, AuthError> {
        let now = Utc::now();
        if account.is_locked(now) {
            return Err(AuthError::Locked);
        }
        if !account.is_active || account.suspended {
            return Err(AuthError::Inactive("Account is inactive or suspended".into()));
        }
        if !verify_secret(pin, &account.pin_hash)? {
            let attempts = account.failed_attempts + 1;
            if attempts >= self.cfg.max_failed_attempts {
                self.repo
                    .record_login_failure(account.kind, account.id, 0, Some(now + self.cfg.lock_duration))
                    .await?;
                warn!(event = "account_locked", id = %account.id);
                return Err(AuthError::Locked);
            }
            self.repo.record_login_failure(account.kind, account.id, attempts, None).await?;
            debug!(event = "login_failed", id = %account.id, attempts);
            return Err(AuthError::InvalidCredentials);
        }
        if !account.phone_verified {
            return Err(AuthError::NotVerified);
        }
        self.repo.record_login_success(account.kind, account.id, now).await?;
        Ok(AccountProfile::from(account))
    }

    /// First login screen: confirm the phone is registered and hand back a login handle.
    #[instrument(skip(self))]
    pub async fn initiate_user_login(&self, phone: &str, accepted_policies: bool) -> Result<LoginTicket, AuthError> {
        check_phone(phone)?;
        check_combined_policies(accepted_policies)?;
        let account = self
            .repo
            .find_account(AccountKind::User, phone)
            .await?
            .ok_or_else(|| not_found(AccountKind::User))?;
        if !account.is_active || account.suspended {
            return Err(AuthError::Inactive("Account is inactive or suspended".into()));
        }
        let login_id = Uuid::new_v4().to_string();
        self.cache.set_json(
            format!("login:{login_id}"),
            &PendingLogin { phone_number: account.phone_number.clone() },
            Some(self.cfg.pending_ttl),
        );
        Ok(LoginTicket { login_id, phone_number: account.phone_number, name: account.name })
    }

    #[instrument(skip(self, pin))]
    pub async fn complete_user_login(&self, login_id: &str, pin: &str) -> Result<AuthSession, AuthError> {
        let key = format!("login:{login_id}");
        let pending: PendingLogin = self
            .cache
            .get_json(&key)
            .ok_or_else(|| AuthError::SessionExpired("Login session expired. Please start again".into()))?;
        let session = self.login(AccountKind::User, &pending.phone_number, pin).await?;
        self.cache.del(&key);
        Ok(session)
    }

    /// Text a fresh code: a verification code for unverified accounts, a reset code otherwise.
    #[instrument(skip(self))]
    pub async fn send_otp(&self, kind: AccountKind, phone: &str) -> Result<(), AuthError> {
        let account = self.repo.find_account(kind, phone).await?.ok_or_else(|| not_found(kind))?;
        let purpose = if account.phone_verified { OtpPurpose::Reset } else { OtpPurpose::Verify };
        self.send_code(purpose, kind, phone).await;
        Ok(())
    }

    #[instrument(skip(self, otp, new_pin, confirm_pin))]
    pub async fn reset_pin(
        &self,
        kind: AccountKind,
        phone: &str,
        otp: &str,
        new_pin: &str,
        confirm_pin: &str,
    ) -> Result<(), AuthError> {
        check_pin(new_pin, confirm_pin)?;
        let account = self.repo.find_account(kind, phone).await?.ok_or_else(|| not_found(kind))?;
        if !self.otp.verify(OtpPurpose::Reset, kind.as_str(), phone, otp) {
            return Err(AuthError::InvalidOtp);
        }
        self.repo.update_pin(kind, account.id, hash_secret(new_pin)?).await?;
        info!(event = "pin_reset", kind = kind.as_str(), id = %account.id);
        Ok(())
    }

    /// Reset step two: trade a valid reset code for a reset handle.
    #[instrument(skip(self, otp))]
    pub async fn verify_reset_otp(&self, phone: &str, otp: &str) -> Result<ResetTicket, AuthError> {
        let kind = AccountKind::User;
        self.repo.find_account(kind, phone).await?.ok_or_else(|| not_found(kind))?;
        if !self.otp.verify(OtpPurpose::Reset, kind.as_str(), phone, otp) {
            return Err(AuthError::InvalidOtp);
        }
        let reset_id = Uuid::new_v4().to_string();
        self.cache.set_json(
            format!("reset:{reset_id}"),
            &PendingReset { kind, phone_number: phone.to_string() },
            Some(self.cfg.pending_ttl),
        );
        Ok(ResetTicket { reset_id })
    }

    #[instrument(skip(self, new_pin, confirm_pin))]
    pub async fn complete_reset_pin(
        &self,
        reset_id: &str,
        new_pin: &str,
        confirm_pin: &str,
        accepted_policies: bool,
    ) -> Result<(), AuthError> {
        check_pin(new_pin, confirm_pin)?;
        check_combined_policies(accepted_policies)?;
        let pending: PendingReset = self
            .cache
            .take_json(&format!("reset:{reset_id}"))
            .ok_or_else(|| AuthError::SessionExpired("Reset session expired. Please start again".into()))?;
        let account = self
            .repo
            .find_account(pending.kind, &pending.phone_number)
            .await?
            .ok_or_else(|| not_found(pending.kind))?;
        self.repo.update_pin(pending.kind, account.id, hash_secret(new_pin)?).await?;
        info!(event = "pin_reset", kind = pending.kind.as_str(), id = %account.id, flow = "three_step");
        Ok(())
    }

    #[instrument(skip(self, password))]
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let admin = self.repo.find_admin(username).await?.ok_or(AuthError::InvalidCredentials)?;
        if !admin.is_active {
            return Err(AuthError::Inactive("Account is inactive".into()));
        }
        if !verify_secret(password, &admin.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        self.repo.record_admin_login(admin.id, Utc::now()).await?;
        info!(event = "admin_login", admin_id = %admin.id);
        self.session(AccountProfile::from(&admin))
    }

    /// Create an `admin`-role account. Callers gate this on `super_admin`.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn admin_signup(&self, input: AdminSignupInput) -> Result<AccountProfile, AuthError> {
        let username = input.username.trim();
        if username.len() < 3 || username.len() > 30 || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AuthError::Validation("Username must be 3-30 alphanumeric characters".into()));
        }
        if input.password.len() < 8 {
            return Err(AuthError::Validation("Password must be at least 8 characters".into()));
        }
        if input.password != input.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".into()));
        }
        if self.repo.find_admin(username).await?.is_some() {
            return Err(AuthError::Conflict("username already exists".into()));
        }
        let admin = self
            .repo
            .create_admin(NewAdmin {
                username: username.to_string(),
                name: input.name,
                email: input.email,
                password_hash: hash_secret(&input.password)?,
                role: Role::Admin,
            })
            .await?;
        info!(event = "admin_registered", admin_id = %admin.id);
        Ok(AccountProfile::from(&admin))
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshedToken, AuthError> {
        let claims = self.tokens.verify_refresh(refresh_token)?;
        Ok(RefreshedToken {
            access_token: self.tokens.issue_access(claims.sub, claims.role)?,
            token_type: "Bearer".into(),
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.verify_access(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use crate::notify::mock::RecordingSmsSender;

    const PHONE: &str = "+919811111111";

    fn service(repo: Arc<MockAuthRepository>) -> AuthService<MockAuthRepository> {
        let tokens = TokenIssuer::new("access", "refresh", Duration::from_secs(60), Duration::from_secs(600));
        AuthService::new(repo, Arc::new(Cache::new()), tokens, AuthConfig::default())
    }

    fn signup(phone: &str) -> UserSignupInput {
        UserSignupInput {
            phone_number: phone.into(),
            name: "Meera".into(),
            email: Some("meera@example.com".into()),
            pin: "1234".into(),
            confirm_pin: "1234".into(),
            accepted_terms: true,
            accepted_privacy: true,
        }
    }

    async fn verified(svc: &AuthService<MockAuthRepository>, phone: &str) {
        svc.user_signup(signup(phone)).await.unwrap();
        svc.verify_signup_otp(AccountKind::User, phone, "123456").await.unwrap();
    }

    #[tokio::test]
    async fn signup_sends_otp_and_rejects_duplicates() {
        let sms = Arc::new(RecordingSmsSender::default());
        let svc = service(Arc::new(MockAuthRepository::default())).with_sms(sms.clone());
        let profile = svc.user_signup(signup(PHONE)).await.unwrap();
        assert_eq!(profile.role, Role::User);
        assert_eq!(sms.sent().len(), 1);
        assert!(sms.sent()[0].1.contains("123456"));

        let err = svc.user_signup(signup(PHONE)).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict(ref m) if m == "phoneNumber already exists"));
    }

    #[tokio::test]
    async fn signup_validates_pin_and_policies() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        let mut input = signup(PHONE);
        input.confirm_pin = "9999".into();
        assert!(matches!(svc.user_signup(input).await, Err(AuthError::Validation(ref m)) if m == "PINs do not match"));

        let mut input = signup(PHONE);
        input.accepted_privacy = false;
        assert!(matches!(svc.user_signup(input).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_requires_verification_and_correct_pin() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        svc.user_signup(signup(PHONE)).await.unwrap();
        assert!(matches!(svc.login(AccountKind::User, PHONE, "1234").await, Err(AuthError::NotVerified)));

        assert!(matches!(
            svc.verify_signup_otp(AccountKind::User, PHONE, "000000").await,
            Err(AuthError::InvalidOtp)
        ));
        let session = svc.verify_signup_otp(AccountKind::User, PHONE, "123456").await.unwrap();
        assert!(session.user.is_verified);

        assert!(matches!(svc.login(AccountKind::User, PHONE, "9999").await, Err(AuthError::InvalidCredentials)));
        assert!(matches!(svc.login(AccountKind::User, "+910000000", "1234").await, Err(AuthError::InvalidCredentials)));
        let session = svc.login(AccountKind::User, PHONE, "1234").await.unwrap();
        let claims = svc.verify_access(&session.access_token).unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.sub, session.user.id);
    }

    #[tokio::test]
    async fn repeated_failures_lock_the_account() {
        let repo = Arc::new(MockAuthRepository::default());
        let svc = service(repo.clone());
        verified(&svc, PHONE).await;

        for _ in 0..4 {
            assert!(matches!(svc.login(AccountKind::User, PHONE, "0000").await, Err(AuthError::InvalidCredentials)));
        }
        assert!(matches!(svc.login(AccountKind::User, PHONE, "0000").await, Err(AuthError::Locked)));
        // even the right PIN is refused while locked
        assert!(matches!(svc.login(AccountKind::User, PHONE, "1234").await, Err(AuthError::Locked)));
        let account = repo.account(AccountKind::User, PHONE).unwrap();
        assert!(account.lock_until.is_some());
        assert_eq!(account.failed_attempts, 0);
    }

    #[tokio::test]
    async fn two_step_signup_and_login() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        let ticket = svc.initiate_user_signup(PHONE, "Kiran", None).await.unwrap();
        svc.complete_user_signup(&ticket.signup_id, "2468", "2468", true).await.unwrap();
        assert!(matches!(
            svc.complete_user_signup(&ticket.signup_id, "2468", "2468", true).await,
            Err(AuthError::SessionExpired(_))
        ));
        svc.verify_signup_otp(AccountKind::User, PHONE, "123456").await.unwrap();

        let login = svc.initiate_user_login(PHONE, true).await.unwrap();
        assert_eq!(login.name, "Kiran");
        assert!(matches!(svc.complete_user_login(&login.login_id, "1111").await, Err(AuthError::InvalidCredentials)));
        svc.complete_user_login(&login.login_id, "2468").await.unwrap();
        assert!(matches!(svc.complete_user_login(&login.login_id, "2468").await, Err(AuthError::SessionExpired(_))));
    }

    #[tokio::test]
    async fn reset_flows_replace_the_pin() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        verified(&svc, PHONE).await;

        svc.send_otp(AccountKind::User, PHONE).await.unwrap();
        svc.reset_pin(AccountKind::User, PHONE, "123456", "5678", "5678").await.unwrap();
        assert!(svc.login(AccountKind::User, PHONE, "5678").await.is_ok());

        svc.send_otp(AccountKind::User, PHONE).await.unwrap();
        let ticket = svc.verify_reset_otp(PHONE, "123456").await.unwrap();
        svc.complete_reset_pin(&ticket.reset_id, "9012", "9012", true).await.unwrap();
        assert!(svc.login(AccountKind::User, PHONE, "9012").await.is_ok());

        assert!(matches!(svc.send_otp(AccountKind::Vendor, PHONE).await, Err(AuthError::NotFound(_))));
    }

    #[tokio::test]
    async fn vendor_signup_and_login() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        let input = VendorSignupInput {
            phone_number: PHONE.into(),
            name: "Sanjay".into(),
            email: None,
            pin: "1357".into(),
            confirm_pin: "1357".into(),
            work_state: "Karnataka".into(),
            work_city: "Mysuru".into(),
            work_pincodes: vec![" 570001 ".into()],
            accepted_terms: true,
            accepted_privacy: true,
        };
        let profile = svc.vendor_signup(input).await.unwrap();
        assert_eq!(profile.role, Role::Vendor);
        svc.verify_signup_otp(AccountKind::Vendor, PHONE, "123456").await.unwrap();
        let session = svc.login(AccountKind::Vendor, PHONE, "1357").await.unwrap();
        assert_eq!(svc.verify_access(&session.access_token).unwrap().role, Role::Vendor);
        // the same phone is still free on the user side
        assert!(svc.user_signup(signup(PHONE)).await.is_ok());
    }

    #[tokio::test]
    async fn admin_signup_login_and_refresh() {
        let svc = service(Arc::new(MockAuthRepository::default()));
        let input = AdminSignupInput {
            username: "Ops1".into(),
            name: "Ops".into(),
            email: None,
            password: "Str0ng!pass".into(),
            confirm_password: "Str0ng!pass".into(),
        };
        let profile = svc.admin_signup(input.clone()).await.unwrap();
        assert_eq!(profile.username.as_deref(), Some("ops1"));
        assert!(matches!(svc.admin_signup(input).await, Err(AuthError::Conflict(_))));

        assert!(matches!(svc.admin_login("ops1", "wrong-pass").await, Err(AuthError::InvalidCredentials)));
        let session = svc.admin_login("OPS1", "Str0ng!pass").await.unwrap();
        assert_eq!(session.user.role, Role::Admin);

        let refreshed = svc.refresh(&session.refresh_token).unwrap();
        assert_eq!(svc.verify_access(&refreshed.access_token).unwrap().sub, profile.id);
        assert!(matches!(svc.refresh(&session.access_token), Err(AuthError::TokenInvalid)));
    }
}
