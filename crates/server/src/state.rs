use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use configs::AppConfig;
use service::admin::AdminService;
use service::audit::AuditService;
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::auth::tokens::TokenIssuer;
use service::bookings::BookingService;
use service::cache::Cache;
use service::image_host::ImageHost;
use service::otp::OtpGenerator;
use service::rate_limit::FixedWindowLimiter;
use service::users::UserService;
use service::vendors::VendorService;

pub type Auth = AuthService<SeaOrmAuthRepository>;

/// Per-concern request limiters sharing one window length.
pub struct Limiters {
    pub api: FixedWindowLimiter,
    pub auth: FixedWindowLimiter,
    pub otp: FixedWindowLimiter,
}

impl Limiters {
    pub fn from_config(cfg: &configs::RateLimitConfig) -> Self {
        let window = Duration::from_secs(cfg.window_secs);
        Self {
            api: FixedWindowLimiter::new("api", cfg.api_max, window, cfg.enabled),
            auth: FixedWindowLimiter::new("auth", cfg.auth_max, window, cfg.enabled),
            otp: FixedWindowLimiter::new("otp", cfg.otp_max, window, cfg.enabled),
        }
    }

    pub fn sweep(&self) {
        self.api.sweep();
        self.auth.sweep();
        self.otp.sweep();
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub cache: Arc<Cache>,
    pub auth: Arc<Auth>,
    pub audit: AuditService,
    pub bookings: BookingService,
    pub users: UserService,
    pub vendors: VendorService,
    pub admin: AdminService,
    pub images: ImageHost,
    pub limiters: Arc<Limiters>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let cache = Arc::new(Cache::new());
        let audit = AuditService::new(db.clone());
        let auth = AuthService::new(
            Arc::new(SeaOrmAuthRepository::new(db.clone())),
            cache.clone(),
            TokenIssuer::from_config(&config.auth),
            AuthConfig::from_app(&config),
        );
        let otp = OtpGenerator::new(config.otp.static_codes);
        Self {
            bookings: BookingService::new(db.clone(), audit.clone(), otp),
            users: UserService::new(db.clone(), audit.clone()),
            vendors: VendorService::new(db.clone(), audit.clone()),
            admin: AdminService::new(db.clone(), audit.clone()),
            images: ImageHost::new(&config.upload),
            limiters: Arc::new(Limiters::from_config(&config.rate_limit)),
            auth: Arc::new(auth),
            audit,
            cache,
            config: Arc::new(config),
            db,
        }
    }
}
