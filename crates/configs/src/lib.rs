use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub otp: OtpConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Allowed CORS origins; empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Emit JSON logs instead of the compact formatter.
    #[serde(default)]
    pub json_logs: bool,
    /// Reverse proxies in front of the server. The client address is the
    /// `X-Forwarded-For` entry this many hops from the right; 0 ignores the header.
    #[serde(default = "default_trusted_proxies")]
    pub trusted_proxies: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            worker_threads: Some(4),
            api_version: default_api_version(),
            cors_origins: Vec::new(),
            json_logs: false,
            trusted_proxies: default_trusted_proxies(),
        }
    }
}

fn default_api_version() -> String { "v1".into() }
fn default_trusted_proxies() -> usize { 1 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default)]
    pub jwt_refresh_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_secs: u64,
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: i32,
    #[serde(default = "default_lock_minutes")]
    pub lock_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_refresh_secret: String::new(),
            access_ttl_secs: default_access_ttl(),
            refresh_ttl_secs: default_refresh_ttl(),
            max_failed_attempts: default_max_failed_attempts(),
            lock_minutes: default_lock_minutes(),
        }
    }
}

fn default_access_ttl() -> u64 { 24 * 3600 }
fn default_refresh_ttl() -> u64 { 7 * 24 * 3600 }
fn default_max_failed_attempts() -> i32 { 5 }
fn default_lock_minutes() -> i64 { 30 }

/// Fixed-window limits; all windows share `window_secs`.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_window")]
    pub window_secs: u64,
    #[serde(default = "default_api_max")]
    pub api_max: u32,
    #[serde(default = "default_auth_max")]
    pub auth_max: u32,
    #[serde(default = "default_otp_max")]
    pub otp_max: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: default_window(),
            api_max: default_api_max(),
            auth_max: default_auth_max(),
            otp_max: default_otp_max(),
        }
    }
}

fn default_true() -> bool { true }
fn default_window() -> u64 { 15 * 60 }
fn default_api_max() -> u32 { 100 }
fn default_auth_max() -> u32 { 15 }
fn default_otp_max() -> u32 { 3 }

#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Use the fixed development codes instead of random ones.
    #[serde(default = "default_true")]
    pub static_codes: bool,
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self { static_codes: true, ttl_secs: default_otp_ttl() }
    }
}

fn default_otp_ttl() -> u64 { 600 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UploadConfig {
    /// Image host endpoint accepting multipart uploads. Uploads are disabled when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_upload_folder")]
    pub folder: String,
}

fn default_upload_folder() -> String { "banners".into() }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SeedConfig {
    #[serde(default)]
    pub admins: Vec<SeedAdmin>,
    /// Create a dashboard section for every subcategory that has none.
    #[serde(default)]
    pub service_sections: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAdmin {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub password: String,
    #[serde(default = "default_seed_role")]
    pub role: String,
}

fn default_seed_role() -> String { "admin".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Build from defaults plus environment variables, for deployments without a config file.
    pub fn from_env() -> Result<Self> {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Ok(port) = std::env::var("SERVER_PORT") {
            cfg.server.port = port
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be a number between 1 and 65535"))?;
        }
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.auth.normalize_from_env();
        self.auth.validate()?;
        self.rate_limit.validate()?;
        self.upload.normalize_from_env();
        Ok(())
    }

    /// `/api/{version}` prefix for every API route.
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.server.api_version)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        let version = self.api_version.trim().trim_matches('/');
        self.api_version = if version.is_empty() { default_api_version() } else { version.to_string() };
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        let supported = lower.starts_with("postgresql://")
            || lower.starts_with("postgres://")
            || lower.starts_with("sqlite:");
        if !supported {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
        if self.jwt_refresh_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_REFRESH_SECRET") {
                self.jwt_refresh_secret = secret;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_secret is empty; set it in config.toml or JWT_SECRET"));
        }
        if self.jwt_refresh_secret.trim().is_empty() {
            return Err(anyhow!("auth.jwt_refresh_secret is empty; set it in config.toml or JWT_REFRESH_SECRET"));
        }
        if self.max_failed_attempts <= 0 || self.lock_minutes <= 0 {
            return Err(anyhow!("auth.max_failed_attempts and auth.lock_minutes must be positive"));
        }
        Ok(())
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_secs == 0 {
            return Err(anyhow!("rate_limit.window_secs must be positive"));
        }
        if self.api_max == 0 || self.auth_max == 0 || self.otp_max == 0 {
            return Err(anyhow!("rate_limit maxima must be positive"));
        }
        Ok(())
    }
}

impl UploadConfig {
    pub fn normalize_from_env(&mut self) {
        if self.endpoint.is_none() {
            self.endpoint = std::env::var("IMAGE_UPLOAD_URL").ok().filter(|v| !v.trim().is_empty());
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("IMAGE_UPLOAD_KEY").ok().filter(|v| !v.trim().is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [server]
        host = ""
        port = 9000
        worker_threads = 0
        api_version = "/v2/"

        [database]
        url = "sqlite::memory:"
        min_connections = 1
        max_connections = 1

        [auth]
        jwt_secret = "access"
        jwt_refresh_secret = "refresh"

        [[seed.admins]]
        username = "root"
        name = "Root"
        password = "changeme"
        role = "super_admin"
    "#;

    #[test]
    fn parses_and_normalizes_sample() {
        let mut cfg = parse(SAMPLE).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.api_prefix(), "/api/v2");
        assert_eq!(cfg.rate_limit.auth_max, 15);
        assert_eq!(cfg.auth.max_failed_attempts, 5);
        assert!(cfg.otp.static_codes);
        assert_eq!(cfg.seed.admins.len(), 1);
        assert_eq!(cfg.seed.admins[0].role, "super_admin");
    }

    #[test]
    fn rejects_unsupported_database_scheme() {
        let db = DatabaseConfig { url: "mysql://localhost/app".into(), ..Default::default() };
        assert!(db.validate().is_err());
    }

    #[test]
    fn rejects_zero_rate_limit_window() {
        let rl = RateLimitConfig { window_secs: 0, ..Default::default() };
        assert!(rl.validate().is_err());
    }
}
