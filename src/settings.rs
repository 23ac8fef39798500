use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::{env, fmt, str::FromStr};
use zeroize::Zeroizing;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl AppEnvironment {
    const ALL: [AppEnvironment; 3] = [
        AppEnvironment::Development,
        AppEnvironment::Production,
        AppEnvironment::Testing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|env| env.as_str() == wanted)
            .ok_or_else(|| ConfigError::Message(format!("Invalid APP_ENV value: {}", s)))
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration.
///
/// Sources, lowest precedence first: `config/default.*`, `config/{APP_ENV}.*`,
/// then `APP_*` environment variables (nested keys use `__`).
#[derive(Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "defaults::env")]
    pub env: AppEnvironment,
    #[serde(default = "defaults::name")]
    pub name: String,
    #[serde(default = "defaults::port")]
    pub port: u16,
    #[serde(default = "defaults::host")]
    pub host: String,
    #[serde(default = "defaults::worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: String,
    #[serde(default = "defaults::cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    // Session tokens
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "defaults::jwt_expiration_minutes")]
    pub jwt_expiration_minutes: i64,
    #[serde(default)]
    pub refresh_token_secret: String,
    #[serde(default = "defaults::refresh_token_exp_days")]
    pub refresh_token_exp_days: i64,

    /// The single privileged account. Matched exactly against the session email.
    #[serde(default)]
    pub admin_email: String,

    // Object store for uploaded images
    #[serde(default)]
    pub image_store_url: String,
    #[serde(default)]
    pub image_store_api_key: Option<String>,

    // Location classifier
    #[serde(default = "defaults::geo_api_url")]
    pub geo_api_url: String,
    #[serde(default)]
    pub geo_api_key: Option<String>,
    #[serde(default = "defaults::geo_timeout_secs")]
    pub geo_timeout_secs: u64,
    #[serde(default = "defaults::geo_top_k")]
    pub geo_top_k: u8,
    #[serde(default = "defaults::geo_min_confidence")]
    pub geo_min_confidence: f64,
    #[serde(default = "defaults::detect_requests_per_minute")]
    pub detect_requests_per_minute: u32,
}

mod defaults {
    use super::AppEnvironment;

    pub fn env() -> AppEnvironment { AppEnvironment::Development }
    pub fn name() -> String { "PhotoMap-API".into() }
    pub fn port() -> u16 { 8080 }
    pub fn host() -> String { "127.0.0.1".into() }
    pub fn worker_count() -> usize { num_cpus::get() }
    pub fn cors_origins() -> Vec<String> { vec!["*".into()] }
    pub fn jwt_expiration_minutes() -> i64 { 60 }
    pub fn refresh_token_exp_days() -> i64 { 30 }
    pub fn geo_api_url() -> String { "https://picarta.ai/classify".into() }
    pub fn geo_timeout_secs() -> u64 { 30 }
    pub fn geo_top_k() -> u8 { 3 }
    pub fn geo_min_confidence() -> f64 { 0.1 }
    pub fn detect_requests_per_minute() -> u32 { 10 }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let env_name = env::var("APP_ENV")
            .map(|raw| raw.parse::<AppEnvironment>())
            .unwrap_or(Ok(AppEnvironment::Development))?;

        let mut config: Self = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            )
            .build()?
            .try_deserialize()?;

        config.env = env_name;
        config.fill_from_process_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Required keys fall back to their plain `APP_*` variable when the layered
    /// sources left them empty.
    fn fill_from_process_env(&mut self) -> Result<(), ConfigError> {
        for (slot, key) in [
            (&mut self.database_url, "APP_DATABASE_URL"),
            (&mut self.jwt_secret, "APP_JWT_SECRET"),
            (&mut self.refresh_token_secret, "APP_REFRESH_TOKEN_SECRET"),
            (&mut self.admin_email, "APP_ADMIN_EMAIL"),
        ] {
            if slot.trim().is_empty() {
                *slot = env::var(key).map_err(|_| ConfigError::Message(format!("{key} must be set")))?;
            }
        }

        for (slot, key) in [
            (&mut self.geo_api_key, "APP_GEO_API_KEY"),
            (&mut self.image_store_api_key, "APP_IMAGE_STORE_API_KEY"),
        ] {
            if slot.is_none() {
                *slot = env::var(key).ok().filter(|k| !k.trim().is_empty());
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            (self.database_url.trim().is_empty(), "DATABASE_URL cannot be empty"),
            (self.jwt_secret.len() < MIN_SECRET_LEN, "JWT_SECRET must be at least 32 characters"),
            (
                self.refresh_token_secret.len() < MIN_SECRET_LEN,
                "REFRESH_TOKEN_SECRET must be at least 32 characters",
            ),
            (!self.admin_email.contains('@'), "ADMIN_EMAIL must be an email address"),
            (
                !(0.0..=1.0).contains(&self.geo_min_confidence),
                "GEO_MIN_CONFIDENCE must be between 0 and 1",
            ),
            (self.geo_timeout_secs == 0, "GEO_TIMEOUT_SECS must be positive"),
            (self.detect_requests_per_minute == 0, "DETECT_REQUESTS_PER_MINUTE must be positive"),
            (
                self.is_production() && self.cors_origins().iter().any(|o| o == "*"),
                "Wildcard CORS (*) is not allowed in production",
            ),
            (
                self.is_production() && self.image_store_url.trim().is_empty(),
                "IMAGE_STORE_URL must be set in production",
            ),
        ];

        let problems: Vec<&str> = checks
            .iter()
            .filter(|(failed, _)| *failed)
            .map(|(_, message)| *message)
            .collect();

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(problems.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    /// Origins may arrive as a list or as one comma separated string.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    }
}

fn mask(secret: &str) -> &'static str {
    match secret.len() {
        0 => "[MISSING]",
        n if n < MIN_SECRET_LEN => "[TOO_SHORT]",
        _ => "[REDACTED]",
    }
}

fn mask_optional(secret: &Option<String>) -> &'static str {
    match secret.as_deref() {
        Some(s) if !s.is_empty() => "[REDACTED]",
        _ => "[MISSING]",
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("bind", &format!("{}:{}", self.host, self.port))
            .field("worker_count", &self.worker_count)
            .field("database_url", &mask(&self.database_url))
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_secret", &mask(&self.jwt_secret))
            .field("jwt_expiration_minutes", &self.jwt_expiration_minutes)
            .field("refresh_token_secret", &mask(&self.refresh_token_secret))
            .field("refresh_token_exp_days", &self.refresh_token_exp_days)
            .field("admin_email", &self.admin_email)
            .field("image_store_url", &self.image_store_url)
            .field("image_store_api_key", &mask_optional(&self.image_store_api_key))
            .field("geo_api_url", &self.geo_api_url)
            .field("geo_api_key", &mask_optional(&self.geo_api_key))
            .field("geo_timeout_secs", &self.geo_timeout_secs)
            .field("geo_top_k", &self.geo_top_k)
            .field("geo_min_confidence", &self.geo_min_confidence)
            .field("detect_requests_per_minute", &self.detect_requests_per_minute)
            .finish()
    }
}

/// HMAC key material for one token kind.
#[derive(Clone)]
pub struct KeyPair {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        let secret = Zeroizing::new(secret.as_bytes().to_vec());
        KeyPair {
            encoding: EncodingKey::from_secret(&secret),
            decoding: DecodingKey::from_secret(&secret),
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyPair([REDACTED])")
    }
}

/// Session and refresh tokens are signed with independent secrets.
#[derive(Clone, Debug)]
pub struct SigningKeys {
    pub session: KeyPair,
    pub refresh: KeyPair,
}

impl From<&AppConfig> for SigningKeys {
    fn from(config: &AppConfig) -> Self {
        SigningKeys {
            session: KeyPair::from_secret(&config.jwt_secret),
            refresh: KeyPair::from_secret(&config.refresh_token_secret),
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "PhotoMap Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        database_url: "postgres://localhost/photomap_test".into(),
        cors_allowed_origins: vec!["*".to_string()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512_1234567890".into(),
        jwt_expiration_minutes: 5,
        refresh_token_secret: "test_refresh_secret_that_is_long_enough_1234567890".into(),
        refresh_token_exp_days: 1,
        admin_email: "admin@photomap.test".into(),
        image_store_url: "http://127.0.0.1:9/images".into(),
        image_store_api_key: None,
        geo_api_url: "http://127.0.0.1:9/classify".into(),
        geo_api_key: None,
        geo_timeout_secs: 5,
        geo_top_k: 3,
        geo_min_confidence: 0.1,
        detect_requests_per_minute: 10,
    }
}
