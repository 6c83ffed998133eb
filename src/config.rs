//! Construction parameters for the facade.
//!
//! [`Settings`] is what callers fill in (directly, through serde, or from the
//! environment). It is reduced once, at construction, into an immutable
//! [`ConnectionConfig`] plus the initial [`Defaults`].

use serde::Deserialize;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::target::Defaults;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 27017;
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 10;
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

const ENV_PREFIX: &str = "EASY_MONGO_";

/// Where and how to reach the store. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: String,
    port: u16,
    app_name: Option<String>,
    server_selection_timeout: Option<Duration>,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            app_name: None,
            server_selection_timeout: None,
        }
    }

    /// Parses a `host:port` string. The split happens at the last `:`.
    pub fn from_endpoint(endpoint: &str) -> Result<Self> {
        let invalid = || Error::InvalidEndpoint(endpoint.to_string());

        let (host, port) = endpoint.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.trim().parse::<u16>().map_err(|_| invalid())?;

        Ok(Self::new(host, port))
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn server_selection_timeout(&self) -> Option<Duration> {
        self.server_selection_timeout
    }

    /// `host:port`, used in logs and errors.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Recognized construction options.
///
/// `endpoint` wins over `host`/`port` when both are present. With neither,
/// the driver's usual `localhost:27017` is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub endpoint: Option<String>,
    pub default_database: Option<String>,
    pub default_collection: Option<String>,
    /// Connect eagerly while constructing the facade.
    pub connect: bool,
    /// Attempt budget used when an operation has to connect lazily.
    pub connect_attempts: u32,
    pub retry_backoff_ms: u64,
    pub app_name: Option<String>,
    pub server_selection_timeout_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            endpoint: None,
            default_database: None,
            default_collection: None,
            connect: false,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_backoff_ms: duration_millis(DEFAULT_RETRY_BACKOFF),
            app_name: Some(env!("CARGO_PKG_NAME").to_string()),
            server_selection_timeout_ms: None,
        }
    }
}

impl Settings {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    pub fn endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    pub fn with_defaults(
        mut self,
        database: impl Into<String>,
        collection: Option<&str>,
    ) -> Self {
        self.default_database = Some(database.into());
        self.default_collection = collection.map(str::to_string);
        self
    }

    pub fn with_connect(mut self, connect: bool) -> Self {
        self.connect = connect;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff_ms = duration_millis(backoff);
        self
    }

    /// Reads `EASY_MONGO_HOST`, `EASY_MONGO_PORT`, `EASY_MONGO_ENDPOINT`,
    /// `EASY_MONGO_DEFAULT_DATABASE`, `EASY_MONGO_DEFAULT_COLLECTION`,
    /// `EASY_MONGO_CONNECT`, `EASY_MONGO_CONNECT_ATTEMPTS`,
    /// `EASY_MONGO_RETRY_BACKOFF_MS`, `EASY_MONGO_APP_NAME` and
    /// `EASY_MONGO_SERVER_SELECTION_TIMEOUT_MS`. Unset variables keep their
    /// defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));
        let mut settings = Self::default();

        if let Some(host) = var("HOST") {
            settings.host = Some(host);
        }
        if let Some(port) = var("PORT") {
            settings.port = Some(parse_setting("EASY_MONGO_PORT", port)?);
        }
        if let Some(endpoint) = var("ENDPOINT") {
            settings.endpoint = Some(endpoint);
        }
        if let Some(database) = var("DEFAULT_DATABASE") {
            settings.default_database = Some(database);
        }
        if let Some(collection) = var("DEFAULT_COLLECTION") {
            settings.default_collection = Some(collection);
        }
        if let Some(connect) = var("CONNECT") {
            settings.connect = parse_flag("EASY_MONGO_CONNECT", connect)?;
        }
        if let Some(attempts) = var("CONNECT_ATTEMPTS") {
            settings.connect_attempts = parse_setting("EASY_MONGO_CONNECT_ATTEMPTS", attempts)?;
        }
        if let Some(backoff) = var("RETRY_BACKOFF_MS") {
            settings.retry_backoff_ms = parse_setting("EASY_MONGO_RETRY_BACKOFF_MS", backoff)?;
        }
        if let Some(app_name) = var("APP_NAME") {
            settings.app_name = Some(app_name);
        }
        if let Some(timeout) = var("SERVER_SELECTION_TIMEOUT_MS") {
            settings.server_selection_timeout_ms =
                Some(parse_setting("EASY_MONGO_SERVER_SELECTION_TIMEOUT_MS", timeout)?);
        }

        Ok(settings)
    }

    /// Reduces host/port/endpoint into the retained host and port.
    pub fn connection_config(&self) -> Result<ConnectionConfig> {
        let mut config = match &self.endpoint {
            Some(endpoint) => ConnectionConfig::from_endpoint(endpoint)?,
            None => ConnectionConfig::new(
                self.host.as_deref().unwrap_or(DEFAULT_HOST),
                self.port.unwrap_or(DEFAULT_PORT),
            ),
        };

        if let Some(app_name) = &self.app_name {
            config = config.with_app_name(app_name.clone());
        }
        if let Some(timeout) = self.server_selection_timeout_ms {
            config = config.with_server_selection_timeout(Duration::from_millis(timeout));
        }

        Ok(config)
    }

    pub fn defaults(&self) -> Defaults {
        Defaults {
            database: self.default_database.clone(),
            collection: self.default_collection.clone(),
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_setting<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidSetting { key, value })
}

fn parse_flag(key: &'static str, value: String) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(Error::InvalidSetting { key, value }),
    }
}
