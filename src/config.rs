//! Configuration loaded from environment variables.
//!
//! Two layers live here:
//!
//! - [`ServerConfig`]: typed process settings (ports, log level) read with `envy`.
//! - [`CharmConfig`]: every other variable in the environment, with known
//!   integration settings pulled out into [`Integrations`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

// === Integration Variables ===

/// PostgreSQL connection string.
pub const POSTGRESQL_DB_CONNECT_STRING: &str = "POSTGRESQL_DB_CONNECT_STRING";
/// MySQL connection string.
pub const MYSQL_DB_CONNECT_STRING: &str = "MYSQL_DB_CONNECT_STRING";
/// Redis connection string.
pub const REDIS_DB_CONNECT_STRING: &str = "REDIS_DB_CONNECT_STRING";
/// MongoDB connection string.
pub const MONGODB_DB_CONNECT_STRING: &str = "MONGODB_DB_CONNECT_STRING";

/// S3 access key.
pub const S3_ACCESS_KEY: &str = "S3_ACCESS_KEY";
/// S3 secret key.
pub const S3_SECRET_KEY: &str = "S3_SECRET_KEY";
/// S3 region.
pub const S3_REGION: &str = "S3_REGION";
/// S3 storage class.
pub const S3_STORAGE_CLASS: &str = "S3_STORAGE_CLASS";
/// S3 bucket.
pub const S3_BUCKET: &str = "S3_BUCKET";
/// S3 endpoint.
pub const S3_ENDPOINT: &str = "S3_ENDPOINT";
/// S3 path prefix.
pub const S3_PATH: &str = "S3_PATH";
/// S3 API version.
pub const S3_API_VERSION: &str = "S3_API_VERSION";
/// S3 URI style.
pub const S3_URI_STYLE: &str = "S3_URI_STYLE";
/// S3 addressing style.
pub const S3_ADDRESSING_STYLE: &str = "S3_ADDRESSING_STYLE";
/// S3 extra attributes.
pub const S3_ATTRIBUTES: &str = "S3_ATTRIBUTES";
/// S3 TLS CA chain.
pub const S3_TLS_CA_CHAIN: &str = "S3_TLS_CA_CHAIN";

/// SAML entity id.
pub const SAML_ENTITY_ID: &str = "SAML_ENTITY_ID";
/// SAML metadata URL.
pub const SAML_METADATA_URL: &str = "SAML_METADATA_URL";
/// SAML single sign-on redirect URL.
pub const SAML_SINGLE_SIGN_ON_REDIRECT_URL: &str = "SAML_SINGLE_SIGN_ON_REDIRECT_URL";
/// SAML signing certificate.
pub const SAML_SIGNING_CERTIFICATE: &str = "SAML_SIGNING_CERTIFICATE";

/// A generic `NAME=VALUE` pair from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    /// Variable name.
    pub name: String,
    /// Variable value.
    pub value: String,
}

/// Settings for known external dependencies.
///
/// Only `postgresql_url` is filled by the loader today. The rest are declared
/// so handlers and checks can be wired up without changing the shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Integrations {
    /// MongoDB connection string.
    pub mongodb_url: Option<String>,
    /// PostgreSQL connection string.
    pub postgresql_url: Option<String>,
    /// Redis connection string.
    pub redis_url: Option<String>,
    /// MySQL connection string.
    pub mysql_url: Option<String>,
    /// S3 object store settings.
    pub s3: Option<S3Config>,
}

/// S3 object store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Config {
    /// Access key.
    pub access_key: String,
    /// Secret key.
    pub secret_key: String,
    /// Bucket name.
    pub bucket: String,
    /// Region.
    pub region: Option<String>,
    /// Storage class.
    pub storage_class: Option<String>,
    /// Endpoint URL.
    pub endpoint: Option<String>,
    /// Path prefix inside the bucket.
    pub path: Option<String>,
    /// API version.
    pub api_version: Option<String>,
    /// URI style.
    pub uri_style: Option<String>,
    /// Addressing style.
    pub addressing_style: Option<String>,
    /// Extra attributes, serialized.
    pub attributes: Option<String>,
    /// TLS CA chain, serialized.
    pub tls_ca_chain: Option<String>,
}

/// SAML identity provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlConfig {
    /// Entity id.
    pub entity_id: String,
    /// Metadata URL.
    pub metadata_url: String,
    /// Signing certificate.
    pub signing_certificate: String,
    /// Single sign-on redirect URL.
    pub single_sign_on_redirect_url: String,
}

/// Configuration built from the process environment.
///
/// Built once at startup and shared read-only with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmConfig {
    /// Every variable not claimed by an integration, sorted by name.
    pub configs: Vec<ConfigEntry>,
    /// Known integration settings.
    pub integrations: Integrations,
}

impl CharmConfig {
    /// Build from raw `NAME=VALUE` strings.
    ///
    /// Each entry is split on its first `=`. Entries without one are skipped,
    /// and a name seen twice keeps its last value.
    pub fn from_environ<I, S>(environ: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_vars(environ.into_iter().filter_map(|entry| {
            entry
                .as_ref()
                .split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
        }))
    }

    /// Build from the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process_env() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }))
    }

    fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: BTreeMap<String, String> = vars.into_iter().collect();

        let integrations = Integrations {
            postgresql_url: vars.remove(POSTGRESQL_DB_CONNECT_STRING),
            ..Integrations::default()
        };

        let configs = vars
            .into_iter()
            .map(|(name, value)| ConfigEntry { name, value })
            .collect();

        Self {
            configs,
            integrations,
        }
    }

    /// Look up a generic config value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.configs
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }
}

/// Typed process settings loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port of the Prometheus exporter.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Seconds to wait for in-flight requests on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Directory served by the static file server.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_port() -> u16 {
    8080
}

fn default_metrics_port() -> u16 {
    8081
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout() -> u64 {
    10
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            static_dir: default_static_dir(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Load configuration from explicit `(name, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.port == 0 {
            return Err(AppError::InvalidConfig("PORT must not be 0".to_string()));
        }

        if self.metrics_port == 0 {
            return Err(AppError::InvalidConfig(
                "METRICS_PORT must not be 0".to_string(),
            ));
        }

        if self.port == self.metrics_port {
            return Err(AppError::InvalidConfig(format!(
                "PORT and METRICS_PORT must differ (both {})",
                self.port
            )));
        }

        if self.shutdown_timeout_secs == 0 {
            return Err(AppError::InvalidConfig(
                "SHUTDOWN_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Graceful shutdown deadline.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
