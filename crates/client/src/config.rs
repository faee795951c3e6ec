use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, str::FromStr};

use common::prelude::{CounterpartyKey, KeyWrapError};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::Endpoints;

pub const APP_NAME: &str = "cib";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Which counterparty deployment to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    #[default]
    Sandbox,
    Live,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "Sandbox"),
            Environment::Live => write!(f, "Live"),
        }
    }
}

impl Environment {
    /// Name of the environment's profile table in `config.toml`
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" => Ok(Environment::Live),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// How long one session key lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKeyPolicy {
    /// One key for the lifetime of the client, wrapped into every request
    #[default]
    PerClient,
    /// A fresh key (and envelope) for every request
    PerRequest,
}

/// Client secret; kept out of `Debug` output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(..)")
    }
}

impl From<&str> for ClientSecret {
    fn from(value: &str) -> Self {
        ClientSecret(value.to_string())
    }
}

impl ClientSecret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Credentials and trust material for one environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentProfile {
    /// Value of the `X-IBM-Client-Id` header
    pub client_id: String,
    /// Value of the `X-IBM-Client-Secret` header
    pub client_secret: ClientSecret,
    /// The counterparty's RSA public key or certificate (PEM or DER)
    pub public_key_path: PathBuf,
    /// CA bundle the server certificate must chain to.
    ///  if not set then the built-in web PKI roots are used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<PathBuf>,
    /// Replaces the environment's API base URL (gateway or test server)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Url>,
}

/// On-disk client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Environment used when none is given explicitly
    #[serde(default)]
    pub environment: Environment,
    /// Upper bound on one request/response exchange
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub session_key_policy: SessionKeyPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<EnvironmentProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live: Option<EnvironmentProfile>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            timeout_secs: default_timeout_secs(),
            session_key_policy: SessionKeyPolicy::default(),
            sandbox: None,
            live: None,
        }
    }
}

/// Configuration resolved for exactly one environment
///
/// Built once by [`ClientConfig::bind`]; nothing in it changes afterwards.
#[derive(Debug, Clone)]
pub struct BoundConfig {
    pub environment: Environment,
    pub endpoints: Endpoints,
    pub client_id: String,
    pub client_secret: ClientSecret,
    pub counterparty_key: CounterpartyKey,
    /// PEM bytes of the pinned CA bundle
    pub ca_bundle: Option<Vec<u8>>,
    pub timeout: Duration,
    pub session_key_policy: SessionKeyPolicy,
}

impl ClientConfig {
    /// Default config directory (`~/.cib`) unless a custom one is given
    pub fn config_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Write `self` as `config.toml` in a new config directory
    pub fn init(&self, custom_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let config_dir = Self::config_dir(custom_path)?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Err(ConfigError::AlreadyInitialized(config_path));
        }

        fs::create_dir_all(&config_dir)?;
        fs::write(&config_path, toml::to_string_pretty(self)?)?;
        Ok(config_path)
    }

    /// Load `config.toml` from the config directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config_path = Self::config_dir(custom_path)?.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(ConfigError::NotInitialized(config_path));
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_toml = fs::read_to_string(path)?;
        Ok(toml::from_str(&config_toml)?)
    }

    pub fn profile(&self, environment: Environment) -> Option<&EnvironmentProfile> {
        match environment {
            Environment::Sandbox => self.sandbox.as_ref(),
            Environment::Live => self.live.as_ref(),
        }
    }

    /// Validate and resolve the configuration for one environment
    ///
    /// `environment` overrides the file's default. Key material and the CA
    /// bundle are read here, so a bound config never touches the filesystem
    /// again.
    pub fn bind(&self, environment: Option<Environment>) -> Result<BoundConfig, ConfigError> {
        let environment = environment.unwrap_or(self.environment);
        let profile = self
            .profile(environment)
            .ok_or(ConfigError::MissingProfile(environment))?;

        if profile.client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("client_id", environment));
        }
        if profile.client_secret.expose().trim().is_empty() {
            return Err(ConfigError::MissingCredential("client_secret", environment));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let counterparty_key = CounterpartyKey::from_file(&profile.public_key_path)?;

        let ca_bundle = match &profile.ca_cert_path {
            Some(path) => Some(fs::read(path).map_err(|source| ConfigError::CaBundle {
                path: path.clone(),
                source,
            })?),
            None => None,
        };

        let endpoints = match &profile.base_url {
            Some(base) => Endpoints::with_base(base.clone())
                .ok_or_else(|| ConfigError::InvalidBaseUrl(base.clone()))?,
            None => Endpoints::for_environment(environment),
        };

        Ok(BoundConfig {
            environment,
            endpoints,
            client_id: profile.client_id.clone(),
            client_secret: profile.client_secret.clone(),
            counterparty_key,
            ca_bundle,
            timeout: Duration::from_secs(self.timeout_secs),
            session_key_policy: self.session_key_policy,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found at {0}. Run 'cib init' first")]
    NotInitialized(PathBuf),

    #[error("config already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("unknown environment `{0}` (expected sandbox or live)")]
    UnknownEnvironment(String),

    #[error("no [{}] profile in config", .0.as_str())]
    MissingProfile(Environment),

    #[error("{0} is empty in the {1} profile")]
    MissingCredential(&'static str, Environment),

    #[error("timeout_secs must be greater than zero")]
    InvalidTimeout,

    #[error("base_url `{0}` cannot be used as an API base")]
    InvalidBaseUrl(Url),

    #[error("counterparty key: {0}")]
    CounterpartyKey(#[from] KeyWrapError),

    #[error("failed to read CA bundle {}: {source}", .path.display())]
    CaBundle {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
