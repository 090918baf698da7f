//! Configuration system for the `SecureChat` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/securechat/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::crypto::fernet::DEFAULT_KDF_ITERATIONS;
use crate::session::{SessionContext, parse_encryption_flag};
use crate::sync::poll::DEFAULT_POLL_INTERVAL;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The server URL is not a valid absolute URL.
    #[error("invalid server URL {url:?}: {source}")]
    InvalidServerUrl {
        /// The rejected value.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerFileConfig,
    session: SessionFileConfig,
    sync: SyncFileConfig,
    ui: UiFileConfig,
}

/// `[server]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerFileConfig {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    username: Option<String>,
    encryption_key: Option<String>,
    encryption_enabled: Option<bool>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    poll_interval_ms: Option<u64>,
    kdf_iterations: Option<u32>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Default server address (the chat server's development default).
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/";

/// Fully resolved client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    // -- Server --
    /// Base URL of the chat server.
    pub server_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,

    // -- Session --
    /// Username sent with each message.
    pub username: Option<String>,
    /// Shared session password used to derive the message cipher.
    pub encryption_key: Option<String>,
    /// Whether outgoing messages are encrypted.
    pub encryption_enabled: bool,

    // -- Sync --
    /// Period between message refreshes.
    pub poll_interval: Duration,
    /// PBKDF2 iterations used to derive the cipher from the key.
    pub kdf_iterations: u32,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            username: None,
            encryption_key: None,
            encryption_enabled: false,
            poll_interval: DEFAULT_POLL_INTERVAL,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            poll_timeout: Duration::from_millis(50),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("request_timeout", &self.request_timeout)
            .field("username", &self.username)
            .field(
                "encryption_key",
                &self.encryption_key.as_ref().map(|_| "<redacted>"),
            )
            .field("encryption_enabled", &self.encryption_enabled)
            .field("poll_interval", &self.poll_interval)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("poll_timeout", &self.poll_timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/securechat/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve from CLI args and env alone, as if the config file were empty.
    ///
    /// Used when the file fails to load so CLI and env values still apply.
    #[must_use]
    pub fn from_cli(cli: &CliArgs) -> Self {
        Self::resolve(cli, &ConfigFile::default())
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            server_url: cli
                .server_url
                .clone()
                .or_else(|| file.server.url.clone())
                .unwrap_or(defaults.server_url),
            request_timeout: file
                .server
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            username: cli
                .username
                .clone()
                .or_else(|| file.session.username.clone()),
            encryption_key: cli
                .encryption_key
                .clone()
                .or_else(|| file.session.encryption_key.clone()),
            encryption_enabled: cli
                .encryption_enabled
                .as_deref()
                .map(parse_encryption_flag)
                .or(file.session.encryption_enabled)
                .unwrap_or(defaults.encryption_enabled),
            poll_interval: file
                .sync
                .poll_interval_ms
                .map_or(defaults.poll_interval, Duration::from_millis),
            kdf_iterations: file
                .sync
                .kdf_iterations
                .unwrap_or(defaults.kdf_iterations),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
        }
    }

    /// Parse the configured server URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidServerUrl`] if the value is not an
    /// absolute URL.
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.server_url).map_err(|source| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            source,
        })
    }

    /// Build the session context described by this configuration.
    #[must_use]
    pub fn to_session(&self) -> SessionContext {
        SessionContext::new(
            self.username.clone(),
            self.encryption_key.clone(),
            self.encryption_enabled,
        )
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal client for the SecureChat server")]
pub struct CliArgs {
    /// Base URL of the chat server.
    #[arg(long, env = "SECURECHAT_SERVER_URL")]
    pub server_url: Option<String>,

    /// Username to post messages as.
    #[arg(long, env = "SECURECHAT_USERNAME")]
    pub username: Option<String>,

    /// Session encryption key (shared password).
    #[arg(long, env = "SECURECHAT_ENCRYPTION_KEY", hide_env_values = true)]
    pub encryption_key: Option<String>,

    /// Encrypt outgoing messages. Only the exact value `True` enables it.
    #[arg(long, env = "SECURECHAT_ENCRYPTION_ENABLED")]
    pub encryption_enabled: Option<String>,

    /// Path to config file (default: `~/.config/securechat/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "SECURECHAT_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/securechat.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("securechat").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
