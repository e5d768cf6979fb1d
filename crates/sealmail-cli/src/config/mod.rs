//! Configuration management.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use sealmail::Policy;
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Delivery policy.
    #[serde(default)]
    pub policy: Policy,

    /// Identity manifest (default: `identities.toml` next to the config file).
    #[serde(default)]
    pub identities: Option<PathBuf>,

    /// Where `send` hands messages.
    #[serde(default)]
    pub transport: TransportConfig,
}

/// Outbound transport for `send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Write each message as an `.eml` file.
    File {
        /// Target directory, created on first send
        dir: PathBuf,
    },
    /// Submit to an SMTP relay over TLS.
    Smtp {
        host: String,
        #[serde(default)]
        port: Option<u16>,
        /// STARTTLS on the submission port instead of implicit TLS
        #[serde(default = "default_true")]
        starttls: bool,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::File {
            dir: PathBuf::from("outbox"),
        }
    }
}

const fn default_true() -> bool {
    true
}

impl Config {
    fn dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("org", "sealmail", "sealmail")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::dirs()?.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

        Ok(config)
    }

    /// Identity manifest location.
    pub fn identities_path(&self) -> Result<PathBuf> {
        match &self.identities {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::dirs()?.config_dir().join("identities.toml")),
        }
    }
}
