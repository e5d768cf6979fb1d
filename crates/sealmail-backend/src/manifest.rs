//! TOML identity manifests.
//!
//! ```toml
//! [[identity]]
//! certificate = "certs/alice.pem"
//! key = "keys/alice.pem"
//!
//! [[identity]]
//! address = "team@example.com"
//! certificate = "certs/bob.pem"
//! not_after = "2030-01-01"
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sealmail_core::{Certificate, Identity, PrivateKey, Result, SealError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::MemoryIdentityStore;

/// A list of identities backed by PEM files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityManifest {
    /// Entries, in file order
    #[serde(rename = "identity", default)]
    pub identities: Vec<ManifestEntry>,

    #[serde(skip)]
    base: PathBuf,
}

/// One `[[identity]]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// PEM certificate path
    pub certificate: PathBuf,

    /// PEM private key path; present only for sender identities
    #[serde(default)]
    pub key: Option<PathBuf>,

    /// Bound address (default: first address in the certificate)
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub not_before: Option<NaiveDate>,

    #[serde(default)]
    pub not_after: Option<NaiveDate>,

    /// Use the certificate's validity period as the window
    #[serde(default)]
    pub certificate_dates: bool,
}

impl IdentityManifest {
    /// Read a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut manifest: Self =
            toml::from_str(&content).map_err(|e| SealError::Config(e.to_string()))?;
        manifest.base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(manifest)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// True when the manifest lists nothing.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Load every certificate and key, producing identities.
    pub fn into_identities(self) -> Result<Vec<Identity>> {
        let base = self.base;
        self.identities
            .into_iter()
            .map(|entry| entry.load(&base))
            .collect()
    }

    /// Load every entry into a fresh [`MemoryIdentityStore`].
    pub fn into_store(self) -> Result<MemoryIdentityStore> {
        let identities = self.into_identities()?;
        debug!(count = identities.len(), "loaded identity manifest");
        Ok(identities.into_iter().collect())
    }
}

impl ManifestEntry {
    fn load(self, base: &Path) -> Result<Identity> {
        let certificate = Certificate::from_pem(std::fs::read(base.join(&self.certificate))?)?;

        let mut identity = match self.address.as_deref() {
            Some(address) => Identity::for_address(address, certificate)?,
            None => Identity::new(certificate)?,
        };
        if let Some(key) = &self.key {
            identity = identity.with_key(PrivateKey::from_pem(std::fs::read(base.join(key))?)?);
        }
        if self.certificate_dates {
            identity = identity.with_certificate_window();
        }
        if self.not_before.is_some() || self.not_after.is_some() {
            let not_before = self.not_before.or_else(|| identity.not_before());
            let not_after = self.not_after.or_else(|| identity.not_after());
            identity = identity.with_window(not_before, not_after);
        }
        Ok(identity)
    }
}
