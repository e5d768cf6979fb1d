//! Delivery policy, read by the backend at the start of every call.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SealError};

/// Symmetric cipher used for the content-encryption key of an envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCipher {
    /// AES-128 in CBC mode
    Aes128Cbc,
    /// AES-192 in CBC mode
    Aes192Cbc,
    /// AES-256 in CBC mode
    #[default]
    Aes256Cbc,
    /// Triple DES, for legacy receivers only
    DesEde3Cbc,
}

impl ContentCipher {
    /// Configuration name, as written in TOML.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes128Cbc => "aes128-cbc",
            Self::Aes192Cbc => "aes192-cbc",
            Self::Aes256Cbc => "aes256-cbc",
            Self::DesEde3Cbc => "des-ede3-cbc",
        }
    }
}

impl std::fmt::Display for ContentCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fallback and validation policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Send an unencrypted copy to recipients without a usable identity.
    #[serde(default)]
    pub plaintext_fallback: bool,

    /// Enforce identity validity windows against today's date.
    #[serde(default)]
    pub validate_dates: bool,

    /// Content-encryption cipher (default: aes256-cbc).
    #[serde(default)]
    pub cipher: ContentCipher,
}

impl Policy {
    /// Load policy from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| SealError::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Enable or disable the plaintext fallback.
    #[must_use]
    pub const fn with_plaintext_fallback(mut self, enabled: bool) -> Self {
        self.plaintext_fallback = enabled;
        self
    }

    /// Enable or disable validity-window checks.
    #[must_use]
    pub const fn with_validate_dates(mut self, enabled: bool) -> Self {
        self.validate_dates = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_policy() {
        let policy = Policy::default();
        assert!(!policy.plaintext_fallback);
        assert!(!policy.validate_dates);
        assert_eq!(policy.cipher, ContentCipher::Aes256Cbc);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let policy = Policy::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "plaintext_fallback = true\ncipher = \"des-ede3-cbc\"").unwrap();

        let policy = Policy::load(file.path()).unwrap();
        assert!(policy.plaintext_fallback);
        assert!(!policy.validate_dates);
        assert_eq!(policy.cipher, ContentCipher::DesEde3Cbc);
    }

    #[test]
    fn test_unknown_cipher_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cipher = \"rc2-40\"").unwrap();
        assert!(matches!(
            Policy::load(file.path()),
            Err(SealError::Config(_))
        ));
    }

    #[test]
    fn test_policy_serialization() {
        let policy = Policy::default().with_validate_dates(true);
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"cipher\":\"aes256-cbc\""));
        let parsed: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, policy);
    }
}
