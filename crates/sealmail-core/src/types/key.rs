//! Private key material.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{Result, SealError};

/// Encoding of the DER bytes held by a [`PrivateKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyFormat {
    /// `PRIVATE KEY`: unencrypted PKCS#8 `PrivateKeyInfo`
    Pkcs8,
    /// `RSA PRIVATE KEY`: PKCS#1 `RSAPrivateKey`
    Pkcs1,
    /// `EC PRIVATE KEY`: SEC1 `ECPrivateKey`
    Sec1,
}

impl KeyFormat {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "PRIVATE KEY" => Some(Self::Pkcs8),
            "RSA PRIVATE KEY" => Some(Self::Pkcs1),
            "EC PRIVATE KEY" => Some(Self::Sec1),
            _ => None,
        }
    }
}

/// A signing key. The DER bytes are zeroized on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    der: Zeroizing<Vec<u8>>,
    format: KeyFormat,
}

impl PrivateKey {
    /// Parse the first private key block of a PEM document.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Key` if the PEM is malformed, holds no key, or the
    /// key is passphrase-protected (`ENCRYPTED PRIVATE KEY`).
    pub fn from_pem(input: impl AsRef<[u8]>) -> Result<Self> {
        let blocks = pem::parse_many(input.as_ref())
            .map_err(|e| SealError::Key(format!("PEM decode failed: {e}")))?;

        if blocks.iter().any(|p| p.tag() == "ENCRYPTED PRIVATE KEY") {
            return Err(SealError::Key(
                "passphrase-protected keys are not supported".into(),
            ));
        }

        blocks
            .into_iter()
            .find_map(|p| KeyFormat::from_tag(p.tag()).map(|format| (format, p)))
            .map(|(format, p)| Self {
                der: Zeroizing::new(p.into_contents()),
                format,
            })
            .ok_or_else(|| SealError::Key("no private key block found".into()))
    }

    /// Wrap DER bytes of a known format.
    #[must_use]
    pub fn from_der(der: Vec<u8>, format: KeyFormat) -> Self {
        Self {
            der: Zeroizing::new(der),
            format,
        }
    }

    /// DER bytes of the key.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Encoding of [`Self::der`].
    pub const fn format(&self) -> KeyFormat {
        self.format
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("format", &self.format)
            .field("der", &"<redacted>")
            .finish()
    }
}
