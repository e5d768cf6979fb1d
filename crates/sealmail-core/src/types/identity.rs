//! Identities: a certificate bound to an address.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::certificate::Certificate;
use super::key::{KeyFormat, PrivateKey};
use crate::address::canonical_address;
use crate::error::{Result, SealError};

/// A certificate (plus optional private key and validity window) bound to an
/// email address.
///
/// Several identities may share an address: a list address is served by one
/// identity per subscriber certificate. An identity is sender-capable iff it
/// carries a private key; every identity is a valid encryption target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    address: String,
    certificate: Certificate,
    key: Option<PrivateKey>,
    not_before: Option<NaiveDate>,
    not_after: Option<NaiveDate>,
}

impl Identity {
    /// Bind a certificate to the first email address it names.
    ///
    /// # Errors
    ///
    /// Returns `SealError::InvalidInput` if the certificate names no address.
    pub fn new(certificate: Certificate) -> Result<Self> {
        let address = certificate
            .email_addresses()
            .first()
            .cloned()
            .ok_or_else(|| {
                SealError::InvalidInput(format!(
                    "certificate {} names no email address; bind it explicitly",
                    certificate.subject()
                ))
            })?;
        Ok(Self::bound(address, certificate))
    }

    /// Bind a certificate to an explicit address (e.g. a list address).
    pub fn for_address(address: &str, certificate: Certificate) -> Result<Self> {
        Ok(Self::bound(canonical_address(address)?, certificate))
    }

    fn bound(address: String, certificate: Certificate) -> Self {
        Self {
            address,
            certificate,
            key: None,
            not_before: None,
            not_after: None,
        }
    }

    /// Attach the private key, making the identity sender-capable.
    #[must_use]
    pub fn with_key(mut self, key: PrivateKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Set an explicit validity window. `None` leaves that side unbounded.
    #[must_use]
    pub fn with_window(
        mut self,
        not_before: Option<NaiveDate>,
        not_after: Option<NaiveDate>,
    ) -> Self {
        self.not_before = not_before;
        self.not_after = not_after;
        self
    }

    /// Use the certificate's own validity period as the window.
    #[must_use]
    pub fn with_certificate_window(self) -> Self {
        let (not_before, not_after) = self.certificate.validity();
        self.with_window(Some(not_before.date_naive()), Some(not_after.date_naive()))
    }

    /// Canonical address this identity is bound to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Certificate.
    pub const fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Private key, present only on sender-capable identities.
    pub const fn key(&self) -> Option<&PrivateKey> {
        self.key.as_ref()
    }

    /// Start of the validity window, if bounded.
    pub const fn not_before(&self) -> Option<NaiveDate> {
        self.not_before
    }

    /// End of the validity window, if bounded.
    pub const fn not_after(&self) -> Option<NaiveDate> {
        self.not_after
    }

    /// True iff a private key is present.
    pub const fn is_sender_capable(&self) -> bool {
        self.key.is_some()
    }

    /// SHA-1 fingerprint of the certificate.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        self.certificate.fingerprint()
    }

    /// Serializable description, free of key material.
    #[must_use]
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            address: self.address.clone(),
            fingerprint: self.fingerprint(),
            subject: self.certificate.subject().to_string(),
            sender_capable: self.is_sender_capable(),
            key_format: self.key.as_ref().map(PrivateKey::format),
            not_before: self.not_before,
            not_after: self.not_after,
        }
    }
}

/// Key-free view of an [`Identity`] for listings and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySummary {
    /// Bound address
    pub address: String,
    /// Certificate fingerprint
    pub fingerprint: String,
    /// Certificate subject
    pub subject: String,
    /// Whether the identity can sign
    pub sender_capable: bool,
    /// Key encoding, when a key is present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_format: Option<KeyFormat>,
    /// Window start
    #[serde(default)]
    pub not_before: Option<NaiveDate>,
    /// Window end
    #[serde(default)]
    pub not_after: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cert1, key1};

    #[test]
    fn address_derived_from_certificate() {
        let identity = Identity::new(cert1()).unwrap();
        assert_eq!(identity.address(), "recipient1@example.com");
        assert!(!identity.is_sender_capable());
        assert_eq!(identity.not_before(), None);
        assert_eq!(identity.not_after(), None);
    }

    #[test]
    fn explicit_address_is_canonicalized() {
        let identity = Identity::for_address("Team <List@Example.com>", cert1()).unwrap();
        assert_eq!(identity.address(), "list@example.com");
        assert!(Identity::for_address("", cert1())
            .unwrap_err()
            .is_input_error());
    }

    #[test]
    fn key_makes_identity_sender_capable() {
        let key = key1();
        let identity = Identity::new(cert1()).unwrap().with_key(key);
        assert!(identity.is_sender_capable());
        assert_eq!(identity.summary().key_format, Some(KeyFormat::Pkcs8));
    }

    #[test]
    fn certificate_window_copies_validity_dates() {
        let identity = Identity::new(cert1()).unwrap().with_certificate_window();
        assert_eq!(identity.not_before(), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(identity.not_after(), NaiveDate::from_ymd_opt(2120, 1, 1));
    }

    #[test]
    fn fingerprint_follows_certificate() {
        let a = Identity::new(cert1()).unwrap();
        let b = Identity::for_address("list@example.com", cert1()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a, b);
    }

    #[test]
    fn summary_serializes_without_key_material() {
        let key = key1();
        let identity = Identity::new(cert1()).unwrap().with_key(key);
        let json = serde_json::to_string(&identity.summary()).unwrap();
        assert!(json.contains("\"sender_capable\":true"));
        assert!(json.contains("\"key_format\":\"pkcs8\""));
        assert!(!json.contains("BEGIN"));
    }
}
