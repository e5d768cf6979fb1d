//! X.509 certificate values.

use chrono::{DateTime, TimeZone, Utc};
use x509_parser::extensions::{GeneralName, SubjectAlternativeName};

use crate::address::canonical_address;
use crate::error::{Result, SealError};
use crate::hash::sha1_fingerprint;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// A parsed X.509 certificate.
///
/// The DER encoding is the canonical value; subject, email addresses and
/// validity are extracted once at parse time. The fingerprint is always
/// recomputed from the DER bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    emails: Vec<String>,
    not_before: DateTime<Utc>,
    not_after: DateTime<Utc>,
}

impl Certificate {
    /// Parse a PEM document containing exactly one `CERTIFICATE` block.
    ///
    /// Blocks with other tags (keys, parameters) are ignored.
    pub fn from_pem(input: impl AsRef<[u8]>) -> Result<Self> {
        let blocks = pem::parse_many(input.as_ref())
            .map_err(|e| SealError::Certificate(format!("PEM decode failed: {e}")))?;

        let mut certs = blocks.into_iter().filter(|p| p.tag() == CERTIFICATE_TAG);
        let first = certs
            .next()
            .ok_or_else(|| SealError::Certificate("no CERTIFICATE block found".into()))?;
        if certs.next().is_some() {
            return Err(SealError::Certificate(
                "expected a single certificate, found a bundle".into(),
            ));
        }

        Self::from_der(first.into_contents())
    }

    /// Parse a DER-encoded certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let (subject, emails, not_before, not_after) = {
            let (_, cert) = x509_parser::parse_x509_certificate(&der)
                .map_err(|e| SealError::Certificate(e.to_string()))?;

            let mut emails = Vec::new();
            let subject_emails = cert.subject().iter_email().filter_map(|a| a.as_str().ok());
            let san_emails = cert
                .subject_alternative_name()
                .ok()
                .flatten()
                .into_iter()
                .flat_map(|ext| {
                    let san: &SubjectAlternativeName<'_> = ext.value;
                    san.general_names.iter()
                })
                .filter_map(|name| match name {
                    GeneralName::RFC822Name(addr) => Some(*addr),
                    _ => None,
                });
            for raw in subject_emails.chain(san_emails) {
                if let Ok(addr) = canonical_address(raw) {
                    if !emails.contains(&addr) {
                        emails.push(addr);
                    }
                }
            }

            (
                cert.subject().to_string(),
                emails,
                asn1_to_utc(cert.validity().not_before)?,
                asn1_to_utc(cert.validity().not_after)?,
            )
        };

        Ok(Self {
            der,
            subject,
            emails,
            not_before,
            not_after,
        })
    }

    /// DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM encoding (`-----BEGIN CERTIFICATE-----`).
    #[must_use]
    pub fn to_pem(&self) -> String {
        pem::encode(&pem::Pem::new(CERTIFICATE_TAG, self.der.clone()))
    }

    /// SHA-1 fingerprint of the DER encoding, colon-separated uppercase hex.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        sha1_fingerprint(&self.der)
    }

    /// Subject distinguished name (human-readable).
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Canonical email addresses bound to the certificate, subject first,
    /// then `rfc822Name` subject alternative names.
    pub fn email_addresses(&self) -> &[String] {
        &self.emails
    }

    /// The certificate's own validity period (`notBefore`, `notAfter`).
    pub const fn validity(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.not_before, self.not_after)
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}

/// Convert an ASN.1 `GeneralizedTime` / `UTCTime` to `DateTime<Utc>`.
fn asn1_to_utc(t: x509_parser::time::ASN1Time) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(t.timestamp(), 0)
        .single()
        .ok_or_else(|| SealError::Certificate("validity timestamp out of range".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use chrono::Datelike;

    #[test]
    fn test_fingerprint_matches_openssl() {
        let cert = Certificate::from_pem(RECIPIENT1_CERT).unwrap();
        assert_eq!(cert.fingerprint(), RECIPIENT1_FINGERPRINT);
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let cert = Certificate::from_pem(RECIPIENT2_CERT).unwrap();
        assert_eq!(cert.fingerprint(), cert.fingerprint());
        let reparsed = Certificate::from_der(cert.der().to_vec()).unwrap();
        assert_eq!(reparsed.fingerprint(), cert.fingerprint());
    }

    #[test]
    fn test_email_addresses_deduplicated() {
        let cert = Certificate::from_pem(RECIPIENT1_CERT).unwrap();
        // Present in both the subject and the SAN; reported once.
        assert_eq!(cert.email_addresses(), ["recipient1@example.com"]);
        assert!(cert.subject().contains("recipient1"));
    }

    #[test]
    fn test_validity_period() {
        let cert = Certificate::from_pem(RECIPIENT1_CERT).unwrap();
        let (not_before, not_after) = cert.validity();
        assert_eq!(not_before.year(), 2020);
        assert_eq!(not_after.year(), 2120);
    }

    #[test]
    fn test_pem_round_trip() {
        let cert = Certificate::from_pem(RECIPIENT1_CERT).unwrap();
        let again = Certificate::from_pem(cert.to_pem()).unwrap();
        assert_eq!(again, cert);
    }

    #[test]
    fn test_rejects_key_only_and_bundles() {
        let err = Certificate::from_pem(RECIPIENT1_KEY).unwrap_err();
        assert!(matches!(err, SealError::Certificate(_)));

        let bundle = format!("{RECIPIENT1_CERT}{RECIPIENT2_CERT}");
        assert!(Certificate::from_pem(bundle).is_err());

        assert!(Certificate::from_der(b"not a certificate".to_vec()).is_err());
    }

    #[test]
    fn test_ignores_non_certificate_blocks() {
        let combined = format!("{RECIPIENT1_KEY}{RECIPIENT1_CERT}");
        let cert = Certificate::from_pem(combined).unwrap();
        assert_eq!(cert.email_addresses(), ["recipient1@example.com"]);
    }
}
