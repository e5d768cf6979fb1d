//! Receiver side: decrypt with one key, then verify the inner signature.

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::X509;
use sealmail_core::{sha1_fingerprint, Certificate, PrivateKey, Result};
use tracing::debug;

use crate::convert;
use crate::error::CryptoError;

/// Plaintext recovered from an [`crate::Envelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMessage {
    /// Signed MIME entity, CRLF line endings
    pub content: Vec<u8>,
    /// Fingerprints of the certificates that produced the signature
    pub signer_fingerprints: Vec<String>,
}

/// Decrypt an `EnvelopedData` structure with `key` and verify the detached
/// signature it carries against `trusted_senders`.
///
/// Each trusted sender certificate acts as its own trust anchor.
///
/// # Errors
///
/// `SealError::Key` if `key` does not match `certificate`; `SealError::Crypto`
/// if decryption fails (for instance, the envelope was not addressed to this
/// certificate), the payload is not a detached signature, or the signature
/// does not verify.
pub fn open_envelope(
    der: &[u8],
    certificate: &Certificate,
    key: &PrivateKey,
    trusted_senders: &[Certificate],
) -> Result<OpenedMessage> {
    Ok(open(der, certificate, key, trusted_senders)?)
}

/// Like [`open_envelope`], for an S/MIME entity or a whole message whose
/// body is `application/pkcs7-mime`.
pub fn open_smime(
    input: &[u8],
    certificate: &Certificate,
    key: &PrivateKey,
    trusted_senders: &[Certificate],
) -> Result<OpenedMessage> {
    let (enveloped, _) = Pkcs7::from_smime(input).map_err(CryptoError::from)?;
    let der = enveloped.to_der().map_err(CryptoError::from)?;
    open_envelope(&der, certificate, key, trusted_senders)
}

fn open(
    der: &[u8],
    certificate: &Certificate,
    key: &PrivateKey,
    trusted_senders: &[Certificate],
) -> std::result::Result<OpenedMessage, CryptoError> {
    let (cert, pkey) = convert::key_pair(certificate, key)?;

    let enveloped = Pkcs7::from_der(der)?;
    let decrypted = enveloped.decrypt(&pkey, &cert, Pkcs7Flags::empty())?;

    let (signed, detached) = Pkcs7::from_smime(&decrypted)?;
    let detached = detached
        .ok_or_else(|| CryptoError::Malformed("expected a detached multipart/signed".into()))?;

    let mut certs = Stack::<X509>::new()?;
    let mut store = X509StoreBuilder::new()?;
    for trusted in trusted_senders {
        let x509 = convert::x509(trusted)?;
        store.add_cert(x509.clone())?;
        certs.push(x509)?;
    }
    let store = store.build();

    let mut content = Vec::new();
    signed
        .verify(
            &certs,
            &store,
            Some(detached.as_slice()),
            Some(&mut content),
            Pkcs7Flags::empty(),
        )
        .map_err(CryptoError::Verification)?;

    let signer_fingerprints = signed
        .signers(&certs, Pkcs7Flags::empty())?
        .iter()
        .map(|signer| signer.to_der().map(|der| sha1_fingerprint(&der)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    debug!(
        recipient = %certificate.fingerprint(),
        signers = signer_fingerprints.len(),
        "opened envelope"
    );

    Ok(OpenedMessage {
        content,
        signer_fingerprints,
    })
}
