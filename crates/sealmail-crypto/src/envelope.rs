//! Sign-then-encrypt envelope construction.

use std::collections::BTreeSet;

use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::stack::Stack;
use openssl::x509::X509;
use sealmail_core::{ContentCipher, Identity, Result, SealError};
use tracing::debug;

use crate::convert;
use crate::error::CryptoError;

/// An S/MIME `EnvelopedData` structure holding a detached `SignedData`.
///
/// The payload is encrypted once under a random content key; the key is
/// wrapped once per distinct recipient certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    der: Vec<u8>,
    recipients: Vec<String>,
    cipher: ContentCipher,
}

impl Envelope {
    /// DER encoding of the `EnvelopedData` content info.
    pub fn to_der(&self) -> &[u8] {
        &self.der
    }

    /// Standalone `application/pkcs7-mime; smime-type=enveloped-data` entity,
    /// headers included.
    pub fn to_smime(&self) -> Result<Vec<u8>> {
        let pkcs7 = Pkcs7::from_der(&self.der).map_err(CryptoError::from)?;
        Ok(pkcs7
            .to_smime(&[], Pkcs7Flags::NOOLDMIMETYPE)
            .map_err(CryptoError::from)?)
    }

    /// Number of recipient-info entries.
    pub fn recipient_count(&self) -> usize {
        self.recipients.len()
    }

    /// Fingerprints of the certificates the content key was wrapped for.
    pub fn recipient_fingerprints(&self) -> &[String] {
        &self.recipients
    }

    /// Cipher protecting the content.
    pub const fn cipher(&self) -> ContentCipher {
        self.cipher
    }
}

/// Builds signed-and-encrypted envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeBuilder {
    cipher: ContentCipher,
}

impl EnvelopeBuilder {
    /// Create a builder using `cipher` for the content.
    pub const fn new(cipher: ContentCipher) -> Self {
        Self { cipher }
    }

    /// Sign `content` as `sender`, then encrypt the signed entity for every
    /// identity in `recipients` in a single pass.
    ///
    /// `content` is a MIME entity; bare `\n` line endings are canonicalized
    /// to `\r\n` before signing. Identities sharing a certificate get a
    /// single recipient-info entry.
    ///
    /// # Errors
    ///
    /// `SealError::InvalidInput` if `sender` has no key, `content` is empty or
    /// `recipients` is empty; `SealError::Key` if the sender key does not match
    /// its certificate; `SealError::Crypto` if OpenSSL fails.
    pub fn build(
        &self,
        sender: &Identity,
        content: &[u8],
        recipients: &[Identity],
    ) -> Result<Envelope> {
        let key = sender.key().ok_or_else(|| {
            SealError::InvalidInput(format!(
                "sender identity {} has no private key",
                sender.address()
            ))
        })?;
        if content.is_empty() {
            return Err(SealError::InvalidInput("content must not be empty".into()));
        }
        if recipients.is_empty() {
            return Err(SealError::InvalidInput(
                "at least one encrypting identity is required".into(),
            ));
        }

        let (signer_cert, signer_key) = convert::key_pair(sender.certificate(), key)?;
        let content = convert::canonical_crlf(content);

        let signed = sign(&signer_cert, &signer_key, &content)?;

        let mut seen = BTreeSet::new();
        let mut fingerprints = Vec::new();
        let mut targets = Stack::<X509>::new().map_err(CryptoError::from)?;
        for identity in recipients {
            let fingerprint = identity.fingerprint();
            if seen.insert(fingerprint.clone()) {
                targets
                    .push(convert::x509(identity.certificate())?)
                    .map_err(CryptoError::from)?;
                fingerprints.push(fingerprint);
            }
        }

        let enveloped = Pkcs7::encrypt(
            &targets,
            &signed,
            convert::cipher(self.cipher),
            Pkcs7Flags::empty(),
        )
        .map_err(CryptoError::from)?;
        let der = enveloped.to_der().map_err(CryptoError::from)?;

        debug!(
            sender = %sender.address(),
            recipients = fingerprints.len(),
            cipher = %self.cipher,
            size = der.len(),
            "built envelope"
        );

        Ok(Envelope {
            der,
            recipients: fingerprints,
            cipher: self.cipher,
        })
    }
}

/// Detached signature over `content`, rendered as a `multipart/signed` entity.
fn sign(
    cert: &X509,
    key: &openssl::pkey::PKeyRef<openssl::pkey::Private>,
    content: &[u8],
) -> std::result::Result<Vec<u8>, CryptoError> {
    let chain = Stack::<X509>::new()?;
    let flags = Pkcs7Flags::DETACHED | Pkcs7Flags::BINARY;
    let signature = Pkcs7::sign(cert, key, &chain, content, flags)?;
    Ok(signature.to_smime(content, Pkcs7Flags::DETACHED)?)
}
