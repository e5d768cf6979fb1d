use openssl::error::ErrorStack;
use sealmail_core::SealError;
use thiserror::Error;

/// Errors raised by the S/MIME layer
#[derive(Error, Debug)]
pub enum CryptoError {
    /// OpenSSL rejected an operation
    #[error("openssl: {0}")]
    OpenSsl(#[from] ErrorStack),

    /// Private key could not be loaded
    #[error("unusable private key: {0}")]
    Key(ErrorStack),

    /// Private key does not belong to the certificate it was paired with
    #[error("private key does not match certificate {0}")]
    KeyMismatch(String),

    /// Signature did not verify against the trusted sender certificates
    #[error("signature verification failed: {0}")]
    Verification(ErrorStack),

    /// Decrypted payload is not a detached S/MIME signature
    #[error("malformed envelope: {0}")]
    Malformed(String),
}

impl From<CryptoError> for SealError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Key(_) | CryptoError::KeyMismatch(_) => Self::Key(err.to_string()),
            _ => Self::Crypto(err.to_string()),
        }
    }
}
