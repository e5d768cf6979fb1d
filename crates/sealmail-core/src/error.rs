//! Error types for sealmail.

use std::collections::BTreeSet;

use thiserror::Error;

/// Result type alias for sealmail operations
pub type Result<T> = std::result::Result<T, SealError>;

/// Errors that can occur while resolving, enveloping or dispatching mail
#[derive(Error, Debug)]
pub enum SealError {
    /// Malformed request: empty address, empty recipient list, empty content
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The sender address did not resolve to exactly one sender-capable identity
    #[error("no usable sender identity for {address}")]
    NoSenderIdentity {
        /// Canonical sender address that failed to resolve
        address: String,
    },

    /// Policy forbids delivering to recipients without a valid encryption identity
    #[error(
        "{} recipient(s) cannot receive encrypted mail: {}",
        plaintext_recipients.len(),
        join(plaintext_recipients)
    )]
    UnencryptableRecipients {
        /// Addresses that were (or would have been) reached by the encrypted envelope
        encrypting_recipients: BTreeSet<String>,
        /// Addresses left without any deliverable copy
        plaintext_recipients: BTreeSet<String>,
        /// Messages already handed to the transport before the error was raised
        dispatched: usize,
    },

    /// Certificate could not be decoded or lacks required data
    #[error("certificate error: {0}")]
    Certificate(String),

    /// Private key could not be decoded or does not match its certificate
    #[error("key error: {0}")]
    Key(String),

    /// Signing, encryption or decryption failed
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Outgoing message could not be rendered
    #[error("compose error: {0}")]
    Compose(String),

    /// Identity store query failed
    #[error("identity store error: {0}")]
    Store(String),

    /// The transport refused or failed to deliver a message
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SealError {
    /// Returns true if `fail_silently` is allowed to swallow this error
    #[must_use]
    pub const fn is_suppressible(&self) -> bool {
        matches!(
            self,
            Self::UnencryptableRecipients { .. } | Self::Transport(_)
        )
    }

    /// Returns true if the error reflects a malformed request rather than data
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

fn join(addresses: &BTreeSet<String>) -> String {
    addresses.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
