//! Encrypting S/MIME mail delivery.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sealmail::{DeliveryBackend, IdentityManifest, LettreTransport, MailMessage, Policy};
//! use sealmail::lettre::{AsyncSmtpTransport, Tokio1Executor};
//!
//! #[tokio::main]
//! async fn main() -> sealmail::Result<()> {
//!     let store = IdentityManifest::load("identities.toml".as_ref())?.into_store()?;
//!     let relay = AsyncSmtpTransport::<Tokio1Executor>::relay("smtp.example.com")
//!         .map_err(|e| sealmail::SealError::Config(e.to_string()))?
//!         .build();
//!
//!     let backend = DeliveryBackend::with_policy(
//!         store,
//!         LettreTransport::new(relay),
//!         Policy::default().with_plaintext_fallback(true),
//!     );
//!
//!     let message = MailMessage::new(
//!         "Quarterly numbers",
//!         "See attached.",
//!         "alice@example.com",
//!         ["bob@example.com", "team@example.com"],
//!     );
//!     let sent = backend.send(&message, false).await?;
//!     println!("{sent} message(s) dispatched");
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `sealmail-core` - identities, certificates, messages, policy, errors
//! - `sealmail-crypto` - signing, enveloping and opening
//! - `sealmail-backend` - stores, transports and the delivery backend

// Re-export core types
pub use sealmail_core::*;

// Re-export envelope construction
pub use sealmail_crypto::{open_envelope, open_smime, CryptoError, Envelope, EnvelopeBuilder, OpenedMessage};

// Re-export the backend
pub use sealmail_backend::{
    compose, DeliveryBackend, IdentityManifest, IdentityResolver, IdentityStore, LettreTransport,
    ManifestEntry, MemoryIdentityStore, MemoryTransport, RecipientAnalyzer, RenderedMessage,
    Transport, ValidityFilter,
};

// Re-export runtime for convenience
pub use lettre;
pub use tokio;
