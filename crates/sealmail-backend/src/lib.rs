//! Encrypting delivery backend for sealmail.
//!
//! For each outgoing message the [`DeliveryBackend`] resolves every recipient
//! against an [`IdentityStore`], keeps the identities whose validity window
//! covers today, signs and encrypts one envelope for all of them, and then
//! applies the plaintext fallback policy to whoever is left.
//!
//! # Example
//!
//! ```rust,ignore
//! use sealmail_backend::{DeliveryBackend, IdentityManifest, MemoryTransport};
//! use sealmail_core::MailMessage;
//!
//! let store = IdentityManifest::load("identities.toml".as_ref())?.into_store()?;
//! let backend = DeliveryBackend::new(store, MemoryTransport::new());
//!
//! let message = MailMessage::new("Hi", "Hello", "alice@example.com", ["bob@example.com"]);
//! let sent = backend.send(&message, false).await?;
//! ```

mod analyzer;
mod backend;
pub mod compose;
mod manifest;
mod resolver;
mod store;
mod transport;
mod validity;

pub use analyzer::RecipientAnalyzer;
pub use backend::DeliveryBackend;
pub use compose::RenderedMessage;
pub use manifest::{IdentityManifest, ManifestEntry};
pub use resolver::IdentityResolver;
pub use store::{IdentityStore, MemoryIdentityStore};
pub use transport::{LettreTransport, MemoryTransport, Transport};
pub use validity::ValidityFilter;
