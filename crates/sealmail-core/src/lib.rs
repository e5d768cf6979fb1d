//! Core types for the sealmail S/MIME delivery backend.
//!
//! - **Types**: [`Identity`], [`Certificate`], [`PrivateKey`], [`MailMessage`]
//!   and the [`RecipientAnalysis`] partition
//! - **Policy**: [`Policy`] and [`ContentCipher`], loaded from TOML
//! - **Errors**: [`SealError`] and the crate-wide [`Result`]
//!
//! # Example
//!
//! ```rust,ignore
//! use sealmail_core::{Certificate, Identity, Result};
//!
//! fn bind(pem: &str) -> Result<Identity> {
//!     let identity = Identity::new(Certificate::from_pem(pem)?)?;
//!     println!("{} {}", identity.address(), identity.fingerprint());
//!     Ok(identity)
//! }
//! ```

mod address;
mod error;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
mod hash;
pub mod policy;
pub mod types;

pub use address::canonical_address;
pub use error::{Result, SealError};
pub use hash::sha1_fingerprint;
pub use policy::{ContentCipher, Policy};
pub use types::*;
