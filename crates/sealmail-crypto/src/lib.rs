//! S/MIME envelopes for sealmail.
//!
//! [`EnvelopeBuilder`] signs a MIME entity with the sender's key and encrypts
//! the signed result for any number of recipient certificates in one pass.
//! [`open_envelope`] is the receiving half: decrypt with one key, verify the
//! signature against trusted sender certificates.
//!
//! # Example
//!
//! ```rust,ignore
//! use sealmail_crypto::{open_envelope, EnvelopeBuilder};
//!
//! let envelope = EnvelopeBuilder::default().build(&sender, content, &recipients)?;
//! let opened = open_envelope(envelope.to_der(), &cert, &key, &[sender_cert])?;
//! assert_eq!(opened.content, content);
//! ```

mod convert;
mod envelope;
mod error;
mod open;

pub use envelope::{Envelope, EnvelopeBuilder};
pub use error::CryptoError;
pub use open::{open_envelope, open_smime, OpenedMessage};
