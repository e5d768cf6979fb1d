//! Data model shared by the resolver, the envelope builder and the backend.

mod analysis;
mod certificate;
mod identity;
mod key;
mod message;

pub use analysis::RecipientAnalysis;
pub use certificate::Certificate;
pub use identity::{Identity, IdentitySummary};
pub use key::{KeyFormat, PrivateKey};
pub use message::MailMessage;
