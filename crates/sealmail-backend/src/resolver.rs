//! Address to identity resolution.

use sealmail_core::{canonical_address, Identity, Result};
use tracing::{debug, instrument};

use crate::store::IdentityStore;

/// Resolves senders and recipients against an [`IdentityStore`].
pub struct IdentityResolver<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: IdentityStore + ?Sized> IdentityResolver<'a, S> {
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The unique sender-capable identity for `address`.
    ///
    /// Zero or several candidates resolve to `None`: an ambiguous sender
    /// cannot be authenticated, which is not an input error.
    ///
    /// # Errors
    ///
    /// `SealError::InvalidInput` if `address` is empty or malformed.
    #[instrument(skip(self))]
    pub async fn resolve_sender(&self, address: &str) -> Result<Option<Identity>> {
        let address = canonical_address(address)?;
        let mut candidates: Vec<Identity> = self
            .store
            .find_sender_candidates(&address)
            .await?
            .into_iter()
            .filter(Identity::is_sender_capable)
            .collect();

        if candidates.len() == 1 {
            Ok(candidates.pop())
        } else {
            debug!(%address, candidates = candidates.len(), "no unique sender identity");
            Ok(None)
        }
    }

    /// Every identity bound to `address`; possibly none.
    ///
    /// # Errors
    ///
    /// `SealError::InvalidInput` if `address` is empty or malformed.
    pub async fn resolve_recipients(&self, address: &str) -> Result<Vec<Identity>> {
        let address = canonical_address(address)?;
        self.store.find_recipient_candidates(&address).await
    }
}
