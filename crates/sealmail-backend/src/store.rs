//! Identity stores.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sealmail_core::{canonical_address, Identity, Result};
use tokio::sync::RwLock;

/// Source of identities, queried once per address per call.
///
/// Implementations receive canonical addresses and must return stable results
/// for a fixed store state. Ordering is not significant.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Identities for `address` that carry a private key.
    async fn find_sender_candidates(&self, address: &str) -> Result<Vec<Identity>>;

    /// Every identity for `address`, with or without a key.
    async fn find_recipient_candidates(&self, address: &str) -> Result<Vec<Identity>>;
}

#[async_trait]
impl<S: IdentityStore + ?Sized> IdentityStore for Arc<S> {
    async fn find_sender_candidates(&self, address: &str) -> Result<Vec<Identity>> {
        (**self).find_sender_candidates(address).await
    }

    async fn find_recipient_candidates(&self, address: &str) -> Result<Vec<Identity>> {
        (**self).find_recipient_candidates(address).await
    }
}

/// In-process store indexed by address.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    index: RwLock<BTreeMap<String, Vec<Identity>>>,
    lookups: AtomicUsize,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity under its address. Several identities may share one.
    pub async fn insert(&self, identity: Identity) {
        self.index
            .write()
            .await
            .entry(identity.address().to_string())
            .or_default()
            .push(identity);
    }

    /// Drop every identity bound to `address`, returning how many were removed.
    pub async fn remove_address(&self, address: &str) -> Result<usize> {
        let address = canonical_address(address)?;
        Ok(self
            .index
            .write()
            .await
            .remove(&address)
            .map_or(0, |removed| removed.len()))
    }

    /// Addresses with at least one identity, sorted.
    pub async fn addresses(&self) -> Vec<String> {
        self.index.read().await.keys().cloned().collect()
    }

    /// Every identity, grouped by address.
    pub async fn identities(&self) -> Vec<Identity> {
        self.index.read().await.values().flatten().cloned().collect()
    }

    /// Total identity count.
    pub async fn len(&self) -> usize {
        self.index.read().await.values().map(Vec::len).sum()
    }

    /// True when the store holds no identities.
    pub async fn is_empty(&self) -> bool {
        self.index.read().await.is_empty()
    }

    /// Number of queries served so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    async fn lookup(&self, address: &str, senders_only: bool) -> Vec<Identity> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.index
            .read()
            .await
            .get(address)
            .map(|found| {
                found
                    .iter()
                    .filter(|identity| !senders_only || identity.is_sender_capable())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromIterator<Identity> for MemoryIdentityStore {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let mut index: BTreeMap<String, Vec<Identity>> = BTreeMap::new();
        for identity in iter {
            index
                .entry(identity.address().to_string())
                .or_default()
                .push(identity);
        }
        Self {
            index: RwLock::new(index),
            lookups: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_sender_candidates(&self, address: &str) -> Result<Vec<Identity>> {
        Ok(self.lookup(address, true).await)
    }

    async fn find_recipient_candidates(&self, address: &str) -> Result<Vec<Identity>> {
        Ok(self.lookup(address, false).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealmail_core::fixtures::*;

    #[tokio::test]
    async fn test_multiple_identities_per_address() {
        let store = MemoryIdentityStore::new();
        store
            .insert(Identity::for_address("list@example.com", cert1()).unwrap())
            .await;
        store
            .insert(Identity::for_address("list@example.com", cert2()).unwrap())
            .await;
        store.insert(recipient1().with_key(key1())).await;

        assert_eq!(store.len().await, 3);
        assert_eq!(
            store.addresses().await,
            ["list@example.com", "recipient1@example.com"]
        );

        let list = store
            .find_recipient_candidates("list@example.com")
            .await
            .unwrap();
        assert_eq!(list.len(), 2);
        assert!(store
            .find_sender_candidates("list@example.com")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn test_remove_address() {
        let store: MemoryIdentityStore = [recipient1(), recipient2()].into_iter().collect();
        assert_eq!(
            store.remove_address("Recipient1@Example.com").await.unwrap(),
            1
        );
        assert_eq!(store.remove_address("nobody@example.com").await.unwrap(), 0);
        assert_eq!(store.addresses().await, ["recipient2@example.com"]);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn test_shared_through_arc() {
        let store = Arc::new(MemoryIdentityStore::from_iter([recipient2()]));
        let found = store
            .find_recipient_candidates("recipient2@example.com")
            .await
            .unwrap();
        assert_eq!(found, [recipient2()]);
        assert_eq!(store.lookups(), 1);
    }
}
