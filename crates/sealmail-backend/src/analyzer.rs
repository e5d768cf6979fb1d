//! Recipient partitioning.

use std::collections::BTreeSet;

use sealmail_core::{MailMessage, RecipientAnalysis, Result};
use tracing::debug;

use crate::resolver::IdentityResolver;
use crate::store::IdentityStore;
use crate::validity::ValidityFilter;

/// Splits recipients into those that can be encrypted for and those that
/// cannot.
pub struct RecipientAnalyzer<'a, S: ?Sized> {
    resolver: IdentityResolver<'a, S>,
    filter: ValidityFilter,
}

impl<'a, S: IdentityStore + ?Sized> RecipientAnalyzer<'a, S> {
    pub const fn new(store: &'a S, filter: ValidityFilter) -> Self {
        Self {
            resolver: IdentityResolver::new(store),
            filter,
        }
    }

    /// Partition every distinct To, Cc and Bcc address of `message`.
    pub async fn analyze(&self, message: &MailMessage) -> Result<RecipientAnalysis> {
        self.analyze_addresses(&message.recipients()?).await
    }

    /// Partition canonical `addresses`.
    ///
    /// An address lands in the encrypting set when at least one of its
    /// identities passes the validity filter, and all passing identities are
    /// kept. Otherwise it lands in the plaintext set.
    pub async fn analyze_addresses(
        &self,
        addresses: &BTreeSet<String>,
    ) -> Result<RecipientAnalysis> {
        let mut analysis = RecipientAnalysis::default();

        for address in addresses {
            let resolved = self.resolver.resolve_recipients(address).await?;
            let found = resolved.len();
            let valid: Vec<_> = resolved
                .into_iter()
                .filter(|identity| self.filter.is_valid(identity))
                .collect();

            debug!(%address, found, valid = valid.len(), "resolved recipient");
            if valid.is_empty() {
                analysis.push_plaintext(address.clone());
            } else {
                analysis.push_encrypting(address.clone(), valid);
            }
        }

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIdentityStore;
    use sealmail_core::fixtures::*;
    use chrono::NaiveDate;
    use sealmail_core::Identity;

    fn message(to: &[&str]) -> MailMessage {
        MailMessage::new("subject", "body", "recipient1@example.com", to.iter().copied())
    }

    #[tokio::test]
    async fn test_partition_is_disjoint() {
        let store: MemoryIdentityStore = [recipient1(), recipient2()].into_iter().collect();
        let analyzer = RecipientAnalyzer::new(&store, ValidityFilter::disabled());

        let analysis = analyzer
            .analyze(
                &message(&["recipient1@example.com", "recipient3@example.com"])
                    .cc(["Recipient1@Example.com"]),
            )
            .await
            .unwrap();

        assert_eq!(analysis.encrypting_identities, [recipient1()]);
        assert_eq!(
            analysis.encrypting_addresses,
            BTreeSet::from(["recipient1@example.com".to_string()])
        );
        assert_eq!(
            analysis.plaintext_addresses,
            BTreeSet::from(["recipient3@example.com".to_string()])
        );
        assert!(!analysis.is_fully_encryptable());
    }

    #[tokio::test]
    async fn test_list_address_contributes_every_member() {
        let store: MemoryIdentityStore = [
            Identity::for_address("list@example.com", cert1()).unwrap(),
            Identity::for_address("list@example.com", cert2()).unwrap(),
        ]
        .into_iter()
        .collect();
        let analysis = RecipientAnalyzer::new(&store, ValidityFilter::disabled())
            .analyze(&message(&["list@example.com"]))
            .await
            .unwrap();

        assert_eq!(analysis.encrypting_identities.len(), 2);
        assert!(analysis.is_fully_encryptable());
    }

    #[tokio::test]
    async fn test_expired_identities_fall_back_to_plaintext() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let expired = recipient2().with_window(None, NaiveDate::from_ymd_opt(2024, 1, 1));
        let store: MemoryIdentityStore = [recipient1(), expired].into_iter().collect();
        let to = ["recipient1@example.com", "recipient2@example.com"];

        let lenient = RecipientAnalyzer::new(&store, ValidityFilter::disabled())
            .analyze(&message(&to))
            .await
            .unwrap();
        assert!(lenient.is_fully_encryptable());

        let strict = RecipientAnalyzer::new(&store, ValidityFilter::on(today))
            .analyze(&message(&to))
            .await
            .unwrap();
        assert_eq!(strict.encrypting_identities, [recipient1()]);
        assert!(strict.plaintext_addresses.contains("recipient2@example.com"));
    }

    #[tokio::test]
    async fn test_empty_recipient_list() {
        let store = MemoryIdentityStore::new();
        let analysis = RecipientAnalyzer::new(&store, ValidityFilter::disabled())
            .analyze(&message(&[]))
            .await
            .unwrap();
        assert!(analysis.is_empty());
        assert_eq!(store.lookups(), 0);
    }
}
