//! Recipient partition produced by the analyzer.

use std::collections::BTreeSet;

use super::identity::Identity;

/// Partition of a message's recipients.
///
/// An address appears in exactly one of `encrypting_addresses` and
/// `plaintext_addresses`. `encrypting_identities` holds every valid identity
/// of every encrypting address, so a list address contributes one entry per
/// subscriber certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientAnalysis {
    /// Identities the envelope must be addressed to
    pub encrypting_identities: Vec<Identity>,
    /// Addresses satisfied by at least one valid identity
    pub encrypting_addresses: BTreeSet<String>,
    /// Addresses with no identity, or none passing the validity filter
    pub plaintext_addresses: BTreeSet<String>,
}

impl RecipientAnalysis {
    /// True when no recipient needs a plaintext copy.
    pub fn is_fully_encryptable(&self) -> bool {
        self.plaintext_addresses.is_empty()
    }

    /// True when nothing at all was analyzed.
    pub fn is_empty(&self) -> bool {
        self.encrypting_addresses.is_empty() && self.plaintext_addresses.is_empty()
    }

    /// Record an address satisfied by `identities` (must be non-empty).
    pub fn push_encrypting(&mut self, address: String, identities: Vec<Identity>) {
        for identity in identities {
            if !self.encrypting_identities.contains(&identity) {
                self.encrypting_identities.push(identity);
            }
        }
        self.encrypting_addresses.insert(address);
    }

    /// Record an address that has no usable identity.
    pub fn push_plaintext(&mut self, address: String) {
        self.plaintext_addresses.insert(address);
    }

    /// Destructure into `(identities, encrypting addresses, plaintext addresses)`.
    pub fn into_parts(self) -> (Vec<Identity>, BTreeSet<String>, BTreeSet<String>) {
        (
            self.encrypting_identities,
            self.encrypting_addresses,
            self.plaintext_addresses,
        )
    }
}
