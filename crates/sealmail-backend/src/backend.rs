//! The delivery backend: analysis, enveloping and the fallback policy.

use std::collections::BTreeSet;
use std::sync::Arc;

use sealmail_core::{
    canonical_address, Identity, MailMessage, Policy, RecipientAnalysis, Result, SealError,
};
use sealmail_crypto::{Envelope, EnvelopeBuilder};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::analyzer::RecipientAnalyzer;
use crate::compose::{self, RenderedMessage};
use crate::resolver::IdentityResolver;
use crate::store::IdentityStore;
use crate::transport::Transport;
use crate::validity::ValidityFilter;

/// Encrypting mail backend.
///
/// Every call re-resolves identities from the store and reads the policy
/// once at its start; nothing is cached between calls.
pub struct DeliveryBackend<S, T> {
    inner: Arc<BackendInner<S, T>>,
}

struct BackendInner<S, T> {
    store: S,
    transport: T,
    policy: RwLock<Policy>,
}

impl<S, T> Clone for DeliveryBackend<S, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: IdentityStore, T: Transport> DeliveryBackend<S, T> {
    /// Create a backend with the default policy.
    pub fn new(store: S, transport: T) -> Self {
        Self::with_policy(store, transport, Policy::default())
    }

    /// Create a backend with an explicit policy.
    pub fn with_policy(store: S, transport: T, policy: Policy) -> Self {
        Self {
            inner: Arc::new(BackendInner {
                store,
                transport,
                policy: RwLock::new(policy),
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Current policy.
    pub async fn policy(&self) -> Policy {
        *self.inner.policy.read().await
    }

    /// Replace the policy. Calls already in flight keep their snapshot.
    pub async fn set_policy(&self, policy: Policy) {
        *self.inner.policy.write().await = policy;
        info!(
            plaintext_fallback = policy.plaintext_fallback,
            validate_dates = policy.validate_dates,
            cipher = %policy.cipher,
            "policy updated"
        );
    }

    /// The unique sender-capable identity for `address`, if there is one.
    ///
    /// # Errors
    ///
    /// `SealError::InvalidInput` if `address` is empty.
    pub async fn get_sender_identity(&self, address: &str) -> Result<Option<Identity>> {
        IdentityResolver::new(&self.inner.store)
            .resolve_sender(address)
            .await
    }

    /// Partition the recipients of `message` under the current policy.
    pub async fn analyze_recipients(&self, message: &MailMessage) -> Result<RecipientAnalysis> {
        let policy = self.policy().await;
        self.analyzer(&policy).analyze(message).await
    }

    /// Sign `content` as `sender` and encrypt it for every identity of every
    /// recipient.
    ///
    /// # Errors
    ///
    /// `SealError::InvalidInput` for an empty recipient list or empty content,
    /// `SealError::NoSenderIdentity` if the sender does not resolve, and
    /// `SealError::UnencryptableRecipients` if any recipient has no valid
    /// identity.
    pub async fn encrypt<I, A>(
        &self,
        sender: &str,
        recipients: I,
        content: &[u8],
    ) -> Result<Envelope>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        let addresses = recipients
            .into_iter()
            .map(|r| canonical_address(r.as_ref()))
            .collect::<Result<BTreeSet<_>>>()?;
        if addresses.is_empty() {
            return Err(SealError::InvalidInput(
                "at least one recipient is required".into(),
            ));
        }
        if content.is_empty() {
            return Err(SealError::InvalidInput("content must not be empty".into()));
        }

        let policy = self.policy().await;
        let sender = self.require_sender(sender).await?;
        let (identities, encrypting, plaintext) = self
            .analyzer(&policy)
            .analyze_addresses(&addresses)
            .await?
            .into_parts();
        if !plaintext.is_empty() {
            return Err(SealError::UnencryptableRecipients {
                encrypting_recipients: encrypting,
                plaintext_recipients: plaintext,
                dispatched: 0,
            });
        }

        EnvelopeBuilder::new(policy.cipher).build(&sender, content, &identities)
    }

    /// Send `message`, returning the number of copies handed to the transport.
    ///
    /// Encryptable recipients get one signed and encrypted copy. The rest get
    /// a plaintext copy when the policy allows it; otherwise they are dropped
    /// (`fail_silently`) or reported with `SealError::UnencryptableRecipients`
    /// after the encrypted copy has gone out. Transport failures are not
    /// counted and are swallowed only when `fail_silently` is set.
    #[instrument(skip_all, fields(from = %message.from, fail_silently = fail_silently))]
    pub async fn send(&self, message: &MailMessage, fail_silently: bool) -> Result<usize> {
        if message.has_no_recipients() {
            debug!("no recipients; nothing to send");
            return Ok(0);
        }

        let policy = self.policy().await;
        let (identities, encrypting, plaintext) = self
            .analyzer(&policy)
            .analyze(message)
            .await?
            .into_parts();

        // Everything is rendered before anything is dispatched.
        let encrypted = if encrypting.is_empty() {
            None
        } else {
            let sender = self.require_sender(&message.from).await?;
            let envelope = EnvelopeBuilder::new(policy.cipher).build(
                &sender,
                &compose::body_entity(message),
                &identities,
            )?;
            Some(compose::render_encrypted(message, &envelope, &encrypting)?)
        };
        let fallback = if policy.plaintext_fallback && !plaintext.is_empty() {
            Some(compose::render_plaintext(message, &plaintext)?)
        } else {
            None
        };

        let sent = self
            .dispatch(encrypted.iter().chain(fallback.iter()), fail_silently)
            .await?;

        if !policy.plaintext_fallback && !plaintext.is_empty() {
            let err = SealError::UnencryptableRecipients {
                encrypting_recipients: encrypting,
                plaintext_recipients: plaintext,
                dispatched: sent,
            };
            if !suppressed(&err, fail_silently) {
                return Err(err);
            }
            warn!(error = %err, "dropping recipients without a valid identity");
            return Ok(sent);
        }

        info!(
            sent,
            encrypted = encrypting.len(),
            plaintext = plaintext.len(),
            "message dispatched"
        );
        Ok(sent)
    }

    /// Send each message in order, returning the total count.
    ///
    /// The first error that `fail_silently` does not cover aborts the batch.
    pub async fn send_messages(
        &self,
        messages: &[MailMessage],
        fail_silently: bool,
    ) -> Result<usize> {
        let mut total = 0;
        for message in messages {
            total += self.send(message, fail_silently).await?;
        }
        Ok(total)
    }

    fn analyzer(&self, policy: &Policy) -> RecipientAnalyzer<'_, S> {
        RecipientAnalyzer::new(&self.inner.store, ValidityFilter::for_policy(policy))
    }

    async fn require_sender(&self, address: &str) -> Result<Identity> {
        let address = canonical_address(address)?;
        let found = self.get_sender_identity(&address).await?;
        found.ok_or(SealError::NoSenderIdentity { address })
    }

    /// Attempt every copy. Returns the success count, or the first failure
    /// once all copies have been tried.
    async fn dispatch<'m>(
        &self,
        copies: impl Iterator<Item = &'m RenderedMessage>,
        fail_silently: bool,
    ) -> Result<usize> {
        let mut sent = 0;
        let mut first_failure = None;
        for copy in copies {
            match self.inner.transport.deliver(copy).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    warn!(error = %e, recipients = copy.recipients.len(), "delivery failed");
                    if !suppressed(&e, fail_silently) {
                        first_failure.get_or_insert(e);
                    }
                }
            }
        }
        first_failure.map_or(Ok(sent), Err)
    }
}

/// True when `fail_silently` covers `err`.
const fn suppressed(err: &SealError, fail_silently: bool) -> bool {
    fail_silently && err.is_suppressible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIdentityStore;
    use sealmail_core::fixtures::*;
    use crate::transport::MemoryTransport;
    use sealmail_core::ContentCipher;
    use sealmail_crypto::open_envelope;

    fn backend() -> DeliveryBackend<MemoryIdentityStore, MemoryTransport> {
        let store = [recipient1().with_key(key1()), recipient2()]
            .into_iter()
            .collect();
        DeliveryBackend::new(store, MemoryTransport::new())
    }

    #[tokio::test]
    async fn test_encrypt_opens_for_recipient() {
        let backend = backend();
        backend
            .set_policy(Policy {
                cipher: ContentCipher::Aes128Cbc,
                ..Policy::default()
            })
            .await;

        let envelope = backend
            .encrypt(
                "recipient1@example.com",
                ["recipient2@example.com"],
                b"hello\r\n",
            )
            .await
            .unwrap();
        assert_eq!(envelope.cipher(), ContentCipher::Aes128Cbc);

        let opened = open_envelope(envelope.to_der(), &cert2(), &key2(), &[cert1()]).unwrap();
        assert_eq!(opened.content, b"hello\r\n");
    }

    #[tokio::test]
    async fn test_encrypt_rejects_bad_input() {
        let backend = backend();
        let none: [&str; 0] = [];
        assert!(backend
            .encrypt("recipient1@example.com", none, b"")
            .await
            .unwrap_err()
            .is_input_error());
        assert!(backend
            .encrypt("recipient1@example.com", ["recipient2@example.com"], b"")
            .await
            .unwrap_err()
            .is_input_error());
        assert_eq!(backend.store().lookups(), 0);
    }

    #[tokio::test]
    async fn test_encrypt_requires_every_recipient() {
        let err = backend()
            .encrypt(
                "recipient1@example.com",
                ["recipient2@example.com", "stranger@example.com"],
                b"x",
            )
            .await
            .unwrap_err();
        match err {
            SealError::UnencryptableRecipients {
                plaintext_recipients,
                dispatched,
                ..
            } => {
                assert!(plaintext_recipients.contains("stranger@example.com"));
                assert_eq!(dispatched, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_encrypt_unknown_sender() {
        let err = backend()
            .encrypt("nobody@example.com", ["recipient2@example.com"], b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, SealError::NoSenderIdentity { address } if address == "nobody@example.com"));
    }

    #[tokio::test]
    async fn test_fail_silently_does_not_hide_missing_sender() {
        let message = MailMessage::new(
            "s",
            "b",
            "nobody@example.com",
            ["recipient2@example.com"],
        );
        let backend = backend();
        let err = backend.send(&message, true).await.unwrap_err();
        assert!(!err.is_suppressible());
        assert!(matches!(err, SealError::NoSenderIdentity { .. }));
        assert!(backend.transport().is_empty().await);
    }

    #[tokio::test]
    async fn test_fail_silently_swallows_unencryptable_recipients() {
        let message = MailMessage::new(
            "s",
            "b",
            "recipient1@example.com",
            ["recipient2@example.com", "stranger@example.com"],
        );
        let backend = backend();
        assert_eq!(backend.send(&message, true).await.unwrap(), 1);

        let err = backend.send(&message, false).await.unwrap_err();
        assert!(err.is_suppressible());
        assert!(matches!(
            err,
            SealError::UnencryptableRecipients { dispatched: 1, .. }
        ));
    }

    #[test]
    fn test_suppression_needs_flag_and_kind() {
        let transport = SealError::Transport("down".into());
        assert!(suppressed(&transport, true));
        assert!(!suppressed(&transport, false));
        assert!(!suppressed(&SealError::InvalidInput("x".into()), true));
    }

    #[tokio::test]
    async fn test_clones_share_policy() {
        let backend = backend();
        let other = backend.clone();
        other
            .set_policy(Policy::default().with_plaintext_fallback(true))
            .await;
        assert!(backend.policy().await.plaintext_fallback);
    }
}
