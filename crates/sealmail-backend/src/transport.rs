//! Outbound transports.

use std::collections::BTreeSet;
use std::fmt::Display;

use async_trait::async_trait;
use lettre::AsyncTransport;
use sealmail_core::{canonical_address, Result, SealError};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::compose::RenderedMessage;

/// Delivers rendered messages.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Hand one message to the outbound path.
    async fn deliver(&self, message: &RenderedMessage) -> Result<()>;
}

/// Records every delivered message in memory.
///
/// Addresses registered with [`MemoryTransport::rejecting`] make any message
/// addressed to them fail, which stands in for a dead-letter relay.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    outbox: Mutex<Vec<RenderedMessage>>,
    rejects: BTreeSet<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse messages addressed to any of `addresses`.
    pub fn rejecting<I, S>(addresses: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            outbox: Mutex::default(),
            rejects: addresses
                .into_iter()
                .map(|a| canonical_address(a.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// Copies of every message accepted so far, in delivery order.
    pub async fn messages(&self) -> Vec<RenderedMessage> {
        self.outbox.lock().await.clone()
    }

    /// Number of messages accepted.
    pub async fn len(&self) -> usize {
        self.outbox.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.outbox.lock().await.is_empty()
    }

    /// Drain the outbox.
    pub async fn take(&self) -> Vec<RenderedMessage> {
        std::mem::take(&mut *self.outbox.lock().await)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn deliver(&self, message: &RenderedMessage) -> Result<()> {
        if let Some(rejected) = message
            .recipients
            .iter()
            .find(|r| self.rejects.contains(r.as_str()))
        {
            return Err(SealError::Transport(format!(
                "recipient {rejected} rejected"
            )));
        }
        self.outbox.lock().await.push(message.clone());
        Ok(())
    }
}

/// Adapter over any [`lettre::AsyncTransport`]: SMTP relays, file drops, stubs.
#[derive(Debug, Clone)]
pub struct LettreTransport<T> {
    inner: T,
}

impl<T> LettreTransport<T> {
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// The wrapped lettre transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T> Transport for LettreTransport<T>
where
    T: AsyncTransport + Send + Sync,
    T::Error: Display,
{
    #[instrument(skip_all, fields(recipients = message.recipients.len()))]
    async fn deliver(&self, message: &RenderedMessage) -> Result<()> {
        let envelope = message.smtp_envelope()?;
        match self.inner.send_raw(&envelope, &message.raw).await {
            Ok(_) => {
                debug!(size = message.raw.len(), "handed message to transport");
                Ok(())
            }
            Err(e) => Err(SealError::Transport(e.to_string())),
        }
    }
}
