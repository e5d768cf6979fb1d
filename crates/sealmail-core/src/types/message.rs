//! Outgoing messages as handed to the delivery backend.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::address::canonical_address;
use crate::error::Result;

/// An outgoing email before any encryption decision has been made.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
    /// Optional HTML alternative to `body`
    #[serde(default)]
    pub html: Option<String>,
    /// Originator, `addr` or `Name <addr>`
    pub from: String,
    /// Primary recipients
    #[serde(default)]
    pub to: Vec<String>,
    /// Carbon-copy recipients
    #[serde(default)]
    pub cc: Vec<String>,
    /// Blind recipients: envelope only, never rendered as a header
    #[serde(default)]
    pub bcc: Vec<String>,
    /// Optional Reply-To mailbox
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl MailMessage {
    /// Create a plain-text message.
    pub fn new<I, S>(
        subject: impl Into<String>,
        body: impl Into<String>,
        from: impl Into<String>,
        to: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            body: body.into(),
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add carbon-copy recipients.
    #[must_use]
    pub fn cc<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cc.extend(cc.into_iter().map(Into::into));
        self
    }

    /// Add blind recipients.
    #[must_use]
    pub fn bcc<I, S>(mut self, bcc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bcc.extend(bcc.into_iter().map(Into::into));
        self
    }

    /// Attach an HTML alternative.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set Reply-To.
    #[must_use]
    pub fn reply_to(mut self, mailbox: impl Into<String>) -> Self {
        self.reply_to = Some(mailbox.into());
        self
    }

    /// Distinct canonical addresses across To, Cc and Bcc.
    ///
    /// # Errors
    ///
    /// Returns `SealError::InvalidInput` if any recipient is empty or malformed.
    pub fn recipients(&self) -> Result<BTreeSet<String>> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(|r| canonical_address(r))
            .collect()
    }

    /// True when To, Cc and Bcc are all empty.
    pub fn has_no_recipients(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty()
    }

    /// Canonical sender address.
    pub fn sender_address(&self) -> Result<String> {
        canonical_address(&self.from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipients_collapse_duplicates_across_fields() {
        let message = MailMessage::new(
            "subject",
            "body",
            "Sender <sender@example.com>",
            ["a@example.com", "B@example.com"],
        )
        .cc(["b@example.com"])
        .bcc(["c@example.com", "A@EXAMPLE.COM"]);

        let recipients = message.recipients().unwrap();
        assert_eq!(
            recipients.into_iter().collect::<Vec<_>>(),
            ["a@example.com", "b@example.com", "c@example.com"]
        );
        assert_eq!(message.sender_address().unwrap(), "sender@example.com");
    }

    #[test]
    fn empty_recipient_is_invalid() {
        let message = MailMessage::new("s", "b", "sender@example.com", ["a@example.com", ""]);
        assert!(message.recipients().unwrap_err().is_input_error());
    }

    #[test]
    fn has_no_recipients() {
        let empty: [&str; 0] = [];
        assert!(MailMessage::new("s", "b", "x@example.com", empty).has_no_recipients());
        assert!(!MailMessage::new("s", "b", "x@example.com", empty)
            .bcc(["y@example.com"])
            .has_no_recipients());
    }
}
