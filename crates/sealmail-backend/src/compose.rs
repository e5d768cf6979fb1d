//! MIME rendering of outgoing copies.
//!
//! The signed content is the message's MIME body entity. The encrypted copy
//! replaces that body with an `application/pkcs7-mime` part but keeps the
//! visible headers, so clients thread it with the plaintext copy.

use std::collections::BTreeSet;

use lettre::address::Envelope as SmtpEnvelope;
use lettre::message::header::{ContentDisposition, ContentTransferEncoding, ContentType};
use lettre::message::{Body, Mailbox, MessageBuilder, MultiPart, SinglePart};
use lettre::{Address, Message};
use sealmail_core::{MailMessage, Result, SealError};
use sealmail_crypto::Envelope;

const SMIME_ENVELOPED: &str =
    "application/pkcs7-mime; smime-type=enveloped-data; name=\"smime.p7m\"";

/// A fully rendered message plus its SMTP envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    /// Reverse path
    pub sender: String,
    /// Forward paths; exactly the addresses this copy is meant for
    pub recipients: Vec<String>,
    /// RFC 5322 bytes
    pub raw: Vec<u8>,
}

impl RenderedMessage {
    fn from_message(message: &Message) -> Self {
        let envelope = message.envelope();
        Self {
            sender: envelope.from().map(ToString::to_string).unwrap_or_default(),
            recipients: envelope.to().iter().map(ToString::to_string).collect(),
            raw: message.formatted(),
        }
    }

    /// SMTP envelope for handing this message to a lettre transport.
    pub fn smtp_envelope(&self) -> Result<SmtpEnvelope> {
        let from = if self.sender.is_empty() {
            None
        } else {
            Some(parse_address(&self.sender)?)
        };
        let to = self
            .recipients
            .iter()
            .map(|r| parse_address(r))
            .collect::<Result<Vec<_>>>()?;
        SmtpEnvelope::new(from, to).map_err(|e| SealError::Compose(e.to_string()))
    }
}

/// The MIME entity that gets signed: `text/plain`, or `multipart/alternative`
/// when an HTML body is present.
pub fn body_entity(message: &MailMessage) -> Vec<u8> {
    match &message.html {
        Some(html) => MultiPart::alternative_plain_html(message.body.clone(), html.clone())
            .formatted(),
        None => SinglePart::plain(message.body.clone()).formatted(),
    }
}

/// The ordinary, unencrypted message addressed to `recipients`.
pub fn render_plaintext(
    message: &MailMessage,
    recipients: &BTreeSet<String>,
) -> Result<RenderedMessage> {
    let builder = headers(message, recipients)?;
    let built = match &message.html {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            message.body.clone(),
            html.clone(),
        )),
        None => builder.singlepart(SinglePart::plain(message.body.clone())),
    }
    .map_err(|e| SealError::Compose(e.to_string()))?;
    Ok(RenderedMessage::from_message(&built))
}

/// The S/MIME copy carrying `envelope`, addressed to `recipients`.
pub fn render_encrypted(
    message: &MailMessage,
    envelope: &Envelope,
    recipients: &BTreeSet<String>,
) -> Result<RenderedMessage> {
    let content_type =
        ContentType::parse(SMIME_ENVELOPED).map_err(|e| SealError::Compose(e.to_string()))?;
    let body = Body::new_with_encoding(envelope.to_der().to_vec(), ContentTransferEncoding::Base64)
        .map_err(|_| SealError::Compose("envelope cannot be base64 encoded".into()))?;
    let part = SinglePart::builder()
        .header(content_type)
        .header(ContentDisposition::attachment("smime.p7m"))
        .body(body);

    let built = headers(message, recipients)?
        .singlepart(part)
        .map_err(|e| SealError::Compose(e.to_string()))?;
    Ok(RenderedMessage::from_message(&built))
}

/// Visible headers of `message` with an SMTP envelope limited to `recipients`.
fn headers(message: &MailMessage, recipients: &BTreeSet<String>) -> Result<MessageBuilder> {
    let from = parse_mailbox(&message.from)?;
    let envelope = SmtpEnvelope::new(
        Some(from.email.clone()),
        recipients
            .iter()
            .map(|r| parse_address(r))
            .collect::<Result<Vec<_>>>()?,
    )
    .map_err(|e| SealError::Compose(e.to_string()))?;

    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .envelope(envelope);
    for to in &message.to {
        builder = builder.to(parse_mailbox(to)?);
    }
    for cc in &message.cc {
        builder = builder.cc(parse_mailbox(cc)?);
    }
    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(parse_mailbox(reply_to)?);
    }
    Ok(builder)
}

fn parse_mailbox(raw: &str) -> Result<Mailbox> {
    raw.trim()
        .parse()
        .map_err(|e| SealError::InvalidInput(format!("bad mailbox {raw:?}: {e}")))
}

fn parse_address(raw: &str) -> Result<Address> {
    raw.parse()
        .map_err(|e| SealError::InvalidInput(format!("bad address {raw:?}: {e}")))
}
