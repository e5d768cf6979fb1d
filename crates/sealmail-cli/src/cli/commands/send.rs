//! `sealmail send` - Deliver a message through the configured transport.

use anyhow::{Context as _, Result};
use colored::Colorize;
use sealmail::lettre::{AsyncFileTransport, AsyncSmtpTransport, Tokio1Executor};
use sealmail::{DeliveryBackend, LettreTransport, MailMessage, MemoryIdentityStore, Policy, Transport};

use super::Context;
use crate::cli::args::SendArgs;
use crate::config::TransportConfig;
use crate::output::print_json;

pub async fn execute(ctx: &Context, args: SendArgs) -> Result<()> {
    let store = ctx.store()?;
    let policy = ctx.policy(args.policy);
    let fail_silently = args.fail_silently;
    let message = build_message(args)?;

    let sent = match &ctx.config.transport {
        TransportConfig::File { dir } => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let transport = AsyncFileTransport::<Tokio1Executor>::new(dir);
            deliver(store, LettreTransport::new(transport), policy, &message, fail_silently).await?
        }
        TransportConfig::Smtp {
            host,
            port,
            starttls,
        } => {
            let builder = if *starttls {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            } else {
                AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            }
            .with_context(|| format!("configuring relay {host}"))?;
            let builder = match port {
                Some(port) => builder.port(*port),
                None => builder,
            };
            deliver(store, LettreTransport::new(builder.build()), policy, &message, fail_silently)
                .await?
        }
    };

    if ctx.is_json() {
        return print_json(&serde_json::json!({ "sent": sent }));
    }
    println!("{} {sent} message(s)", "Sent".green().bold());
    Ok(())
}

async fn deliver<T: Transport>(
    store: MemoryIdentityStore,
    transport: T,
    policy: Policy,
    message: &MailMessage,
    fail_silently: bool,
) -> Result<usize> {
    let backend = DeliveryBackend::with_policy(store, transport, policy);
    Ok(backend.send(message, fail_silently).await?)
}

fn build_message(args: SendArgs) -> Result<MailMessage> {
    let body = match (&args.body, &args.body_file) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => String::new(),
    };

    let mut message = MailMessage::new(args.subject, body, args.from, args.recipients.to)
        .cc(args.recipients.cc)
        .bcc(args.recipients.bcc);
    if let Some(path) = &args.html_file {
        let html = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        message = message.html(html);
    }
    if let Some(reply_to) = args.reply_to {
        message = message.reply_to(reply_to);
    }
    Ok(message)
}
