//! `sealmail encrypt` - Sign and envelope a MIME entity offline.

use std::io::Write;

use anyhow::{Context as _, Result};
use sealmail::{DeliveryBackend, MemoryTransport};
use tracing::info;

use super::{read, Context};
use crate::cli::args::EncryptArgs;

pub async fn execute(ctx: &Context, args: EncryptArgs) -> Result<()> {
    let backend =
        DeliveryBackend::with_policy(ctx.store()?, MemoryTransport::new(), ctx.policy(args.policy));

    let content = read(&args.input)?;
    let envelope = backend.encrypt(&args.from, &args.to, &content).await?;
    info!(
        recipients = envelope.recipient_count(),
        cipher = %envelope.cipher(),
        "built envelope"
    );

    let bytes = if args.der {
        envelope.to_der().to_vec()
    } else {
        envelope.to_smime()?
    };

    match &args.output_file {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout().lock().write_all(&bytes)?,
    }
    Ok(())
}
