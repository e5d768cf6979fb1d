//! `sealmail open` - Decrypt an envelope and verify the sender.

use std::io::Write;

use anyhow::{Context as _, Result};
use colored::Colorize;
use sealmail::{open_envelope, open_smime, Certificate, PrivateKey};

use super::{read, Context};
use crate::cli::args::OpenArgs;
use crate::output::print_json;

/// DER `SEQUENCE` tag.
const DER_SEQUENCE: u8 = 0x30;

pub fn execute(ctx: &Context, args: &OpenArgs) -> Result<()> {
    let certificate = Certificate::from_pem(read(&args.cert)?)
        .with_context(|| format!("parsing {}", args.cert.display()))?;
    let key = PrivateKey::from_pem(read(&args.key)?)
        .with_context(|| format!("parsing {}", args.key.display()))?;
    let trusted = args
        .trust
        .iter()
        .map(|path| {
            Certificate::from_pem(read(path)?)
                .with_context(|| format!("parsing {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let input = read(&args.input)?;
    let opened = if input.first() == Some(&DER_SEQUENCE) {
        open_envelope(&input, &certificate, &key, &trusted)?
    } else {
        open_smime(&input, &certificate, &key, &trusted)?
    };

    if ctx.is_json() {
        return print_json(&serde_json::json!({
            "signers": opened.signer_fingerprints,
            "content": String::from_utf8_lossy(&opened.content),
        }));
    }

    for signer in &opened.signer_fingerprints {
        eprintln!("{} {}", "Signed by".green().bold(), signer);
    }
    std::io::stdout().lock().write_all(&opened.content)?;
    Ok(())
}
