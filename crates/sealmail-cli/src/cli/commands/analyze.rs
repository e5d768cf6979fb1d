//! `sealmail analyze` - Show how a message's recipients would be served.

use anyhow::Result;
use colored::Colorize;
use sealmail::{MailMessage, RecipientAnalyzer, ValidityFilter};
use serde::Serialize;

use super::Context;
use crate::cli::args::AnalyzeArgs;
use crate::output::print_json;

#[derive(Serialize)]
struct AnalysisReport {
    encrypting: Vec<String>,
    plaintext: Vec<String>,
    certificates: Vec<String>,
    fully_encryptable: bool,
}

pub async fn execute(ctx: &Context, args: AnalyzeArgs) -> Result<()> {
    let store = ctx.store()?;
    let policy = ctx.policy(args.policy);

    let message = MailMessage {
        to: args.recipients.to,
        cc: args.recipients.cc,
        bcc: args.recipients.bcc,
        ..MailMessage::default()
    };
    let analysis = RecipientAnalyzer::new(&store, ValidityFilter::for_policy(&policy))
        .analyze(&message)
        .await?;

    let report = AnalysisReport {
        fully_encryptable: analysis.is_fully_encryptable(),
        certificates: analysis
            .encrypting_identities
            .iter()
            .map(sealmail::Identity::fingerprint)
            .collect(),
        encrypting: analysis.encrypting_addresses.into_iter().collect(),
        plaintext: analysis.plaintext_addresses.into_iter().collect(),
    };

    if ctx.is_json() {
        return print_json(&report);
    }

    for address in &report.encrypting {
        println!("  {} {}", "encrypt".green().bold(), address);
    }
    for address in &report.plaintext {
        let action = if policy.plaintext_fallback {
            "plain".yellow().bold()
        } else {
            "refuse".red().bold()
        };
        println!("  {action} {address}");
    }
    println!(
        "\n{} certificate(s) would receive the envelope",
        report.certificates.len()
    );
    Ok(())
}
