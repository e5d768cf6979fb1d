//! `sealmail fingerprint` - Inspect certificates.

use anyhow::{Context as _, Result};
use colored::Colorize;
use sealmail::Certificate;
use serde::Serialize;

use super::{read, Context};
use crate::cli::args::FingerprintArgs;
use crate::output::print_json;

#[derive(Serialize)]
struct CertificateReport {
    path: String,
    fingerprint: String,
    subject: String,
    addresses: Vec<String>,
    not_before: String,
    not_after: String,
}

pub fn execute(ctx: &Context, args: &FingerprintArgs) -> Result<()> {
    let mut reports = Vec::with_capacity(args.certificates.len());
    for path in &args.certificates {
        let certificate = Certificate::from_pem(read(path)?)
            .with_context(|| format!("parsing {}", path.display()))?;
        let (not_before, not_after) = certificate.validity();
        reports.push(CertificateReport {
            path: path.display().to_string(),
            fingerprint: certificate.fingerprint(),
            subject: certificate.subject().to_string(),
            addresses: certificate.email_addresses().to_vec(),
            not_before: not_before.to_rfc3339(),
            not_after: not_after.to_rfc3339(),
        });
    }

    if ctx.is_json() {
        return print_json(&reports);
    }

    for report in &reports {
        println!("{}", report.path.bold());
        println!("  {} {}", "Fingerprint:".bold(), report.fingerprint.cyan());
        println!("  {} {}", "Subject:".bold(), report.subject);
        if report.addresses.is_empty() {
            println!("  {} {}", "Addresses:".bold(), "none".dimmed());
        } else {
            println!("  {} {}", "Addresses:".bold(), report.addresses.join(", "));
        }
        println!(
            "  {} {} .. {}",
            "Valid:".bold(),
            report.not_before,
            report.not_after
        );
    }
    Ok(())
}
