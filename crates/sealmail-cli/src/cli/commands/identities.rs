//! `sealmail identities` - List the identity manifest.

use anyhow::Result;
use colored::Colorize;
use sealmail::IdentitySummary;
use tabled::{settings::Style, Table, Tabled};

use super::Context;
use crate::output::print_json;

#[derive(Tabled)]
struct IdentityRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
    #[tabled(rename = "Sender")]
    sender: String,
    #[tabled(rename = "Valid")]
    window: String,
}

impl From<&IdentitySummary> for IdentityRow {
    fn from(summary: &IdentitySummary) -> Self {
        let bound = |d: Option<chrono::NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
        Self {
            address: summary.address.clone(),
            fingerprint: summary.fingerprint.clone(),
            sender: if summary.sender_capable { "yes" } else { "no" }.to_string(),
            window: format!("{} .. {}", bound(summary.not_before), bound(summary.not_after)),
        }
    }
}

pub async fn execute(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let summaries: Vec<IdentitySummary> =
        store.identities().await.iter().map(sealmail::Identity::summary).collect();

    if ctx.is_json() {
        return print_json(&summaries);
    }

    if summaries.is_empty() {
        println!("{}", "No identities configured.".yellow());
        return Ok(());
    }

    let rows: Vec<IdentityRow> = summaries.iter().map(IdentityRow::from).collect();
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}
