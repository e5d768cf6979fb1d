//! Command-line argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sealmail::Policy;

use crate::output::OutputFormat;

/// Encrypting S/MIME mail delivery
///
/// Recipients with a valid certificate get one signed and encrypted message;
/// everyone else gets a plaintext copy only when the policy allows it.
#[derive(Parser, Debug)]
#[command(name = "sealmail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: platform config directory)
    #[arg(short, long, env = "SEALMAIL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Identity manifest, overriding the config file
    #[arg(short, long, env = "SEALMAIL_IDENTITIES", global = true)]
    pub identities: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show fingerprint, addresses and validity of certificates
    Fingerprint(FingerprintArgs),

    /// List the identities in the manifest
    Identities,

    /// Show which recipients can receive encrypted mail
    Analyze(AnalyzeArgs),

    /// Sign and encrypt a MIME entity without sending it
    Encrypt(EncryptArgs),

    /// Decrypt an envelope and verify its signature
    Open(OpenArgs),

    /// Send a message through the configured transport
    Send(SendArgs),
}

// ============================================================================
// Shared argument groups
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct RecipientArgs {
    /// Primary recipients (repeat or comma-separate)
    #[arg(long, value_delimiter = ',')]
    pub to: Vec<String>,

    /// Carbon-copy recipients
    #[arg(long, value_delimiter = ',')]
    pub cc: Vec<String>,

    /// Blind recipients
    #[arg(long, value_delimiter = ',')]
    pub bcc: Vec<String>,
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PolicyArgs {
    /// Enforce identity validity windows
    #[arg(long)]
    pub validate_dates: bool,

    /// Send a plaintext copy to recipients without a valid identity
    #[arg(long)]
    pub plaintext_fallback: bool,
}

impl PolicyArgs {
    /// Flags only ever switch checks on; they never relax the config.
    pub const fn apply(self, mut policy: Policy) -> Policy {
        if self.validate_dates {
            policy.validate_dates = true;
        }
        if self.plaintext_fallback {
            policy.plaintext_fallback = true;
        }
        policy
    }
}

// ============================================================================
// Fingerprint command
// ============================================================================

#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// PEM certificate files
    #[arg(required = true)]
    pub certificates: Vec<PathBuf>,
}

// ============================================================================
// Analyze command
// ============================================================================

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub recipients: RecipientArgs,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

// ============================================================================
// Encrypt / open commands
// ============================================================================

#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Sender address; must resolve to exactly one identity with a key
    #[arg(long)]
    pub from: String,

    /// Recipient addresses
    #[arg(long, required = true, value_delimiter = ',')]
    pub to: Vec<String>,

    /// MIME entity to sign and encrypt
    #[arg(long)]
    pub input: PathBuf,

    /// Write here instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Emit raw DER instead of an S/MIME entity
    #[arg(long)]
    pub der: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Recipient certificate (PEM)
    #[arg(long)]
    pub cert: PathBuf,

    /// Recipient private key (PEM)
    #[arg(long)]
    pub key: PathBuf,

    /// Trusted sender certificates (PEM)
    #[arg(long, required = true)]
    pub trust: Vec<PathBuf>,

    /// Envelope: DER, S/MIME entity or a whole message
    #[arg(long)]
    pub input: PathBuf,
}

// ============================================================================
// Send command
// ============================================================================

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Sender mailbox
    #[arg(long)]
    pub from: String,

    #[command(flatten)]
    pub recipients: RecipientArgs,

    /// Subject line
    #[arg(short, long, default_value = "")]
    pub subject: String,

    /// Plain-text body
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// Read the plain-text body from a file
    #[arg(long)]
    pub body_file: Option<PathBuf>,

    /// Read an HTML alternative from a file
    #[arg(long)]
    pub html_file: Option<PathBuf>,

    /// Reply-To mailbox
    #[arg(long)]
    pub reply_to: Option<String>,

    /// Drop unencryptable recipients and transport failures instead of failing
    #[arg(long)]
    pub fail_silently: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}
