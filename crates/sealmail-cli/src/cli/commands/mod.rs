//! Command implementations.

pub mod analyze;
pub mod encrypt;
pub mod fingerprint;
pub mod identities;
pub mod open;
pub mod send;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use sealmail::{IdentityManifest, MemoryIdentityStore, Policy};

use super::args::PolicyArgs;
use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration
    pub config: Config,

    /// Manifest path given on the command line
    pub identities: Option<PathBuf>,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Identity manifest location, command line first.
    pub fn manifest_path(&self) -> Result<PathBuf> {
        match &self.identities {
            Some(path) => Ok(path.clone()),
            None => self.config.identities_path(),
        }
    }

    /// Load the identity manifest into a store.
    pub fn store(&self) -> Result<MemoryIdentityStore> {
        let path = self.manifest_path()?;
        IdentityManifest::load(&path)
            .and_then(IdentityManifest::into_store)
            .with_context(|| format!("loading identities from {}", path.display()))
    }

    /// Config policy with command-line overrides applied.
    pub fn policy(&self, args: PolicyArgs) -> Policy {
        args.apply(self.config.policy)
    }

    pub const fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }
}

pub(crate) fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}
