//! # sealmail-cli
//!
//! Command-line interface over the sealmail delivery backend.
//!
//! ## Commands
//!
//! - **fingerprint**: certificate fingerprints, addresses and validity
//! - **identities**: the identities listed in the manifest
//! - **analyze**: which recipients would get encrypted mail
//! - **encrypt** / **open**: build and open S/MIME envelopes offline
//! - **send**: run the delivery backend against the configured transport

pub mod cli;
pub mod config;
pub mod output;

pub use cli::run;
