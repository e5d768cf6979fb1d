//! Email address canonicalization.
//!
//! Every address that reaches the resolver, the analyzer or the stores goes
//! through [`canonical_address`] so set semantics hold regardless of display
//! names, surrounding whitespace or case.

use crate::error::{Result, SealError};

/// Reduce an address (optionally `Display Name <addr>`) to its canonical form.
///
/// Strips the display name and angle brackets, trims whitespace and
/// ASCII-lowercases the result.
///
/// # Errors
///
/// Returns `SealError::InvalidInput` if the address is empty or does not
/// have a non-empty local part and domain around a single `@`.
pub fn canonical_address(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SealError::invalid("address must not be empty"));
    }

    let bare = match (trimmed.rfind('<'), trimmed.ends_with('>')) {
        (Some(start), true) => trimmed[start + 1..trimmed.len() - 1].trim(),
        _ => trimmed,
    };

    match bare.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !bare.contains(char::is_whitespace) =>
        {
            Ok(bare.to_ascii_lowercase())
        }
        _ => Err(SealError::invalid(format!("malformed address: {raw:?}"))),
    }
}
