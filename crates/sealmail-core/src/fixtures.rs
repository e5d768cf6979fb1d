//! Self-signed S/MIME certificates and keys for tests.
//!
//! Both certificates are valid 2020-01-01 to 2120-01-01 and carry their
//! address in the subject and the SAN. Enabled for dependents with the
//! `test-fixtures` feature.

use crate::types::{Certificate, Identity, PrivateKey};

pub const RECIPIENT1_CERT: &str = include_str!("../testdata/recipient1.cert.pem");
pub const RECIPIENT1_KEY: &str = include_str!("../testdata/recipient1.key.pem");
pub const RECIPIENT2_CERT: &str = include_str!("../testdata/recipient2.cert.pem");
pub const RECIPIENT2_KEY: &str = include_str!("../testdata/recipient2.key.pem");

/// SHA-1 fingerprint of [`RECIPIENT1_CERT`].
pub const RECIPIENT1_FINGERPRINT: &str =
    "0C:65:DD:C1:FF:AF:B1:BC:3A:9F:00:0F:D7:50:DA:01:D1:7E:C9:FE";

pub fn cert1() -> Certificate {
    Certificate::from_pem(RECIPIENT1_CERT).expect("recipient1 certificate fixture")
}

pub fn cert2() -> Certificate {
    Certificate::from_pem(RECIPIENT2_CERT).expect("recipient2 certificate fixture")
}

pub fn key1() -> PrivateKey {
    PrivateKey::from_pem(RECIPIENT1_KEY).expect("recipient1 key fixture")
}

pub fn key2() -> PrivateKey {
    PrivateKey::from_pem(RECIPIENT2_KEY).expect("recipient2 key fixture")
}

/// `recipient1@example.com`, receive-only.
pub fn recipient1() -> Identity {
    Identity::new(cert1()).expect("recipient1 names an address")
}

/// `recipient2@example.com`, receive-only.
pub fn recipient2() -> Identity {
    Identity::new(cert2()).expect("recipient2 names an address")
}

/// `recipient1@example.com` with its key, so it can sign.
pub fn recipient1_with_key() -> Identity {
    recipient1().with_key(key1())
}
