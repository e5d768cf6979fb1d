//! Bridges from sealmail-core values to OpenSSL handles.

use openssl::ec::EcKey;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::X509;
use sealmail_core::{Certificate, ContentCipher, KeyFormat, PrivateKey};

use crate::error::CryptoError;

pub fn x509(certificate: &Certificate) -> Result<X509, CryptoError> {
    Ok(X509::from_der(certificate.der())?)
}

pub fn pkey(key: &PrivateKey) -> Result<PKey<Private>, CryptoError> {
    let der = key.der();
    let loaded = match key.format() {
        KeyFormat::Pkcs8 => PKey::private_key_from_pkcs8(der),
        KeyFormat::Pkcs1 => Rsa::private_key_from_der(der).and_then(PKey::from_rsa),
        KeyFormat::Sec1 => EcKey::private_key_from_der(der).and_then(PKey::from_ec_key),
    };
    loaded.map_err(CryptoError::Key)
}

/// Load a key and check it belongs to `certificate`.
pub fn key_pair(
    certificate: &Certificate,
    key: &PrivateKey,
) -> Result<(X509, PKey<Private>), CryptoError> {
    let cert = x509(certificate)?;
    let pkey = pkey(key)?;
    if !cert.public_key()?.public_eq(&pkey) {
        return Err(CryptoError::KeyMismatch(certificate.fingerprint()));
    }
    Ok((cert, pkey))
}

pub fn cipher(cipher: ContentCipher) -> Cipher {
    match cipher {
        ContentCipher::Aes128Cbc => Cipher::aes_128_cbc(),
        ContentCipher::Aes192Cbc => Cipher::aes_192_cbc(),
        ContentCipher::Aes256Cbc => Cipher::aes_256_cbc(),
        ContentCipher::DesEde3Cbc => Cipher::des_ede3_cbc(),
    }
}

/// Rewrite bare `\n` line endings as `\r\n`, the canonical form signatures
/// are computed over.
pub fn canonical_crlf(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + content.len() / 32);
    let mut prev = 0u8;
    for &b in content {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crlf_canonicalization_is_idempotent() {
        assert_eq!(canonical_crlf(b"a\nb\r\nc"), b"a\r\nb\r\nc");
        assert_eq!(canonical_crlf(b"a\r\nb\r\n"), b"a\r\nb\r\n");
        assert_eq!(canonical_crlf(b"\n\n"), b"\r\n\r\n");
        assert!(canonical_crlf(b"").is_empty());
    }
}
