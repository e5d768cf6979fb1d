//! Certificate fingerprints via `ring::digest`.

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

/// Fingerprint of a certificate's DER encoding.
///
/// SHA-1 over the DER bytes, rendered as uppercase hex octets joined by
/// colons: 20 octets, 59 characters.
#[must_use]
pub fn sha1_fingerprint(der: &[u8]) -> String {
    colon_hex(digest(&SHA1_FOR_LEGACY_USE_ONLY, der).as_ref())
}

fn colon_hex(bytes: &[u8]) -> String {
    let upper = hex::encode_upper(bytes);
    let mut out = String::with_capacity(upper.len() + upper.len() / 2);
    for (i, pair) in upper.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(':');
        }
        out.push(char::from(pair[0]));
        out.push(char::from(pair[1]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha1_fingerprint_format() {
        // SHA-1("hello world")
        let fp = sha1_fingerprint(b"hello world");
        assert_eq!(
            fp,
            "2A:AE:6C:35:C9:4F:CF:B4:15:DB:E9:5F:40:8B:9C:E9:1E:E8:46:ED"
        );
        assert_eq!(fp.len(), 59);
        assert_eq!(fp.matches(':').count(), 19);
    }

    #[test]
    fn test_sha1_fingerprint_empty() {
        assert_eq!(
            sha1_fingerprint(b""),
            "DA:39:A3:EE:5E:6B:4B:0D:32:55:BF:EF:95:60:18:90:AF:D8:07:09"
        );
    }
}
