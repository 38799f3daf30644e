use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Domain tag mixed into every file digest.
const FILE_DOMAIN: &[u8] = b"cpl-file-v1:";

/// Content-addressed identifier for a file.
///
/// A `FileDigest` is the BLAKE3 hash of the file's content in its lowercase
/// hex encoding, prefixed with a domain tag. The hex encoding step is part
/// of the digest contract: proofs key on the digest of the hex form, not of
/// the raw bytes.
///
/// Identical content always produces the same `FileDigest`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileDigest([u8; 32]);

impl FileDigest {
    /// Compute the digest of raw file content.
    pub fn of_content(content: &[u8]) -> Self {
        let encoded = hex::encode(content);
        let mut hasher = blake3::Hasher::new();
        hasher.update(FILE_DOMAIN);
        hasher.update(encoded.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Create a `FileDigest` from a pre-computed hash.
    pub const fn from_raw(hash: [u8; 32]) -> Self {
        Self(hash)
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string (64 hex characters).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileDigest({})", self.short_hex())
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for FileDigest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<FileDigest> for [u8; 32] {
    fn from(digest: FileDigest) -> Self {
        digest.0
    }
}

// Digests travel as hex strings on the wire.
impl Serialize for FileDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FileDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn of_content_is_deterministic() {
        let data = b"hello world";
        let d1 = FileDigest::of_content(data);
        let d2 = FileDigest::of_content(data);
        assert_eq!(d1, d2);
    }

    #[test]
    fn different_content_produces_different_digests() {
        let d1 = FileDigest::of_content(b"hello");
        let d2 = FileDigest::of_content(b"world");
        assert_ne!(d1, d2);
    }

    #[test]
    fn digest_covers_hex_encoding_not_raw_bytes() {
        // 0x01 hex-encodes to "01"; hashing the raw byte would collide
        // with hashing the ASCII bytes of "01" only by accident.
        let of_raw = FileDigest::of_content(&[0x01]);
        let of_ascii = FileDigest::of_content(b"01");
        assert_ne!(of_raw, of_ascii);
    }

    #[test]
    fn empty_content_has_a_digest() {
        let d = FileDigest::of_content(b"");
        assert_ne!(d.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn hex_roundtrip() {
        let d = FileDigest::of_content(b"test");
        let parsed = FileDigest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = FileDigest::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            FileDigest::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn short_hex_is_8_chars() {
        let d = FileDigest::of_content(b"test");
        assert_eq!(d.short_hex().len(), 8);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let d = FileDigest::of_content(b"serde test");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let parsed: FileDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(d, parsed);
    }

    proptest! {
        #[test]
        fn hex_roundtrip_any_content(content in proptest::collection::vec(any::<u8>(), 0..256)) {
            let d = FileDigest::of_content(&content);
            prop_assert_eq!(FileDigest::from_hex(&d.to_hex()).unwrap(), d);
        }
    }
}
