/// Domain-separated BLAKE3 hasher.
///
/// Each hasher carries a domain tag (e.g. `"cpl-tx-payload-v1"`) that is
/// prepended to every hash computation. This prevents cross-type hash
/// collisions: a transaction payload and a transaction id over identical
/// bytes produce different hashes.
pub struct DigestHasher {
    domain: &'static str,
}

impl DigestHasher {
    /// Hasher for transaction signing payloads.
    pub const TX_PAYLOAD: Self = Self {
        domain: "cpl-tx-payload-v1",
    };
    /// Hasher for transaction identifiers.
    pub const TX_ID: Self = Self {
        domain: "cpl-tx-id-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        *hasher.finalize().as_bytes()
    }

    /// Hash raw bytes and return the hex-encoded result.
    pub fn hash_hex(&self, data: &[u8]) -> String {
        hex::encode(self.hash(data))
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &[u8; 32]) -> bool {
        self.hash(data) == *expected
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}
