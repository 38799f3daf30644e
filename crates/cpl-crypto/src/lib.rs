//! Cryptographic primitives for the Compliance Proof Ledger.
//!
//! Provides domain-separated BLAKE3 hashing, Ed25519 signing/verification,
//! and TOML key files for persisting account keypairs.
//!
//! Everything here wraps established libraries; there is no custom
//! cryptography.

pub mod hasher;
pub mod keyfile;
pub mod signer;

pub use hasher::DigestHasher;
pub use keyfile::{generate_keypair, load_keypair, KeyFile, KeyFileError};
pub use signer::{Keypair, Signature, SignatureError, VerifyingKey};
