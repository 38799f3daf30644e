//! Foundation types for the Compliance Proof Ledger (CPL).
//!
//! This crate provides the core identity and record types used throughout the
//! CPL system. Every other CPL crate depends on `cpl-types`.
//!
//! # Key Types
//!
//! - [`FileDigest`] — Content-addressed file identifier (BLAKE3 hash)
//! - [`AccountId`] — Account identity derived from an ed25519 public key
//! - [`ComplianceRecord`] — Ownership claim for a digest, minted at a block height

pub mod account;
pub mod digest;
pub mod error;
pub mod record;

pub use account::AccountId;
pub use digest::FileDigest;
pub use error::TypeError;
pub use record::ComplianceRecord;
