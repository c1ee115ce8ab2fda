//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 and double SHA-256 hashing
//! - Base58Check checksums
//! - HASH160 for public key hashes

pub mod hash;

pub use hash::{checksum, double_sha256, hash160, sha256, CHECKSUM_LEN};
