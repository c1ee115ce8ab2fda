//! Hashing utilities for addresses and block identifiers
//!
//! Provides the SHA-256 based digests used by Base58Check checksums
//! and the HASH160 digest used for public key hashes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a Base58Check checksum in bytes
pub const CHECKSUM_LEN: usize = 4;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
pub fn double_sha256(data: &[u8]) -> Vec<u8> {
    sha256(&sha256(data))
}

/// Base58Check checksum: the first four bytes of the double SHA-256
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = double_sha256(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash[..CHECKSUM_LEN]);
    out
}

/// Computes RIPEMD-160 of SHA-256 (HASH160)
/// Used to derive key hashes from serialized public keys
pub fn hash160(data: &[u8]) -> Vec<u8> {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(hash.len(), 32);
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_checksum_is_double_sha256_prefix() {
        let data = b"hello world";
        assert_eq!(checksum(data).as_slice(), &double_sha256(data)[..4]);
    }

    #[test]
    fn test_hash160_of_generator_point() {
        // Compressed public key for secret key 1
        let pubkey =
            hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798")
                .unwrap();
        assert_eq!(
            hex::encode(hash160(&pubkey)),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }
}
