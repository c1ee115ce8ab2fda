//! Block snapshots used for chain navigation
//!
//! A block is identified by its height and its 32-byte header hash.
//! Blocks handed out by storage are immutable value snapshots.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of a block header hash in bytes
pub const BLOCK_HASH_LEN: usize = 32;

/// Errors raised while parsing a block hash
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockHashError {
    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("Invalid hash length: {0} bytes (expected 32)")]
    InvalidLength(usize),
}

/// A 32-byte block header hash
///
/// Bytes are kept in internal (wire) order. The textual form is the
/// byte-reversed hex string used by block explorers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockHash([u8; BLOCK_HASH_LEN]);

impl BlockHash {
    pub const fn from_bytes(bytes: [u8; BLOCK_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Reversed hex, the display form of a header hash
    pub fn reversed_hex(&self) -> String {
        let mut bytes = self.0;
        bytes.reverse();
        hex::encode(bytes)
    }

    /// Parse the reversed-hex display form
    pub fn from_reversed_hex(s: &str) -> Result<Self, BlockHashError> {
        let mut bytes = hex::decode(s)?;
        if bytes.len() != BLOCK_HASH_LEN {
            return Err(BlockHashError::InvalidLength(bytes.len()));
        }
        bytes.reverse();
        let mut out = [0u8; BLOCK_HASH_LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reversed_hex())
    }
}

impl fmt::Debug for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHash({})", self.reversed_hex())
    }
}

impl FromStr for BlockHash {
    type Err = BlockHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reversed_hex(s)
    }
}

impl Serialize for BlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.reversed_hex())
    }
}

impl<'de> Deserialize<'de> for BlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_reversed_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A block as seen by the navigation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Block height
    pub height: u32,
    /// Hash of this block's header
    pub header_hash: BlockHash,
    /// Hash of the previous block's header
    pub previous_header_hash: BlockHash,
    /// Header timestamp (Unix seconds)
    pub timestamp: u32,
}

impl Block {
    pub fn new(
        height: u32,
        header_hash: BlockHash,
        previous_header_hash: BlockHash,
        timestamp: u32,
    ) -> Self {
        Self {
            height,
            header_hash,
            previous_header_hash,
            timestamp,
        }
    }

    /// Header hash in reversed-hex display form
    pub fn header_hash_reversed_hex(&self) -> String {
        self.header_hash.reversed_hex()
    }

    /// Header timestamp as a UTC date
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(i64::from(self.timestamp), 0).single()
    }

    /// Check that this block directly follows `previous`
    pub fn extends(&self, previous: &Block) -> bool {
        previous.height.checked_add(1) == Some(self.height)
            && self.previous_header_hash == previous.header_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(byte: u8) -> BlockHash {
        BlockHash::from_bytes([byte; BLOCK_HASH_LEN])
    }

    #[test]
    fn test_reversed_hex_display() {
        let mut bytes = [0u8; BLOCK_HASH_LEN];
        bytes[0] = 0x01;
        bytes[31] = 0xff;
        let hash = BlockHash::from_bytes(bytes);

        let display = hash.to_string();
        assert!(display.starts_with("ff"));
        assert!(display.ends_with("01"));
        assert_eq!(display.parse::<BlockHash>().unwrap(), hash);
    }

    #[test]
    fn test_invalid_hash_length() {
        assert_eq!(
            BlockHash::from_reversed_hex("abcd"),
            Err(BlockHashError::InvalidLength(2))
        );
        assert!(matches!(
            BlockHash::from_reversed_hex("zz"),
            Err(BlockHashError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_extends() {
        let parent = Block::new(2016, hash(1), hash(0), 1_000);
        let child = Block::new(2017, hash(2), hash(1), 1_600);
        let stranger = Block::new(2017, hash(3), hash(9), 1_600);
        let skipped = Block::new(2018, hash(4), hash(1), 2_200);

        assert!(child.extends(&parent));
        assert!(!stranger.extends(&parent));
        assert!(!skipped.extends(&parent));
    }

    #[test]
    fn test_block_json_uses_display_hashes() {
        let block = Block::new(7, hash(0xab), hash(0xcd), 1_231_006_505);
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains(&"ab".repeat(32)));

        let decoded: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.time().unwrap().timestamp(), 1_231_006_505);
    }
}
