//! Checkpoint anchoring
//!
//! A checkpoint is the earliest block a store is guaranteed to hold.
//! Nothing below it is ever stored, so history queries that reach past
//! it come back empty.

use serde::{Deserialize, Serialize};

use crate::core::{Block, BlockHash};

// =============================================================================
// Checkpoint
// =============================================================================

/// A known-good block that bounds stored history from below
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    block: Block,
}

impl Checkpoint {
    pub fn new(block: Block) -> Self {
        Self { block }
    }

    /// Checkpoint block height
    pub fn height(&self) -> u32 {
        self.block.height
    }

    /// The checkpoint block itself
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Whether a height can be stored at all
    pub fn covers(&self, height: u32) -> bool {
        height >= self.block.height
    }

    /// Check a block against the checkpoint at its height
    pub fn verify(&self, block: &Block) -> CheckpointResult {
        if block.height != self.block.height {
            return CheckpointResult::NoCheckpoint;
        }

        if block.header_hash == self.block.header_hash {
            CheckpointResult::Match
        } else {
            CheckpointResult::Mismatch {
                expected: self.block.header_hash,
                got: block.header_hash,
            }
        }
    }
}

// =============================================================================
// Checkpoint Result
// =============================================================================

/// Result of checkpoint verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointResult {
    /// Block matches the checkpoint
    Match,
    /// Block doesn't match the checkpoint
    Mismatch { expected: BlockHash, got: BlockHash },
    /// No checkpoint at this height
    NoCheckpoint,
}

// =============================================================================
// Tests
// =============================================================================
