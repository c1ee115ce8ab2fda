//! Block lookup contract consumed by chain navigation
//!
//! Storage backends only need to answer two read queries: a single
//! block by height and a height range. Absence is a normal outcome and
//! is reported as `Ok(None)` or a short range, never as an error.

use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::core::Block;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Block height {height} is below the checkpoint at {checkpoint}")]
    BelowCheckpoint { height: u32, checkpoint: u32 },
    #[error("Checkpoint mismatch at height {height}: expected {expected}, got {got}")]
    CheckpointMismatch {
        height: u32,
        expected: String,
        got: String,
    },
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Read access to stored blocks by height
///
/// Implementations must be thread-safe so one store can back several
/// navigators at once.
pub trait BlockStorage: Send + Sync {
    /// Block at the given height, if stored
    fn block_at_height(&self, height: u32) -> Result<Option<Block>, StorageError>;

    /// Stored blocks with heights in `low..=high`
    ///
    /// May return fewer blocks than the range spans. Blocks are ordered
    /// by height, ascending or descending as requested.
    fn blocks_in_range(
        &self,
        low: u32,
        high: u32,
        ascending: bool,
    ) -> Result<Vec<Block>, StorageError>;
}

impl<S: BlockStorage + ?Sized> BlockStorage for &S {
    fn block_at_height(&self, height: u32) -> Result<Option<Block>, StorageError> {
        (**self).block_at_height(height)
    }

    fn blocks_in_range(
        &self,
        low: u32,
        high: u32,
        ascending: bool,
    ) -> Result<Vec<Block>, StorageError> {
        (**self).blocks_in_range(low, high, ascending)
    }
}

impl<S: BlockStorage + ?Sized> BlockStorage for Arc<S> {
    fn block_at_height(&self, height: u32) -> Result<Option<Block>, StorageError> {
        (**self).block_at_height(height)
    }

    fn blocks_in_range(
        &self,
        low: u32,
        high: u32,
        ascending: bool,
    ) -> Result<Vec<Block>, StorageError> {
        (**self).blocks_in_range(low, high, ascending)
    }
}
