//! In-memory block store
//!
//! Keeps a contiguous run of blocks starting at a checkpoint, indexed by
//! height. Used by the CLI, by tests and by embedders that keep headers
//! in memory. Snapshots can be written to and read from JSON files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::block_store::{BlockStorage, StorageError};
use super::checkpoint::{Checkpoint, CheckpointResult};
use crate::core::Block;

// =============================================================================
// Chain Snapshot
// =============================================================================

/// Serializable copy of a stored chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Earliest stored block
    pub checkpoint: Block,
    /// Blocks above the checkpoint
    #[serde(default)]
    pub blocks: Vec<Block>,
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Checkpoint-anchored block store backed by a height index
#[derive(Debug)]
pub struct MemoryStorage {
    checkpoint: Checkpoint,
    by_height: RwLock<BTreeMap<u32, Block>>,
}

impl MemoryStorage {
    /// Create a store holding only the checkpoint block
    pub fn new(checkpoint: Block) -> Self {
        let mut by_height = BTreeMap::new();
        by_height.insert(checkpoint.height, checkpoint.clone());

        Self {
            checkpoint: Checkpoint::new(checkpoint),
            by_height: RwLock::new(by_height),
        }
    }

    /// Rebuild a store from a snapshot, validating every link
    pub fn from_snapshot(snapshot: ChainSnapshot) -> Result<Self, StorageError> {
        let storage = Self::new(snapshot.checkpoint);

        let mut blocks = snapshot.blocks;
        blocks.sort_by_key(|b| b.height);
        for block in blocks {
            storage.insert(block)?;
        }

        Ok(storage)
    }

    /// Copy the stored chain into a snapshot
    pub fn snapshot(&self) -> Result<ChainSnapshot, StorageError> {
        let by_height = self.read()?;
        let blocks = by_height
            .values()
            .filter(|b| b.height != self.checkpoint.height())
            .cloned()
            .collect();

        Ok(ChainSnapshot {
            checkpoint: self.checkpoint.block().clone(),
            blocks,
        })
    }

    /// Load a store from a JSON snapshot file
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Chain snapshot not found: {}",
                path.display()
            )));
        }

        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let snapshot: ChainSnapshot = serde_json::from_reader(reader)?;

        let storage = Self::from_snapshot(snapshot)?;
        log::info!(
            "Loaded chain snapshot from {} ({} blocks)",
            path.display(),
            storage.len()?
        );
        Ok(storage)
    }

    /// Save the stored chain as a JSON snapshot file
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let snapshot = self.snapshot()?;

        // Write to a temporary file first, then rename over the target
        let temp_path = path.with_extension("tmp");
        if let Err(e) = write_snapshot(&temp_path, &snapshot) {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// The checkpoint this store is anchored at
    pub fn checkpoint(&self) -> &Checkpoint {
        &self.checkpoint
    }

    /// Add a block on top of the stored chain
    ///
    /// A different block at an occupied height replaces it and drops
    /// every block above it.
    pub fn insert(&self, block: Block) -> Result<(), StorageError> {
        let checkpoint_height = self.checkpoint.height();
        if !self.checkpoint.covers(block.height) {
            log::warn!(
                "Rejected block {} below checkpoint {}",
                block.height,
                checkpoint_height
            );
            return Err(StorageError::BelowCheckpoint {
                height: block.height,
                checkpoint: checkpoint_height,
            });
        }

        match self.checkpoint.verify(&block) {
            CheckpointResult::Match => return Ok(()),
            CheckpointResult::Mismatch { expected, got } => {
                log::warn!("Rejected block conflicting with checkpoint {}", block.height);
                return Err(StorageError::CheckpointMismatch {
                    height: block.height,
                    expected: expected.to_string(),
                    got: got.to_string(),
                });
            }
            CheckpointResult::NoCheckpoint => {}
        }

        let mut by_height = self.write()?;

        if by_height.get(&block.height) == Some(&block) {
            return Ok(());
        }

        // Above the checkpoint, so the parent height cannot underflow
        let parent_height = block.height - 1;
        match by_height.get(&parent_height) {
            Some(parent) if block.extends(parent) => {}
            Some(_) => {
                log::warn!("Rejected block {} not extending its parent", block.height);
                return Err(StorageError::InvalidData(format!(
                    "Block {} does not extend block {}",
                    block.header_hash, parent_height
                )));
            }
            None => {
                return Err(StorageError::InvalidData(format!(
                    "No parent stored at height {}",
                    parent_height
                )));
            }
        }

        if by_height.contains_key(&block.height) {
            let stale = by_height.split_off(&block.height);
            log::info!(
                "Reorganized at height {}: dropped {} block(s)",
                block.height,
                stale.len()
            );
        }

        by_height.insert(block.height, block);
        Ok(())
    }

    /// Highest stored block
    pub fn tip(&self) -> Result<Block, StorageError> {
        let by_height = self.read()?;
        Ok(by_height
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(|| self.checkpoint.block().clone()))
    }

    /// Number of stored blocks, checkpoint included
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u32, Block>>, StorageError> {
        self.by_height
            .read()
            .map_err(|_| StorageError::Unavailable("block index lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u32, Block>>, StorageError> {
        self.by_height
            .write()
            .map_err(|_| StorageError::Unavailable("block index lock poisoned".to_string()))
    }
}

fn write_snapshot(path: &Path, snapshot: &ChainSnapshot) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

impl BlockStorage for MemoryStorage {
    fn block_at_height(&self, height: u32) -> Result<Option<Block>, StorageError> {
        Ok(self.read()?.get(&height).cloned())
    }

    fn blocks_in_range(
        &self,
        low: u32,
        high: u32,
        ascending: bool,
    ) -> Result<Vec<Block>, StorageError> {
        if low > high {
            return Ok(Vec::new());
        }

        let by_height = self.read()?;
        let range = by_height.range(low..=high).map(|(_, b)| b.clone());
        let blocks = if ascending {
            range.collect()
        } else {
            range.rev().collect()
        };
        Ok(blocks)
    }
}

// =============================================================================
// Tests
// =============================================================================
