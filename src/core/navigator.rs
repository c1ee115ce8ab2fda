//! Chain window navigation
//!
//! Answers positional history queries ("the block N steps back", "the N
//! blocks before this one") against an injected [`BlockStorage`]. Used by
//! retarget and other window-based consensus checks.
//!
//! Nothing is cached between calls: a reorganization can change which
//! block sits at a height, and the store owns that invalidation.

use thiserror::Error;

use crate::core::Block;
use crate::storage::{BlockStorage, StorageError};

/// Navigation errors
///
/// A missing block is not an error; it comes back as `Ok(None)`.
#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Block count must be at least 1")]
    ZeroCount,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Positional queries over a stored chain
#[derive(Debug, Clone)]
pub struct ChainNavigator<S> {
    storage: S,
}

impl<S: BlockStorage> ChainNavigator<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying store
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Block `count` heights below `block`
    ///
    /// Returns `None` when nothing is stored there, including when the
    /// height would fall before the checkpoint or below zero.
    pub fn previous(&self, block: &Block, count: u32) -> Result<Option<Block>, NavigationError> {
        if count == 0 {
            return Err(NavigationError::ZeroCount);
        }

        let height = match block.height.checked_sub(count) {
            Some(height) => height,
            None => return Ok(None),
        };

        Ok(self.storage.block_at_height(height)?)
    }

    /// The `count` blocks directly below `block`, lowest first
    ///
    /// Covers heights `height - count ..= height - 1`. All or nothing: if
    /// the store cannot supply that exact contiguous range the whole
    /// window is `None`.
    pub fn previous_window(
        &self,
        block: &Block,
        count: u32,
    ) -> Result<Option<Vec<Block>>, NavigationError> {
        if count == 0 {
            return Err(NavigationError::ZeroCount);
        }

        let low = match block.height.checked_sub(count) {
            Some(low) => low,
            None => return Ok(None),
        };
        let high = block.height - 1;

        let blocks = self.storage.blocks_in_range(low, high, true)?;

        if blocks.len() != count as usize {
            log::debug!(
                "Incomplete window below block {}: got {} of {} blocks",
                block.height,
                blocks.len(),
                count
            );
            return Ok(None);
        }

        if !blocks.iter().zip(low..=high).all(|(b, h)| b.height == h) {
            log::debug!(
                "Non-contiguous window below block {} for heights {}..={}",
                block.height,
                low,
                high
            );
            return Ok(None);
        }

        Ok(Some(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BlockHash;
    use crate::storage::MemoryStorage;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const CHECKPOINT_HEIGHT: u32 = 2016;

    fn hash(height: u32) -> BlockHash {
        let mut bytes = [0u8; 32];
        bytes[28..].copy_from_slice(&height.to_be_bytes());
        BlockHash::from_bytes(bytes)
    }

    fn block(height: u32) -> Block {
        Block::new(height, hash(height), hash(height - 1), 1_000 + height)
    }

    /// Storage double with canned answers that records range queries
    #[derive(Default)]
    struct MockStorage {
        blocks: HashMap<u32, Block>,
        ranges: HashMap<(u32, u32, bool), Vec<Block>>,
        range_calls: Mutex<Vec<(u32, u32, bool)>>,
        unavailable: bool,
    }

    impl MockStorage {
        fn with_blocks(heights: &[u32]) -> Self {
            Self {
                blocks: heights.iter().map(|&h| (h, block(h))).collect(),
                ..Default::default()
            }
        }

        fn stub_range(&mut self, low: u32, high: u32, blocks: Vec<Block>) {
            self.ranges.insert((low, high, true), blocks);
        }

        fn range_calls(&self) -> Vec<(u32, u32, bool)> {
            self.range_calls.lock().unwrap().clone()
        }
    }

    impl BlockStorage for MockStorage {
        fn block_at_height(&self, height: u32) -> Result<Option<Block>, StorageError> {
            if self.unavailable {
                return Err(StorageError::Unavailable("backend offline".to_string()));
            }
            Ok(self.blocks.get(&height).cloned())
        }

        fn blocks_in_range(
            &self,
            low: u32,
            high: u32,
            ascending: bool,
        ) -> Result<Vec<Block>, StorageError> {
            self.range_calls.lock().unwrap().push((low, high, ascending));
            if self.unavailable {
                return Err(StorageError::Unavailable("backend offline".to_string()));
            }
            Ok(self
                .ranges
                .get(&(low, high, ascending))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn stored_chain() -> MockStorage {
        MockStorage::with_blocks(&[2016, 2017, 2018, 2019])
    }

    #[test]
    fn test_previous() {
        let navigator = ChainNavigator::new(stored_chain());

        let previous = navigator.previous(&block(2019), 1).unwrap();
        assert_eq!(
            previous.map(|b| b.header_hash_reversed_hex()),
            Some(block(2018).header_hash_reversed_hex())
        );

        let previous = navigator.previous(&block(2019), 3).unwrap();
        assert_eq!(previous, Some(block(2016)));
    }

    #[test]
    fn test_no_previous_for_checkpoint() {
        let navigator = ChainNavigator::new(stored_chain());

        assert_eq!(navigator.previous(&block(CHECKPOINT_HEIGHT), 1).unwrap(), None);
        assert_eq!(navigator.previous(&block(2019), 4).unwrap(), None);
    }

    #[test]
    fn test_previous_does_not_underflow() {
        let navigator = ChainNavigator::new(stored_chain());
        let genesis = Block::new(0, hash(0), BlockHash::default(), 0);

        assert_eq!(navigator.previous(&genesis, 1).unwrap(), None);
        assert_eq!(navigator.previous(&block(5), u32::MAX).unwrap(), None);
    }

    #[test]
    fn test_zero_count_is_rejected() {
        let navigator = ChainNavigator::new(stored_chain());

        assert!(matches!(
            navigator.previous(&block(2019), 0),
            Err(NavigationError::ZeroCount)
        ));
        assert!(matches!(
            navigator.previous_window(&block(2019), 0),
            Err(NavigationError::ZeroCount)
        ));
        assert!(navigator.storage().range_calls().is_empty());
    }

    #[test]
    fn test_previous_window() {
        let mut storage = stored_chain();
        storage.stub_range(2016, 2017, vec![block(2016), block(2017)]);
        let navigator = ChainNavigator::new(storage);

        let window = navigator.previous_window(&block(2018), 2).unwrap();

        assert_eq!(navigator.storage().range_calls(), vec![(2016, 2017, true)]);
        assert_eq!(
            window.map(|w| w.iter().map(|b| b.header_hash_reversed_hex()).collect::<Vec<_>>()),
            Some(vec![
                block(2016).header_hash_reversed_hex(),
                block(2017).header_hash_reversed_hex()
            ])
        );
    }

    #[test]
    fn test_no_previous_window_when_short() {
        let mut storage = stored_chain();
        storage.stub_range(2015, 2017, vec![block(2016), block(2017)]);
        let navigator = ChainNavigator::new(storage);

        let window = navigator.previous_window(&block(2018), 3).unwrap();

        assert_eq!(navigator.storage().range_calls(), vec![(2015, 2017, true)]);
        assert_eq!(window, None);
    }

    #[test]
    fn test_no_previous_window_when_not_contiguous() {
        let mut storage = stored_chain();
        storage.stub_range(2016, 2018, vec![block(2016), block(2016), block(2018)]);
        let navigator = ChainNavigator::new(storage);

        assert_eq!(navigator.previous_window(&block(2019), 3).unwrap(), None);
    }

    #[test]
    fn test_no_previous_window_when_descending() {
        let mut storage = stored_chain();
        storage.stub_range(2016, 2017, vec![block(2017), block(2016)]);
        let navigator = ChainNavigator::new(storage);

        assert_eq!(navigator.previous_window(&block(2018), 2).unwrap(), None);
    }

    #[test]
    fn test_window_missing_lowest_height() {
        // Only heights 2015..=2017 are stored
        let storage = MemoryStorage::new(block(2015));
        storage.insert(block(2016)).unwrap();
        storage.insert(block(2017)).unwrap();
        let navigator = ChainNavigator::new(&storage);

        assert_eq!(navigator.previous_window(&block(2017), 3).unwrap(), None);
        assert_eq!(
            navigator.previous_window(&block(2017), 2).unwrap(),
            Some(vec![block(2015), block(2016)])
        );
    }

    #[test]
    fn test_previous_matches_height_arithmetic() {
        let storage = MemoryStorage::new(block(CHECKPOINT_HEIGHT));
        for height in CHECKPOINT_HEIGHT + 1..=CHECKPOINT_HEIGHT + 30 {
            storage.insert(block(height)).unwrap();
        }
        let navigator = ChainNavigator::new(&storage);

        for count in 1..=10 {
            for height in CHECKPOINT_HEIGHT + count..=CHECKPOINT_HEIGHT + 30 {
                let previous = navigator.previous(&block(height), count).unwrap();
                assert_eq!(previous.map(|b| b.height), Some(height - count));

                let window = navigator.previous_window(&block(height), count).unwrap();
                let heights: Vec<u32> = window.unwrap().iter().map(|b| b.height).collect();
                assert_eq!(heights, (height - count..height).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_storage_fault_is_propagated() {
        let storage = MockStorage {
            unavailable: true,
            ..stored_chain()
        };
        let navigator = ChainNavigator::new(storage);

        assert!(matches!(
            navigator.previous(&block(2019), 1),
            Err(NavigationError::Storage(StorageError::Unavailable(_)))
        ));
        assert!(matches!(
            navigator.previous_window(&block(2019), 2),
            Err(NavigationError::Storage(StorageError::Unavailable(_)))
        ));
    }
}
