//! Core chain components
//!
//! This module contains:
//! - Blocks (height-indexed header snapshots)
//! - Chain navigation (previous block and consensus windows)

pub mod block;
pub mod navigator;

pub use block::{Block, BlockHash, BlockHashError, BLOCK_HASH_LEN};
pub use navigator::{ChainNavigator, NavigationError};
