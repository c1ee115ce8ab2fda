//! Storage module: block lookup contract and reference stores

pub mod block_store;
pub mod checkpoint;
pub mod memory;

pub use block_store::{BlockStorage, StorageError};
pub use checkpoint::{Checkpoint, CheckpointResult};
pub use memory::{ChainSnapshot, MemoryStorage};
