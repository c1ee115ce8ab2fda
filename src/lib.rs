//! SPV core: chain navigation and address conversion for a lightweight client
//!
//! This crate provides the validation building blocks of an SPV wallet:
//! - Positional chain queries over checkpoint-anchored block storage
//! - Retarget-style windows of consecutive blocks
//! - Base58Check (P2PKH, P2SH) address encoding and decoding
//! - Bech32 SegWit v0 (P2WPKH, P2WSH) address encoding and decoding
//! - Network parameter presets and JSON-loaded custom networks
//!
//! # Example
//!
//! ```rust
//! use spv_core::network::Network;
//! use spv_core::wallet::{AddressConverter, AddressType};
//!
//! let converter = AddressConverter::for_network(Network::Testnet).unwrap();
//!
//! let address = converter
//!     .convert_address_to_hash("msGCb97sW9s9Mt7gN5m7TGmwLqhqGaFqYz")
//!     .unwrap();
//! assert_eq!(address.address_type(), AddressType::PubKeyHash);
//!
//! let segwit = converter
//!     .convert_hash_to_address(address.key_hash(), AddressType::WitnessV0KeyHash)
//!     .unwrap();
//! println!("SegWit address: {}", segwit);
//! ```

pub mod cli;
pub mod core;
pub mod crypto;
pub mod network;
pub mod storage;
pub mod wallet;

// Re-export commonly used types
pub use core::{Block, BlockHash, ChainNavigator, NavigationError};
pub use network::{Network, NetworkParameters, ParamsError};
pub use storage::{BlockStorage, Checkpoint, MemoryStorage, StorageError};
pub use wallet::{Address, AddressConverter, AddressType, ConversionError};
