//! CLI commands for address conversion and chain navigation
//!
//! Implements all command handlers for the CLI interface.

use crate::core::{Block, ChainNavigator};
use crate::network::{Network, NetworkParameters};
use crate::storage::{BlockStorage, MemoryStorage};
use crate::wallet::{Address, AddressConverter, AddressType};
use secp256k1::PublicKey;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Resolve network parameters from the command line
///
/// A parameters file takes precedence over the named network.
pub fn load_params(
    network: Network,
    params_file: Option<&Path>,
) -> CliResult<NetworkParameters> {
    match params_file {
        Some(path) => {
            log::info!("Loading network parameters from {:?}", path);
            Ok(NetworkParameters::load(path)?)
        }
        None => Ok(network.params()),
    }
}

/// Decode an address into its key hash
pub fn cmd_decode(params: NetworkParameters, address: &str) -> CliResult<()> {
    let converter = AddressConverter::new(params)?;
    let decoded = converter.convert_address_to_hash(address)?;

    println!("🔎 Address decoded on {}", converter.params().name);
    print_address(&decoded);

    Ok(())
}

/// Encode a key hash as an address
pub fn cmd_encode(
    params: NetworkParameters,
    hash_hex: &str,
    address_type: AddressType,
) -> CliResult<()> {
    let converter = AddressConverter::new(params)?;
    let hash = hex::decode(hash_hex.trim())?;
    let encoded = converter.convert_hash_to_address(&hash, address_type)?;

    println!("🏷️  Address encoded on {}", converter.params().name);
    print_address(&encoded);

    Ok(())
}

/// Derive an address from a compressed or uncompressed public key
pub fn cmd_pubkey(
    params: NetworkParameters,
    key_hex: &str,
    address_type: AddressType,
) -> CliResult<()> {
    let converter = AddressConverter::new(params)?;
    let key_bytes = hex::decode(key_hex.trim())?;
    let public_key = PublicKey::from_slice(&key_bytes)?;
    let address = converter.convert_public_key(&public_key, address_type)?;

    println!("🔑 Address derived on {}", converter.params().name);
    println!("   Public key: {}", hex::encode(public_key.serialize()));
    print_address(&address);

    Ok(())
}

/// Show the block `count` heights below `height`
pub fn cmd_previous(chain: &Path, height: u32, count: u32) -> CliResult<()> {
    let storage = MemoryStorage::load(chain)?;
    let block = stored_block(&storage, height)?;
    let navigator = ChainNavigator::new(&storage);

    match navigator.previous(&block, count)? {
        Some(previous) => {
            println!("⏪ {} block(s) before {}:", count, height);
            print_block(&previous, "└─");
        }
        None => {
            println!("📭 No block stored {} height(s) below {}", count, height);
        }
    }

    Ok(())
}

/// Show the `count` blocks directly below `height`
pub fn cmd_window(chain: &Path, height: u32, count: u32) -> CliResult<()> {
    let storage = MemoryStorage::load(chain)?;
    let block = stored_block(&storage, height)?;
    let navigator = ChainNavigator::new(&storage);

    match navigator.previous_window(&block, count)? {
        Some(window) => {
            println!("🪟 Window of {} block(s) below {}:", window.len(), height);
            for (i, b) in window.iter().enumerate() {
                let branch = if i + 1 == window.len() { "└─" } else { "├─" };
                print_block(b, branch);
            }
        }
        None => {
            println!(
                "📭 Storage cannot supply {} contiguous block(s) below {}",
                count, height
            );
            println!("   Checkpoint is at height {}", storage.checkpoint().height());
        }
    }

    Ok(())
}

fn stored_block(storage: &MemoryStorage, height: u32) -> CliResult<Block> {
    storage
        .block_at_height(height)?
        .ok_or_else(|| format!("No block stored at height {}", height).into())
}

fn print_address(address: &Address) {
    println!("   ├─ Address: {}", address);
    println!("   ├─ Type: {}", address.address_type());
    println!("   ├─ Key hash: {}", hex::encode(address.key_hash()));
    println!("   └─ Script: {}", hex::encode(address.script_pubkey()));
}

fn print_block(block: &Block, branch: &str) {
    let time = block
        .time()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "   {} #{} {} ({})",
        branch,
        block.height,
        block.header_hash_reversed_hex(),
        time
    );
}
