//! Network parameters for address encoding
//!
//! Mainnet, testnet and regtest presets plus custom parameters loaded
//! from JSON.

pub mod params;

pub use params::{
    matches_prefix_pattern, Network, NetworkParameters, ParamsError, MAX_BECH32_HRP_LEN,
};
