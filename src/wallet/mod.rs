//! Wallet module for address encoding and decoding

pub mod address;

pub use address::{
    Address, AddressConverter, AddressType, ConversionError, KEY_HASH_LEN, SCRIPT_PROGRAM_LEN,
};
