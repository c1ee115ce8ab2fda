//! Address conversion
//!
//! Converts between address strings and `(key hash, address type)` pairs
//! for one network:
//! - Base58Check legacy addresses (pay-to-pubkey-hash, pay-to-script-hash)
//! - Bech32 SegWit v0 addresses (P2WPKH with 20-byte, P2WSH with 32-byte programs)
//!
//! Every failure is classified into a [`ConversionError`] so callers can
//! branch on the exact reason an address was refused.

use bech32::primitives::decode::{CheckedHrpstring, SegwitHrpstring, SegwitHrpstringError};
use bech32::{segwit, Bech32, Bech32m, Fe32, Hrp};
use secp256k1::PublicKey;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::crypto::{checksum, hash160, CHECKSUM_LEN};
use crate::network::{Network, NetworkParameters, ParamsError};

// =============================================================================
// Constants
// =============================================================================

/// Length of a public key hash or script hash
pub const KEY_HASH_LEN: usize = 20;

/// Length of a SegWit v0 script hash program
pub const SCRIPT_PROGRAM_LEN: usize = 32;

/// Shortest Base58Check address string accepted
pub const MIN_BASE58_ADDRESS_LEN: usize = 26;

/// Longest Base58Check address string accepted
pub const MAX_BASE58_ADDRESS_LEN: usize = 35;

// Script opcodes used by standard locking scripts
const OP_0: u8 = 0x00;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;

// =============================================================================
// Errors
// =============================================================================

/// Address conversion errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionError {
    #[error("Invalid address length")]
    InvalidAddressLength,
    #[error("Invalid address checksum")]
    InvalidChecksum,
    #[error("Address prefix does not match the network")]
    WrongAddressPrefix,
    #[error("Unknown address type")]
    UnknownAddressType,
}

// =============================================================================
// Address Type
// =============================================================================

/// Kinds of address the converter understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Base58Check pay-to-pubkey-hash
    PubKeyHash,
    /// Base58Check pay-to-script-hash
    ScriptHash,
    /// SegWit v0 pay-to-witness-pubkey-hash
    WitnessV0KeyHash,
    /// SegWit v0 pay-to-witness-script-hash
    WitnessV0ScriptHash,
    /// Placeholder for an unsupported type; never produced by decoding
    Unknown,
}

impl AddressType {
    /// Required key hash length, `None` for `Unknown`
    pub fn key_hash_len(&self) -> Option<usize> {
        match self {
            AddressType::PubKeyHash | AddressType::ScriptHash | AddressType::WitnessV0KeyHash => {
                Some(KEY_HASH_LEN)
            }
            AddressType::WitnessV0ScriptHash => Some(SCRIPT_PROGRAM_LEN),
            AddressType::Unknown => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AddressType::PubKeyHash => "p2pkh",
            AddressType::ScriptHash => "p2sh",
            AddressType::WitnessV0KeyHash => "p2wpkh",
            AddressType::WitnessV0ScriptHash => "p2wsh",
            AddressType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AddressType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "p2pkh" | "pubkeyhash" => Ok(AddressType::PubKeyHash),
            "p2sh" | "scripthash" => Ok(AddressType::ScriptHash),
            "p2wpkh" => Ok(AddressType::WitnessV0KeyHash),
            "p2wsh" => Ok(AddressType::WitnessV0ScriptHash),
            "unknown" => Ok(AddressType::Unknown),
            _ => Err(ConversionError::UnknownAddressType),
        }
    }
}

// =============================================================================
// Address
// =============================================================================

/// A fully validated address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    address_type: AddressType,
    key_hash: Vec<u8>,
    string_value: String,
}

impl Address {
    fn new(address_type: AddressType, key_hash: Vec<u8>, string_value: String) -> Self {
        Self {
            address_type,
            key_hash,
            string_value,
        }
    }

    pub fn address_type(&self) -> AddressType {
        self.address_type
    }

    /// Raw key hash or witness program
    pub fn key_hash(&self) -> &[u8] {
        &self.key_hash
    }

    /// Textual form of the address
    pub fn string_value(&self) -> &str {
        &self.string_value
    }

    /// Standard locking script paying to this address
    pub fn script_pubkey(&self) -> Vec<u8> {
        let hash = &self.key_hash;
        let mut script = Vec::with_capacity(hash.len() + 5);

        match self.address_type {
            AddressType::PubKeyHash => {
                script.extend_from_slice(&[OP_DUP, OP_HASH160, hash.len() as u8]);
                script.extend_from_slice(hash);
                script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
            }
            AddressType::ScriptHash => {
                script.extend_from_slice(&[OP_HASH160, hash.len() as u8]);
                script.extend_from_slice(hash);
                script.push(OP_EQUAL);
            }
            AddressType::WitnessV0KeyHash | AddressType::WitnessV0ScriptHash => {
                script.extend_from_slice(&[OP_0, hash.len() as u8]);
                script.extend_from_slice(hash);
            }
            AddressType::Unknown => {}
        }

        script
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value)
    }
}

// =============================================================================
// Address Converter
// =============================================================================

/// Address encoder/decoder bound to one network's parameters
#[derive(Debug, Clone)]
pub struct AddressConverter {
    params: NetworkParameters,
    hrp: Hrp,
}

impl AddressConverter {
    /// Create a converter, validating the network parameters
    pub fn new(params: NetworkParameters) -> Result<Self, ParamsError> {
        params.validate()?;
        let hrp = Hrp::parse(&params.bech32_hrp)
            .map_err(|_| ParamsError::InvalidHrp(params.bech32_hrp.clone()))?;
        Ok(Self { params, hrp })
    }

    /// Create a converter for a built-in network
    pub fn for_network(network: Network) -> Result<Self, ParamsError> {
        Self::new(network.params())
    }

    pub fn params(&self) -> &NetworkParameters {
        &self.params
    }

    /// Decode an address string into its key hash and type
    pub fn convert_address_to_hash(&self, address: &str) -> Result<Address, ConversionError> {
        let result = if self.is_own_bech32(address) {
            self.decode_segwit(address)
        } else if SegwitHrpstring::new(address).is_ok() {
            // A valid SegWit address, but for another network's prefix
            Err(ConversionError::WrongAddressPrefix)
        } else {
            self.decode_base58(address)
        };

        if let Err(e) = &result {
            log::debug!("Rejected address {} on {}: {}", address, self.params.name, e);
        }
        result
    }

    /// Encode a key hash as an address of the given type
    pub fn convert_hash_to_address(
        &self,
        hash: &[u8],
        address_type: AddressType,
    ) -> Result<Address, ConversionError> {
        if address_type.key_hash_len() != Some(hash.len()) {
            return Err(ConversionError::UnknownAddressType);
        }

        let string_value = match address_type {
            AddressType::PubKeyHash => encode_base58(self.params.pub_key_hash_version, hash),
            AddressType::ScriptHash => encode_base58(self.params.script_hash_version, hash),
            AddressType::WitnessV0KeyHash | AddressType::WitnessV0ScriptHash => {
                segwit::encode_v0(self.hrp, hash)
                    .map_err(|_| ConversionError::InvalidAddressLength)?
            }
            AddressType::Unknown => return Err(ConversionError::UnknownAddressType),
        };

        Ok(Address::new(address_type, hash.to_vec(), string_value))
    }

    /// Encode the HASH160 of a compressed public key
    ///
    /// Only key-hash types can be derived from a key; script-hash types
    /// are refused with `UnknownAddressType`.
    pub fn convert_public_key(
        &self,
        public_key: &PublicKey,
        address_type: AddressType,
    ) -> Result<Address, ConversionError> {
        match address_type {
            AddressType::PubKeyHash | AddressType::WitnessV0KeyHash => {
                let key_hash = hash160(&public_key.serialize());
                self.convert_hash_to_address(&key_hash, address_type)
            }
            _ => Err(ConversionError::UnknownAddressType),
        }
    }

    fn is_own_bech32(&self, address: &str) -> bool {
        let prefix = format!("{}1", self.params.bech32_hrp);
        address
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(&prefix))
    }

    fn decode_base58(&self, address: &str) -> Result<Address, ConversionError> {
        let len = address.chars().count();
        if !(MIN_BASE58_ADDRESS_LEN..=MAX_BASE58_ADDRESS_LEN).contains(&len) {
            return Err(ConversionError::InvalidAddressLength);
        }

        if !self.params.matches_pub_key_hash_prefix(address)
            && !self.params.matches_script_hash_prefix(address)
        {
            return Err(ConversionError::WrongAddressPrefix);
        }

        let decoded = bs58::decode(address)
            .into_vec()
            .map_err(|_| ConversionError::InvalidChecksum)?;
        if decoded.len() <= CHECKSUM_LEN {
            return Err(ConversionError::InvalidAddressLength);
        }

        let (payload, given_checksum) = decoded.split_at(decoded.len() - CHECKSUM_LEN);
        if checksum(payload).as_slice() != given_checksum {
            return Err(ConversionError::InvalidChecksum);
        }

        // Version byte followed by the key hash
        if payload.len() != 1 + KEY_HASH_LEN {
            return Err(ConversionError::InvalidAddressLength);
        }

        let address_type = match payload[0] {
            v if v == self.params.pub_key_hash_version => AddressType::PubKeyHash,
            v if v == self.params.script_hash_version => AddressType::ScriptHash,
            _ => return Err(ConversionError::WrongAddressPrefix),
        };

        Ok(Address::new(
            address_type,
            payload[1..].to_vec(),
            address.to_string(),
        ))
    }

    fn decode_segwit(&self, address: &str) -> Result<Address, ConversionError> {
        let parsed = SegwitHrpstring::new(address).map_err(|e| classify_segwit_error(address, e))?;

        if parsed.hrp().to_lowercase() != self.hrp.to_lowercase() {
            return Err(ConversionError::WrongAddressPrefix);
        }

        if parsed.witness_version() != Fe32::Q {
            return Err(ConversionError::UnknownAddressType);
        }

        let program: Vec<u8> = parsed.byte_iter().collect();
        let address_type = match program.len() {
            KEY_HASH_LEN => AddressType::WitnessV0KeyHash,
            SCRIPT_PROGRAM_LEN => AddressType::WitnessV0ScriptHash,
            _ => return Err(ConversionError::InvalidAddressLength),
        };

        Ok(Address::new(address_type, program, address.to_string()))
    }
}

fn encode_base58(version: u8, hash: &[u8]) -> String {
    let mut bytes = Vec::with_capacity(1 + hash.len() + CHECKSUM_LEN);
    bytes.push(version);
    bytes.extend_from_slice(hash);
    let check = checksum(&bytes);
    bytes.extend_from_slice(&check);
    bs58::encode(bytes).into_string()
}

fn classify_segwit_error(address: &str, error: SegwitHrpstringError) -> ConversionError {
    match error {
        SegwitHrpstringError::Checksum(_) => ConversionError::InvalidChecksum,
        // The witness version is read before the checksum is verified
        SegwitHrpstringError::InvalidWitnessVersion(_) => {
            if CheckedHrpstring::new::<Bech32>(address).is_ok()
                || CheckedHrpstring::new::<Bech32m>(address).is_ok()
            {
                ConversionError::UnknownAddressType
            } else {
                ConversionError::InvalidChecksum
            }
        }
        SegwitHrpstringError::WitnessLength(_) | SegwitHrpstringError::Padding(_) => {
            ConversionError::InvalidAddressLength
        }
        SegwitHrpstringError::Unchecked(_) => ConversionError::InvalidChecksum,
        _ => ConversionError::InvalidAddressLength,
    }
}

// =============================================================================
// Tests
// =============================================================================
