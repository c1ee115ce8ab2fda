//! Network address parameters
//!
//! Version bytes, leading-character patterns and the Bech32 prefix that
//! tie an address to one network. Parameters are plain values: build one
//! per network and hand it to the converter that needs it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, BufReader};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Separator between alternatives in a prefix pattern (`"m|n"`)
pub const PREFIX_PATTERN_SEPARATOR: char = '|';

/// Longest Bech32 prefix that still fits a 32-byte v0 program
///
/// A SegWit string is at most 90 characters: the prefix, the `1`
/// separator, the witness version, 52 program characters and a
/// 6-character checksum.
pub const MAX_BECH32_HRP_LEN: usize = 90 - (1 + 1 + 52 + 6);

/// Parameter errors
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid bech32 human-readable part: {0}")]
    InvalidHrp(String),
    #[error("Empty prefix pattern for {0}")]
    EmptyPrefixPattern(&'static str),
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
}

/// Built-in networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    /// Address parameters for this network
    pub fn params(&self) -> NetworkParameters {
        match self {
            Network::Mainnet => NetworkParameters::mainnet(),
            Network::Testnet => NetworkParameters::testnet(),
            Network::Regtest => NetworkParameters::regtest(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            _ => Err(ParamsError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Address encoding parameters for one network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// Display name
    pub name: String,
    /// Base58Check version byte for pay-to-pubkey-hash
    pub pub_key_hash_version: u8,
    /// Base58Check version byte for pay-to-script-hash
    pub script_hash_version: u8,
    /// Leading characters of pay-to-pubkey-hash addresses, `|` separated
    pub pub_key_hash_prefix_pattern: String,
    /// Leading characters of pay-to-script-hash addresses, `|` separated
    pub script_hash_prefix_pattern: String,
    /// Bech32 human-readable part for SegWit addresses
    pub bech32_hrp: String,
}

impl NetworkParameters {
    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            pub_key_hash_version: 0x00,
            script_hash_version: 0x05,
            pub_key_hash_prefix_pattern: "1".to_string(),
            script_hash_prefix_pattern: "3".to_string(),
            bech32_hrp: "bc".to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            name: "testnet".to_string(),
            pub_key_hash_version: 0x6f,
            script_hash_version: 0xc4,
            pub_key_hash_prefix_pattern: "m|n".to_string(),
            script_hash_prefix_pattern: "2".to_string(),
            bech32_hrp: "tb".to_string(),
        }
    }

    pub fn regtest() -> Self {
        Self {
            name: "regtest".to_string(),
            bech32_hrp: "bcrt".to_string(),
            ..Self::testnet()
        }
    }

    /// Load parameters from a JSON file
    pub fn load(path: &Path) -> Result<Self, ParamsError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let params: Self = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    /// Check that the parameters can drive an address converter
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.bech32_hrp.len() > MAX_BECH32_HRP_LEN
            || bech32::Hrp::parse(&self.bech32_hrp).is_err()
        {
            return Err(ParamsError::InvalidHrp(self.bech32_hrp.clone()));
        }
        if pattern_alternatives(&self.pub_key_hash_prefix_pattern).next().is_none() {
            return Err(ParamsError::EmptyPrefixPattern("pubkey hash"));
        }
        if pattern_alternatives(&self.script_hash_prefix_pattern).next().is_none() {
            return Err(ParamsError::EmptyPrefixPattern("script hash"));
        }
        Ok(())
    }

    /// Whether `address` starts like a pay-to-pubkey-hash address
    pub fn matches_pub_key_hash_prefix(&self, address: &str) -> bool {
        matches_prefix_pattern(&self.pub_key_hash_prefix_pattern, address)
    }

    /// Whether `address` starts like a pay-to-script-hash address
    pub fn matches_script_hash_prefix(&self, address: &str) -> bool {
        matches_prefix_pattern(&self.script_hash_prefix_pattern, address)
    }
}

impl Default for NetworkParameters {
    fn default() -> Self {
        Self::mainnet()
    }
}

fn pattern_alternatives(pattern: &str) -> impl Iterator<Item = &str> {
    pattern
        .split(PREFIX_PATTERN_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

/// Check the leading characters of `address` against a `|` separated pattern
pub fn matches_prefix_pattern(pattern: &str, address: &str) -> bool {
    pattern_alternatives(pattern).any(|prefix| address.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_prefix_pattern_alternatives() {
        assert!(matches_prefix_pattern("m|n", "msGCb97sW9s9Mt7gN5m7TGmwLqhqGaFqYz"));
        assert!(matches_prefix_pattern("m|n", "n1"));
        assert!(!matches_prefix_pattern("m|n", "2NCRTejQCRReGuV4XpttwsMAxQTNRaYzrr1"));
        assert!(matches_prefix_pattern(" 2 ", "2NCR"));
        assert!(!matches_prefix_pattern("|", "anything"));
    }

    #[test]
    fn test_presets_are_valid() {
        for network in [Network::Mainnet, Network::Testnet, Network::Regtest] {
            let params = network.params();
            assert!(params.validate().is_ok());
            assert_eq!(params.name, network.name());
        }

        let regtest = NetworkParameters::regtest();
        assert_eq!(regtest.pub_key_hash_version, 0x6f);
        assert_eq!(regtest.bech32_hrp, "bcrt");
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("test".parse::<Network>().unwrap(), Network::Testnet);
        assert_eq!("regtest".parse::<Network>().unwrap(), Network::Regtest);
        assert!(matches!(
            "signet".parse::<Network>(),
            Err(ParamsError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let params = NetworkParameters {
            bech32_hrp: String::new(),
            ..NetworkParameters::mainnet()
        };
        assert!(matches!(params.validate(), Err(ParamsError::InvalidHrp(_))));

        let params = NetworkParameters {
            bech32_hrp: "a".repeat(MAX_BECH32_HRP_LEN + 1),
            ..NetworkParameters::mainnet()
        };
        assert!(matches!(params.validate(), Err(ParamsError::InvalidHrp(_))));

        let params = NetworkParameters {
            bech32_hrp: "a".repeat(MAX_BECH32_HRP_LEN),
            ..NetworkParameters::mainnet()
        };
        assert!(params.validate().is_ok());

        let params = NetworkParameters {
            script_hash_prefix_pattern: " | ".to_string(),
            ..NetworkParameters::mainnet()
        };
        assert!(matches!(
            params.validate(),
            Err(ParamsError::EmptyPrefixPattern("script hash"))
        ));
    }

    #[test]
    fn test_load_params_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&NetworkParameters::testnet()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let params = NetworkParameters::load(file.path()).unwrap();
        assert_eq!(params, NetworkParameters::testnet());
    }
}
