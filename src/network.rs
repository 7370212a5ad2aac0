//! Network parameters: version bytes for addresses, WIF and extended keys

use crate::error::{KeychainError, Result};
use crate::script::ScriptType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bitcoin network a key or address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    /// Version byte of pay-to-pubkey-hash addresses
    pub fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6f,
        }
    }

    /// Version byte of pay-to-script-hash addresses
    pub fn p2sh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xc4,
        }
    }

    /// Version byte of WIF private keys
    pub fn wif_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xef,
        }
    }

    /// BIP32 version prefix of extended private keys (xprv / tprv)
    pub fn xprv_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xad, 0xe4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    /// BIP32 version prefix of extended public keys (xpub / tpub)
    pub fn xpub_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xb2, 0x1e],
            Network::Testnet => [0x04, 0x35, 0x87, 0xcf],
        }
    }

    /// Address version byte for a script type
    pub fn address_version(self, script_type: ScriptType) -> u8 {
        match script_type {
            ScriptType::P2pkh => self.p2pkh_version(),
            ScriptType::P2sh => self.p2sh_version(),
        }
    }

    /// Network and script type of an address version byte
    pub fn from_address_version(version: u8) -> Result<(Network, ScriptType)> {
        match version {
            0x00 => Ok((Network::Mainnet, ScriptType::P2pkh)),
            0x05 => Ok((Network::Mainnet, ScriptType::P2sh)),
            0x6f => Ok((Network::Testnet, ScriptType::P2pkh)),
            0xc4 => Ok((Network::Testnet, ScriptType::P2sh)),
            other => Err(KeychainError::InvalidVersion(format!("address version {:#04x}", other))),
        }
    }

    /// Network of a WIF version byte
    pub fn from_wif_version(version: u8) -> Result<Network> {
        match version {
            0x80 => Ok(Network::Mainnet),
            0xef => Ok(Network::Testnet),
            other => Err(KeychainError::InvalidVersion(format!("WIF version {:#04x}", other))),
        }
    }

    /// Network of a BIP32 prefix and whether it denotes a private key
    pub fn from_extended_key_version(version: [u8; 4]) -> Result<(Network, bool)> {
        for network in [Network::Mainnet, Network::Testnet] {
            if version == network.xprv_version() {
                return Ok((network, true));
            }
            if version == network.xpub_version() {
                return Ok((network, false));
            }
        }
        Err(KeychainError::InvalidVersion(format!(
            "extended key version {:02x}{:02x}{:02x}{:02x}",
            version[0], version[1], version[2], version[3]
        )))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoin" | "main" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(KeychainError::InvalidVersion(format!("unknown network '{}'", other))),
        }
    }
}
