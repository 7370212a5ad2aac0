//! Hierarchical deterministic keys (BIP32)
//!
//! Every derivation step is a pure function from a parent `ExtendedKey` and
//! a child number to a new, independent `ExtendedKey`.

use crate::base58;
use crate::constants::*;
use crate::error::{KeychainError, Result};
use crate::field::{self, CURVE_ORDER};
use crate::hash::{hash160, hmac_sha512};
use crate::keys::{KeyPair, PublicKey};
use crate::network::Network;
use crate::point::{self, GENERATOR};
use log::debug;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Child index as serialized: values at or above 2^31 are hardened.
///
/// The raw index is private so a normal child can never carry a hardened
/// index and the other way round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct ChildNumber(u32);

impl ChildNumber {
    /// Normal child for an index in [0, 2^31)
    pub fn normal(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(KeychainError::InvalidDerivationPath(format!("normal index {} too large", index)));
        }
        Ok(ChildNumber(index))
    }

    /// Hardened child for an index in [0, 2^31), serialized as index + 2^31
    pub fn hardened(index: u32) -> Result<Self> {
        if index >= HARDENED_OFFSET {
            return Err(KeychainError::InvalidDerivationPath(format!("hardened index {} too large", index)));
        }
        Ok(ChildNumber(index | HARDENED_OFFSET))
    }

    /// Interpret a raw 32-bit index; the top bit marks a hardened child
    pub fn from_index(raw: u32) -> Self {
        ChildNumber(raw)
    }

    /// Raw 32-bit index as serialized
    pub fn to_index(self) -> u32 {
        self.0
    }

    /// Index within its half, without the hardened offset
    pub fn index(self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }

    pub fn is_hardened(self) -> bool {
        self.0 >= HARDENED_OFFSET
    }

    /// Following child number of the same kind, `None` at the end of the half
    pub fn checked_next(self) -> Option<Self> {
        let next = self.index().checked_add(1)?;
        if self.is_hardened() {
            ChildNumber::hardened(next).ok()
        } else {
            ChildNumber::normal(next).ok()
        }
    }
}

impl From<u32> for ChildNumber {
    fn from(raw: u32) -> Self {
        ChildNumber::from_index(raw)
    }
}

impl From<ChildNumber> for u32 {
    fn from(child: ChildNumber) -> Self {
        child.to_index()
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.index())
        } else {
            write!(f, "{}", self.index())
        }
    }
}

impl FromStr for ChildNumber {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, hardened) = match s.strip_suffix(['\'', 'h', 'H']) {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        let index: u32 = digits
            .parse()
            .map_err(|_| KeychainError::InvalidDerivationPath(format!("invalid child number '{}'", s)))?;
        if hardened {
            ChildNumber::hardened(index)
        } else {
            ChildNumber::normal(index)
        }
    }
}

/// A path such as `m/44'/0'/0'/0`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn master() -> Self {
        DerivationPath(Vec::new())
    }

    pub fn children(&self) -> &[ChildNumber] {
        &self.0
    }

    pub fn is_master(&self) -> bool {
        self.0.is_empty()
    }

    /// Path extended by one more step
    pub fn child(&self, child: ChildNumber) -> Self {
        let mut steps = self.0.clone();
        steps.push(child);
        DerivationPath(steps)
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        DerivationPath(steps)
    }
}

impl FromStr for DerivationPath {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => {
                return Err(KeychainError::InvalidDerivationPath(format!(
                    "path '{}' must start with 'm'",
                    s
                )))
            }
        }
        let steps = parts.map(ChildNumber::from_str).collect::<Result<Vec<_>>>()?;
        Ok(DerivationPath(steps))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m")?;
        for child in &self.0 {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

/// Key half of an extended key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Private(KeyPair),
    Public(PublicKey),
}

/// Key, chain code and position in the derivation tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    network: Network,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: [u8; 32],
    key: KeyMaterial,
}

impl ExtendedKey {
    /// Master key: I = HMAC-SHA512("Bitcoin seed", seed), IL is the key, IR the chain code
    pub fn from_seed(seed: &[u8], network: Network) -> Result<Self> {
        if seed.len() < MIN_SEED_SIZE || seed.len() > MAX_SEED_SIZE {
            return Err(KeychainError::InvalidEncoding(format!(
                "seed must be {} to {} bytes, got {}",
                MIN_SEED_SIZE,
                MAX_SEED_SIZE,
                seed.len()
            )));
        }
        let i = hmac_sha512(BIP32_SEED_KEY, &[seed]);
        let (il, ir) = i.split_at(32);
        let key = KeyPair::from_bytes(il)
            .map_err(|_| KeychainError::InvalidScalar("seed produced an invalid master key".to_string()))?;
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedKey {
            network,
            depth: 0,
            parent_fingerprint: [0; 4],
            child_number: ChildNumber::from_index(0),
            chain_code,
            key: KeyMaterial::Private(key),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn parent_fingerprint(&self) -> [u8; 4] {
        self.parent_fingerprint
    }

    pub fn child_number(&self) -> ChildNumber {
        self.child_number
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    /// Private key pair, absent for extended public keys
    pub fn key_pair(&self) -> Option<&KeyPair> {
        match &self.key {
            KeyMaterial::Private(key) => Some(key),
            KeyMaterial::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        match &self.key {
            KeyMaterial::Private(key) => key.public_key(),
            KeyMaterial::Public(public) => public,
        }
    }

    /// HASH160 of the compressed public key
    pub fn identifier(&self) -> [u8; HASH160_SIZE] {
        hash160(&self.public_key().to_compressed())
    }

    /// First four bytes of the identifier
    pub fn fingerprint(&self) -> [u8; 4] {
        let mut fingerprint = [0u8; 4];
        fingerprint.copy_from_slice(&self.identifier()[..4]);
        fingerprint
    }

    /// Extended public key with the same position in the tree
    pub fn neuter(&self) -> ExtendedKey {
        ExtendedKey {
            key: KeyMaterial::Public(self.public_key().clone()),
            ..self.clone()
        }
    }

    /// CKDpriv / CKDpub for one child number.
    ///
    /// Fails with `InvalidChildDerivation` when IL >= n or the child key is
    /// zero (or infinity); callers may move on to the next index.
    pub fn derive_child(&self, child: ChildNumber) -> Result<ExtendedKey> {
        let index = child.to_index();
        let depth = self
            .depth
            .checked_add(1)
            .ok_or_else(|| KeychainError::InvalidDerivationPath("maximum depth of 255 reached".to_string()))?;

        let mut data = Vec::with_capacity(37);
        if child.is_hardened() {
            let key = self
                .key_pair()
                .ok_or(KeychainError::HardenedDerivationRequiresPrivateKey(index))?;
            data.push(0x00);
            data.extend_from_slice(&key.secret_bytes());
        } else {
            data.extend_from_slice(&self.public_key().to_compressed());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let i = hmac_sha512(&self.chain_code, &[&data]);
        let (il, ir) = i.split_at(32);
        let tweak = field::from_bytes(il);
        if tweak >= *CURVE_ORDER {
            return Err(KeychainError::InvalidChildDerivation { index });
        }

        let key = match &self.key {
            KeyMaterial::Private(parent) => {
                let secret = field::add(&tweak, parent.secret(), &CURVE_ORDER);
                if secret.is_zero() {
                    return Err(KeychainError::InvalidChildDerivation { index });
                }
                KeyMaterial::Private(KeyPair::from_scalar(secret)?)
            }
            KeyMaterial::Public(parent) => {
                let tweak_point = point::scalar_multiply(&tweak, &GENERATOR)?;
                let child_point = point::add(&tweak_point, &parent.point())?;
                if child_point.is_infinity() {
                    return Err(KeychainError::InvalidChildDerivation { index });
                }
                KeyMaterial::Public(PublicKey::from_point(&child_point)?)
            }
        };

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        Ok(ExtendedKey {
            network: self.network,
            depth,
            parent_fingerprint: self.fingerprint(),
            child_number: child,
            chain_code,
            key,
        })
    }

    /// Derive `child`, moving to the next index while the derivation is
    /// invalid. Never crosses from normal into hardened indices.
    pub fn derive_child_or_next(&self, child: ChildNumber) -> Result<ExtendedKey> {
        let mut current = child;
        loop {
            match self.derive_child(current) {
                Err(KeychainError::InvalidChildDerivation { index }) => {
                    let next = current
                        .checked_next()
                        .ok_or(KeychainError::InvalidChildDerivation { index })?;
                    debug!("child {:#010x} is invalid, trying {:#010x}", index, next.to_index());
                    current = next;
                }
                other => return other,
            }
        }
    }

    /// Walk every step of `path` from this key
    pub fn derive_path(&self, path: &DerivationPath) -> Result<ExtendedKey> {
        path.children()
            .iter()
            .try_fold(self.clone(), |key, child| key.derive_child(*child))
    }

    /// Sibling children of this key for each child number in `children`
    pub fn derive_children(&self, children: &[ChildNumber]) -> Result<Vec<ExtendedKey>> {
        children.iter().map(|child| self.derive_child(*child)).collect()
    }

    /// 78-byte BIP32 serialization
    pub fn serialize(&self) -> [u8; EXTENDED_KEY_SIZE] {
        let mut out = [0u8; EXTENDED_KEY_SIZE];
        let version = match self.key {
            KeyMaterial::Private(_) => self.network.xprv_version(),
            KeyMaterial::Public(_) => self.network.xpub_version(),
        };
        out[0..4].copy_from_slice(&version);
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_index().to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        match &self.key {
            KeyMaterial::Private(key) => {
                out[45] = 0x00;
                out[46..78].copy_from_slice(&key.secret_bytes());
            }
            KeyMaterial::Public(public) => out[45..78].copy_from_slice(&public.to_compressed()),
        }
        out
    }

    /// Parse the 78-byte BIP32 serialization
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.len() != EXTENDED_KEY_SIZE {
            return Err(KeychainError::SerializationLengthMismatch {
                expected: EXTENDED_KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&data[0..4]);
        let (network, private) = Network::from_extended_key_version(version)?;

        let depth = data[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&data[5..9]);
        let mut index = [0u8; 4];
        index.copy_from_slice(&data[9..13]);
        let child_number = ChildNumber::from_index(u32::from_be_bytes(index));
        if depth == 0 && (parent_fingerprint != [0; 4] || child_number.to_index() != 0) {
            return Err(KeychainError::InvalidEncoding(
                "master key with non-zero parent fingerprint or index".to_string(),
            ));
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let key = if private {
            if data[45] != 0x00 {
                return Err(KeychainError::InvalidEncoding("private key data must start with 0x00".to_string()));
            }
            KeyMaterial::Private(KeyPair::from_bytes(&data[46..78])?)
        } else {
            KeyMaterial::Public(PublicKey::from_bytes(&data[45..78])?)
        };

        Ok(ExtendedKey {
            network,
            depth,
            parent_fingerprint,
            child_number,
            chain_code,
            key,
        })
    }

    /// Base58Check form (xprv... / xpub...)
    pub fn encode(&self) -> String {
        base58::check_encode(&[], &self.serialize())
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        ExtendedKey::deserialize(&base58::check_decode(encoded)?)
    }
}

impl fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for ExtendedKey {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self> {
        ExtendedKey::decode(s)
    }
}
