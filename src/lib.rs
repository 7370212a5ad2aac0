//! # Keychain-Tx
//!
//! Bitcoin keys, hierarchical derivation and transaction signing, built up
//! from secp256k1 arithmetic.
//!
//! The crate is layered bottom-up and no layer depends on a higher one:
//! - `field` / `point`: modular arithmetic over p and n, curve points
//! - `ecdsa` / `keys`: deterministic (RFC 6979) low-S signatures, key pairs
//! - `bip32`: extended keys and derivation paths
//! - `builder`: P2PKH-spending transactions, signed in place
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Arithmetic, signing and derivation return fresh values
//! 2. **Explicit Entropy**: Randomness is only drawn through an `EntropySource`
//! 3. **Exact Version Pinning**: Cryptographic dependencies pinned to exact versions
//! 4. **Byte-Exact Encodings**: SEC1, DER, Base58Check, BIP32 and raw transactions
//!
//! ## Usage
//!
//! ```rust
//! use keychain_tx::{Keychain, Network, ScriptType};
//!
//! let keychain = Keychain::new(Network::Mainnet);
//! let master = keychain.master_key(&[7u8; 32]).unwrap();
//! let account = keychain.derive(&master, "m/44'/0'/0'/0/0").unwrap();
//! let key = account.key_pair().unwrap().clone();
//!
//! let mut builder = keychain.transaction_builder();
//! builder.add_input([0x11; 32], 0, key.clone());
//! builder.add_output(&key.address(Network::Mainnet), 10_000, ScriptType::P2pkh).unwrap();
//! builder.sign_all_inputs().unwrap();
//! assert!(builder.verify_input(0).unwrap());
//! ```

pub mod types;
pub mod constants;
pub mod error;
pub mod field;
pub mod point;
pub mod hash;
pub mod rfc6979;
pub mod ecdsa;
pub mod entropy;
pub mod base58;
pub mod network;
pub mod keys;
pub mod bip32;
pub mod script;
pub mod transaction;
pub mod builder;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use error::{KeychainError, Result};
pub use point::CurvePoint;
pub use ecdsa::Signature;
pub use entropy::{EntropySource, FixedEntropy, OsEntropy};
pub use network::Network;
pub use keys::{KeyPair, PublicKey};
pub use bip32::{ChildNumber, DerivationPath, ExtendedKey, KeyMaterial};
pub use script::ScriptType;
pub use builder::TransactionBuilder;

/// Network-bound entry point to keys, derivation and transactions
///
/// # Examples
///
/// ```
/// use keychain_tx::{Keychain, Network};
///
/// let keychain = Keychain::new(Network::Testnet);
/// assert_eq!(keychain.network(), Network::Testnet);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keychain {
    network: Network,
}

impl Keychain {
    pub fn new(network: Network) -> Self {
        Keychain { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Generate a fresh key pair from an entropy source
    ///
    /// # Examples
    ///
    /// ```
    /// use keychain_tx::{Keychain, OsEntropy};
    ///
    /// let keychain = Keychain::default();
    /// let key = keychain.generate_key(&mut OsEntropy).unwrap();
    /// assert!(keychain.address(&key).starts_with('1'));
    /// ```
    pub fn generate_key<E: EntropySource + ?Sized>(&self, source: &mut E) -> Result<KeyPair> {
        KeyPair::from_entropy(source)
    }

    /// Import a WIF key; keys for another network are rejected
    ///
    /// # Examples
    ///
    /// ```
    /// use keychain_tx::Keychain;
    ///
    /// let keychain = Keychain::default();
    /// let key = keychain
    ///     .key_from_wif("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn")
    ///     .unwrap();
    /// assert_eq!(keychain.address(&key), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    /// ```
    pub fn key_from_wif(&self, wif: &str) -> Result<KeyPair> {
        let (key, network) = KeyPair::from_wif(wif)?;
        if network != self.network {
            return Err(KeychainError::InvalidVersion(format!(
                "WIF key for {} used on {}",
                network, self.network
            )));
        }
        Ok(key)
    }

    pub fn key_to_wif(&self, key: &KeyPair) -> String {
        key.to_wif(self.network)
    }

    /// P2PKH address of a key pair in its own encoding
    pub fn address(&self, key: &KeyPair) -> String {
        key.address(self.network)
    }

    /// Master extended key from a 16 to 64 byte seed
    pub fn master_key(&self, seed: &[u8]) -> Result<ExtendedKey> {
        ExtendedKey::from_seed(seed, self.network)
    }

    /// Derive along a textual path such as `m/44'/0'/0'`
    ///
    /// # Examples
    ///
    /// ```
    /// use keychain_tx::Keychain;
    ///
    /// let keychain = Keychain::default();
    /// let master = keychain.master_key(&[1u8; 16]).unwrap();
    /// let child = keychain.derive(&master, "m/0h/1").unwrap();
    /// assert_eq!(child.depth(), 2);
    /// ```
    pub fn derive(&self, key: &ExtendedKey, path: &str) -> Result<ExtendedKey> {
        key.derive_path(&path.parse::<DerivationPath>()?)
    }

    /// Parse an `xprv`/`xpub` (or testnet) string for this network
    pub fn parse_extended_key(&self, encoded: &str) -> Result<ExtendedKey> {
        let key = ExtendedKey::decode(encoded)?;
        if key.network() != self.network {
            return Err(KeychainError::InvalidVersion(format!(
                "extended key for {} used on {}",
                key.network(),
                self.network
            )));
        }
        Ok(key)
    }

    pub fn sign(&self, key: &KeyPair, message_hash: &Hash) -> Result<Signature> {
        key.sign(message_hash)
    }

    pub fn verify(&self, public: &PublicKey, message_hash: &Hash, signature: &Signature) -> Result<bool> {
        public.verify(message_hash, signature)
    }

    /// New transaction builder with default version, lock time and sighash type
    pub fn transaction_builder(&self) -> TransactionBuilder {
        TransactionBuilder::new()
    }

    pub fn parse_transaction(&self, data: &[u8]) -> Result<Transaction> {
        transaction::parse_transaction(data)
    }
}
