//! Incremental construction and signing of P2PKH-spending transactions

use crate::base58;
use crate::constants::*;
use crate::ecdsa::Signature;
use crate::error::{KeychainError, Result};
use crate::hash::{hash160, sha256d};
use crate::keys::{KeyPair, PublicKey};
use crate::network::Network;
use crate::script::{self, ScriptType};
use crate::transaction::{self, serialize_transaction};
use crate::types::*;
use log::{debug, trace};

/// An input together with the key that unlocks the output it spends
#[derive(Debug, Clone)]
struct SigningInput {
    input: TransactionInput,
    key: KeyPair,
}

/// Accumulates inputs and outputs, then signs every input in place.
///
/// Each input spends a P2PKH output locked to the public key hash of its
/// key pair, in the key's compressed or uncompressed encoding. A builder is meant to be driven by a single owner; signing
/// takes `&mut self`.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    version: u32,
    lock_time: u32,
    sighash_type: u32,
    inputs: Vec<SigningInput>,
    outputs: Vec<TransactionOutput>,
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        TransactionBuilder::new()
    }
}

impl TransactionBuilder {
    pub fn new() -> Self {
        TransactionBuilder {
            version: TX_VERSION,
            lock_time: 0,
            sighash_type: SIGHASH_ALL,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_lock_time(mut self, lock_time: u32) -> Self {
        self.lock_time = lock_time;
        self
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Append an unsigned input spending output `index` of `prev_tx_hash`.
    ///
    /// `prev_tx_hash` is in display order (as printed by explorers and
    /// returned by `transaction::txid`); it is reversed for the wire.
    pub fn add_input(&mut self, prev_tx_hash: Hash, index: u32, key: KeyPair) -> &mut Self {
        let mut hash = prev_tx_hash;
        hash.reverse();
        self.inputs.push(SigningInput {
            input: TransactionInput {
                prevout: OutPoint { hash, index },
                script_sig: Vec::new(),
                sequence: SEQUENCE_FINAL,
            },
            key,
        });
        self
    }

    /// Append an output paying `value` satoshis to a Base58Check address.
    ///
    /// The address version must agree with `script_type`.
    pub fn add_output(&mut self, address: &str, value: i64, script_type: ScriptType) -> Result<&mut Self> {
        let (version, hash) = base58::decode_address(address)?;
        let (network, encoded_type) = Network::from_address_version(version)?;
        if encoded_type != script_type {
            return Err(KeychainError::UnsupportedScriptType(format!(
                "{} address for {} requested as {}",
                encoded_type, network, script_type
            )));
        }
        self.add_output_hash(&hash, value, script_type)
    }

    /// Append an output paying `value` satoshis to a raw 20-byte hash
    pub fn add_output_hash(
        &mut self,
        hash: &[u8; HASH160_SIZE],
        value: i64,
        script_type: ScriptType,
    ) -> Result<&mut Self> {
        if value < 0 || value > MAX_MONEY {
            return Err(KeychainError::InvalidOutputValue {
                index: self.outputs.len(),
                value,
            });
        }
        self.outputs.push(TransactionOutput {
            value,
            script_pubkey: script::locking_script(script_type, hash),
        });
        Ok(self)
    }

    /// Locking script of the output spent by input `index`
    pub fn previous_output_script(&self, index: usize) -> Result<ByteString> {
        let signing = self.signing_input(index)?;
        Ok(script::p2pkh_script(&signing.key.pubkey_hash()))
    }

    /// SIGHASH_ALL digest for input `index`: the transaction with that
    /// input's script replaced by the spent locking script, every other
    /// input script emptied, and the 4-byte sighash type appended.
    pub fn signature_hash(&self, index: usize) -> Result<Hash> {
        let previous_script = self.previous_output_script(index)?;
        let mut tx = self.transaction();
        for (i, input) in tx.inputs.iter_mut().enumerate() {
            input.script_sig = if i == index { previous_script.clone() } else { Vec::new() };
        }
        let mut preimage = serialize_transaction(&tx)?;
        preimage.extend_from_slice(&self.sighash_type.to_le_bytes());
        Ok(sha256d(&preimage))
    }

    /// Sign input `index` and install `<DER sig || sighash byte> <pubkey>`
    pub fn sign_input(&mut self, index: usize) -> Result<()> {
        let sighash = self.signature_hash(index)?;
        let signing = self.signing_input(index)?;

        let signature = signing.key.sign(&sighash)?;
        let mut encoded = signature.to_der();
        encoded.push(self.sighash_type as u8);
        let public_key = signing.key.public_key_bytes(signing.key.is_compressed());
        let script_sig = script::p2pkh_script_sig(&encoded, &public_key)?;

        debug!(
            "signed input {} spending {}:{}",
            index,
            transaction::hash_to_hex(&signing.input.prevout.hash),
            signing.input.prevout.index
        );
        trace!("input {} sighash {}", index, hex::encode(sighash));

        self.inputs[index].input.script_sig = script_sig;
        Ok(())
    }

    /// Sign every input in index order
    pub fn sign_all_inputs(&mut self) -> Result<()> {
        for index in 0..self.inputs.len() {
            self.sign_input(index)?;
        }
        Ok(())
    }

    /// Check the unlocking script of input `index` against its sighash
    pub fn verify_input(&self, index: usize) -> Result<bool> {
        let signing = self.signing_input(index)?;
        let (encoded, public_key) = script::parse_p2pkh_script_sig(&signing.input.script_sig)?;
        let (sighash_byte, der) = match encoded.split_last() {
            Some((byte, der)) => (*byte, der),
            None => return Ok(false),
        };
        if sighash_byte as u32 != self.sighash_type {
            return Ok(false);
        }
        if hash160(&public_key) != signing.key.pubkey_hash() {
            return Ok(false);
        }
        let public_key = PublicKey::from_bytes(&public_key)?;
        let signature = Signature::from_der(der)?;
        public_key.verify(&self.signature_hash(index)?, &signature)
    }

    pub fn is_fully_signed(&self) -> bool {
        self.inputs.iter().all(|signing| !signing.input.script_sig.is_empty())
    }

    /// Current state of the transaction
    pub fn transaction(&self) -> Transaction {
        Transaction {
            version: self.version,
            inputs: self.inputs.iter().map(|signing| signing.input.clone()).collect(),
            outputs: self.outputs.clone(),
            lock_time: self.lock_time,
        }
    }

    /// Raw wire bytes of the current transaction
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_transaction(&self.transaction())
    }

    pub fn txid(&self) -> Result<Hash> {
        transaction::txid(&self.transaction())
    }

    fn signing_input(&self, index: usize) -> Result<&SigningInput> {
        self.inputs.get(index).ok_or(KeychainError::InputIndexOutOfRange {
            index,
            count: self.inputs.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn key(d: u32) -> KeyPair {
        KeyPair::from_scalar(BigUint::from(d)).unwrap()
    }

    fn builder() -> TransactionBuilder {
        let mut builder = TransactionBuilder::new();
        builder.add_input([0x22; 32], 0, key(1));
        builder
            .add_output("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", 90_000, ScriptType::P2pkh)
            .unwrap();
        builder
    }

    #[test]
    fn test_defaults() {
        let tx = TransactionBuilder::new().transaction();
        assert_eq!(tx.version, 1);
        assert_eq!(tx.lock_time, 0);
        let tx = TransactionBuilder::new().with_version(2).with_lock_time(77).transaction();
        assert_eq!((tx.version, tx.lock_time), (2, 77));
    }

    #[test]
    fn test_add_input_reverses_hash() {
        let mut builder = TransactionBuilder::new();
        let mut display = [0u8; 32];
        display[0] = 0xaa;
        builder.add_input(display, 5, key(1));
        let tx = builder.transaction();
        assert_eq!(tx.inputs[0].prevout.hash[31], 0xaa);
        assert_eq!(tx.inputs[0].prevout.index, 5);
        assert_eq!(tx.inputs[0].sequence, SEQUENCE_FINAL);
        assert!(tx.inputs[0].script_sig.is_empty());
    }

    #[test]
    fn test_add_output_templates() {
        let mut builder = TransactionBuilder::new();
        builder.add_output_hash(&[7; 20], 1, ScriptType::P2sh).unwrap();
        builder
            .add_output("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", 2, ScriptType::P2pkh)
            .unwrap();
        let tx = builder.transaction();
        assert_eq!(tx.outputs[0].script_pubkey, script::p2sh_script(&[7; 20]));
        assert_eq!(tx.outputs[1].script_pubkey, script::p2pkh_script(&key(1).pubkey_hash()));
    }

    #[test]
    fn test_add_output_rejects_bad_values_and_types() {
        let mut builder = TransactionBuilder::new();
        assert_eq!(
            builder.add_output_hash(&[7; 20], -5, ScriptType::P2pkh).err(),
            Some(KeychainError::InvalidOutputValue { index: 0, value: -5 })
        );
        assert!(matches!(
            builder.add_output("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", 1, ScriptType::P2sh),
            Err(KeychainError::UnsupportedScriptType(_))
        ));
        assert!(builder.add_output("not-an-address", 1, ScriptType::P2pkh).is_err());
        assert_eq!(builder.output_count(), 0);
    }

    #[test]
    fn test_input_index_out_of_range() {
        let mut builder = builder();
        assert_eq!(
            builder.sign_input(1),
            Err(KeychainError::InputIndexOutOfRange { index: 1, count: 1 })
        );
        assert!(builder.signature_hash(3).is_err());
    }

    #[test]
    fn test_sign_and_verify_single_input() {
        let mut builder = builder();
        assert!(!builder.is_fully_signed());
        builder.sign_all_inputs().unwrap();
        assert!(builder.is_fully_signed());
        assert!(builder.verify_input(0).unwrap());

        let script_sig = &builder.transaction().inputs[0].script_sig;
        let (encoded, public_key) = script::parse_p2pkh_script_sig(script_sig).unwrap();
        assert_eq!(*encoded.last().unwrap(), SIGHASH_ALL as u8);
        assert_eq!(public_key, key(1).public_key().to_compressed().to_vec());
    }

    #[test]
    fn test_uncompressed_key_spends_its_own_address() {
        let uncompressed = key(1).with_compression(false);
        let (_, hash) = base58::decode_address(&uncompressed.address(Network::Mainnet)).unwrap();
        let mut builder = TransactionBuilder::new();
        builder.add_input([0x22; 32], 0, uncompressed.clone());
        builder.add_output_hash(&[7; 20], 1_000, ScriptType::P2sh).unwrap();

        assert_eq!(builder.previous_output_script(0).unwrap(), script::p2pkh_script(&hash));
        assert_ne!(
            builder.previous_output_script(0).unwrap(),
            script::p2pkh_script(&key(1).pubkey_hash())
        );

        builder.sign_all_inputs().unwrap();
        let script_sig = &builder.transaction().inputs[0].script_sig;
        let (_, public_key) = script::parse_p2pkh_script_sig(script_sig).unwrap();
        assert_eq!(public_key.len(), 65);
        assert_eq!(public_key, uncompressed.public_key_bytes(false));
        assert!(builder.verify_input(0).unwrap());
    }

    #[test]
    fn test_sighash_ignores_other_signatures() {
        let mut builder = builder();
        builder.add_input([0x33; 32], 1, key(2));
        let before = builder.signature_hash(1).unwrap();
        builder.sign_input(0).unwrap();
        assert_eq!(builder.signature_hash(1).unwrap(), before);
        assert_ne!(builder.signature_hash(0).unwrap(), before);
    }

    #[test]
    fn test_signing_is_deterministic() {
        let mut a = builder();
        let mut b = builder();
        a.sign_all_inputs().unwrap();
        b.sign_all_inputs().unwrap();
        assert_eq!(a.serialize().unwrap(), b.serialize().unwrap());
        assert_eq!(a.txid().unwrap(), b.txid().unwrap());
    }

    #[test]
    fn test_tampered_output_fails_verification() {
        let mut builder = builder();
        builder.sign_all_inputs().unwrap();
        builder.outputs[0].value += 1;
        assert!(!builder.verify_input(0).unwrap());
    }
}
