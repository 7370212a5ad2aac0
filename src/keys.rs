//! Key pairs: private scalar d in [1, n-1] and public point Q = d·G

use crate::base58;
use crate::constants::*;
use crate::ecdsa::{self, Signature};
use crate::entropy::EntropySource;
use crate::error::{KeychainError, Result};
use crate::field::{self, CURVE_ORDER};
use crate::hash::hash160;
use crate::network::Network;
use crate::point::{self, CurvePoint, GENERATOR};
use crate::types::Hash;
use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;

/// Draws allowed when sampling a private scalar from an entropy source
const MAX_ENTROPY_DRAWS: usize = 16;

/// A finite point on the curve usable as a public key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicKey {
    x: BigUint,
    y: BigUint,
}

impl PublicKey {
    /// Wrap a curve point; the point at infinity is rejected
    pub fn from_point(point: &CurvePoint) -> Result<Self> {
        match point {
            CurvePoint::Infinity => Err(KeychainError::InvalidPoint(
                "public key cannot be the point at infinity".to_string(),
            )),
            CurvePoint::Affine { x, y } => Ok(PublicKey { x: x.clone(), y: y.clone() }),
        }
    }

    /// Parse a 33- or 65-byte SEC1 encoding
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        PublicKey::from_point(&CurvePoint::from_sec_bytes(bytes)?)
    }

    pub fn point(&self) -> CurvePoint {
        CurvePoint::Affine {
            x: self.x.clone(),
            y: self.y.clone(),
        }
    }

    /// 0x04 || x || y (65 bytes) or 0x02/0x03 || x (33 bytes)
    pub fn to_bytes(&self, compressed: bool) -> Vec<u8> {
        if compressed {
            self.to_compressed().to_vec()
        } else {
            let mut out = Vec::with_capacity(UNCOMPRESSED_PUBKEY_SIZE);
            out.push(0x04);
            out.extend_from_slice(&field::to_bytes32(&self.x));
            out.extend_from_slice(&field::to_bytes32(&self.y));
            out
        }
    }

    pub fn to_compressed(&self) -> [u8; COMPRESSED_PUBKEY_SIZE] {
        let mut out = [0u8; COMPRESSED_PUBKEY_SIZE];
        out[0] = if field::is_even(&self.y) { 0x02 } else { 0x03 };
        out[1..].copy_from_slice(&field::to_bytes32(&self.x));
        out
    }

    /// HASH160 of the serialized key
    pub fn hash160(&self, compressed: bool) -> [u8; HASH160_SIZE] {
        hash160(&self.to_bytes(compressed))
    }

    /// P2PKH address of the serialized key
    pub fn address(&self, network: Network, compressed: bool) -> String {
        base58::encode_address(network.p2pkh_version(), &self.hash160(compressed))
    }

    pub fn verify(&self, message_hash: &Hash, signature: &Signature) -> Result<bool> {
        ecdsa::verify(message_hash, signature, &self.point())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for byte in self.to_compressed() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Private scalar, its public point and the preferred public key encoding
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    secret: BigUint,
    public: PublicKey,
    compressed: bool,
}

impl KeyPair {
    /// Key pair for a scalar in [1, n-1]; compressed encoding by default
    pub fn from_scalar(secret: BigUint) -> Result<Self> {
        if !field::is_valid_scalar(&secret) {
            return Err(KeychainError::InvalidScalar("private scalar not in [1, n-1]".to_string()));
        }
        let public = PublicKey::from_point(&point::scalar_multiply(&secret, &GENERATOR)?)?;
        Ok(KeyPair {
            secret,
            public,
            compressed: true,
        })
    }

    /// Key pair from a 32-byte big-endian scalar
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SCALAR_SIZE {
            return Err(KeychainError::SerializationLengthMismatch {
                expected: SCALAR_SIZE,
                actual: bytes.len(),
            });
        }
        KeyPair::from_scalar(field::from_bytes(bytes))
    }

    /// Sample 32 bytes, reduce mod n and retry on zero
    pub fn from_entropy<E: EntropySource + ?Sized>(source: &mut E) -> Result<Self> {
        for draw in 0..MAX_ENTROPY_DRAWS {
            let bytes = source.next_bytes(SCALAR_SIZE);
            let secret = field::reduce(&field::from_bytes(&bytes), &CURVE_ORDER);
            if secret.is_zero() {
                debug!("entropy draw {} reduced to zero, drawing again", draw);
                continue;
            }
            return KeyPair::from_scalar(secret);
        }
        Err(KeychainError::InvalidScalar(format!(
            "entropy source produced no usable scalar in {} draws",
            MAX_ENTROPY_DRAWS
        )))
    }

    /// Same key, different public key encoding
    pub fn with_compression(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn secret(&self) -> &BigUint {
        &self.secret
    }

    pub fn secret_bytes(&self) -> [u8; SCALAR_SIZE] {
        field::to_bytes32(&self.secret)
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn public_point(&self) -> CurvePoint {
        self.public.point()
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Serialized public key, 33 or 65 bytes
    pub fn public_key_bytes(&self, compressed: bool) -> Vec<u8> {
        self.public.to_bytes(compressed)
    }

    /// HASH160 of the public key in this pair's encoding
    pub fn pubkey_hash(&self) -> [u8; HASH160_SIZE] {
        self.public.hash160(self.compressed)
    }

    /// P2PKH address in this pair's encoding
    pub fn address(&self, network: Network) -> String {
        self.public.address(network, self.compressed)
    }

    /// Wallet Import Format: version || scalar || [0x01 if compressed]
    pub fn to_wif(&self, network: Network) -> String {
        let mut payload = self.secret_bytes().to_vec();
        if self.compressed {
            payload.push(0x01);
        }
        base58::check_encode(&[network.wif_version()], &payload)
    }

    /// Parse a WIF string, restoring the compression flag
    pub fn from_wif(wif: &str) -> Result<(Self, Network)> {
        let data = base58::check_decode(wif)?;
        let (version, payload) = match data.split_first() {
            Some((version, payload)) => (*version, payload),
            None => return Err(KeychainError::InvalidEncoding("empty WIF payload".to_string())),
        };
        let network = Network::from_wif_version(version)?;
        let compressed = match payload.len() {
            SCALAR_SIZE => false,
            len if len == SCALAR_SIZE + 1 && payload[SCALAR_SIZE] == 0x01 => true,
            len => {
                return Err(KeychainError::SerializationLengthMismatch {
                    expected: SCALAR_SIZE + 1,
                    actual: len,
                })
            }
        };
        let key = KeyPair::from_bytes(&payload[..SCALAR_SIZE])?.with_compression(compressed);
        Ok((key, network))
    }

    /// Deterministic low-S ECDSA signature over a 32-byte hash
    pub fn sign(&self, message_hash: &Hash) -> Result<Signature> {
        ecdsa::sign(&self.secret, message_hash)
    }

    pub fn verify(&self, message_hash: &Hash, signature: &Signature) -> Result<bool> {
        self.public.verify(message_hash, signature)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public.to_string())
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}
