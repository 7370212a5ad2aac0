//! ECDSA over secp256k1 with RFC 6979 nonces and low-S normalization

use crate::constants::*;
use crate::error::{KeychainError, Result};
use crate::field::{self, CURVE_ORDER, HALF_CURVE_ORDER};
use crate::point::{self, CurvePoint, GENERATOR};
use crate::rfc6979::NonceGenerator;
use crate::types::Hash;
use log::debug;
use num_bigint::BigUint;
use num_traits::Zero;

/// Signature pair (r, s), both in [1, n-1]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    /// Build a signature, rejecting components outside [1, n-1]
    pub fn new(r: BigUint, s: BigUint) -> Result<Self> {
        check_range("r", &r)?;
        check_range("s", &s)?;
        Ok(Signature { r, s })
    }

    /// True when s <= n/2
    pub fn is_low_s(&self) -> bool {
        self.s <= *HALF_CURVE_ORDER
    }

    /// Replace s with n - s when s > n/2; r is unchanged
    pub fn normalize_s(&self) -> Signature {
        if self.is_low_s() {
            self.clone()
        } else {
            Signature {
                r: self.r.clone(),
                s: &*CURVE_ORDER - &self.s,
            }
        }
    }

    /// r || s, 32 bytes each
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&field::to_bytes32(&self.r));
        out[32..].copy_from_slice(&field::to_bytes32(&self.s));
        out
    }

    pub fn from_compact(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(KeychainError::SerializationLengthMismatch {
                expected: 64,
                actual: bytes.len(),
            });
        }
        Signature::new(field::from_bytes(&bytes[..32]), field::from_bytes(&bytes[32..]))
    }

    /// DER: SEQUENCE { INTEGER r, INTEGER s }
    pub fn to_der(&self) -> Vec<u8> {
        let r = der_integer(&self.r);
        let s = der_integer(&self.s);
        let mut out = Vec::with_capacity(6 + r.len() + s.len());
        out.push(0x30);
        out.push((4 + r.len() + s.len()) as u8);
        out.push(0x02);
        out.push(r.len() as u8);
        out.extend_from_slice(&r);
        out.push(0x02);
        out.push(s.len() as u8);
        out.extend_from_slice(&s);
        out
    }

    /// Strict DER parse; integers must be minimally encoded and positive
    pub fn from_der(der: &[u8]) -> Result<Self> {
        if der.len() < 8 || der.len() > 72 {
            return Err(KeychainError::InvalidEncoding(format!("DER signature of {} bytes", der.len())));
        }
        if der[0] != 0x30 {
            return Err(KeychainError::InvalidEncoding("DER signature must start with SEQUENCE".to_string()));
        }
        if der[1] as usize != der.len() - 2 {
            return Err(KeychainError::SerializationLengthMismatch {
                expected: der[1] as usize + 2,
                actual: der.len(),
            });
        }
        let (r, rest) = read_der_integer(&der[2..])?;
        let (s, rest) = read_der_integer(rest)?;
        if !rest.is_empty() {
            return Err(KeychainError::InvalidEncoding("trailing bytes after DER signature".to_string()));
        }
        Signature::new(r, s)
    }
}

fn check_range(name: &str, value: &BigUint) -> Result<()> {
    if field::is_valid_scalar(value) {
        Ok(())
    } else {
        Err(KeychainError::SignatureOutOfRange(format!("{} not in [1, n-1]", name)))
    }
}

fn der_integer(value: &BigUint) -> Vec<u8> {
    let mut bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0x00);
    }
    bytes
}

fn read_der_integer(data: &[u8]) -> Result<(BigUint, &[u8])> {
    if data.len() < 2 || data[0] != 0x02 {
        return Err(KeychainError::InvalidEncoding("expected DER INTEGER".to_string()));
    }
    let len = data[1] as usize;
    if len == 0 || data.len() < 2 + len {
        return Err(KeychainError::InvalidEncoding("truncated DER INTEGER".to_string()));
    }
    let body = &data[2..2 + len];
    if body[0] & 0x80 != 0 {
        return Err(KeychainError::InvalidEncoding("negative DER INTEGER".to_string()));
    }
    if len > 1 && body[0] == 0x00 && body[1] & 0x80 == 0 {
        return Err(KeychainError::InvalidEncoding("non-minimal DER INTEGER".to_string()));
    }
    Ok((field::from_bytes(body), &data[2 + len..]))
}

/// Sign a 32-byte message hash with the private scalar `secret`.
///
/// Nonces come from the RFC 6979 stream for (secret, hash). A candidate is
/// skipped when it is outside [1, n-1], when R = k·G is infinity, or when r
/// or s come out as zero; the next candidate is then taken. At most
/// `MAX_NONCE_ATTEMPTS` candidates are tried. The returned signature is
/// always in low-S form.
pub fn sign(secret: &BigUint, message_hash: &Hash) -> Result<Signature> {
    if !field::is_valid_scalar(secret) {
        return Err(KeychainError::InvalidScalar("private scalar not in [1, n-1]".to_string()));
    }
    let n = &*CURVE_ORDER;
    let z = field::reduce(&field::from_bytes(message_hash), n);

    for (attempt, k) in NonceGenerator::new(secret, message_hash).take(MAX_NONCE_ATTEMPTS).enumerate() {
        if !field::is_valid_scalar(&k) {
            debug!("nonce candidate {} out of range, deriving next", attempt);
            continue;
        }
        let r = match point::scalar_multiply(&k, &GENERATOR)? {
            CurvePoint::Affine { x, .. } => field::reduce(&x, n),
            CurvePoint::Infinity => {
                debug!("nonce candidate {} gave R at infinity, deriving next", attempt);
                continue;
            }
        };
        if r.is_zero() {
            debug!("nonce candidate {} gave r = 0, deriving next", attempt);
            continue;
        }
        let k_inv = field::inverse(&k, n)?;
        let s = field::mul(&k_inv, &field::add(&z, &field::mul(&r, secret, n), n), n);
        if s.is_zero() {
            debug!("nonce candidate {} gave s = 0, deriving next", attempt);
            continue;
        }
        return Ok(Signature { r, s }.normalize_s());
    }

    Err(KeychainError::NonceExhausted(MAX_NONCE_ATTEMPTS))
}

/// Verify `signature` over `message_hash` against `public`.
///
/// Out-of-range components are an error; a well-formed signature that does
/// not match yields `Ok(false)`. High-S signatures are accepted.
pub fn verify(message_hash: &Hash, signature: &Signature, public: &CurvePoint) -> Result<bool> {
    check_range("r", &signature.r)?;
    check_range("s", &signature.s)?;
    if public.is_infinity() {
        return Err(KeychainError::InvalidPoint("public key is the point at infinity".to_string()));
    }

    let n = &*CURVE_ORDER;
    let z = field::reduce(&field::from_bytes(message_hash), n);
    let s_inv = field::inverse(&signature.s, n)?;
    let u1 = field::mul(&z, &s_inv, n);
    let u2 = field::mul(&signature.r, &s_inv, n);

    match point::multiply_add(&u1, &u2, public)? {
        CurvePoint::Infinity => Ok(false),
        CurvePoint::Affine { x, .. } => Ok(field::reduce(&x, n) == signature.r),
    }
}
