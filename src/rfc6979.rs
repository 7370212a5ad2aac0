//! Deterministic nonce generation (RFC 6979, HMAC-SHA256, qlen = 256)
//!
//! The generator yields the successive candidates of step h. A caller that
//! rejects a candidate (out of range, r = 0, s = 0) simply pulls the next
//! one; the K/V update between candidates follows step h.3.

use crate::field::{self, CURVE_ORDER};
use crate::hash::hmac_sha256;
use crate::types::Hash;
use num_bigint::BigUint;

/// Stream of RFC 6979 nonce candidates for one (key, message hash) pair
pub struct NonceGenerator {
    k: Hash,
    v: Hash,
    started: bool,
}

impl NonceGenerator {
    /// Steps b to g: seed K and V from int2octets(x) and bits2octets(h1)
    pub fn new(secret: &BigUint, message_hash: &Hash) -> Self {
        let x = field::to_bytes32(secret);
        let h = field::to_bytes32(&field::reduce(&field::from_bytes(message_hash), &CURVE_ORDER));

        let mut v = [0x01u8; 32];
        let mut k = [0x00u8; 32];
        k = hmac_sha256(&k, &[&v[..], &[0x00], &x[..], &h[..]]);
        v = hmac_sha256(&k, &[&v[..]]);
        k = hmac_sha256(&k, &[&v[..], &[0x01], &x[..], &h[..]]);
        v = hmac_sha256(&k, &[&v[..]]);

        NonceGenerator { k, v, started: false }
    }
}

impl Iterator for NonceGenerator {
    type Item = BigUint;

    /// Next candidate T; not yet checked against [1, n-1]
    fn next(&mut self) -> Option<BigUint> {
        if self.started {
            self.k = hmac_sha256(&self.k, &[&self.v[..], &[0x00]]);
            self.v = hmac_sha256(&self.k, &[&self.v[..]]);
        }
        self.started = true;
        // hlen = qlen, one block of V is enough
        self.v = hmac_sha256(&self.k, &[&self.v[..]]);
        Some(field::from_bytes(&self.v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256;

    #[test]
    fn test_satoshi_nakamoto_nonce() {
        let secret = BigUint::from(1u32);
        let mut nonces = NonceGenerator::new(&secret, &sha256(b"Satoshi Nakamoto"));
        let k = nonces.next().unwrap();
        assert_eq!(
            format!("{:064x}", k),
            "8f8a276c19f4149656b280621e358cce24f5f52542772691ee69063b74f15d15"
        );
    }

    #[test]
    fn test_deterministic() {
        let secret = BigUint::from(42u32);
        let hash = sha256(b"message");
        let a: Vec<BigUint> = NonceGenerator::new(&secret, &hash).take(3).collect();
        let b: Vec<BigUint> = NonceGenerator::new(&secret, &hash).take(3).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_successive_candidates_differ() {
        let secret = BigUint::from(42u32);
        let candidates: Vec<BigUint> = NonceGenerator::new(&secret, &sha256(b"message")).take(4).collect();
        for i in 0..candidates.len() {
            for j in i + 1..candidates.len() {
                assert_ne!(candidates[i], candidates[j]);
            }
        }
    }

    #[test]
    fn test_depends_on_key_and_message() {
        let hash = sha256(b"message");
        let k1 = NonceGenerator::new(&BigUint::from(1u32), &hash).next();
        let k2 = NonceGenerator::new(&BigUint::from(2u32), &hash).next();
        let k3 = NonceGenerator::new(&BigUint::from(1u32), &sha256(b"other")).next();
        assert_ne!(k1, k2);
        assert_ne!(k1, k3);
    }
}
