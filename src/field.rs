//! Modular arithmetic over the secp256k1 field prime p and group order n
//!
//! Every function takes its modulus explicitly. Operands are expected to be
//! reduced already; results are always in `[0, modulus)`.

use crate::constants::*;
use crate::error::{KeychainError, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::sync::LazyLock;

/// Field prime p
pub static FIELD_PRIME: LazyLock<BigUint> = LazyLock::new(|| BigUint::from_bytes_be(&SECP256K1_P));

/// Curve order n
pub static CURVE_ORDER: LazyLock<BigUint> = LazyLock::new(|| BigUint::from_bytes_be(&SECP256K1_N));

/// n / 2, the upper bound of a low-S signature component
pub static HALF_CURVE_ORDER: LazyLock<BigUint> = LazyLock::new(|| &*CURVE_ORDER >> 1u32);

/// a mod m
pub fn reduce(a: &BigUint, modulus: &BigUint) -> BigUint {
    a % modulus
}

/// (a + b) mod m
pub fn add(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    (a + b) % modulus
}

/// (a - b) mod m
pub fn sub(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    let b = b % modulus;
    ((a % modulus) + modulus - b) % modulus
}

/// (a * b) mod m
pub fn mul(a: &BigUint, b: &BigUint, modulus: &BigUint) -> BigUint {
    (a * b) % modulus
}

/// -a mod m
pub fn neg(a: &BigUint, modulus: &BigUint) -> BigUint {
    sub(&BigUint::zero(), a, modulus)
}

/// base^exponent mod m
pub fn pow(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exponent, modulus)
}

/// a^-1 mod m for a prime modulus, via Fermat's little theorem: a^(m-2)
pub fn inverse(a: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    let a = a % modulus;
    if a.is_zero() {
        return Err(KeychainError::InversionOfZero);
    }
    let exponent = modulus - BigUint::from(2u32);
    Ok(a.modpow(&exponent, modulus))
}

/// a / b mod m
pub fn div(a: &BigUint, b: &BigUint, modulus: &BigUint) -> Result<BigUint> {
    Ok(mul(a, &inverse(b, modulus)?, modulus))
}

/// True when the low bit of `a` is clear
pub fn is_even(a: &BigUint) -> bool {
    (a % 2u32).is_zero()
}

/// True when `a` lies in [1, n-1]
pub fn is_valid_scalar(a: &BigUint) -> bool {
    !a.is_zero() && a < &*CURVE_ORDER
}

/// Big-endian bytes, left padded to 32 bytes
pub fn to_bytes32(a: &BigUint) -> [u8; 32] {
    let bytes = a.to_bytes_be();
    let mut out = [0u8; SCALAR_SIZE];
    if bytes.len() > SCALAR_SIZE {
        out.copy_from_slice(&bytes[bytes.len() - SCALAR_SIZE..]);
    } else {
        out[SCALAR_SIZE - bytes.len()..].copy_from_slice(&bytes);
    }
    out
}

/// Interpret big-endian bytes as an unsigned integer
pub fn from_bytes(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// 1 as a BigUint
pub fn one() -> BigUint {
    BigUint::one()
}
