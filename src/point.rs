//! Points on secp256k1: y^2 = x^3 + 7 over GF(p)
//!
//! `add` and `double` are the textbook affine formulas. `scalar_multiply`
//! walks the bits of k from the most significant end (double-and-add) but
//! keeps the running sum in Jacobian coordinates so that only one field
//! inversion is paid per multiplication. The result is identical to the
//! affine ladder for every k.

use crate::constants::*;
use crate::error::{KeychainError, Result};
use crate::field::{self, CURVE_ORDER, FIELD_PRIME};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use std::fmt;
use std::sync::LazyLock;

/// Generator point G
pub static GENERATOR: LazyLock<CurvePoint> = LazyLock::new(|| CurvePoint::Affine {
    x: BigUint::from_bytes_be(&SECP256K1_GX),
    y: BigUint::from_bytes_be(&SECP256K1_GY),
});

/// A point on secp256k1, or the point at infinity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurvePoint {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl CurvePoint {
    /// Build a finite point, rejecting coordinates that are not reduced or not on the curve
    pub fn new(x: BigUint, y: BigUint) -> Result<Self> {
        if x >= *FIELD_PRIME || y >= *FIELD_PRIME {
            return Err(KeychainError::InvalidPoint("coordinate not reduced mod p".to_string()));
        }
        if !is_on_curve(&x, &y) {
            return Err(KeychainError::InvalidPoint(format!(
                "({:064x}, {:064x}) is not on the curve",
                x, y
            )));
        }
        Ok(CurvePoint::Affine { x, y })
    }

    /// The generator G
    pub fn generator() -> Self {
        GENERATOR.clone()
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, CurvePoint::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { x, .. } => Some(x),
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            CurvePoint::Infinity => None,
            CurvePoint::Affine { y, .. } => Some(y),
        }
    }

    /// Recover the point with the given x coordinate and y parity
    pub fn lift_x(x: &BigUint, odd: bool) -> Result<Self> {
        let p = &*FIELD_PRIME;
        if x >= p {
            return Err(KeychainError::InvalidPoint("x not reduced mod p".to_string()));
        }
        let rhs = curve_rhs(x);
        // p = 3 mod 4, so a square root of z is z^((p+1)/4)
        let exponent = (p + BigUint::one()) >> 2u32;
        let y = field::pow(&rhs, &exponent, p);
        if field::mul(&y, &y, p) != rhs {
            return Err(KeychainError::InvalidPoint(format!("no point with x = {:064x}", x)));
        }
        let y = if field::is_even(&y) == odd { field::neg(&y, p) } else { y };
        Ok(CurvePoint::Affine { x: x.clone(), y })
    }

    /// SEC1 encoding: 0x04 || x || y, or 0x02/0x03 || x
    pub fn to_sec_bytes(&self, compressed: bool) -> Result<Vec<u8>> {
        let (x, y) = match self {
            CurvePoint::Infinity => {
                return Err(KeychainError::InvalidPoint("point at infinity has no encoding".to_string()))
            }
            CurvePoint::Affine { x, y } => (x, y),
        };
        let mut out = Vec::with_capacity(if compressed { COMPRESSED_PUBKEY_SIZE } else { UNCOMPRESSED_PUBKEY_SIZE });
        if compressed {
            out.push(if field::is_even(y) { 0x02 } else { 0x03 });
            out.extend_from_slice(&field::to_bytes32(x));
        } else {
            out.push(0x04);
            out.extend_from_slice(&field::to_bytes32(x));
            out.extend_from_slice(&field::to_bytes32(y));
        }
        Ok(out)
    }

    /// Parse a 33-byte compressed or 65-byte uncompressed SEC1 point
    pub fn from_sec_bytes(bytes: &[u8]) -> Result<Self> {
        match (bytes.len(), bytes.first()) {
            (COMPRESSED_PUBKEY_SIZE, Some(prefix @ (0x02 | 0x03))) => {
                let x = field::from_bytes(&bytes[1..]);
                CurvePoint::lift_x(&x, *prefix == 0x03)
            }
            (UNCOMPRESSED_PUBKEY_SIZE, Some(0x04)) => {
                let x = field::from_bytes(&bytes[1..33]);
                let y = field::from_bytes(&bytes[33..]);
                CurvePoint::new(x, y)
            }
            (len, prefix) => Err(KeychainError::InvalidPoint(format!(
                "unsupported public key encoding: {} bytes, prefix {:?}",
                len, prefix
            ))),
        }
    }
}

impl fmt::Display for CurvePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CurvePoint::Infinity => write!(f, "(infinity)"),
            CurvePoint::Affine { x, y } => write!(f, "({:064x}, {:064x})", x, y),
        }
    }
}

/// x^3 + ax + b mod p
fn curve_rhs(x: &BigUint) -> BigUint {
    let p = &*FIELD_PRIME;
    let x3 = field::mul(&field::mul(x, x, p), x, p);
    let ax = field::mul(&BigUint::from(SECP256K1_A), x, p);
    field::add(&field::add(&x3, &ax, p), &BigUint::from(SECP256K1_B), p)
}

/// Check y^2 = x^3 + ax + b mod p
pub fn is_on_curve(x: &BigUint, y: &BigUint) -> bool {
    let p = &*FIELD_PRIME;
    field::mul(y, y, p) == curve_rhs(x)
}

/// P + Q in affine coordinates
pub fn add(p1: &CurvePoint, p2: &CurvePoint) -> Result<CurvePoint> {
    let ((x1, y1), (x2, y2)) = match (p1, p2) {
        (CurvePoint::Infinity, _) => return Ok(p2.clone()),
        (_, CurvePoint::Infinity) => return Ok(p1.clone()),
        (CurvePoint::Affine { x: x1, y: y1 }, CurvePoint::Affine { x: x2, y: y2 }) => ((x1, y1), (x2, y2)),
    };

    if x1 == x2 {
        // Same point doubles, mirrored points cancel
        return if y1 == y2 { double(p1) } else { Ok(CurvePoint::Infinity) };
    }

    let p = &*FIELD_PRIME;
    let slope = field::div(&field::sub(y2, y1, p), &field::sub(x2, x1, p), p)?;
    let x3 = field::sub(&field::sub(&field::mul(&slope, &slope, p), x1, p), x2, p);
    let y3 = field::sub(&field::mul(&slope, &field::sub(x1, &x3, p), p), y1, p);
    Ok(CurvePoint::Affine { x: x3, y: y3 })
}

/// 2P in affine coordinates; with a = 0 the slope is 3x^2 / 2y
pub fn double(point: &CurvePoint) -> Result<CurvePoint> {
    let (x, y) = match point {
        CurvePoint::Infinity => return Ok(CurvePoint::Infinity),
        CurvePoint::Affine { x, y } => (x, y),
    };
    if y.is_zero() {
        return Ok(CurvePoint::Infinity);
    }

    let p = &*FIELD_PRIME;
    let three_x2 = field::add(
        &field::mul(&BigUint::from(3u32), &field::mul(x, x, p), p),
        &BigUint::from(SECP256K1_A),
        p,
    );
    let two_y = field::add(y, y, p);
    let slope = field::div(&three_x2, &two_y, p)?;
    let x3 = field::sub(&field::mul(&slope, &slope, p), &field::add(x, x, p), p);
    let y3 = field::sub(&field::mul(&slope, &field::sub(x, &x3, p), p), y, p);
    Ok(CurvePoint::Affine { x: x3, y: y3 })
}

/// -P
pub fn negate(point: &CurvePoint) -> CurvePoint {
    match point {
        CurvePoint::Infinity => CurvePoint::Infinity,
        CurvePoint::Affine { x, y } => CurvePoint::Affine {
            x: x.clone(),
            y: field::neg(y, &FIELD_PRIME),
        },
    }
}

/// k·P by double-and-add over the bits of k mod n
pub fn scalar_multiply(k: &BigUint, point: &CurvePoint) -> Result<CurvePoint> {
    let k = field::reduce(k, &CURVE_ORDER);
    if k.is_zero() || point.is_infinity() {
        return Ok(CurvePoint::Infinity);
    }

    let mut acc = JacobianPoint::infinity();
    for byte in k.to_bytes_be() {
        for bit in (0..8).rev() {
            acc = acc.double();
            if (byte >> bit) & 1 == 1 {
                acc = acc.add_affine(point);
            }
        }
    }
    acc.to_affine()
}

/// u1·G + u2·Q
pub fn multiply_add(u1: &BigUint, u2: &BigUint, q: &CurvePoint) -> Result<CurvePoint> {
    let a = scalar_multiply(u1, &GENERATOR)?;
    let b = scalar_multiply(u2, q)?;
    add(&a, &b)
}

/// (X, Y, Z) representing the affine point (X/Z^2, Y/Z^3); Z = 0 is infinity
#[derive(Debug, Clone)]
struct JacobianPoint {
    x: BigUint,
    y: BigUint,
    z: BigUint,
}

impl JacobianPoint {
    fn infinity() -> Self {
        JacobianPoint {
            x: BigUint::one(),
            y: BigUint::one(),
            z: BigUint::zero(),
        }
    }

    fn is_infinity(&self) -> bool {
        self.z.is_zero()
    }

    fn from_affine(x: &BigUint, y: &BigUint) -> Self {
        JacobianPoint {
            x: x.clone(),
            y: y.clone(),
            z: BigUint::one(),
        }
    }

    // dbl-2009-l, valid for a = 0
    fn double(&self) -> Self {
        if self.is_infinity() || self.y.is_zero() {
            return JacobianPoint::infinity();
        }
        let p = &*FIELD_PRIME;
        let a = field::mul(&self.x, &self.x, p);
        let b = field::mul(&self.y, &self.y, p);
        let c = field::mul(&b, &b, p);
        let x_plus_b = field::add(&self.x, &b, p);
        let d = field::sub(&field::sub(&field::mul(&x_plus_b, &x_plus_b, p), &a, p), &c, p);
        let d = field::add(&d, &d, p);
        let e = field::add(&field::add(&a, &a, p), &a, p);
        let f = field::mul(&e, &e, p);
        let x3 = field::sub(&f, &field::add(&d, &d, p), p);
        let eight_c = field::mul(&BigUint::from(8u32), &c, p);
        let y3 = field::sub(&field::mul(&e, &field::sub(&d, &x3, p), p), &eight_c, p);
        let z3 = field::mul(&BigUint::from(2u32), &field::mul(&self.y, &self.z, p), p);
        JacobianPoint { x: x3, y: y3, z: z3 }
    }

    // Mixed addition with an affine point
    fn add_affine(&self, other: &CurvePoint) -> Self {
        let (x2, y2) = match other {
            CurvePoint::Infinity => return self.clone(),
            CurvePoint::Affine { x, y } => (x, y),
        };
        if self.is_infinity() {
            return JacobianPoint::from_affine(x2, y2);
        }

        let p = &*FIELD_PRIME;
        let z1z1 = field::mul(&self.z, &self.z, p);
        let u2 = field::mul(x2, &z1z1, p);
        let s2 = field::mul(&field::mul(y2, &self.z, p), &z1z1, p);
        let h = field::sub(&u2, &self.x, p);
        let r = field::sub(&s2, &self.y, p);

        if h.is_zero() {
            return if r.is_zero() { self.double() } else { JacobianPoint::infinity() };
        }

        let hh = field::mul(&h, &h, p);
        let hhh = field::mul(&h, &hh, p);
        let v = field::mul(&self.x, &hh, p);
        let x3 = field::sub(&field::sub(&field::mul(&r, &r, p), &hhh, p), &field::add(&v, &v, p), p);
        let y3 = field::sub(
            &field::mul(&r, &field::sub(&v, &x3, p), p),
            &field::mul(&self.y, &hhh, p),
            p,
        );
        let z3 = field::mul(&self.z, &h, p);
        JacobianPoint { x: x3, y: y3, z: z3 }
    }

    fn to_affine(&self) -> Result<CurvePoint> {
        if self.is_infinity() {
            return Ok(CurvePoint::Infinity);
        }
        let p = &*FIELD_PRIME;
        let z_inv = field::inverse(&self.z, p)?;
        let z_inv2 = field::mul(&z_inv, &z_inv, p);
        let x = field::mul(&self.x, &z_inv2, p);
        let y = field::mul(&self.y, &field::mul(&z_inv2, &z_inv, p), p);
        Ok(CurvePoint::Affine { x, y })
    }
}
