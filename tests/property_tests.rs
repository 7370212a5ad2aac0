//! Property tests for curve arithmetic, signing and derivation

use keychain_tx::field::{self, CURVE_ORDER, FIELD_PRIME};
use keychain_tx::point::{self, GENERATOR};
use keychain_tx::*;
use num_bigint::BigUint;
use proptest::prelude::*;

/// Scalar in [1, n-1] built from 32 arbitrary bytes
fn scalar() -> impl Strategy<Value = BigUint> {
    any::<[u8; 32]>().prop_map(|bytes| {
        let value = BigUint::from_bytes_be(&bytes) % (&*CURVE_ORDER - 1u32);
        value + 1u32
    })
}

fn field_element() -> impl Strategy<Value = BigUint> {
    any::<[u8; 32]>().prop_map(|bytes| BigUint::from_bytes_be(&bytes) % &*FIELD_PRIME)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_field_inverse(a in field_element()) {
        prop_assume!(a != BigUint::from(0u32));
        let inv = field::inverse(&a, &FIELD_PRIME).unwrap();
        prop_assert_eq!(field::mul(&a, &inv, &FIELD_PRIME), BigUint::from(1u32));
    }

    #[test]
    fn prop_field_add_sub(a in field_element(), b in field_element()) {
        let sum = field::add(&a, &b, &FIELD_PRIME);
        prop_assert!(sum < *FIELD_PRIME);
        prop_assert_eq!(field::sub(&sum, &b, &FIELD_PRIME), a);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_point_addition_commutes(a in scalar(), b in scalar()) {
        let p = point::scalar_multiply(&a, &GENERATOR).unwrap();
        let q = point::scalar_multiply(&b, &GENERATOR).unwrap();
        prop_assert_eq!(point::add(&p, &q).unwrap(), point::add(&q, &p).unwrap());
    }

    #[test]
    fn prop_point_addition_associates(a in scalar(), b in scalar(), c in scalar()) {
        let p = point::scalar_multiply(&a, &GENERATOR).unwrap();
        let q = point::scalar_multiply(&b, &GENERATOR).unwrap();
        let r = point::scalar_multiply(&c, &GENERATOR).unwrap();
        let left = point::add(&point::add(&p, &q).unwrap(), &r).unwrap();
        let right = point::add(&p, &point::add(&q, &r).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_scalar_multiplication_distributes(a in scalar(), b in scalar()) {
        let p = point::scalar_multiply(&a, &GENERATOR).unwrap();
        let q = point::scalar_multiply(&b, &GENERATOR).unwrap();
        let sum = field::add(&a, &b, &CURVE_ORDER);
        prop_assert_eq!(point::add(&p, &q).unwrap(), point::scalar_multiply(&sum, &GENERATOR).unwrap());
    }

    #[test]
    fn prop_multiples_stay_on_curve(k in scalar()) {
        let p = point::scalar_multiply(&k, &GENERATOR).unwrap();
        prop_assert!(point::is_on_curve(p.x().unwrap(), p.y().unwrap()));
        prop_assert_eq!(CurvePoint::from_sec_bytes(&p.to_sec_bytes(true).unwrap()).unwrap(), p);
    }

    #[test]
    fn prop_sign_verify(secret in scalar(), hash in any::<[u8; 32]>()) {
        let key = KeyPair::from_scalar(secret).unwrap();
        let signature = key.sign(&hash).unwrap();
        prop_assert!(signature.is_low_s());
        prop_assert!(key.verify(&hash, &signature).unwrap());
        prop_assert_eq!(key.sign(&hash).unwrap(), signature.clone());
        prop_assert_eq!(Signature::from_der(&signature.to_der()).unwrap(), signature);
    }

    #[test]
    fn prop_distinct_messages_use_distinct_nonces(
        secret in scalar(),
        h1 in any::<[u8; 32]>(),
        h2 in any::<[u8; 32]>(),
    ) {
        prop_assume!(h1 != h2);
        let key = KeyPair::from_scalar(secret).unwrap();
        let first = key.sign(&h1).unwrap();
        let second = key.sign(&h2).unwrap();
        prop_assert_ne!(&first.r, &second.r);
    }

    #[test]
    fn prop_signature_rejects_other_message(secret in scalar(), hash in any::<[u8; 32]>()) {
        let key = KeyPair::from_scalar(secret).unwrap();
        let signature = key.sign(&hash).unwrap();
        let mut other = hash;
        other[0] ^= 0x01;
        prop_assert!(!key.verify(&other, &signature).unwrap());
    }

    #[test]
    fn prop_public_derivation_matches_private(seed in any::<[u8; 32]>(), index in 0u32..0x8000_0000) {
        let master = ExtendedKey::from_seed(&seed, Network::Mainnet).unwrap();
        let child = ChildNumber::from_index(index);
        let from_private = master.derive_child(child).unwrap().neuter();
        let from_public = master.neuter().derive_child(child).unwrap();
        prop_assert_eq!(from_private, from_public);
    }
}
