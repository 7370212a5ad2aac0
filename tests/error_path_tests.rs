//! Error paths across the public API

use keychain_tx::field::{self, CURVE_ORDER, FIELD_PRIME};
use keychain_tx::point;
use keychain_tx::*;
use num_bigint::BigUint;

#[test]
fn test_inverse_of_zero() {
    assert_eq!(
        field::inverse(&BigUint::from(0u32), &FIELD_PRIME),
        Err(KeychainError::InversionOfZero)
    );
    assert_eq!(
        field::div(&BigUint::from(1u32), &CURVE_ORDER, &CURVE_ORDER),
        Err(KeychainError::InversionOfZero)
    );
}

#[test]
fn test_off_curve_point_rejected() {
    let result = CurvePoint::new(BigUint::from(1u32), BigUint::from(1u32));
    assert!(matches!(result, Err(KeychainError::InvalidPoint(_))));

    let mut bytes = vec![0x04];
    bytes.extend_from_slice(&[0x01; 64]);
    assert!(matches!(PublicKey::from_bytes(&bytes), Err(KeychainError::InvalidPoint(_))));
}

#[test]
fn test_infinity_is_not_a_public_key() {
    let infinity = point::scalar_multiply(&CURVE_ORDER, &CurvePoint::generator()).unwrap();
    assert!(infinity.is_infinity());
    assert!(matches!(PublicKey::from_point(&infinity), Err(KeychainError::InvalidPoint(_))));
    assert!(infinity.to_sec_bytes(true).is_err());
}

#[test]
fn test_signature_components_out_of_range() {
    assert!(matches!(
        Signature::new(BigUint::from(0u32), BigUint::from(1u32)),
        Err(KeychainError::SignatureOutOfRange(_))
    ));
    assert!(matches!(
        Signature::new(BigUint::from(1u32), CURVE_ORDER.clone()),
        Err(KeychainError::SignatureOutOfRange(_))
    ));
    assert!(Signature::from_der(&[0x30, 0x00]).is_err());
}

#[test]
fn test_invalid_private_scalars() {
    assert!(matches!(KeyPair::from_bytes(&[0u8; 32]), Err(KeychainError::InvalidScalar(_))));
    assert!(matches!(KeyPair::from_bytes(&[0xff; 32]), Err(KeychainError::InvalidScalar(_))));
    assert!(matches!(
        KeyPair::from_bytes(&[1u8; 33]),
        Err(KeychainError::SerializationLengthMismatch { expected: 32, actual: 33 })
    ));
}

#[test]
fn test_hardened_derivation_from_public_key() {
    let master = ExtendedKey::from_seed(&[0x21; 32], Network::Mainnet).unwrap();
    let result = master.neuter().derive_path(&"m/0/1'".parse().unwrap());
    assert_eq!(result, Err(KeychainError::HardenedDerivationRequiresPrivateKey(0x8000_0001)));

    let raw = ChildNumber::from_index(0x8000_0007);
    assert_eq!(
        master.neuter().derive_child(raw),
        Err(KeychainError::HardenedDerivationRequiresPrivateKey(0x8000_0007))
    );
    assert_eq!(
        master.neuter().derive_child_or_next(raw),
        Err(KeychainError::HardenedDerivationRequiresPrivateKey(0x8000_0007))
    );
}

#[test]
fn test_malformed_derivation_paths() {
    for path in ["", "x/0", "m/-1", "m/0''", "m/4294967295", "m/1/"] {
        assert!(
            matches!(path.parse::<DerivationPath>(), Err(KeychainError::InvalidDerivationPath(_))),
            "path {:?} should be rejected",
            path
        );
    }
}

#[test]
fn test_unsupported_script_and_addresses() {
    assert!(matches!(
        script::classify(&[0x00, 0x14, 0x01]),
        Err(KeychainError::UnsupportedScriptType(_))
    ));
    assert!(matches!(
        base58::decode_address("1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMj"),
        Err(KeychainError::InvalidChecksum)
    ));
    let unknown = base58::encode_address(0x30, &[1; 20]);
    let mut builder = TransactionBuilder::new();
    assert!(matches!(
        builder.add_output(&unknown, 1, ScriptType::P2pkh),
        Err(KeychainError::InvalidVersion(_))
    ));
}

#[test]
fn test_malformed_script_sig() {
    assert!(matches!(
        script::parse_p2pkh_script_sig(&[0x4c]),
        Err(KeychainError::MalformedScript(_))
    ));
    assert!(matches!(script::push_data(&[0u8; 300]), Err(KeychainError::MalformedScript(_))));
}

#[test]
fn test_builder_errors() {
    let mut builder = TransactionBuilder::new();
    assert_eq!(
        builder.signature_hash(0),
        Err(KeychainError::InputIndexOutOfRange { index: 0, count: 0 })
    );
    assert!(matches!(
        builder.add_output_hash(&[0; 20], -1, ScriptType::P2pkh),
        Err(KeychainError::InvalidOutputValue { index: 0, value: -1 })
    ));
    assert!(builder.sign_all_inputs().is_ok());
}

#[test]
fn test_truncated_transaction() {
    let result = transaction::parse_transaction(&[0x01, 0x00, 0x00]);
    assert!(matches!(result, Err(KeychainError::SerializationLengthMismatch { expected: 4, actual: 3 })));
}

#[test]
fn test_error_messages() {
    let err = KeychainError::InvalidChildDerivation { index: 0x8000_0000 };
    assert!(err.to_string().contains("0x80000000"));
    let err = KeychainError::SerializationLengthMismatch { expected: 78, actual: 77 };
    assert_eq!(err.to_string(), "Serialization length mismatch: expected 78 bytes, got 77");
}
