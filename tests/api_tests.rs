//! Tests for the public Keychain API and key encodings

use keychain_tx::*;
use num_bigint::BigUint;

const GENERATOR_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

#[test]
fn test_keychain_address_and_wif() {
    let keychain = Keychain::new(Network::Mainnet);
    let key = KeyPair::from_scalar(BigUint::from(1u32)).unwrap();
    assert_eq!(keychain.address(&key), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    assert_eq!(
        keychain.key_to_wif(&key),
        "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn"
    );

    let uncompressed = key.clone().with_compression(false);
    assert_eq!(keychain.address(&uncompressed), "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm");
    assert_eq!(
        keychain.key_to_wif(&uncompressed),
        "5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf"
    );
}

#[test]
fn test_wif_import_restores_compression() {
    let (key, network) = KeyPair::from_wif("5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4nEB3kEsreAnchuDf").unwrap();
    assert_eq!(network, Network::Mainnet);
    assert!(!key.is_compressed());
    assert_eq!(key.secret(), &BigUint::from(1u32));

    let (key, _) = KeyPair::from_wif("KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgd9M7rFU73sVHnoWn").unwrap();
    assert!(key.is_compressed());
}

#[test]
fn test_testnet_wif_round_trip() {
    let keychain = Keychain::new(Network::Testnet);
    let key = keychain.generate_key(&mut FixedEntropy::new(vec![0x13, 0x37])).unwrap();
    let wif = keychain.key_to_wif(&key);
    assert!(wif.starts_with('c'));
    assert_eq!(keychain.key_from_wif(&wif).unwrap(), key);
    assert!(keychain.address(&key).starts_with(['m', 'n']));
}

#[test]
fn test_public_key_parsing() {
    let public = PublicKey::from_bytes(&hex::decode(GENERATOR_COMPRESSED).unwrap()).unwrap();
    assert_eq!(public.point(), CurvePoint::generator());
    assert_eq!(public.to_string(), GENERATOR_COMPRESSED);

    let uncompressed = public.to_bytes(false);
    assert_eq!(uncompressed.len(), 65);
    assert_eq!(PublicKey::from_bytes(&uncompressed).unwrap(), public);
}

#[test]
fn test_fixed_entropy_is_reproducible() {
    let a = KeyPair::from_entropy(&mut FixedEntropy::new(vec![1, 2, 3, 4])).unwrap();
    let b = KeyPair::from_entropy(&mut FixedEntropy::new(vec![1, 2, 3, 4])).unwrap();
    assert_eq!(a, b);
    let c = KeyPair::from_entropy(&mut OsEntropy).unwrap();
    assert_ne!(a, c);
}

#[test]
fn test_satoshi_nakamoto_signature() {
    let keychain = Keychain::default();
    let key = KeyPair::from_scalar(BigUint::from(1u32)).unwrap();
    let hash = hash::sha256(b"Satoshi Nakamoto");
    let signature = keychain.sign(&key, &hash).unwrap();
    assert_eq!(
        hex::encode(signature.to_compact()),
        "934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
         2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
    );
    assert!(keychain.verify(key.public_key(), &hash, &signature).unwrap());
}

#[test]
fn test_derivation_path_through_keychain() {
    let keychain = Keychain::default();
    let master = keychain.master_key(&hex::decode("000102030405060708090a0b0c0d0e0f").unwrap()).unwrap();
    let account = keychain.derive(&master, "m/44'/0'/0'").unwrap();
    assert_eq!(account.depth(), 3);
    assert_eq!(account.child_number(), ChildNumber::hardened(0).unwrap());

    let external = keychain.derive(&account.neuter(), "m/0/5").unwrap();
    let private = keychain.derive(&account, "m/0/5").unwrap();
    assert_eq!(external.public_key(), private.public_key());
    assert_eq!(
        external.public_key().address(Network::Mainnet, true),
        private.key_pair().unwrap().address(Network::Mainnet)
    );
}

#[test]
fn test_derive_children_public_batch() {
    let master = ExtendedKey::from_seed(&[0x44; 32], Network::Mainnet).unwrap();
    let children: Vec<ChildNumber> = (0..4).map(ChildNumber::from_index).collect();
    let public = master.neuter().derive_children(&children).unwrap();
    let private = master.derive_children(&children).unwrap();
    for (a, b) in public.iter().zip(private.iter()) {
        assert_eq!(a, &b.neuter());
    }
}

#[test]
fn test_serde_values() {
    let json = serde_json::to_string(&Network::Testnet).unwrap();
    assert_eq!(json, "\"testnet\"");
    assert_eq!(serde_json::from_str::<Network>(&json).unwrap(), Network::Testnet);

    let child = ChildNumber::hardened(44).unwrap();
    let back: ChildNumber = serde_json::from_str(&serde_json::to_string(&child).unwrap()).unwrap();
    assert_eq!(back, child);

    let path: DerivationPath = "m/44'/0'/0'/0".parse().unwrap();
    let back: DerivationPath = serde_json::from_str(&serde_json::to_string(&path).unwrap()).unwrap();
    assert_eq!(back, path);

    let script_type: ScriptType = serde_json::from_str("\"p2sh\"").unwrap();
    assert_eq!(script_type, ScriptType::P2sh);
}
