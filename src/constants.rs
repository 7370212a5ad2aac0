//! secp256k1, BIP32 and transaction constants

/// Field prime p = 2^256 - 2^32 - 977
pub const SECP256K1_P: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// Order n of the generator
pub const SECP256K1_N: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
    0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

/// Generator x coordinate
pub const SECP256K1_GX: [u8; 32] = [
    0x79, 0xbe, 0x66, 0x7e, 0xf9, 0xdc, 0xbb, 0xac,
    0x55, 0xa0, 0x62, 0x95, 0xce, 0x87, 0x0b, 0x07,
    0x02, 0x9b, 0xfc, 0xdb, 0x2d, 0xce, 0x28, 0xd9,
    0x59, 0xf2, 0x81, 0x5b, 0x16, 0xf8, 0x17, 0x98,
];

/// Generator y coordinate
pub const SECP256K1_GY: [u8; 32] = [
    0x48, 0x3a, 0xda, 0x77, 0x26, 0xa3, 0xc4, 0x65,
    0x5d, 0xa4, 0xfb, 0xfc, 0x0e, 0x11, 0x08, 0xa8,
    0xfd, 0x17, 0xb4, 0x48, 0xa6, 0x85, 0x54, 0x19,
    0x9c, 0x47, 0xd0, 0x8f, 0xfb, 0x10, 0xd4, 0xb8,
];

/// Curve coefficient a in y^2 = x^3 + ax + b
pub const SECP256K1_A: u32 = 0;

/// Curve coefficient b in y^2 = x^3 + ax + b
pub const SECP256K1_B: u32 = 7;

/// Byte length of a scalar or a field element
pub const SCALAR_SIZE: usize = 32;

/// SEC1 compressed public key length
pub const COMPRESSED_PUBKEY_SIZE: usize = 33;

/// SEC1 uncompressed public key length
pub const UNCOMPRESSED_PUBKEY_SIZE: usize = 65;

/// HASH160 output length
pub const HASH160_SIZE: usize = 20;

/// Upper bound on RFC6979 candidates tried by a single signing call
pub const MAX_NONCE_ATTEMPTS: usize = 64;

/// HMAC key for BIP32 master key generation
pub const BIP32_SEED_KEY: &[u8] = b"Bitcoin seed";

/// First hardened child index (2^31)
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Raw length of a serialized extended key (before Base58Check)
pub const EXTENDED_KEY_SIZE: usize = 78;

/// Accepted BIP32 seed lengths (128 to 512 bits)
pub const MIN_SEED_SIZE: usize = 16;
pub const MAX_SEED_SIZE: usize = 64;

/// Default transaction version
pub const TX_VERSION: u32 = 1;

/// Sequence number for final transaction
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Sign all inputs and all outputs
pub const SIGHASH_ALL: u32 = 0x01;

/// Maximum money supply: 21,000,000 BTC in satoshis
pub const MAX_MONEY: i64 = 21_000_000 * 100_000_000;

// Script opcodes used by the supported templates
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_PUSHDATA1: u8 = 0x4c;
