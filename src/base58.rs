//! Base58Check: Base58(version || payload || SHA256d(version || payload)[..4])

use crate::constants::HASH160_SIZE;
use crate::error::{KeychainError, Result};
use crate::hash::sha256d;

const CHECKSUM_SIZE: usize = 4;

/// Encode `version || payload` with a 4-byte double-SHA256 checksum
pub fn check_encode(version: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(version.len() + payload.len() + CHECKSUM_SIZE);
    data.extend_from_slice(version);
    data.extend_from_slice(payload);
    let checksum = sha256d(&data);
    data.extend_from_slice(&checksum[..CHECKSUM_SIZE]);
    bs58::encode(data).into_string()
}

/// Decode and verify the checksum; returns `version || payload`
pub fn check_decode(encoded: &str) -> Result<Vec<u8>> {
    let mut data = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| KeychainError::InvalidEncoding(format!("base58: {}", e)))?;
    if data.len() < CHECKSUM_SIZE {
        return Err(KeychainError::InvalidEncoding("base58check payload too short".to_string()));
    }
    let split = data.len() - CHECKSUM_SIZE;
    let checksum = sha256d(&data[..split]);
    if checksum[..CHECKSUM_SIZE] != data[split..] {
        return Err(KeychainError::InvalidChecksum);
    }
    data.truncate(split);
    Ok(data)
}

/// Address text for a one-byte version and a 20-byte hash
pub fn encode_address(version: u8, hash: &[u8; HASH160_SIZE]) -> String {
    check_encode(&[version], hash)
}

/// Split an address into its version byte and 20-byte hash
pub fn decode_address(address: &str) -> Result<(u8, [u8; HASH160_SIZE])> {
    let data = check_decode(address)?;
    if data.len() != 1 + HASH160_SIZE {
        return Err(KeychainError::SerializationLengthMismatch {
            expected: 1 + HASH160_SIZE,
            actual: data.len(),
        });
    }
    let mut hash = [0u8; HASH160_SIZE];
    hash.copy_from_slice(&data[1..]);
    Ok((data[0], hash))
}
