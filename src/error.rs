//! Error types for key, derivation and transaction operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeychainError {
    #[error("Invalid private scalar: {0}")]
    InvalidScalar(String),

    #[error("Invalid curve point: {0}")]
    InvalidPoint(String),

    #[error("Modular inverse of zero requested")]
    InversionOfZero,

    #[error("Signature component out of range: {0}")]
    SignatureOutOfRange(String),

    #[error("Hardened derivation requires a private key (index {0:#010x})")]
    HardenedDerivationRequiresPrivateKey(u32),

    #[error("Invalid child derivation at index {index:#010x}, retry with the next index")]
    InvalidChildDerivation { index: u32 },

    #[error("Malformed script: {0}")]
    MalformedScript(String),

    #[error("Unsupported script type: {0}")]
    UnsupportedScriptType(String),

    #[error("Serialization length mismatch: expected {expected} bytes, got {actual}")]
    SerializationLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    #[error("Invalid output value {value} at index {index}")]
    InvalidOutputValue { index: usize, value: i64 },

    #[error("Input index {index} out of range ({count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    #[error("Deterministic nonce generation exhausted after {0} attempts")]
    NonceExhausted(usize),
}

pub type Result<T> = std::result::Result<T, KeychainError>;
