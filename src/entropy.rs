//! Entropy capability passed explicitly to every randomized operation

use rand::rngs::OsRng;
use rand::RngCore;

/// Source of cryptographically sound random bytes
pub trait EntropySource {
    /// Return exactly `len` fresh bytes
    fn next_bytes(&mut self, len: usize) -> Vec<u8>;
}

/// Entropy from the operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}

/// Replays a fixed byte sequence, cycling when exhausted. Meant for tests
/// and reproducible fixtures only.
#[derive(Debug, Clone)]
pub struct FixedEntropy {
    bytes: Vec<u8>,
    position: usize,
}

impl FixedEntropy {
    pub fn new(bytes: Vec<u8>) -> Self {
        FixedEntropy { bytes, position: 0 }
    }
}

impl EntropySource for FixedEntropy {
    fn next_bytes(&mut self, len: usize) -> Vec<u8> {
        if self.bytes.is_empty() {
            return vec![0u8; len];
        }
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.bytes[self.position % self.bytes.len()]);
            self.position += 1;
        }
        out
    }
}
