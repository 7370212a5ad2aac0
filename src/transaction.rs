//! Raw transaction wire format, transaction ids and output value checks

use crate::constants::*;
use crate::error::{KeychainError, Result};
use crate::hash::sha256d;
use crate::types::*;

/// Check every output value: 0 ≤ o.value ≤ M_max
pub fn check_output_values(tx: &Transaction) -> Result<()> {
    for (index, output) in tx.outputs.iter().enumerate() {
        if output.value < 0 || output.value > MAX_MONEY {
            return Err(KeychainError::InvalidOutputValue {
                index,
                value: output.value,
            });
        }
    }
    Ok(())
}

/// Encode a number as a Bitcoin varint
pub fn encode_varint(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut result = vec![0xfd];
        result.extend_from_slice(&(value as u16).to_le_bytes());
        result
    } else if value <= 0xffffffff {
        let mut result = vec![0xfe];
        result.extend_from_slice(&(value as u32).to_le_bytes());
        result
    } else {
        let mut result = vec![0xff];
        result.extend_from_slice(&value.to_le_bytes());
        result
    }
}

/// Decode a varint from the front of `data`; returns the value and the bytes consumed
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut reader = Reader::new(data);
    let value = reader.read_varint()?;
    Ok((value, reader.pos))
}

/// Serialize a transaction to its raw wire form.
///
/// Fails with `InvalidOutputValue` if any output value is negative or above
/// the money supply.
pub fn serialize_transaction(tx: &Transaction) -> Result<Vec<u8>> {
    check_output_values(tx)?;
    let mut data = Vec::new();

    // Version (4 bytes, little-endian)
    data.extend_from_slice(&tx.version.to_le_bytes());

    // Input count (varint)
    data.extend_from_slice(&encode_varint(tx.inputs.len() as u64));

    for input in &tx.inputs {
        // Previous output hash (32 bytes, wire order)
        data.extend_from_slice(&input.prevout.hash);
        // Previous output index (4 bytes, little-endian)
        data.extend_from_slice(&input.prevout.index.to_le_bytes());
        // Script length (varint) and script
        data.extend_from_slice(&encode_varint(input.script_sig.len() as u64));
        data.extend_from_slice(&input.script_sig);
        // Sequence (4 bytes, little-endian)
        data.extend_from_slice(&input.sequence.to_le_bytes());
    }

    // Output count (varint)
    data.extend_from_slice(&encode_varint(tx.outputs.len() as u64));

    for output in &tx.outputs {
        // Value (8 bytes, little-endian); non-negative after the check above
        data.extend_from_slice(&(output.value as u64).to_le_bytes());
        // Script length (varint) and script
        data.extend_from_slice(&encode_varint(output.script_pubkey.len() as u64));
        data.extend_from_slice(&output.script_pubkey);
    }

    // Lock time (4 bytes, little-endian)
    data.extend_from_slice(&tx.lock_time.to_le_bytes());

    Ok(data)
}

/// Parse a raw transaction. Truncated input and trailing bytes are both
/// reported as `SerializationLengthMismatch`.
pub fn parse_transaction(data: &[u8]) -> Result<Transaction> {
    let mut reader = Reader::new(data);

    let version = reader.read_u32()?;

    let input_count = reader.read_varint()?;
    let mut inputs = Vec::new();
    for _ in 0..input_count {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(reader.take(32)?);
        let index = reader.read_u32()?;
        let script_sig = reader.read_bytes()?;
        let sequence = reader.read_u32()?;
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
        });
    }

    let output_count = reader.read_varint()?;
    let mut outputs = Vec::new();
    for index in 0..output_count {
        let raw = reader.read_u64()?;
        let value = i64::try_from(raw).map_err(|_| KeychainError::InvalidOutputValue {
            index: index as usize,
            value: raw as i64,
        })?;
        let script_pubkey = reader.read_bytes()?;
        outputs.push(TransactionOutput { value, script_pubkey });
    }

    let lock_time = reader.read_u32()?;

    if reader.pos != data.len() {
        return Err(KeychainError::SerializationLengthMismatch {
            expected: reader.pos,
            actual: data.len(),
        });
    }

    let tx = Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    };
    check_output_values(&tx)?;
    Ok(tx)
}

/// Transaction id in display order: SHA256d(serialized tx), byte-reversed
pub fn txid(tx: &Transaction) -> Result<Hash> {
    let mut hash = sha256d(&serialize_transaction(tx)?);
    hash.reverse();
    Ok(hash)
}

/// Wire-order hash from the usual (byte-reversed) hex display form
pub fn hash_from_hex(display: &str) -> Result<Hash> {
    let bytes = hex::decode(display).map_err(|e| KeychainError::InvalidEncoding(format!("hash hex: {}", e)))?;
    if bytes.len() != 32 {
        return Err(KeychainError::SerializationLengthMismatch {
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Ok(hash)
}

/// Display hex of a wire-order hash
pub fn hash_to_hex(wire: &Hash) -> String {
    let mut display = *wire;
    display.reverse();
    hex::encode(display)
}

/// Cursor over a byte slice
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len()).ok_or(
            KeychainError::SerializationLengthMismatch {
                expected: self.pos.saturating_add(len),
                actual: self.data.len(),
            },
        )?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(self.take(2)?);
        Ok(u16::from_le_bytes(buf))
    }

    fn read_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(self.take(8)?);
        Ok(u64::from_le_bytes(buf))
    }

    /// Varints must use their shortest form
    fn read_varint(&mut self) -> Result<u64> {
        let prefix = self.take(1)?[0];
        let (value, min) = match prefix {
            0xfd => (self.read_u16()? as u64, 0xfd),
            0xfe => (self.read_u32()? as u64, 0x1_0000),
            0xff => (self.read_u64()?, 0x1_0000_0000),
            small => return Ok(small as u64),
        };
        if value < min {
            return Err(KeychainError::InvalidEncoding(format!(
                "non-canonical varint {:#x} with prefix {:#04x}",
                value, prefix
            )));
        }
        Ok(value)
    }

    fn read_bytes(&mut self) -> Result<ByteString> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| KeychainError::SerializationLengthMismatch {
            expected: usize::MAX,
            actual: self.data.len(),
        })?;
        Ok(self.take(len)?.to_vec())
    }
}
