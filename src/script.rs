//! Script templates for the two supported output types
//!
//! Only template construction and recognition is provided; scripts are
//! never executed.

use crate::constants::*;
use crate::error::{KeychainError, Result};
use crate::types::ByteString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported locking script templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    P2pkh,
    /// OP_HASH160 <20 bytes> OP_EQUAL
    P2sh,
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScriptType::P2pkh => write!(f, "p2pkh"),
            ScriptType::P2sh => write!(f, "p2sh"),
        }
    }
}

impl FromStr for ScriptType {
    type Err = KeychainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p2pkh" => Ok(ScriptType::P2pkh),
            "p2sh" => Ok(ScriptType::P2sh),
            other => Err(KeychainError::UnsupportedScriptType(other.to_string())),
        }
    }
}

/// OP_DUP OP_HASH160 <pubkey hash> OP_EQUALVERIFY OP_CHECKSIG
pub fn p2pkh_script(pubkey_hash: &[u8; HASH160_SIZE]) -> ByteString {
    let mut script = Vec::with_capacity(25);
    script.push(OP_DUP);
    script.push(OP_HASH160);
    script.push(HASH160_SIZE as u8);
    script.extend_from_slice(pubkey_hash);
    script.push(OP_EQUALVERIFY);
    script.push(OP_CHECKSIG);
    script
}

/// OP_HASH160 <script hash> OP_EQUAL
pub fn p2sh_script(script_hash: &[u8; HASH160_SIZE]) -> ByteString {
    let mut script = Vec::with_capacity(23);
    script.push(OP_HASH160);
    script.push(HASH160_SIZE as u8);
    script.extend_from_slice(script_hash);
    script.push(OP_EQUAL);
    script
}

/// Locking script for `script_type` paying to `hash`
pub fn locking_script(script_type: ScriptType, hash: &[u8; HASH160_SIZE]) -> ByteString {
    match script_type {
        ScriptType::P2pkh => p2pkh_script(hash),
        ScriptType::P2sh => p2sh_script(hash),
    }
}

/// Recognise a template locking script and extract its 20-byte hash
pub fn classify(script: &[u8]) -> Result<(ScriptType, [u8; HASH160_SIZE])> {
    let mut hash = [0u8; HASH160_SIZE];
    match script {
        [OP_DUP, OP_HASH160, 0x14, body @ .., OP_EQUALVERIFY, OP_CHECKSIG] if body.len() == HASH160_SIZE => {
            hash.copy_from_slice(body);
            Ok((ScriptType::P2pkh, hash))
        }
        [OP_HASH160, 0x14, body @ .., OP_EQUAL] if body.len() == HASH160_SIZE => {
            hash.copy_from_slice(body);
            Ok((ScriptType::P2sh, hash))
        }
        _ => Err(KeychainError::UnsupportedScriptType(format!(
            "unrecognised locking script of {} bytes",
            script.len()
        ))),
    }
}

/// Minimal push of `data`: direct push up to 75 bytes, OP_PUSHDATA1 up to 255
pub fn push_data(data: &[u8]) -> Result<ByteString> {
    let mut out = Vec::with_capacity(data.len() + 2);
    match data.len() {
        len @ 0..=0x4b => out.push(len as u8),
        len @ 0x4c..=0xff => {
            out.push(OP_PUSHDATA1);
            out.push(len as u8);
        }
        len => {
            return Err(KeychainError::MalformedScript(format!(
                "push of {} bytes is not supported",
                len
            )))
        }
    }
    out.extend_from_slice(data);
    Ok(out)
}

/// Read one push starting at `pos`; returns the data and the next position
fn read_push(script: &[u8], pos: usize) -> Result<(&[u8], usize)> {
    let opcode = *script
        .get(pos)
        .ok_or_else(|| KeychainError::MalformedScript("missing push opcode".to_string()))?;
    let (len, start) = match opcode {
        0x00..=0x4b => (opcode as usize, pos + 1),
        OP_PUSHDATA1 => {
            let len = *script
                .get(pos + 1)
                .ok_or_else(|| KeychainError::MalformedScript("truncated OP_PUSHDATA1".to_string()))?;
            (len as usize, pos + 2)
        }
        other => {
            return Err(KeychainError::MalformedScript(format!(
                "expected a push, found opcode {:#04x}",
                other
            )))
        }
    };
    let end = start + len;
    if end > script.len() {
        return Err(KeychainError::MalformedScript(format!(
            "push of {} bytes runs past the end of the script",
            len
        )));
    }
    Ok((&script[start..end], end))
}

/// <signature || sighash type> <public key>
pub fn p2pkh_script_sig(signature: &[u8], public_key: &[u8]) -> Result<ByteString> {
    let mut script = push_data(signature)?;
    script.extend_from_slice(&push_data(public_key)?);
    Ok(script)
}

/// Split a P2PKH unlocking script into (signature || sighash type, public key)
pub fn parse_p2pkh_script_sig(script: &[u8]) -> Result<(ByteString, ByteString)> {
    let (signature, next) = read_push(script, 0)?;
    let (public_key, end) = read_push(script, next)?;
    if end != script.len() {
        return Err(KeychainError::MalformedScript(
            "unexpected data after public key".to_string(),
        ));
    }
    if signature.is_empty() || public_key.is_empty() {
        return Err(KeychainError::MalformedScript("empty push in unlocking script".to_string()));
    }
    Ok((signature.to_vec(), public_key.to_vec()))
}
