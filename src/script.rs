//! Script parsing, serialization, and pattern classification
//!
//! A script is an ordered list of operations. The wire form packs each
//! operation as one opcode byte, optionally followed by a length field and
//! the pushed bytes. Parsing is total: the only malformed input is a push
//! whose data runs past the end of the stream, and that collapses to the
//! empty script rather than an error.

use std::fmt;

use crate::error::{Result, ScriptError};
use crate::opcode::Opcode;
use crate::types::ByteString;

/// A single instruction: an opcode and, for pushes, the literal bytes it
/// places on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub opcode: Opcode,
    pub data: ByteString,
}

impl Operation {
    /// An instruction with no attached data.
    pub fn new(opcode: Opcode) -> Self {
        Operation {
            opcode,
            data: ByteString::new(),
        }
    }

    /// A push instruction carrying its literal bytes.
    pub fn with_data(opcode: Opcode, data: ByteString) -> Self {
        Operation { opcode, data }
    }
}

/// Standard output-script shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentType {
    /// `push(pubkey) CHECKSIG`
    Pubkey,
    /// `DUP HASH160 push(20 bytes) EQUALVERIFY CHECKSIG`
    PubkeyHash,
    /// `HASH160 push(20 bytes) EQUAL`
    ScriptHash,
    /// Never produced by [`Script::classify`]; multisig outputs are not
    /// recognized and fall through to `NonStandard`.
    Multisig,
    NonStandard,
}

/// An ordered list of operations. Mutable while being built, read-only
/// during execution; the interpreter keeps all run state on its own stacks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    operations: Vec<Operation>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_operations(operations: Vec<Operation>) -> Self {
        Script { operations }
    }

    /// Wrap a coinbase body, which is carried verbatim and never executed.
    pub fn coinbase(raw: ByteString) -> Self {
        Script {
            operations: vec![Operation::with_data(Opcode::RawData, raw)],
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn push_operation(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    /// Append a push of `data`, choosing the shortest push opcode that can
    /// carry it.
    pub fn push_data(&mut self, data: &[u8]) {
        let opcode = match data.len() {
            0 => Opcode::Zero,
            1..=75 => Opcode::Special,
            76..=255 => Opcode::PushData1,
            256..=65535 => Opcode::PushData2,
            _ => Opcode::PushData4,
        };
        self.operations
            .push(Operation::with_data(opcode, data.to_vec()));
    }

    /// Append every operation of `other`.
    pub fn join(&mut self, other: &Script) {
        self.operations.extend_from_slice(&other.operations);
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Decode a raw byte sequence. A push that runs out of bytes yields the
    /// empty script; there is no other way for parsing to fail, since every
    /// byte maps to some opcode.
    pub fn parse(raw: &[u8]) -> Script {
        Self::try_parse(raw).unwrap_or_default()
    }

    fn try_parse(raw: &[u8]) -> Result<Script> {
        let mut operations = Vec::new();
        let mut cursor = 0usize;
        while cursor < raw.len() {
            let byte = raw[cursor];
            cursor += 1;
            let opcode = Opcode::from_byte(byte);
            let data = match opcode {
                Opcode::Special => take(raw, &mut cursor, byte as usize)?.to_vec(),
                Opcode::PushData1 => {
                    let length = take(raw, &mut cursor, 1)?[0] as usize;
                    take(raw, &mut cursor, length)?.to_vec()
                }
                Opcode::PushData2 => {
                    let prefix = take(raw, &mut cursor, 2)?;
                    let length = u16::from_le_bytes([prefix[0], prefix[1]]) as usize;
                    take(raw, &mut cursor, length)?.to_vec()
                }
                Opcode::PushData4 => {
                    let prefix = take(raw, &mut cursor, 4)?;
                    let length =
                        u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
                    take(raw, &mut cursor, length)?.to_vec()
                }
                _ => ByteString::new(),
            };
            operations.push(Operation::with_data(opcode, data));
        }
        Ok(Script { operations })
    }

    /// Encode back to wire bytes. The inverse of [`parse`](Self::parse)
    /// for any script whose pushes satisfy the length invariants. A script
    /// holding a single `RawData` operation serializes to that data
    /// verbatim.
    pub fn to_bytes(&self) -> ByteString {
        if let [only] = self.operations.as_slice() {
            if only.opcode == Opcode::RawData {
                return only.data.clone();
            }
        }
        let mut raw = ByteString::new();
        for operation in &self.operations {
            match operation.opcode {
                Opcode::Special => raw.push(operation.data.len() as u8),
                opcode => match opcode.to_byte() {
                    Some(byte) => raw.push(byte),
                    None => continue,
                },
            }
            match operation.opcode {
                Opcode::PushData1 => raw.push(operation.data.len() as u8),
                Opcode::PushData2 => {
                    raw.extend_from_slice(&(operation.data.len() as u16).to_le_bytes())
                }
                Opcode::PushData4 => {
                    raw.extend_from_slice(&(operation.data.len() as u32).to_le_bytes())
                }
                _ => {}
            }
            raw.extend_from_slice(&operation.data);
        }
        raw
    }

    /// True when every operation is from the push set.
    pub fn is_push_only(&self) -> bool {
        self.operations
            .iter()
            .all(|operation| operation.opcode.is_push_value())
    }

    /// Recognize the standard output shapes.
    pub fn classify(&self) -> PaymentType {
        let ops = self.operations.as_slice();
        if is_pubkey_shape(ops) {
            PaymentType::Pubkey
        } else if is_pubkey_hash_shape(ops) {
            PaymentType::PubkeyHash
        } else if is_script_hash_shape(ops) {
            PaymentType::ScriptHash
        } else {
            PaymentType::NonStandard
        }
    }
}

fn is_pubkey_shape(ops: &[Operation]) -> bool {
    matches!(ops, [key, check]
        if key.opcode == Opcode::Special && check.opcode == Opcode::CheckSig)
}

fn is_pubkey_hash_shape(ops: &[Operation]) -> bool {
    matches!(ops, [dup, hash, digest, equal, check]
        if dup.opcode == Opcode::Dup
            && hash.opcode == Opcode::Hash160
            && digest.opcode == Opcode::Special
            && digest.data.len() == 20
            && equal.opcode == Opcode::EqualVerify
            && check.opcode == Opcode::CheckSig)
}

fn is_script_hash_shape(ops: &[Operation]) -> bool {
    matches!(ops, [hash, digest, equal]
        if hash.opcode == Opcode::Hash160
            && digest.opcode == Opcode::Special
            && digest.data.len() == 20
            && equal.opcode == Opcode::Equal)
}

fn take<'a>(raw: &'a [u8], cursor: &mut usize, count: usize) -> Result<&'a [u8]> {
    let end = cursor
        .checked_add(count)
        .filter(|&end| end <= raw.len())
        .ok_or(ScriptError::ParseUnderflow)?;
    let slice = &raw[*cursor..end];
    *cursor = end;
    Ok(slice)
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, operation) in self.operations.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            if operation.data.is_empty() {
                write!(f, "{}", operation.opcode)?;
            } else {
                f.write_str("[ ")?;
                for byte in &operation.data {
                    write!(f, "{byte:02x}")?;
                }
                f.write_str(" ]")?;
            }
        }
        Ok(())
    }
}
