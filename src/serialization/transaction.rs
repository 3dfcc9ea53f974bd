//! Transaction wire codec

use super::varint::{decode_varint, encode_varint};
use super::DecodeError;
use crate::types::{OutPoint, Transaction, TransactionInput, TransactionOutput};

/// Encode a transaction to wire bytes.
pub fn encode_transaction(tx: &Transaction) -> Vec<u8> {
    let scripts: usize = tx
        .inputs
        .iter()
        .map(|input| input.script_sig.len())
        .chain(tx.outputs.iter().map(|output| output.script_pubkey.len()))
        .sum();
    let mut wire = Vec::with_capacity(16 + tx.inputs.len() * 41 + tx.outputs.len() * 9 + scripts);

    wire.extend_from_slice(&tx.version.to_le_bytes());
    wire.extend_from_slice(&encode_varint(tx.inputs.len() as u64));
    for input in &tx.inputs {
        wire.extend_from_slice(&input.prevout.hash);
        wire.extend_from_slice(&input.prevout.index.to_le_bytes());
        wire.extend_from_slice(&encode_varint(input.script_sig.len() as u64));
        wire.extend_from_slice(&input.script_sig);
        wire.extend_from_slice(&input.sequence.to_le_bytes());
    }
    wire.extend_from_slice(&encode_varint(tx.outputs.len() as u64));
    for output in &tx.outputs {
        wire.extend_from_slice(&(output.value as u64).to_le_bytes());
        wire.extend_from_slice(&encode_varint(output.script_pubkey.len() as u64));
        wire.extend_from_slice(&output.script_pubkey);
    }
    wire.extend_from_slice(&tx.lock_time.to_le_bytes());
    wire
}

/// Decode a transaction from wire bytes. Trailing bytes after the lock
/// time are rejected as an oversized input.
pub fn decode_transaction(data: &[u8]) -> Result<Transaction, DecodeError> {
    let mut reader = Reader::new(data);

    let version = reader.u32_le()?;
    let input_count = reader.varint()?;
    let mut inputs = Vec::new();
    for _ in 0..input_count {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(reader.bytes(32)?);
        let index = reader.u32_le()?;
        let script_sig = reader.var_bytes()?.to_vec();
        let sequence = reader.u32_le()?;
        inputs.push(TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
        });
    }

    let output_count = reader.varint()?;
    let mut outputs = Vec::new();
    for _ in 0..output_count {
        let value = reader.u64_le()? as i64;
        let script_pubkey = reader.var_bytes()?.to_vec();
        outputs.push(TransactionOutput {
            value,
            script_pubkey,
        });
    }

    let lock_time = reader.u32_le()?;
    if !reader.is_exhausted() {
        return Err(DecodeError::OversizedLength);
    }

    Ok(Transaction {
        version,
        inputs,
        outputs,
        lock_time,
    })
}

struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, position: 0 }
    }

    fn bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .position
            .checked_add(count)
            .ok_or(DecodeError::OversizedLength)?;
        if end > self.data.len() {
            return Err(DecodeError::UnexpectedEnd);
        }
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    fn u32_le(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn u64_le(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.bytes(8)?;
        let mut buffer = [0u8; 8];
        buffer.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buffer))
    }

    fn varint(&mut self) -> Result<u64, DecodeError> {
        let (value, consumed) = decode_varint(&self.data[self.position..])?;
        self.position += consumed;
        Ok(value)
    }

    fn var_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let length = self.varint()?;
        let length = usize::try_from(length).map_err(|_| DecodeError::OversizedLength)?;
        self.bytes(length)
    }

    fn is_exhausted(&self) -> bool {
        self.position == self.data.len()
    }
}
