//! Transaction types consumed by the interpreter

use serde::{Deserialize, Serialize};

/// 256-bit hash
pub type Hash = [u8; 32];

/// Variable-length byte string, the universal stack-element type
pub type ByteString = Vec<u8>;

/// Reference to an output of a previous transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// One spend of a previous output. The unlocking script is carried as raw
/// bytes and parsed at the point of execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Value locked behind a predicate script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}
