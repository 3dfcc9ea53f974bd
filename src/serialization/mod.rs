//! Network wire format for transactions
//!
//! The signature-hash routine feeds a transformed transaction through this
//! encoder, so the byte layout must match the network protocol exactly:
//! version, input list (outpoint, script, sequence), output list (value,
//! script), lock time, with all integers little-endian and all lengths as
//! varints.

mod transaction;
mod varint;

pub use transaction::{decode_transaction, encode_transaction};
pub use varint::{decode_varint, encode_varint};

use thiserror::Error;

/// Failures while decoding wire bytes.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("byte stream ended before the structure was complete")]
    UnexpectedEnd,

    #[error("length field exceeds the remaining input")]
    OversizedLength,
}
