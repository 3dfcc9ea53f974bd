//! Signature-hash construction
//!
//! The message an ECDSA signature commits to is not the raw transaction
//! but a transformed copy of it, selected by the hash-type byte carried at
//! the end of the signature.

use crate::crypto::{double_sha256, ecdsa_verify};
use crate::script::Script;
use crate::types::{Hash, Transaction};

/// Hash produced when SIGHASH_SINGLE refers to a missing output, or when
/// the input index itself is out of range. It stands for an unsignable
/// message: every signature check against it reports failure while script
/// execution continues.
pub const INVALID_SIGHASH: Hash = [0u8; 32];

/// The hash-type byte. The low five bits select the mode; bit 7 restricts
/// the commitment to the signing input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SighashType(pub u8);

impl SighashType {
    pub const ALL: SighashType = SighashType(0x01);
    pub const NONE: SighashType = SighashType(0x02);
    pub const SINGLE: SighashType = SighashType(0x03);

    pub const ANYONE_CAN_PAY_FLAG: u8 = 0x80;

    pub fn from_byte(byte: u8) -> Self {
        SighashType(byte)
    }

    /// Mode selected by the low five bits. Anything other than NONE or
    /// SINGLE behaves as ALL.
    pub fn base_type(self) -> u8 {
        self.0 & 0x1f
    }

    pub fn is_none(self) -> bool {
        self.base_type() == Self::NONE.0
    }

    pub fn is_single(self) -> bool {
        self.base_type() == Self::SINGLE.0
    }

    pub fn anyone_can_pay(self) -> bool {
        self.0 & Self::ANYONE_CAN_PAY_FLAG != 0
    }

    /// Combine a mode with the anyone-can-pay restriction.
    pub fn with_anyone_can_pay(self) -> Self {
        SighashType(self.0 | Self::ANYONE_CAN_PAY_FLAG)
    }
}

/// Build the 32-byte message a signature over `tx`'s input commits to.
///
/// Works on a throwaway copy: every input script is blanked, the script
/// code is spliced into the signing input, the NONE and SINGLE modes prune
/// the parts the signature does not commit to, and anyone-can-pay reduces
/// the inputs to the signing one. The result is the double SHA-256 of the
/// wire form followed by the hash type as a 32-bit little-endian integer.
///
/// A SINGLE mode with no matching output yields [`INVALID_SIGHASH`]
/// directly, without hashing.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &Script,
    hash_type: SighashType,
) -> Hash {
    if input_index >= tx.inputs.len() {
        return INVALID_SIGHASH;
    }

    let mut copy = tx.clone();
    for input in &mut copy.inputs {
        input.script_sig.clear();
    }
    copy.inputs[input_index].script_sig = script_code.to_bytes();

    if hash_type.is_none() {
        copy.outputs.clear();
        zero_other_sequences(&mut copy, input_index);
    } else if hash_type.is_single() {
        if input_index >= copy.outputs.len() {
            return INVALID_SIGHASH;
        }
        copy.outputs.truncate(input_index + 1);
        for output in &mut copy.outputs[..input_index] {
            output.value = -1;
            output.script_pubkey.clear();
        }
        zero_other_sequences(&mut copy, input_index);
    }

    if hash_type.anyone_can_pay() {
        copy.inputs.swap(0, input_index);
        copy.inputs.truncate(1);
    }

    let mut preimage = crate::serialization::encode_transaction(&copy);
    preimage.extend_from_slice(&u32::from(hash_type.0).to_le_bytes());
    double_sha256(&preimage)
}

fn zero_other_sequences(tx: &mut Transaction, signing_index: usize) {
    for (index, input) in tx.inputs.iter_mut().enumerate() {
        if index != signing_index {
            input.sequence = 0;
        }
    }
}

/// Check one signature, given as DER bytes with a trailing hash-type
/// byte, against a public key. An empty signature, a sentinel hash, or a
/// failed ECDSA verification all report `false` without failing the
/// script.
pub fn check_signature(
    signature: &[u8],
    pubkey: &[u8],
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
) -> bool {
    let (hash_type_byte, der_signature) = match signature.split_last() {
        Some((&last, rest)) => (last, rest),
        None => return false,
    };
    let hash = signature_hash(
        tx,
        input_index,
        script_code,
        SighashType::from_byte(hash_type_byte),
    );
    if hash == INVALID_SIGHASH {
        return false;
    }
    ecdsa_verify(pubkey, &hash, der_signature)
}
