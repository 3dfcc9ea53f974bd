//! Hashing and ECDSA primitives used by the crypto opcodes

use std::sync::OnceLock;

use ripemd::Ripemd160;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, VerifyOnly};
use sha2::{Digest, Sha256};

use crate::types::Hash;

/// Context creation is expensive; verification is stateless, so one shared
/// verification-only context serves the whole process.
fn secp() -> &'static Secp256k1<VerifyOnly> {
    static CONTEXT: OnceLock<Secp256k1<VerifyOnly>> = OnceLock::new();
    CONTEXT.get_or_init(Secp256k1::verification_only)
}

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// SHA-256 applied twice, the transaction-hash function.
pub fn double_sha256(data: &[u8]) -> Hash {
    Sha256::digest(Sha256::digest(data)).into()
}

/// RIPEMD-160 of SHA-256, the address-hash function.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}

/// Verify a DER-encoded ECDSA signature over a 32-byte message hash.
///
/// A malformed key or signature reports `false` rather than erroring; the
/// caller treats either the same as a failed check. High-S signatures are
/// normalized before verification.
pub fn ecdsa_verify(pubkey: &[u8], message_hash: &Hash, der_signature: &[u8]) -> bool {
    let pubkey = match PublicKey::from_slice(pubkey) {
        Ok(pubkey) => pubkey,
        Err(_) => return false,
    };
    let mut signature = match Signature::from_der(der_signature) {
        Ok(signature) => signature,
        Err(_) => return false,
    };
    let message = match Message::from_digest_slice(message_hash) {
        Ok(message) => message,
        Err(_) => return false,
    };
    signature.normalize_s();
    secp().verify_ecdsa(&message, &signature, &pubkey).is_ok()
}
