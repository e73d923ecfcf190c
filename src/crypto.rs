//! Hash and signature oracles consumed by the engine
//!
//! Both oracles are total, deterministic, and side-effect-free. Malformed
//! keys or signatures are reported as a failed verification, never as an
//! error or panic.

use crate::types::Hash;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
use sha2::{Digest, Sha256};

/// Content hash used as identity for transactions and blocks.
pub fn hash_bytes(data: &[u8]) -> Hash {
    sha256d::Hash::hash(data).to_byte_array()
}

/// Verify an ECDSA signature over `message` against a serialized public key.
///
/// The message is digested with SHA-256 before verification. Returns false
/// for malformed keys or signatures and for any verification failure.
pub fn verify_signature(pubkey: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let pubkey = match PublicKey::from_slice(pubkey) {
        Ok(pk) => pk,
        Err(_) => return false,
    };
    let signature = match Signature::from_compact(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    let digest: [u8; 32] = Sha256::digest(message).into();
    let msg = Message::from_digest(digest);
    Secp256k1::verification_only()
        .verify_ecdsa(&msg, &signature, &pubkey)
        .is_ok()
}
