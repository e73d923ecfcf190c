//! Core types for the UTXO engine

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type
pub type ByteString = Vec<u8>;

/// Monetary value in smallest units
pub type Value = i64;

/// Serialized public key bytes, treated as opaque by the engine
pub type PublicKeyBytes = ByteString;

/// Transaction output: a value payable to the holder of a public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub value: Value,
    pub recipient: PublicKeyBytes,
}

/// Transaction input: a claimed unspent output and the spending signature
///
/// The signature is empty until the input is signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    pub prev_tx: Hash,
    pub out_index: u32,
    pub signature: ByteString,
}
