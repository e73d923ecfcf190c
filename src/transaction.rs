//! Transaction model and canonical serialization

use crate::constants::COINBASE_OUT_INDEX;
use crate::crypto::hash_bytes;
use crate::error::{EngineError, Result};
use crate::types::{ByteString, Hash, Input, Output, Value};
use serde::{Deserialize, Serialize};

/// A transaction spending previously created outputs into new outputs.
///
/// Built incrementally: add inputs and outputs, sign each input over
/// [`Transaction::raw_data_to_sign`], then [`Transaction::seal`] to compute
/// the identity hash. A sealed transaction rejects further mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    id: Option<Hash>,
}

impl Transaction {
    /// Create an empty, unsealed transaction.
    pub fn new() -> Self {
        Transaction {
            inputs: Vec::new(),
            outputs: Vec::new(),
            id: None,
        }
    }

    /// Build the sealed reward transaction for a block proposer.
    ///
    /// The single input is the conventional coinbase sentinel; `tag` binds
    /// the coinbase to its block position so that rewards on different
    /// parents hash to different identities.
    pub fn coinbase(value: Value, recipient: &[u8], tag: &[u8]) -> Self {
        let mut tx = Transaction {
            inputs: vec![Input {
                prev_tx: [0u8; 32],
                out_index: COINBASE_OUT_INDEX,
                signature: tag.to_vec(),
            }],
            outputs: vec![Output {
                value,
                recipient: recipient.to_vec(),
            }],
            id: None,
        };
        tx.seal();
        tx
    }

    /// Add an input claiming output `out_index` of transaction `prev_tx`.
    pub fn add_input(&mut self, prev_tx: Hash, out_index: u32) -> Result<()> {
        if self.id.is_some() {
            return Err(EngineError::TransactionSealed);
        }
        self.inputs.push(Input {
            prev_tx,
            out_index,
            signature: ByteString::new(),
        });
        Ok(())
    }

    /// Add an output paying `value` to the holder of `recipient`.
    pub fn add_output(&mut self, value: Value, recipient: &[u8]) -> Result<()> {
        if self.id.is_some() {
            return Err(EngineError::TransactionSealed);
        }
        self.outputs.push(Output {
            value,
            recipient: recipient.to_vec(),
        });
        Ok(())
    }

    /// Attach a signature to the input at `input_index`.
    pub fn add_signature(&mut self, signature: ByteString, input_index: usize) -> Result<()> {
        if self.id.is_some() {
            return Err(EngineError::TransactionSealed);
        }
        let input = self
            .inputs
            .get_mut(input_index)
            .ok_or(EngineError::InputOutOfRange(input_index))?;
        input.signature = signature;
        Ok(())
    }

    /// The bytes a spender must sign to authorize the input at `input_index`.
    ///
    /// Serializes every input as `prev_tx || out_index` with all signatures
    /// omitted, then every output as `value || recipient`, then the target
    /// input index. Binding the index ties the signature to one position
    /// within one transaction body.
    pub fn raw_data_to_sign(&self, input_index: usize) -> Result<ByteString> {
        if input_index >= self.inputs.len() {
            return Err(EngineError::InputOutOfRange(input_index));
        }
        let mut data = ByteString::new();
        for input in &self.inputs {
            data.extend_from_slice(&input.prev_tx);
            data.extend_from_slice(&input.out_index.to_be_bytes());
        }
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(&output.recipient);
        }
        data.extend_from_slice(&(input_index as u32).to_be_bytes());
        Ok(data)
    }

    /// Compute the identity hash and freeze the transaction.
    ///
    /// Idempotent: sealing a sealed transaction returns the existing id.
    pub fn seal(&mut self) -> Hash {
        if let Some(id) = self.id {
            return id;
        }
        let id = hash_bytes(&self.id_serialization());
        self.id = Some(id);
        id
    }

    /// Whole-transaction serialization hashed to form the id.
    ///
    /// Unlike the signing serialization, signatures are included.
    pub(crate) fn id_serialization(&self) -> ByteString {
        let mut data = ByteString::new();
        for input in &self.inputs {
            data.extend_from_slice(&input.prev_tx);
            data.extend_from_slice(&input.out_index.to_be_bytes());
            data.extend_from_slice(&input.signature);
        }
        for output in &self.outputs {
            data.extend_from_slice(&output.value.to_be_bytes());
            data.extend_from_slice(&output.recipient);
        }
        data
    }

    /// The identity hash, present once sealed.
    pub fn id(&self) -> Option<Hash> {
        self.id
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// True for the sentinel-input reward transaction of a block.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_tx == [0u8; 32]
            && self.inputs[0].out_index == COINBASE_OUT_INDEX
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_data_to_sign_layout() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 7).unwrap();
        tx.add_output(5, &[0xaa, 0xbb]).unwrap();

        // prev_tx || u32_be(out_index) || i64_be(value) || recipient || u32_be(index)
        let mut expected = vec![0x11; 32];
        expected.extend_from_slice(&[0, 0, 0, 7]);
        expected.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 5]);
        expected.extend_from_slice(&[0xaa, 0xbb]);
        expected.extend_from_slice(&[0, 0, 0, 0]);

        assert_eq!(tx.raw_data_to_sign(0).unwrap(), expected);
    }

    #[test]
    fn test_raw_data_to_sign_excludes_signatures() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        tx.add_input([0x22; 32], 1).unwrap();
        tx.add_output(3, &[0xcc]).unwrap();
        let before = tx.raw_data_to_sign(1).unwrap();

        tx.add_signature(vec![0xde, 0xad], 0).unwrap();
        let after = tx.raw_data_to_sign(1).unwrap();

        assert_eq!(before, after);
    }

    #[test]
    fn test_raw_data_to_sign_out_of_range() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        assert_eq!(
            tx.raw_data_to_sign(1),
            Err(EngineError::InputOutOfRange(1))
        );
    }

    #[test]
    fn test_seal_is_idempotent() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        tx.add_output(10, &[0x02; 33]).unwrap();
        let id = tx.seal();
        assert_eq!(tx.seal(), id);
        assert_eq!(tx.id(), Some(id));
    }

    #[test]
    fn test_id_covers_signatures() {
        let mut a = Transaction::new();
        a.add_input([0x11; 32], 0).unwrap();
        a.add_output(10, &[0x02; 33]).unwrap();
        let mut b = a.clone();

        a.add_signature(vec![1, 2, 3], 0).unwrap();
        b.add_signature(vec![4, 5, 6], 0).unwrap();

        assert_ne!(a.seal(), b.seal());
    }

    #[test]
    fn test_mutation_after_seal_is_rejected() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        tx.add_output(10, &[0x02; 33]).unwrap();
        tx.seal();

        assert_eq!(tx.add_input([0x22; 32], 0), Err(EngineError::TransactionSealed));
        assert_eq!(tx.add_output(1, &[0x03; 33]), Err(EngineError::TransactionSealed));
        assert_eq!(
            tx.add_signature(vec![0xff], 0),
            Err(EngineError::TransactionSealed)
        );
    }

    #[test]
    fn test_add_signature_out_of_range() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        assert_eq!(
            tx.add_signature(vec![0xff], 3),
            Err(EngineError::InputOutOfRange(3))
        );
    }

    #[test]
    fn test_coinbase_shape() {
        let cb = Transaction::coinbase(25, &[0x02; 33], &[0x77; 32]);
        assert!(cb.is_coinbase());
        assert!(cb.id().is_some());
        assert_eq!(cb.outputs().len(), 1);
        assert_eq!(cb.outputs()[0].value, 25);
        assert_eq!(cb.outputs()[0].recipient, vec![0x02; 33]);
    }

    #[test]
    fn test_coinbase_distinct_per_tag() {
        let a = Transaction::coinbase(25, &[0x02; 33], &[0x01; 32]);
        let b = Transaction::coinbase(25, &[0x02; 33], &[0x02; 32]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_regular_transaction_is_not_coinbase() {
        let mut tx = Transaction::new();
        tx.add_input([0x11; 32], 0).unwrap();
        tx.add_output(10, &[0x02; 33]).unwrap();
        tx.seal();
        assert!(!tx.is_coinbase());
    }
}
