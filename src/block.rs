//! Block model: parent link, coinbase, transaction list, identity

use crate::constants::COINBASE_VALUE;
use crate::crypto::hash_bytes;
use crate::error::{EngineError, Result};
use crate::transaction::Transaction;
use crate::types::{ByteString, Hash};
use serde::{Deserialize, Serialize};

/// A candidate or accepted block.
///
/// Construction mirrors the transaction builder: create on a parent, add
/// sealed transactions, then [`Block::seal`] to fix the block hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    prev: Option<Hash>,
    coinbase: Transaction,
    txs: Vec<Transaction>,
    hash: Option<Hash>,
}

impl Block {
    /// Start a block on `prev` (`None` for genesis) whose coinbase pays
    /// [`COINBASE_VALUE`] to `proposer`.
    ///
    /// The parent hash tags the coinbase so rewards on different parents
    /// get distinct transaction ids. There is no per-attempt nonce:
    /// blocks are content-addressed, so two builds with the same parent,
    /// proposer, and transaction list are the same block, and the tree
    /// treats the second submission as a duplicate.
    pub fn new(prev: Option<Hash>, proposer: &[u8]) -> Self {
        let tag: &[u8] = match &prev {
            Some(parent) => parent,
            None => &[],
        };
        Block {
            prev,
            coinbase: Transaction::coinbase(COINBASE_VALUE, proposer, tag),
            txs: Vec::new(),
            hash: None,
        }
    }

    /// Append a sealed transaction to the block body.
    pub fn add_transaction(&mut self, tx: Transaction) -> Result<()> {
        if self.hash.is_some() {
            return Err(EngineError::BlockSealed);
        }
        if tx.id().is_none() {
            return Err(EngineError::UnsealedTransaction);
        }
        self.txs.push(tx);
        Ok(())
    }

    /// Compute the block hash and freeze the block. Idempotent.
    pub fn seal(&mut self) -> Hash {
        if let Some(hash) = self.hash {
            return hash;
        }
        let mut data = ByteString::new();
        if let Some(prev) = &self.prev {
            data.extend_from_slice(prev);
        }
        data.extend_from_slice(&self.coinbase.id_serialization());
        for tx in &self.txs {
            if let Some(id) = tx.id() {
                data.extend_from_slice(&id);
            }
        }
        let hash = hash_bytes(&data);
        self.hash = Some(hash);
        hash
    }

    /// The block hash, present once sealed.
    pub fn hash(&self) -> Option<Hash> {
        self.hash
    }

    /// Parent block hash; `None` only for genesis.
    pub fn prev(&self) -> Option<Hash> {
        self.prev
    }

    /// The reward transaction paying this block's proposer.
    pub fn coinbase(&self) -> &Transaction {
        &self.coinbase
    }

    /// The non-coinbase transactions, in block order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.txs
    }
}
