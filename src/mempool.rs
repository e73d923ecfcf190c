//! Pending-transaction staging for block assembly

use crate::constants::MEMPOOL_CAPACITY;
use crate::transaction::Transaction;
use crate::types::Hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bounded, unvalidated staging area for transactions awaiting inclusion
/// in a block.
///
/// Entries are not validated on insert; the validator filters at
/// block-assembly time. Inserts beyond [`MEMPOOL_CAPACITY`] are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionPool {
    txs: HashMap<Hash, Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        TransactionPool {
            txs: HashMap::new(),
        }
    }

    /// Stage a sealed transaction. Unsealed transactions and inserts past
    /// capacity are silently dropped; duplicates overwrite themselves.
    pub fn add_transaction(&mut self, tx: Transaction) {
        let id = match tx.id() {
            Some(id) => id,
            None => return,
        };
        if self.txs.len() >= MEMPOOL_CAPACITY && !self.txs.contains_key(&id) {
            return;
        }
        self.txs.insert(id, tx);
    }

    /// Remove the transaction with the given id, if staged.
    pub fn remove_transaction(&mut self, id: &Hash) {
        self.txs.remove(id);
    }

    pub fn contains(&self, id: &Hash) -> bool {
        self.txs.contains_key(id)
    }

    /// Snapshot of the staged transactions, in no particular order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.txs.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}
