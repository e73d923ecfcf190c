//! Transaction validation and atomic application against a UTXO pool

use crate::crypto::verify_signature;
use crate::transaction::Transaction;
use crate::types::{Hash, Value};
use crate::utxo::{Utxo, UtxoPool};
use std::collections::{BTreeSet, HashSet};

/// Validates transactions against an owned UTXO pool and applies accepted
/// ones to it.
///
/// The pool is exclusively owned for the handler's lifetime; the block tree
/// hands in a snapshot clone and takes the post-application pool back out.
#[derive(Debug)]
pub struct TxHandler {
    pool: UtxoPool,
}

impl TxHandler {
    /// Create a handler over a snapshot of the current UTXO pool.
    pub fn new(pool: UtxoPool) -> Self {
        TxHandler { pool }
    }

    /// The current pool state.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    /// Consume the handler, returning the post-application pool.
    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }

    /// Check a single transaction against the current pool.
    ///
    /// Valid if and only if:
    /// 1. Every claimed output is in the pool
    /// 2. Every input's signature verifies against the claimed output's
    ///    recipient over the raw spend data for that input position
    /// 3. No unspent output is claimed more than once
    /// 4. All output values are non-negative
    /// 5. The output total does not exceed the input total; the surplus is
    ///    the fee and is discarded
    ///
    /// Pure with respect to the pool: no partial state change on failure.
    pub fn is_valid(&self, tx: &Transaction) -> bool {
        if tx.id().is_none() {
            return false;
        }

        let mut claimed = BTreeSet::new();
        let mut total_in: Value = 0;
        for (i, input) in tx.inputs().iter().enumerate() {
            let utxo = Utxo::new(input.prev_tx, input.out_index);

            // 1. The claimed output must be unspent
            let output = match self.pool.tx_output(&utxo) {
                Some(output) => output,
                None => return false,
            };

            // 2. The spend must be authorized by the recorded recipient
            let message = match tx.raw_data_to_sign(i) {
                Ok(message) => message,
                Err(_) => return false,
            };
            if !verify_signature(&output.recipient, &message, &input.signature) {
                return false;
            }

            // 3. Each output may be claimed once
            if !claimed.insert(utxo) {
                return false;
            }

            total_in = match total_in.checked_add(output.value) {
                Some(total) => total,
                None => return false,
            };
        }

        // 4. No negative outputs
        let mut total_out: Value = 0;
        for output in tx.outputs() {
            if output.value < 0 {
                return false;
            }
            total_out = match total_out.checked_add(output.value) {
                Some(total) => total,
                None => return false,
            };
        }

        // 5. Conservation of value
        total_out <= total_in
    }

    /// Accept a maximal mutually-consistent subset of `candidates` and
    /// apply it to the pool atomically per transaction.
    ///
    /// Fixed-point sweep: each round tries the remaining candidates in
    /// ascending-id order and applies every one that validates against the
    /// evolving pool; rounds repeat until none makes progress. Dependencies
    /// between candidates resolve without an explicit topological sort, and
    /// the ascending-id order makes conflict resolution deterministic.
    pub fn handle_txs(&mut self, candidates: &[Transaction]) -> Vec<Transaction> {
        let mut remaining: Vec<(Hash, &Transaction)> = Vec::with_capacity(candidates.len());
        let mut seen = HashSet::new();
        for tx in candidates {
            if let Some(id) = tx.id() {
                if seen.insert(id) {
                    remaining.push((id, tx));
                }
            }
        }
        remaining.sort_by(|a, b| a.0.cmp(&b.0));

        let mut accepted = Vec::new();
        let mut progress = true;
        while progress {
            progress = false;
            let mut next_round = Vec::with_capacity(remaining.len());
            for (id, tx) in remaining {
                if self.is_valid(tx) {
                    self.apply(id, tx);
                    accepted.push(tx.clone());
                    progress = true;
                } else {
                    next_round.push((id, tx));
                }
            }
            remaining = next_round;
        }
        accepted
    }

    /// Spend a valid transaction's inputs and add its outputs to the pool.
    fn apply(&mut self, id: Hash, tx: &Transaction) {
        for input in tx.inputs() {
            self.pool
                .remove_utxo(&Utxo::new(input.prev_tx, input.out_index));
        }
        for (j, output) in tx.outputs().iter().enumerate() {
            self.pool.add_utxo(Utxo::new(id, j as u32), output.clone());
        }
    }
}
