//! Block forest, best-tip selection, and fixed-depth pruning

use crate::block::Block;
use crate::constants::{COINBASE_MATURITY, CUT_OFF_AGE};
use crate::error::{EngineError, Result};
use crate::mempool::TransactionPool;
use crate::transaction::Transaction;
use crate::types::{Hash, Output};
use crate::utxo::{Utxo, UtxoPool};
use crate::validator::TxHandler;
use std::collections::HashMap;

/// An accepted block together with its chain position and the UTXO set
/// obtained by applying it to its parent's.
#[derive(Debug, Clone)]
struct BlockNode {
    block: Block,
    parent: Option<Hash>,
    height: u64,
    utxo_after: UtxoPool,
    age: u64,
}

/// A forest of candidate chains rooted at a genesis block.
///
/// Every node carries its own post-application UTXO snapshot, so a new
/// branch validates against its parent's state without touching the best
/// tip's. The tip with maximum height is canonical; ties keep the
/// earliest-seen tip. Nodes deeper than the cut-off below the best tip are
/// pruned.
#[derive(Debug)]
pub struct BlockChain {
    nodes: HashMap<Hash, BlockNode>,
    best_tip: Hash,
    mempool: TransactionPool,
    insertion_counter: u64,
    cut_off_age: u64,
    coinbase_maturity: u64,
}

impl BlockChain {
    /// Create a chain holding only the sealed `genesis` block, using the
    /// default [`CUT_OFF_AGE`] and [`COINBASE_MATURITY`].
    pub fn new(genesis: Block) -> Result<Self> {
        Self::with_params(genesis, CUT_OFF_AGE, COINBASE_MATURITY)
    }

    /// Create a chain with explicit cut-off and maturity depths.
    ///
    /// Genesis gets height 1, age 0, and a UTXO set holding only its own
    /// coinbase outputs.
    pub fn with_params(genesis: Block, cut_off_age: u64, coinbase_maturity: u64) -> Result<Self> {
        let hash = genesis.hash().ok_or(EngineError::UnsealedBlock)?;
        let mut utxo_after = UtxoPool::new();
        add_coinbase_outputs(&mut utxo_after, genesis.coinbase());

        let mut nodes = HashMap::new();
        nodes.insert(
            hash,
            BlockNode {
                block: genesis,
                parent: None,
                height: 1,
                utxo_after,
                age: 0,
            },
        );
        Ok(BlockChain {
            nodes,
            best_tip: hash,
            mempool: TransactionPool::new(),
            insertion_counter: 1,
            cut_off_age,
            coinbase_maturity,
        })
    }

    /// Validate `block` against its parent's UTXO snapshot and, on
    /// success, install it.
    ///
    /// Rejected (returning false, with no state change) when:
    /// 1. The block is unsealed, already present, or claims no parent
    /// 2. The parent is unknown (possibly already pruned)
    /// 3. It would sit at or below the cut-off depth under the best tip
    /// 4. Any of its transactions fails validation, or they are not all
    ///    mutually consistent against the parent snapshot
    ///
    /// On acceptance the node's snapshot is the parent's clone with all
    /// block transactions applied and the new coinbase outputs added. The
    /// best tip moves only on strictly greater height; the forest is then
    /// pruned to the retention window.
    pub fn add_block(&mut self, block: Block) -> bool {
        let hash = match block.hash() {
            Some(hash) => hash,
            None => return false,
        };
        if self.nodes.contains_key(&hash) {
            return false;
        }
        let prev = match block.prev() {
            Some(prev) => prev,
            None => return false,
        };
        let (parent_height, mut pool) = match self.nodes.get(&prev) {
            Some(parent) => (parent.height, parent.utxo_after.clone()),
            None => return false,
        };

        let height = parent_height + 1;
        let best_height = self.best_height();
        if height <= best_height.saturating_sub(self.cut_off_age) {
            return false;
        }

        // Immature rewards are withheld from the validation view and
        // restored into the stored snapshot afterwards.
        let withheld = self.withhold_immature_coinbases(&mut pool, prev, parent_height);

        // The block promises all of its transactions are valid together.
        let mut handler = TxHandler::new(pool);
        let accepted = handler.handle_txs(block.transactions());
        if accepted.len() != block.transactions().len() {
            return false;
        }
        let mut pool = handler.into_pool();

        for (utxo, output) in withheld {
            pool.add_utxo(utxo, output);
        }
        add_coinbase_outputs(&mut pool, block.coinbase());

        let age = self.insertion_counter;
        self.insertion_counter += 1;
        self.nodes.insert(
            hash,
            BlockNode {
                block,
                parent: Some(prev),
                height,
                utxo_after: pool,
                age,
            },
        );

        if height > best_height {
            self.best_tip = hash;
        }
        self.prune();
        true
    }

    /// The block at the tip of the canonical chain.
    pub fn max_height_block(&self) -> &Block {
        &self.best_node().block
    }

    /// Height of the canonical tip.
    pub fn max_height(&self) -> u64 {
        self.best_height()
    }

    /// Snapshot of the UTXO set at the canonical tip.
    pub fn max_height_utxo_pool(&self) -> UtxoPool {
        self.best_node().utxo_after.clone()
    }

    /// The pending-transaction pool.
    pub fn transaction_pool(&self) -> &TransactionPool {
        &self.mempool
    }

    /// Stage a transaction for future block assembly. Not validated here.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.mempool.add_transaction(tx);
    }

    /// Drop a staged transaction, typically after its block was accepted.
    pub fn remove_transaction(&mut self, id: &Hash) {
        self.mempool.remove_transaction(id);
    }

    fn best_node(&self) -> &BlockNode {
        &self.nodes[&self.best_tip]
    }

    fn best_height(&self) -> u64 {
        self.best_node().height
    }

    /// Remove from `pool` the coinbase outputs of ancestors still shy of
    /// the maturity depth, returning what was removed.
    fn withhold_immature_coinbases(
        &self,
        pool: &mut UtxoPool,
        parent: Hash,
        parent_height: u64,
    ) -> Vec<(Utxo, Output)> {
        if self.coinbase_maturity == 0 {
            return Vec::new();
        }
        let mut withheld = Vec::new();
        let mut cursor = Some(parent);
        while let Some(hash) = cursor {
            let node = match self.nodes.get(&hash) {
                Some(node) => node,
                None => break,
            };
            // A reward at height h is spendable by a block at height
            // parent_height + 1 once it sits at least `maturity` deep.
            if node.height + self.coinbase_maturity <= parent_height + 1 {
                break;
            }
            if let Some(id) = node.block.coinbase().id() {
                for j in 0..node.block.coinbase().outputs().len() as u32 {
                    let utxo = Utxo::new(id, j);
                    if let Some(output) = pool.tx_output(&utxo) {
                        withheld.push((utxo, output.clone()));
                    }
                }
            }
            cursor = node.parent;
        }
        for (utxo, _) in &withheld {
            pool.remove_utxo(utxo);
        }
        withheld
    }

    /// Drop every node below the retention floor. Children of dropped
    /// nodes become unreachable for new blocks via the parent lookup.
    fn prune(&mut self) {
        let floor = self.best_height().saturating_sub(self.cut_off_age);
        self.nodes.retain(|_, node| node.height >= floor);
    }
}

fn add_coinbase_outputs(pool: &mut UtxoPool, coinbase: &Transaction) {
    if let Some(id) = coinbase.id() {
        for (j, output) in coinbase.outputs().iter().enumerate() {
            pool.add_utxo(Utxo::new(id, j as u32), output.clone());
        }
    }
}
