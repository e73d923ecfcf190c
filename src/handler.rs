//! Engine entry point: block acceptance and candidate-block assembly

use crate::block::Block;
use crate::blockchain::BlockChain;
use crate::error::Result;
use crate::transaction::Transaction;
use crate::types::Hash;
use crate::validator::TxHandler;

/// Front door of the engine, owning the block tree and its mempool.
#[derive(Debug)]
pub struct BlockHandler {
    chain: BlockChain,
}

impl BlockHandler {
    pub fn new(chain: BlockChain) -> Self {
        BlockHandler { chain }
    }

    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    /// Submit a block received from the outside world.
    ///
    /// On acceptance, the block's non-coinbase transactions leave the
    /// mempool.
    pub fn process_block(&mut self, block: Block) -> bool {
        let ids: Vec<Hash> = block.transactions().iter().filter_map(|tx| tx.id()).collect();
        if !self.chain.add_block(block) {
            return false;
        }
        for id in &ids {
            self.chain.remove_transaction(id);
        }
        true
    }

    /// Stage a transaction for inclusion in a future block. Not validated
    /// here; the validator filters at assembly time.
    pub fn process_tx(&mut self, tx: Transaction) {
        self.chain.add_transaction(tx);
    }

    /// Assemble and seal a candidate block on the current best tip, paying
    /// the coinbase to `proposer`.
    ///
    /// The mempool is snapshotted in ascending-id order and a maximal
    /// mutually-consistent subset is selected against the tip's UTXO set.
    /// The mempool itself is untouched; entries are removed only when the
    /// block comes back through [`BlockHandler::process_block`].
    pub fn create_block(&mut self, proposer: &[u8]) -> Result<Block> {
        let prev = self.chain.max_height_block().hash();

        let mut candidates = self.chain.transaction_pool().transactions();
        candidates.sort_by_key(|tx| tx.id());

        let mut handler = TxHandler::new(self.chain.max_height_utxo_pool());
        let accepted = handler.handle_txs(&candidates);

        let mut block = Block::new(prev, proposer);
        for tx in accepted {
            block.add_transaction(tx)?;
        }
        block.seal();
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COINBASE_VALUE;
    use secp256k1::{All, Message, Secp256k1, SecretKey};
    use sha2::{Digest, Sha256};

    fn keypair(secp: &Secp256k1<All>) -> (SecretKey, Vec<u8>) {
        let (sk, pk) = secp.generate_keypair(&mut secp256k1::rand::thread_rng());
        (sk, pk.serialize().to_vec())
    }

    fn sign_input(secp: &Secp256k1<All>, tx: &mut Transaction, index: usize, sk: &SecretKey) {
        let data = tx.raw_data_to_sign(index).unwrap();
        let digest: [u8; 32] = Sha256::digest(&data).into();
        let sig = secp.sign_ecdsa(&Message::from_digest(digest), sk);
        tx.add_signature(sig.serialize_compact().to_vec(), index).unwrap();
    }

    fn handler_with_genesis(proposer: &[u8]) -> BlockHandler {
        let mut genesis = Block::new(None, proposer);
        genesis.seal();
        BlockHandler::new(BlockChain::new(genesis).unwrap())
    }

    #[test]
    fn test_create_block_on_empty_mempool() {
        let secp = Secp256k1::new();
        let (_, scrooge_pk) = keypair(&secp);
        let mut handler = handler_with_genesis(&scrooge_pk);

        let block = handler.create_block(&scrooge_pk).unwrap();
        assert!(block.transactions().is_empty());
        assert!(handler.process_block(block));
        assert_eq!(handler.chain().max_height(), 2);
    }

    #[test]
    fn test_create_block_includes_valid_mempool_tx() {
        let secp = Secp256k1::new();
        let (scrooge_sk, scrooge_pk) = keypair(&secp);
        let (_, alice_pk) = keypair(&secp);
        let mut handler = handler_with_genesis(&scrooge_pk);

        let coinbase_id = handler.chain().max_height_block().coinbase().id().unwrap();
        let mut tx = Transaction::new();
        tx.add_input(coinbase_id, 0).unwrap();
        tx.add_output(COINBASE_VALUE, &alice_pk).unwrap();
        sign_input(&secp, &mut tx, 0, &scrooge_sk);
        let id = tx.seal();

        handler.process_tx(tx.clone());
        let block = handler.create_block(&scrooge_pk).unwrap();
        assert_eq!(block.transactions(), &[tx]);

        // Creation leaves the mempool alone; acceptance drains it
        assert!(handler.chain().transaction_pool().contains(&id));
        assert!(handler.process_block(block));
        assert!(!handler.chain().transaction_pool().contains(&id));
    }

    #[test]
    fn test_create_block_filters_invalid_mempool_tx() {
        let secp = Secp256k1::new();
        let (_, scrooge_pk) = keypair(&secp);
        let (mallory_sk, _) = keypair(&secp);
        let mut handler = handler_with_genesis(&scrooge_pk);

        let coinbase_id = handler.chain().max_height_block().coinbase().id().unwrap();
        let mut theft = Transaction::new();
        theft.add_input(coinbase_id, 0).unwrap();
        theft.add_output(COINBASE_VALUE, &scrooge_pk).unwrap();
        sign_input(&secp, &mut theft, 0, &mallory_sk);
        theft.seal();

        handler.process_tx(theft);
        let block = handler.create_block(&scrooge_pk).unwrap();
        assert!(block.transactions().is_empty());
    }

    #[test]
    fn test_rejected_block_keeps_mempool() {
        let secp = Secp256k1::new();
        let (scrooge_sk, scrooge_pk) = keypair(&secp);
        let (_, alice_pk) = keypair(&secp);
        let mut handler = handler_with_genesis(&scrooge_pk);

        let coinbase_id = handler.chain().max_height_block().coinbase().id().unwrap();
        let mut tx = Transaction::new();
        tx.add_input(coinbase_id, 0).unwrap();
        tx.add_output(COINBASE_VALUE, &alice_pk).unwrap();
        sign_input(&secp, &mut tx, 0, &scrooge_sk);
        let id = tx.seal();
        handler.process_tx(tx.clone());

        // Same body on an unknown parent
        let mut orphan = Block::new(Some([0x99; 32]), &scrooge_pk);
        orphan.add_transaction(tx).unwrap();
        orphan.seal();

        assert!(!handler.process_block(orphan));
        assert!(handler.chain().transaction_pool().contains(&id));
    }

    #[test]
    fn test_create_block_resolves_mempool_conflicts() {
        let secp = Secp256k1::new();
        let (scrooge_sk, scrooge_pk) = keypair(&secp);
        let (_, alice_pk) = keypair(&secp);
        let (_, bob_pk) = keypair(&secp);
        let mut handler = handler_with_genesis(&scrooge_pk);

        let coinbase_id = handler.chain().max_height_block().coinbase().id().unwrap();
        for recipient in [&alice_pk, &bob_pk] {
            let mut tx = Transaction::new();
            tx.add_input(coinbase_id, 0).unwrap();
            tx.add_output(COINBASE_VALUE, recipient).unwrap();
            sign_input(&secp, &mut tx, 0, &scrooge_sk);
            tx.seal();
            handler.process_tx(tx);
        }

        // Both spend the same output: exactly one makes it into the block
        let block = handler.create_block(&scrooge_pk).unwrap();
        assert_eq!(block.transactions().len(), 1);
        assert!(handler.process_block(block));
    }
}
