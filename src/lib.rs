//! # UTXO Engine
//!
//! Core of a minimal cryptocurrency: a transaction validator that checks
//! and atomically applies transactions against an unspent-transaction-output
//! set, and a block-tree manager that tracks competing chains from a
//! genesis block, selects the best tip, and evolves per-tip UTXO snapshots
//! and a bounded mempool.
//!
//! ## Architecture
//!
//! - [`Transaction`] / [`Block`]: content-addressed data model with
//!   explicit builder-then-`seal` construction
//! - [`UtxoPool`]: snapshot-cloneable mapping of unspent outputs
//! - [`TxHandler`]: per-transaction consensus rules and maximal-subset
//!   batch application
//! - [`BlockChain`]: fork tracking, longest-chain tip selection with
//!   oldest-wins tie-break, fixed-depth pruning
//! - [`BlockHandler`]: accept-block entry point and candidate-block
//!   assembly over the mempool
//!
//! ## Design principles
//!
//! 1. **Pure validation**: consensus checks are deterministic and
//!    side-effect-free; invalid input is a boolean rejection, never a fault
//! 2. **Rollback-free forks**: every accepted block owns a post-application
//!    UTXO snapshot, so branches evaluate against their parent's state
//!    without undo logic
//! 3. **Oracle boundaries**: hashing and signature verification sit behind
//!    [`crypto`], consumed as total functions
//!
//! ## Usage
//!
//! ```rust
//! use utxo_engine::{Block, BlockChain, BlockHandler};
//!
//! let proposer = [0x02; 33];
//! let mut genesis = Block::new(None, &proposer);
//! genesis.seal();
//!
//! let chain = BlockChain::new(genesis).unwrap();
//! let mut handler = BlockHandler::new(chain);
//!
//! let block = handler.create_block(&proposer).unwrap();
//! assert!(handler.process_block(block));
//! assert_eq!(handler.chain().max_height(), 2);
//! ```

pub mod block;
pub mod blockchain;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod handler;
pub mod mempool;
pub mod transaction;
pub mod types;
pub mod utxo;
pub mod validator;

// Re-export commonly used types
pub use block::Block;
pub use blockchain::BlockChain;
pub use constants::*;
pub use error::{EngineError, Result};
pub use handler::BlockHandler;
pub use mempool::TransactionPool;
pub use transaction::Transaction;
pub use types::*;
pub use utxo::{Utxo, UtxoPool};
pub use validator::TxHandler;
