//! Error types for API misuse
//!
//! Consensus rejections (an invalid transaction, an unacceptable block) are
//! reported as boolean results and never appear here. `EngineError` covers
//! programmer misuse of the builder APIs, where no recovery is sensible.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    #[error("transaction is sealed and can no longer be modified")]
    TransactionSealed,

    #[error("block is sealed and can no longer be modified")]
    BlockSealed,

    #[error("transaction must be sealed before use")]
    UnsealedTransaction,

    #[error("block must be sealed before use")]
    UnsealedBlock,

    #[error("input index {0} is out of range")]
    InputOutOfRange(usize),
}

pub type Result<T> = std::result::Result<T, EngineError>;
