//! Engine constants

use crate::types::Value;

/// Fixed coinbase reward paid to a block's proposer, in smallest units
pub const COINBASE_VALUE: Value = 25;

/// Maximum allowed depth below the best tip for new blocks and retention
pub const CUT_OFF_AGE: u64 = 10;

/// Blocks a coinbase output must be buried under before it is spendable.
/// Zero disables the maturity filter.
pub const COINBASE_MATURITY: u64 = 0;

/// Maximum number of pending transactions held in the mempool
pub const MEMPOOL_CAPACITY: usize = 4096;

/// Sentinel out-index marking a coinbase input
pub const COINBASE_OUT_INDEX: u32 = 0xffffffff;
