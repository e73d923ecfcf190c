//! Unspent transaction outputs and the pool tracking them

use crate::types::{Hash, Output};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key of an unspent output: the creating transaction and the output's
/// position within it. Ordering is lexicographic on the hash bytes, then
/// the index, giving validation a total order over claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: Hash,
    pub index: u32,
}

impl Utxo {
    pub fn new(tx_hash: Hash, index: u32) -> Self {
        Utxo { tx_hash, index }
    }
}

/// The collection of unspent outputs at one point on one chain.
///
/// Cloning produces an independent snapshot; the block tree keeps one per
/// accepted block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoPool {
    utxos: HashMap<Utxo, Output>,
}

impl UtxoPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        UtxoPool {
            utxos: HashMap::new(),
        }
    }

    /// Map `utxo` to its transaction output.
    pub fn add_utxo(&mut self, utxo: Utxo, output: Output) {
        self.utxos.insert(utxo, output);
    }

    /// Drop `utxo` from the pool.
    pub fn remove_utxo(&mut self, utxo: &Utxo) {
        self.utxos.remove(utxo);
    }

    /// The output `utxo` refers to, if unspent.
    pub fn tx_output(&self, utxo: &Utxo) -> Option<&Output> {
        self.utxos.get(utxo)
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains_key(utxo)
    }

    /// All unspent keys, in no particular order.
    pub fn all_utxos(&self) -> Vec<Utxo> {
        self.utxos.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Utxo, &Output)> {
        self.utxos.iter()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(value: i64) -> Output {
        Output {
            value,
            recipient: vec![0x02; 33],
        }
    }

    #[test]
    fn test_add_contains_remove() {
        let mut pool = UtxoPool::new();
        let utxo = Utxo::new([1; 32], 0);

        assert!(!pool.contains(&utxo));
        pool.add_utxo(utxo, output(10));
        assert!(pool.contains(&utxo));
        assert_eq!(pool.tx_output(&utxo).map(|o| o.value), Some(10));

        pool.remove_utxo(&utxo);
        assert!(!pool.contains(&utxo));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_same_tx_different_indices_are_distinct() {
        let mut pool = UtxoPool::new();
        pool.add_utxo(Utxo::new([1; 32], 0), output(5));
        pool.add_utxo(Utxo::new([1; 32], 1), output(3));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.tx_output(&Utxo::new([1; 32], 1)).map(|o| o.value), Some(3));
    }

    #[test]
    fn test_all_utxos_lists_every_key() {
        let mut pool = UtxoPool::new();
        pool.add_utxo(Utxo::new([1; 32], 0), output(5));
        pool.add_utxo(Utxo::new([2; 32], 1), output(3));

        let mut all = pool.all_utxos();
        all.sort();
        assert_eq!(all, vec![Utxo::new([1; 32], 0), Utxo::new([2; 32], 1)]);
    }

    #[test]
    fn test_clone_is_independent_snapshot() {
        let mut pool = UtxoPool::new();
        let utxo = Utxo::new([1; 32], 0);
        pool.add_utxo(utxo, output(10));

        let snapshot = pool.clone();
        pool.remove_utxo(&utxo);

        assert!(!pool.contains(&utxo));
        assert!(snapshot.contains(&utxo));
    }

    #[test]
    fn test_ordering_is_hash_then_index() {
        let a = Utxo::new([1; 32], 9);
        let b = Utxo::new([2; 32], 0);
        let c = Utxo::new([2; 32], 1);

        assert!(a < b);
        assert!(b < c);
    }
}
