//! The set of transactions known locally as unconfirmed.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::state::transaction::{TxAux, TxId};

/// Pending transactions keyed by id.
///
/// The scheduler is told what is pending and never decides itself: entries
/// enter through [`Pendings::union`] and leave through
/// [`Pendings::difference`]. Iteration is in id order, which makes the initial
/// scheduling of a batch deterministic.
///
/// Transactions are held behind `Arc` so that schedule events referencing the
/// same transaction share one allocation.
#[derive(Debug, Clone, Default)]
pub struct Pendings {
    by_id: BTreeMap<TxId, Arc<TxAux>>,
}

impl Pendings {
    /// Creates an empty pending set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending transactions.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns true if `id` is pending.
    pub fn contains(&self, id: &TxId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Looks up a pending transaction.
    pub fn get(&self, id: &TxId) -> Option<&Arc<TxAux>> {
        self.by_id.get(id)
    }

    /// Adds a single transaction. An existing entry for the same id wins.
    pub fn insert(&mut self, tx: Arc<TxAux>) {
        self.by_id.entry(tx.id()).or_insert(tx);
    }

    /// Left-biased union: entries already present win on collision.
    pub fn union(&mut self, other: Pendings) {
        for (id, tx) in other.by_id {
            self.by_id.entry(id).or_insert(tx);
        }
    }

    /// Removes the listed ids. Missing ids are silently ignored.
    pub fn difference(&mut self, ids: &[TxId]) {
        for id in ids {
            self.by_id.remove(id);
        }
    }

    /// Iterates entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TxId, &Arc<TxAux>)> {
        self.by_id.iter()
    }

    /// Iterates pending ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &TxId> {
        self.by_id.keys()
    }
}

impl FromIterator<TxAux> for Pendings {
    fn from_iter<I: IntoIterator<Item = TxAux>>(iter: I) -> Self {
        let mut pendings = Self::new();
        for tx in iter {
            pendings.insert(Arc::new(tx));
        }
        pendings
    }
}

impl FromIterator<Arc<TxAux>> for Pendings {
    fn from_iter<I: IntoIterator<Item = Arc<TxAux>>>(iter: I) -> Self {
        let mut pendings = Self::new();
        for tx in iter {
            pendings.insert(tx);
        }
        pendings
    }
}
