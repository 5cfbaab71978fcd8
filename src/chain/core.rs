use std::fmt::Debug;
use std::ops::BitOr;
use thiserror::Error;

use crate::registry::Merge;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("{0} does not exist")]
    DoesNotExist(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityChain<K, T> {
    chain: Vec<(K, T)>,
}

impl<K, T> Default for PriorityChain<K, T> {
    fn default() -> Self {
        Self { chain: Vec::new() }
    }
}

impl<K, T> PriorityChain<K, T>
where
    K: Ord + Clone + Debug,
    T: PartialEq + Clone + Debug,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, key: &K, item: &T) -> Option<usize> {
        let lo = self.chain.partition_point(|(k, _)| k < key);
        self.chain[lo..]
            .iter()
            .take_while(|(k, _)| k == key)
            .position(|(_, i)| i == item)
            .map(|offset| lo + offset)
    }

    /// Insert keeping ascending key order. An identical `(key, item)` pair is
    /// rejected.
    pub fn add(&mut self, key: K, item: T) -> Result<(), ChainError> {
        if self.find(&key, &item).is_some() {
            return Err(ChainError::AlreadyExists(format!("{:?}", (&key, &item))));
        }
        let at = self.chain.partition_point(|(k, _)| k <= &key);
        self.chain.insert(at, (key, item));
        Ok(())
    }

    pub fn remove(&mut self, key: &K, item: &T) -> Result<(K, T), ChainError> {
        match self.find(key, item) {
            Some(at) => Ok(self.chain.remove(at)),
            None => Err(ChainError::DoesNotExist(format!("{:?}", (key, item)))),
        }
    }

    #[must_use]
    pub fn contains(&self, key: &K, item: &T) -> bool {
        self.find(key, item).is_some()
    }

    pub fn clear(&mut self) {
        self.chain.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &T)> {
        self.chain.iter().map(|(k, i)| (k, i))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.chain.iter().map(|(k, _)| k)
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.chain.iter().map(|(_, i)| i)
    }

    /// A new chain holding every entry of `self` and `other`, in key order.
    pub fn merge(&self, other: &Self) -> Result<Self, ChainError> {
        let mut merged = self.clone();
        for (key, item) in &other.chain {
            merged.add(key.clone(), item.clone())?;
        }
        Ok(merged)
    }
}

impl<K, T> Merge for PriorityChain<K, T>
where
    K: Ord + Clone + Debug + Send + Sync + 'static,
    T: PartialEq + Clone + Debug + Send + Sync + 'static,
{
    type Error = ChainError;

    fn merge(&self, other: &Self) -> Result<Self, Self::Error> {
        PriorityChain::merge(self, other)
    }
}

impl<K, T> BitOr for &PriorityChain<K, T>
where
    K: Ord + Clone + Debug,
    T: PartialEq + Clone + Debug,
{
    type Output = Result<PriorityChain<K, T>, ChainError>;

    fn bitor(self, other: Self) -> Self::Output {
        self.merge(other)
    }
}
