//! # Memory Pool
//!
//! Holds transactions submitted to the mining node that have not yet been
//! included in a block.

use crate::core::transaction::Transaction;
use crate::error::{BtcError, Result};
use std::sync::RwLock;

pub struct MemoryPool {
    inner: RwLock<Vec<Transaction>>,
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool {
            inner: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, tx: Transaction) -> Result<()> {
        let mut pool = self
            .inner
            .write()
            .map_err(|e| BtcError::MemoryPoolInnerPoisonedLockError(e.to_string()))?;
        pool.push(tx);
        Ok(())
    }

    pub fn len(&self) -> Result<usize> {
        let pool = self
            .inner
            .read()
            .map_err(|e| BtcError::MemoryPoolInnerPoisonedLockError(e.to_string()))?;
        Ok(pool.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Removes and returns every pending transaction.
    pub fn drain(&self) -> Result<Vec<Transaction>> {
        let mut pool = self
            .inner
            .write()
            .map_err(|e| BtcError::MemoryPoolInnerPoisonedLockError(e.to_string()))?;
        Ok(std::mem::take(&mut *pool))
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::Wallet;

    #[test]
    fn accumulates_until_drained() {
        let pool = MemoryPool::new();
        let address = Wallet::new().unwrap().get_address().unwrap();
        assert!(pool.is_empty().unwrap());

        pool.add(Transaction::new_coinbase_tx(&address).unwrap())
            .unwrap();
        pool.add(Transaction::new_coinbase_tx(&address).unwrap())
            .unwrap();
        assert_eq!(pool.len().unwrap(), 2);

        let drained = pool.drain().unwrap();
        assert_eq!(drained.len(), 2);
        assert!(pool.is_empty().unwrap());
    }
}
