//! # Storage
//!
//! A thin wrapper around a `sled` database exposing the three logical tables
//! the chain needs: blocks by hash, unspent-output transactions by txid, and
//! a handful of chain-wide metadata keys.

use crate::error::{BtcError, Result};
use sled::{Db, Transactional, Tree};
use std::path::Path;

pub const CHAIN_TREE: &str = "chain";
pub const UNSPENT_TXS_TREE: &str = "unspent_txs";
pub const MISC_TREE: &str = "misc";
pub const LAST_BLOCK_HASH_KEY: &str = "last_block_hash";

pub struct Storage {
    db: Db,
    chain: Tree,
    unspent_txs: Tree,
    misc: Tree,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Storage> {
        let db = sled::open(path).map_err(|e| BtcError::BlockchainDBconnection(e.to_string()))?;
        let chain = db
            .open_tree(CHAIN_TREE)
            .map_err(|e| BtcError::OpenBlockchainTreeError(e.to_string()))?;
        let unspent_txs = db
            .open_tree(UNSPENT_TXS_TREE)
            .map_err(|e| BtcError::OpenBlockchainTreeError(e.to_string()))?;
        let misc = db
            .open_tree(MISC_TREE)
            .map_err(|e| BtcError::OpenBlockchainTreeError(e.to_string()))?;
        Ok(Storage {
            db,
            chain,
            unspent_txs,
            misc,
        })
    }

    pub fn get_block_bytes(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        self.chain
            .get(hash)
            .map(|maybe| maybe.map(|v| v.to_vec()))
            .map_err(|e| BtcError::GetBlockchainError(e.to_string()))
    }

    pub fn get_tx_bytes(&self, txid: &str) -> Result<Option<Vec<u8>>> {
        self.unspent_txs
            .get(txid)
            .map(|maybe| maybe.map(|v| v.to_vec()))
            .map_err(|e| BtcError::GettingUTXOError(e.to_string()))
    }

    pub fn remove_tx(&self, txid: &str) -> Result<()> {
        self.unspent_txs
            .remove(txid)
            .map(|_| ())
            .map_err(|e| BtcError::RemovingUTXOError(e.to_string()))
    }

    pub fn iter_unspent_txs(&self) -> impl Iterator<Item = Result<(String, Vec<u8>)>> {
        self.unspent_txs.iter().map(|entry| {
            entry
                .map(|(k, v)| (String::from_utf8_lossy(&k).to_string(), v.to_vec()))
                .map_err(|e| BtcError::GettingUTXOError(e.to_string()))
        })
    }

    pub fn get_misc(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.misc
            .get(key)
            .map(|maybe| maybe.map(|v| v.to_vec()))
            .map_err(|e| BtcError::GetBlockchainError(e.to_string()))
    }

    /// Atomically inserts `block` under `hash` and advances the tip pointer
    /// in a single transaction, so a crash never leaves the two out of sync.
    pub fn put_block_and_advance_tip(&self, hash: &str, block_bytes: &[u8]) -> Result<()> {
        (&self.chain, &self.misc)
            .transaction(|(chain, misc)| {
                chain.insert(hash, block_bytes)?;
                misc.insert(LAST_BLOCK_HASH_KEY, hash.as_bytes())?;
                Ok::<_, sled::transaction::ConflictableTransactionError<()>>(())
            })
            .map_err(|e| BtcError::SavingBlockchainError(format!("{e:?}")))
    }

    pub fn put_unspent_tx(&self, txid: &str, tx_bytes: &[u8]) -> Result<()> {
        self.unspent_txs
            .insert(txid, tx_bytes)
            .map(|_| ())
            .map_err(|e| BtcError::SavingUTXOError(e.to_string()))
    }

    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| BtcError::SavingBlockchainError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn put_and_get_block_round_trips() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.put_block_and_advance_tip("hash1", b"block-bytes").unwrap();
        assert_eq!(
            storage.get_block_bytes("hash1").unwrap(),
            Some(b"block-bytes".to_vec())
        );
        assert_eq!(
            storage.get_misc(LAST_BLOCK_HASH_KEY).unwrap(),
            Some(b"hash1".to_vec())
        );
    }

    #[test]
    fn unspent_tx_can_be_removed() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.put_unspent_tx("tx1", b"tx-bytes").unwrap();
        assert!(storage.get_tx_bytes("tx1").unwrap().is_some());
        storage.remove_tx("tx1").unwrap();
        assert!(storage.get_tx_bytes("tx1").unwrap().is_none());
    }
}
