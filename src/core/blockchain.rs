//! # Blockchain
//!
//! The append-only chain of blocks plus the incrementally maintained set of
//! transactions that still have at least one unspent output.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use crate::crypto::address::b58check_decode;
use crate::error::{BtcError, Result};
use crate::store::{LAST_BLOCK_HASH_KEY, Storage};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub struct Blockchain {
    storage: Storage,
}

impl Blockchain {
    /// Opens (or lazily creates the trees of) the database at `path` without
    /// requiring a chain to already exist — used for read-only commands that
    /// should fail their own way if no chain is there yet.
    pub fn open(path: &Path) -> Result<Blockchain> {
        Ok(Blockchain {
            storage: Storage::open(path)?,
        })
    }

    fn tip_hash(&self) -> Result<Option<String>> {
        Ok(self
            .storage
            .get_misc(LAST_BLOCK_HASH_KEY)?
            .map(|bytes| String::from_utf8_lossy(&bytes).to_string()))
    }

    /// Creates the genesis block, rewarding `address` with the first coinbase.
    /// Fails with [`BtcError::ChainExists`] if a chain is already present.
    pub fn create(path: &Path, address: &str) -> Result<Blockchain> {
        let blockchain = Blockchain::open(path)?;
        if blockchain.tip_hash()?.is_some() {
            return Err(BtcError::ChainExists);
        }
        let coinbase = Transaction::new_coinbase_tx(address)?;
        let genesis = Block::generate_genesis_block(&coinbase)?;
        blockchain
            .storage
            .put_block_and_advance_tip(genesis.get_hash(), &genesis.serialize()?)?;
        blockchain.update_unspent_txs_set(&coinbase)?;
        info!(hash = genesis.get_hash(), "created genesis block");
        Ok(blockchain)
    }

    /// Builds a block containing `pending` plus a fresh coinbase for `miner_address`,
    /// mines it, and stores it. Does not clear any external pending-transaction queue.
    pub fn create_block(&self, pending: &[Transaction], miner_address: &str) -> Result<Block> {
        for tx in pending {
            if !tx.verify()? {
                return Err(BtcError::InvalidSignature);
            }
        }
        let coinbase = Transaction::new_coinbase_tx(miner_address)?;
        let mut transactions = vec![coinbase];
        transactions.extend_from_slice(pending);

        let tip = self
            .tip_hash()?
            .ok_or_else(|| BtcError::BlockchainNotFoundError(String::new()))?;
        let block = Block::new_block(tip, &transactions)?;
        self.storage
            .put_block_and_advance_tip(block.get_hash(), &block.serialize()?)?;
        for tx in block.get_transactions() {
            self.update_unspent_txs_set(tx)?;
        }
        Ok(block)
    }

    /// Accepts a block received from the network: stores it, folds its
    /// transactions into the unspent-output index, and advances the tip.
    pub fn add_block(&self, block: &Block) -> Result<()> {
        self.storage
            .put_block_and_advance_tip(block.get_hash(), &block.serialize()?)?;
        for tx in block.get_transactions() {
            self.update_unspent_txs_set(tx)?;
        }
        Ok(())
    }

    fn get_unspent_tx(&self, txid: &str) -> Result<Option<Transaction>> {
        self.storage
            .get_tx_bytes(txid)?
            .map(|bytes| Transaction::deserialize(&bytes))
            .transpose()
    }

    /// Folds `tx` into the unspent-output index: marks any outputs it spends as
    /// spent (dropping transactions that become fully spent), then records `tx`
    /// itself as long as it has at least one unspent output. A no-op if `tx`
    /// is already indexed.
    pub fn update_unspent_txs_set(&self, tx: &Transaction) -> Result<()> {
        if self.get_unspent_tx(tx.get_id())?.is_some() {
            return Ok(());
        }
        self.storage.put_unspent_tx(tx.get_id(), &tx.serialize()?)?;

        if tx.is_coinbase() {
            return Ok(());
        }
        for input in tx.get_vin() {
            if let Some(mut spent) = self.get_unspent_tx(input.get_txid())? {
                if let Some(output) = spent.get_vout_mut(input.get_vout()) {
                    output.mark_spent();
                }
                if spent.get_vout().iter().all(|o| o.is_spent()) {
                    self.storage.remove_tx(input.get_txid())?;
                } else {
                    self.storage.put_unspent_tx(spent.get_id(), &spent.serialize()?)?;
                }
            }
        }
        Ok(())
    }

    /// Selects enough unspent outputs locked to `address` to cover `amount`,
    /// stopping as soon as the running total exceeds it (strict inequality).
    pub fn find_spendable_transactions(
        &self,
        amount: u64,
        address: &str,
    ) -> Result<(u64, HashMap<String, Vec<usize>>)> {
        let pub_key_hash = b58check_decode(address)?;
        let mut accumulated = 0u64;
        let mut spendable: HashMap<String, Vec<usize>> = HashMap::new();

        for entry in self.storage.iter_unspent_txs() {
            let (txid, bytes) = entry?;
            let tx = Transaction::deserialize(&bytes)?;
            for (index, output) in tx.get_vout().iter().enumerate() {
                if output.is_spent() || !output.is_locked_with_key(&pub_key_hash) {
                    continue;
                }
                accumulated += output.get_value();
                spendable.entry(txid.clone()).or_default().push(index);
                if accumulated > amount {
                    return Ok((accumulated, spendable));
                }
            }
        }

        if accumulated > amount {
            Ok((accumulated, spendable))
        } else {
            Err(BtcError::NotEnoughFunds)
        }
    }

    /// Sum of every unspent output locked to `address`.
    pub fn get_balance(&self, address: &str) -> Result<u64> {
        let pub_key_hash = b58check_decode(address)?;
        let mut balance = 0u64;
        for entry in self.storage.iter_unspent_txs() {
            let (_, bytes) = entry?;
            let tx = Transaction::deserialize(&bytes)?;
            for output in tx.get_vout() {
                if !output.is_spent() && output.is_locked_with_key(&pub_key_hash) {
                    balance += output.get_value();
                }
            }
        }
        Ok(balance)
    }

    /// Every transaction currently in the UTXO index, in storage order.
    pub fn unspent_transactions(&self) -> Result<Vec<Transaction>> {
        self.storage
            .iter_unspent_txs()
            .map(|entry| {
                let (_, bytes) = entry?;
                Transaction::deserialize(&bytes)
            })
            .collect()
    }

    /// Newest-first iterator over the stored chain, starting at the tip.
    pub fn iterator(&self) -> Result<BlockchainIterator<'_>> {
        Ok(BlockchainIterator {
            storage: &self.storage,
            current_hash: self.tip_hash()?,
        })
    }

    /// The `n` most recent blocks, oldest-first.
    pub fn top_n_blocks(&self, n: usize) -> Result<Vec<Block>> {
        let mut blocks: Vec<Block> = self.iterator()?.take(n).collect::<Result<Vec<_>>>()?;
        blocks.reverse();
        Ok(blocks)
    }

    pub fn len(&self) -> Result<usize> {
        self.iterator()?.count_results()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

pub struct BlockchainIterator<'a> {
    storage: &'a Storage,
    current_hash: Option<String>,
}

impl<'a> BlockchainIterator<'a> {
    fn count_results(self) -> Result<usize> {
        let mut count = 0;
        for block in self {
            block?;
            count += 1;
        }
        Ok(count)
    }
}

impl<'a> Iterator for BlockchainIterator<'a> {
    type Item = Result<Block>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.current_hash.take()?;
        let bytes = match self.storage.get_block_bytes(&hash) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        match Block::deserialize(&bytes) {
            Ok(block) => {
                self.current_hash = Some(block.get_pre_block_hash());
                Some(Ok(block))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
