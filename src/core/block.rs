//! # Block
//!
//! A block bundles a set of transactions behind a proof-of-work-sealed
//! header that links back to the previous block by hash.

use crate::core::proof_of_work::ProofOfWork;
use crate::core::transaction::Transaction;
use crate::error::{BtcError, Result};
use serde::{Deserialize, Serialize};
use sled::IVec;

/// `prev_block_hash` of the genesis block: there is no real predecessor.
pub const GENESIS_BLOCK_PRE_BLOCK_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Difficulty used for every mined block: the hash's leading two bytes must be zero.
pub const DEFAULT_TARGET_BITS: i32 = 16;

#[derive(Clone, Serialize, Deserialize)]
pub struct Block {
    timestamp: i64,
    transactions: Vec<Transaction>,
    pre_block_hash: String,
    nonce: u64,
    hash: String,
    target_bits: i32,
}

impl Block {
    /// Mines a new block on top of `pre_block_hash` containing `transactions`.
    pub fn new_block(pre_block_hash: String, transactions: &[Transaction]) -> Result<Block> {
        let mut block = Block {
            timestamp: crate::util::current_timestamp(),
            transactions: transactions.to_vec(),
            pre_block_hash,
            nonce: 0,
            hash: String::new(),
            target_bits: DEFAULT_TARGET_BITS,
        };
        let pow = ProofOfWork::new(block.clone());
        let (nonce, hash) = pow.run()?;
        block.nonce = nonce;
        block.hash = hash;
        Ok(block)
    }

    pub fn generate_genesis_block(coinbase: &Transaction) -> Result<Block> {
        Block::new_block(
            GENESIS_BLOCK_PRE_BLOCK_HASH.to_string(),
            std::slice::from_ref(coinbase),
        )
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map_err(|e| BtcError::BlockDeserializationError(e.to_string()))
            .map(|(block, _)| block)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| BtcError::BlockSerializationError(e.to_string()))
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_pre_block_hash(&self) -> String {
        self.pre_block_hash.clone()
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_target_bits(&self) -> i32 {
        self.target_bits
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash_transactions(&self) -> String {
        let mut txhashs = Vec::new();
        for transaction in &self.transactions {
            txhashs.extend(transaction.get_id().as_bytes());
        }
        data_encoding::HEXLOWER.encode(crate::crypto::hash::sha256_digest(&txhashs).as_slice())
    }

    /// Recomputes the proof-of-work hash for the stored nonce and checks it
    /// against this block's target.
    pub fn validate(&self) -> Result<bool> {
        ProofOfWork::new(self.clone()).validate()
    }
}

impl TryFrom<&Block> for IVec {
    type Error = BtcError;
    fn try_from(b: &Block) -> Result<Self> {
        Ok(Self::from(b.serialize()?))
    }
}
