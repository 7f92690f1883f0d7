//! # Proof of Work
//!
//! Searches for a nonce such that the block's hash, read as a big-endian
//! integer, falls below a target derived from `target_bits`.

use super::block::Block;
use crate::error::{BtcError, Result};
use data_encoding::HEXLOWER;
use num_bigint::{BigInt, Sign};
use tracing::debug;

pub struct ProofOfWork {
    block: Block,
    target: BigInt,
}

impl ProofOfWork {
    pub fn new(block: Block) -> ProofOfWork {
        let mut target = BigInt::from(1);
        target <<= 256 - block.get_target_bits();
        ProofOfWork { block, target }
    }

    /// `prev_block_hash ∥ hash_transactions() ∥ timestamp ∥ target_bits ∥ nonce`, as UTF-8.
    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        format!(
            "{}{}{}{}{}",
            self.block.get_pre_block_hash(),
            self.block.hash_transactions(),
            self.block.get_timestamp(),
            self.block.get_target_bits(),
            nonce
        )
        .into_bytes()
    }

    fn hash_for(&self, nonce: u64) -> Vec<u8> {
        crate::crypto::hash::sha256_digest(self.prepare_data(nonce).as_slice())
    }

    fn satisfies_target(&self, hash: &[u8]) -> bool {
        BigInt::from_bytes_be(Sign::Plus, hash) < self.target
    }

    /// Scans `nonce` over `[0, u64::MAX]` for the first hash below the target.
    pub fn run(&self) -> Result<(u64, String)> {
        debug!("mining block on top of {}", self.block.get_pre_block_hash());
        for nonce in 0..=u64::MAX {
            let hash = self.hash_for(nonce);
            if self.satisfies_target(&hash) {
                debug!(nonce, hash = %HEXLOWER.encode(&hash), "found valid proof of work");
                return Ok((nonce, HEXLOWER.encode(&hash)));
            }
        }
        Err(BtcError::MiningExhausted)
    }

    /// Recomputes the hash for the block's stored nonce and checks it against the target.
    pub fn validate(&self) -> Result<bool> {
        let hash = self.hash_for(self.block.get_nonce());
        Ok(self.satisfies_target(&hash) && HEXLOWER.encode(&hash) == self.block.get_hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::Transaction;
    use crate::wallet::Wallet;

    #[test]
    fn mined_block_passes_validation() {
        let address = Wallet::new().unwrap().get_address().unwrap();
        let coinbase = Transaction::new_coinbase_tx(&address).unwrap();
        let block = Block::new_block("prev".to_string(), &[coinbase]).unwrap();
        assert!(ProofOfWork::new(block).validate().unwrap());
    }

    #[test]
    fn found_hash_has_the_required_leading_zero_bytes() {
        let address = Wallet::new().unwrap().get_address().unwrap();
        let coinbase = Transaction::new_coinbase_tx(&address).unwrap();
        let block = Block::new_block("prev".to_string(), &[coinbase]).unwrap();
        let zero_bytes = (block.get_target_bits() / 8) as usize;
        let hash_bytes = HEXLOWER.decode(block.get_hash().as_bytes()).unwrap();
        assert!(hash_bytes[..zero_bytes].iter().all(|b| *b == 0));
    }
}
