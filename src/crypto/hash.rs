//! # Hash Functions Module
//!
//! Cryptographic hash primitives used to derive transaction ids, block hashes,
//! and P2PKH public-key-hash addresses.

use ring::digest::{Context, SHA256};
use ripemd::{Digest, Ripemd160};

/// Computes the SHA-256 digest of `data`.
///
/// # Usage Locations
///
/// - `src/core/transaction.rs`: transaction id hashing
/// - `src/core/block.rs`: transaction-set hashing
/// - `src/core/proof_of_work.rs`: block hash calculation during mining
/// - `src/crypto/address.rs`: Base58Check checksum and public-key-hash derivation
pub fn sha256_digest(data: &[u8]) -> Vec<u8> {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    digest.as_ref().to_vec()
}

/// Computes the RIPEMD-160 digest of `data`.
///
/// Used together with `sha256_digest` to derive a 20-byte public-key-hash
/// (`RIPEMD160(SHA256(pubkey))`) for P2PKH address generation.
pub fn ripemd160_digest(data: &[u8]) -> Vec<u8> {
    let mut hasher = Ripemd160::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Hashes a public key the way an address locks to it: `RIPEMD160(SHA256(pubkey))`.
pub fn hash_pubkey(pubkey: &[u8]) -> Vec<u8> {
    ripemd160_digest(sha256_digest(pubkey).as_slice())
}
