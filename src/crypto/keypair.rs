//! # Keypair Generation Module
//!
//! Generates and loads ECDSA P-256 keypairs in PKCS#8 format, the only
//! signature scheme wallets in this system use.

use crate::error::{BtcError, Result};
use ring::rand::SystemRandom;
use ring::signature::{ECDSA_P256_SHA256_FIXED_SIGNING, EcdsaKeyPair, KeyPair};

///
/// Generates a new ECDSA P-256 key pair and returns it as a PKCS#8 document.
///
pub fn new_key_pair() -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let pkcs8 = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, &rng)
        .map_err(|e| BtcError::WalletKeyPairError(e.to_string()))?;
    Ok(pkcs8.as_ref().to_vec())
}

///
/// Recovers the public key that corresponds to a PKCS#8-encoded private key,
/// for reconstructing a wallet's public half after loading it from disk.
///
pub fn public_key_from_pkcs8(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let rng = SystemRandom::new();
    let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8, &rng)
        .map_err(|e| BtcError::WalletKeyPairError(e.to_string()))?;
    Ok(key_pair.public_key().as_ref().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_key_pair_yields_a_public_key() {
        let pkcs8 = new_key_pair().expect("key pair generation");
        let public_key = public_key_from_pkcs8(&pkcs8).expect("public key derivation");
        assert!(!public_key.is_empty());
    }
}
