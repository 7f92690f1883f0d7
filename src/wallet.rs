//! # Wallet
//!
//! An ECDSA P-256 keypair and its derived P2PKH address, persisted as a PEM
//! file named after the wallet.

use crate::crypto::address::b58check_encode;
use crate::crypto::hash::hash_pubkey;
use crate::crypto::keypair::{new_key_pair, public_key_from_pkcs8};
use crate::error::{BtcError, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PEM_TAG: &str = "EC PRIVATE KEY";

#[derive(Clone)]
pub struct Wallet {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    /// Generates a fresh keypair.
    pub fn new() -> Result<Wallet> {
        let pkcs8 = new_key_pair()?;
        let public_key = public_key_from_pkcs8(&pkcs8)?;
        Ok(Wallet { pkcs8, public_key })
    }

    /// Loads a wallet previously written by [`Wallet::save`].
    pub fn load(dir: &Path, name: &str) -> Result<Wallet> {
        let path = wallet_path(dir, name);
        let contents = fs::read_to_string(&path).map_err(|e| {
            BtcError::WalletsFileReadError(format!("{}: {e}", path.display()))
        })?;
        let parsed =
            pem::parse(contents).map_err(|e| BtcError::WalletsDeserializationError(e.to_string()))?;
        let pkcs8 = parsed.contents().to_vec();
        let public_key = public_key_from_pkcs8(&pkcs8)?;
        Ok(Wallet { pkcs8, public_key })
    }

    /// Writes this wallet's private key as PEM to `<dir>/<name>.txt`.
    pub fn save(&self, dir: &Path, name: &str) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| BtcError::SavingWalletsError(e.to_string()))?;
        let pem = pem::Pem::new(PEM_TAG, self.pkcs8.clone());
        let encoded = pem::encode(&pem);
        fs::write(wallet_path(dir, name), encoded)
            .map_err(|e| BtcError::SavingWalletsError(e.to_string()))
    }

    pub fn get_pkcs8(&self) -> &[u8] {
        self.pkcs8.as_slice()
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn get_public_key_hash(&self) -> Vec<u8> {
        hash_pubkey(&self.public_key)
    }

    pub fn get_address(&self) -> Result<String> {
        b58check_encode(&self.get_public_key_hash())
    }
}

fn wallet_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn address_round_trips_through_save_and_load() {
        let dir = TempDir::new().expect("tempdir");
        let wallet = Wallet::new().expect("new wallet");
        wallet.save(dir.path(), "alice").expect("save");

        let loaded = Wallet::load(dir.path(), "alice").expect("load");
        assert_eq!(wallet.get_address().unwrap(), loaded.get_address().unwrap());
        assert_eq!(wallet.get_public_key(), loaded.get_public_key());
    }

    #[test]
    fn different_wallets_have_different_addresses() {
        let a = Wallet::new().expect("wallet a");
        let b = Wallet::new().expect("wallet b");
        assert_ne!(a.get_address().unwrap(), b.get_address().unwrap());
    }
}
