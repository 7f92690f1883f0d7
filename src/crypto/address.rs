use crate::error::{BtcError, Result};

/// Base58-encodes `data`. Used by [`b58check_encode`], which every address
/// produced by [`crate::wallet::Wallet::get_address`] goes through.
pub fn base58_encode(data: &[u8]) -> Result<String> {
    Ok(bs58::encode(data).into_string())
}

/// Decodes a Base58 string back to its raw bytes. Used by [`b58check_decode`],
/// which [`crate::core::transaction::TXOutput::new`] calls to lock a new
/// output to an address, and which
/// [`crate::core::blockchain::Blockchain::find_spendable_transactions`] and
/// `Blockchain::get_balance` call to resolve an address back to the
/// pubkey-hash they filter unspent outputs by.
///
/// Returns `BtcError::AddressDecodingError` if the input string is not valid Base58.
pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| BtcError::AddressDecodingError(e.to_string()))
}

/// Version byte for a P2PKH address payload.
pub const VERSION: u8 = 0x00;

/// Number of checksum bytes appended to a Base58Check payload.
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first = crate::crypto::hash::sha256_digest(payload);
    let second = crate::crypto::hash::sha256_digest(first.as_slice());
    second[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

///
/// Encodes a public-key-hash as a Base58Check address: `base58(version ∥ hash ∥ checksum)`.
///
pub fn b58check_encode(pub_key_hash: &[u8]) -> Result<String> {
    let mut payload = vec![VERSION];
    payload.extend(pub_key_hash);
    let check = checksum(&payload);
    payload.extend(check);
    base58_encode(&payload)
}

///
/// Decodes a Base58Check address back to its 20-byte public-key-hash, rejecting
/// addresses with a bad length or a checksum that doesn't match the payload.
///
pub fn b58check_decode(address: &str) -> Result<Vec<u8>> {
    let payload = base58_decode(address)?;
    if payload.len() <= ADDRESS_CHECK_SUM_LEN {
        return Err(BtcError::BadAddress(address.to_string()));
    }
    let (body, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    if checksum(body) != actual_checksum {
        return Err(BtcError::BadAddress(address.to_string()));
    }
    Ok(body[1..].to_vec())
}
