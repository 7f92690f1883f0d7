pub mod address;
pub mod hash;
pub mod keypair;
pub mod signature;

pub use address::{b58check_decode, b58check_encode, base58_decode, base58_encode};
pub use hash::{hash_pubkey, ripemd160_digest, sha256_digest};
pub use keypair::{new_key_pair, public_key_from_pkcs8};
pub use signature::{ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify};
