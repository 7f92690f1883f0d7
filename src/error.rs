use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum BtcError {
    #[error("Blockchain not found error: {0}")]
    BlockchainNotFoundError(String),

    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Block deserialization error: {0}")]
    BlockDeserializationError(String),
    #[error("Block serialization error: {0}")]
    BlockSerializationError(String),

    #[error("Not enough funds")]
    NotEnoughFunds,

    #[error("Transaction deserialization error: {0}")]
    TransactionDeserializationError(String),
    #[error("Transaction serialization error: {0}")]
    TransactionSerializationError(String),
    #[error("TransactionSignatureError lock error: {0}")]
    TransactionSignatureError(String),

    #[error("Address decoding  error: {0}")]
    AddressDecodingError(String),
    #[error("Bad address: {0}")]
    BadAddress(String),
    #[error("Memory pool inner poisoned lock error: {0}")]
    MemoryPoolInnerPoisonedLockError(String),

    // IO errors
    #[error("Saving wallets error: {0}")]
    SavingWalletsError(String),
    #[error("Wallets file read error: {0}")]
    WalletsFileReadError(String),
    #[error("Wallet key pair error: {0}")]
    WalletKeyPairError(String),
    #[error("Wallets deserialization error: {0}")]
    WalletsDeserializationError(String),

    // Sled errors
    #[error("Saving UTXO error: {0}")]
    SavingUTXOError(String),
    #[error("Getting UTXO error: {0}")]
    GettingUTXOError(String),
    #[error("Removing UTXO error: {0}")]
    RemovingUTXOError(String),

    #[error("Blockchain DB connection error: {0}")]
    BlockchainDBconnection(String),
    #[error("Saving Blockchain error: {0}")]
    SavingBlockchainError(String),
    #[error("Getting Blockchain error: {0}")]
    GetBlockchainError(String),
    #[error("Open Blockchain tree error: {0}")]
    OpenBlockchainTreeError(String),

    // Consensus / mining errors
    #[error("Mining exhausted the nonce space without finding a valid proof of work")]
    MiningExhausted,
    #[error("Chain already exists")]
    ChainExists,

    // Wire protocol errors
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    #[error("Connection timed out: {0}")]
    Timeout(String),
    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for BtcError {
    fn from(e: std::io::Error) -> Self {
        BtcError::IOError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BtcError>;
