pub mod core;
pub use core::*;

pub mod crypto;
pub use crypto::*;

pub mod error;
pub use error::*;

pub mod network;
pub use network::*;

pub mod config;
pub use config::{Config, GLOBAL_CONFIG};

pub mod util;
pub use util::*;

pub mod store;
pub use store::*;

pub mod wallet;
pub use wallet::*;
