// Declare and defines a module for the network layer
pub mod client;
pub mod protocol;
pub mod server;

pub use client::{pull_chain, send_transactions};
pub use protocol::{Command, Version};
pub use server::run_server;
