//! # Client
//!
//! Helpers the CLI uses to talk to a running mining node: one TCP connection
//! per request, closed as soon as the reply arrives.

use crate::core::block::Block;
use crate::core::transaction::Transaction;
use crate::error::Result;
use crate::network::protocol::{
    Command, RECV_TIMEOUT, Version, decode_payload, encode_payload, read_message, write_message,
};
use std::net::TcpStream;

fn connect(node_addr: &str) -> Result<TcpStream> {
    let stream = TcpStream::connect(node_addr)?;
    stream.set_read_timeout(Some(RECV_TIMEOUT))?;
    Ok(stream)
}

/// Asks the node for any blocks beyond `height`. `None` if the node has nothing new.
pub fn pull_chain(node_addr: &str, height: usize, address_from: &str) -> Result<Option<Vec<Block>>> {
    let mut stream = connect(node_addr)?;
    let payload = encode_payload(&Version {
        height,
        address_from: address_from.to_string(),
    })?;
    write_message(&mut stream, Command::PullChain, &payload)?;

    let (command, reply) = read_message(&mut stream)?;
    match command {
        Command::Reply => Ok(Some(decode_payload(&reply)?)),
        _ => Ok(None),
    }
}

/// Submits `transactions` to the node. `None` means the node is still waiting
/// for more before it mines a block.
pub fn send_transactions(node_addr: &str, transactions: &[Transaction]) -> Result<Option<Block>> {
    let mut stream = connect(node_addr)?;
    let payload = encode_payload(&transactions.to_vec())?;
    write_message(&mut stream, Command::Send, &payload)?;

    let (command, reply) = read_message(&mut stream)?;
    match command {
        Command::Reply => Ok(Some(decode_payload(&reply)?)),
        _ => Ok(None),
    }
}
