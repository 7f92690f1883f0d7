//! # Mining Node Server
//!
//! Single-threaded, cooperative: one connection is accepted, served end to
//! end, and closed before the next is accepted. The proof-of-work loop never
//! suspends, so while mining the server simply isn't listening.

use crate::core::blockchain::Blockchain;
use crate::core::memory_pool::MemoryPool;
use crate::error::Result;
use crate::network::protocol::{
    Command, RECV_TIMEOUT, Version, decode_payload, encode_payload, read_message, write_message,
};
use std::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Transactions accumulate until this many are pending, then a block is mined.
const MIN_PENDING_TO_MINE: usize = 2;

pub fn run_server(blockchain: &Blockchain, node_addr: &str, miner_address: &str) -> Result<()> {
    let listener = TcpListener::bind(node_addr)?;
    info!(node_addr, miner_address, "mining node listening");
    let pool = MemoryPool::new();

    for incoming in listener.incoming() {
        let mut stream = match incoming {
            Ok(stream) => stream,
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        if let Err(e) = stream.set_read_timeout(Some(RECV_TIMEOUT)) {
            warn!(error = %e, "failed to set read timeout");
        }
        if let Err(e) = handle_connection(&mut stream, blockchain, &pool, miner_address) {
            warn!(error = %e, "connection handling failed");
        }
    }
    Ok(())
}

fn handle_connection(
    stream: &mut TcpStream,
    blockchain: &Blockchain,
    pool: &MemoryPool,
    miner_address: &str,
) -> Result<()> {
    let (command, payload) = read_message(stream)?;
    debug!(?command, "received request");

    match command {
        Command::PullChain => {
            let version: Version = decode_payload(&payload)?;
            let height = blockchain.len()?;
            if height > version.height {
                let blocks = blockchain.top_n_blocks(height - version.height)?;
                let reply = encode_payload(&blocks)?;
                write_message(stream, Command::Reply, &reply)?;
            } else {
                write_message(stream, Command::Empty, &[])?;
            }
        }
        Command::Send => {
            let transactions: Vec<crate::core::transaction::Transaction> =
                decode_payload(&payload)?;
            for tx in transactions {
                pool.add(tx)?;
            }
            if pool.len()? >= MIN_PENDING_TO_MINE {
                let pending = pool.drain()?;
                let block = blockchain.create_block(&pending, miner_address)?;
                info!(hash = block.get_hash(), "mined new block");
                let reply = encode_payload(&block)?;
                write_message(stream, Command::Reply, &reply)?;
            } else {
                write_message(stream, Command::Empty, &[])?;
            }
        }
        other => {
            return Err(crate::error::BtcError::ProtocolError(format!(
                "unexpected request command {other:?}"
            )));
        }
    }
    Ok(())
}
