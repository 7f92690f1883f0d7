//! # Wire Protocol
//!
//! Framing: `length (4 bytes, big-endian) ∥ command (12 ASCII bytes, right-space-padded)
//! ∥ payload (length bytes)`. One request, one reply, then the connection closes.

use crate::error::{BtcError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

const COMMAND_LEN: usize = 12;
/// Generous enough for a handful of blocks; guards against a malicious length prefix.
const MAX_PAYLOAD_LEN: u32 = 64 * 1024 * 1024;
pub const RECV_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    PullChain,
    Send,
    Reply,
    Empty,
}

impl Command {
    fn as_str(self) -> &'static str {
        match self {
            Command::PullChain => "pull chain",
            Command::Send => "send",
            Command::Reply => "reply",
            Command::Empty => "empty",
        }
    }

    fn from_str(s: &str) -> Result<Command> {
        match s {
            "pull chain" => Ok(Command::PullChain),
            "send" => Ok(Command::Send),
            "reply" => Ok(Command::Reply),
            "empty" => Ok(Command::Empty),
            other => Err(BtcError::ProtocolError(format!("unknown command {other:?}"))),
        }
    }

    fn encode(self) -> [u8; COMMAND_LEN] {
        let mut bytes = [b' '; COMMAND_LEN];
        let s = self.as_str().as_bytes();
        bytes[..s.len()].copy_from_slice(s);
        bytes
    }
}

/// The `pull chain` request payload: the caller's current height and the
/// address it wants any freshly mined coinbase to eventually reach.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Version {
    pub height: usize,
    pub address_from: String,
}

fn map_io_err(e: std::io::Error) -> BtcError {
    if matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    ) {
        BtcError::Timeout(e.to_string())
    } else {
        BtcError::IOError(e.to_string())
    }
}

pub fn write_message(stream: &mut TcpStream, command: Command, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| BtcError::ProtocolError("payload too large".to_string()))?;
    stream.write_all(&len.to_be_bytes()).map_err(map_io_err)?;
    stream.write_all(&command.encode()).map_err(map_io_err)?;
    stream.write_all(payload).map_err(map_io_err)?;
    stream.flush().map_err(map_io_err)
}

pub fn read_message(stream: &mut TcpStream) -> Result<(Command, Vec<u8>)> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).map_err(map_io_err)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_PAYLOAD_LEN {
        return Err(BtcError::ProtocolError(format!(
            "payload length {len} exceeds maximum"
        )));
    }

    let mut command_buf = [0u8; COMMAND_LEN];
    stream.read_exact(&mut command_buf).map_err(map_io_err)?;
    let command_str = String::from_utf8_lossy(&command_buf);
    let command = Command::from_str(command_str.trim_end())?;

    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).map_err(map_io_err)?;
    Ok((command, payload))
}

pub fn encode_payload<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| BtcError::ProtocolError(e.to_string()))
}

pub fn decode_payload<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| BtcError::ProtocolError(e.to_string()))
        .map(|(value, _)| value)
}
