//! # Configuration
//!
//! Process-wide settings read once from the environment, with sane defaults
//! so a node can be started without any setup.

use once_cell::sync::Lazy;
use std::env;
use std::sync::RwLock;

pub static GLOBAL_CONFIG: Lazy<Config> = Lazy::new(Config::new);

const DB_PATH_KEY: &str = "DB_PATH";
const NODE_ADDR_KEY: &str = "NODE_ADDR";
const DEFAULT_DB_PATH: &str = "./data";
const DEFAULT_NODE_ADDR: &str = "localhost:4000";

pub struct Config {
    db_path: RwLock<String>,
    node_addr: RwLock<String>,
}

impl Config {
    pub fn new() -> Config {
        Config {
            db_path: RwLock::new(
                env::var(DB_PATH_KEY).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            ),
            node_addr: RwLock::new(
                env::var(NODE_ADDR_KEY).unwrap_or_else(|_| DEFAULT_NODE_ADDR.to_string()),
            ),
        }
    }

    pub fn get_db_path(&self) -> String {
        self.db_path.read().unwrap().clone()
    }

    pub fn set_db_path(&self, path: &str) {
        *self.db_path.write().unwrap() = path.to_string();
    }

    pub fn get_node_addr(&self) -> String {
        self.node_addr.read().unwrap().clone()
    }

    pub fn set_node_addr(&self, addr: &str) {
        *self.node_addr.write().unwrap() = addr.to_string();
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
