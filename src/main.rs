use tinychain::core::blockchain::Blockchain;
use tinychain::core::transaction::Transaction;
use tinychain::network::{pull_chain, run_server, send_transactions};
use tinychain::wallet::Wallet;
use tinychain::{BtcError, GLOBAL_CONFIG, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt,
    prelude::*,
};

#[derive(Debug, Parser)]
#[command(name = "tinychain")]
struct Opt {
    #[command(subcommand)]
    command: Command,

    /// Directory the embedded store is opened from. Falls back to the
    /// `DB_PATH` environment variable, then `./data`.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Mining node address, used to pull the chain and submit transactions.
    /// Falls back to the `NODE_ADDR` environment variable, then
    /// `localhost:4000`.
    #[arg(long, global = true)]
    node_addr: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Create the genesis block, rewarding a wallet's address")]
    Createchain {
        #[arg(long)]
        wallet: String,
    },
    #[command(about = "Generate a new wallet keypair")]
    Createwallet {
        #[arg(long)]
        name: String,
    },
    #[command(about = "Print the balance of a wallet's address")]
    Getbalance {
        #[arg(long)]
        wallet: String,
    },
    #[command(about = "Build, sign and submit a transaction")]
    Send {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
    },
    #[command(about = "Print every stored block")]
    Printchain,
    #[command(about = "Run the mining node, rewarding a wallet's address")]
    Startserver {
        #[arg(long)]
        wallet: String,
    },
}

fn initialize_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_filter(filter))
        .init();
}

fn amount_to_cents(amount: f64) -> u64 {
    (amount * 100.0).round() as u64
}

fn cents_to_string(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

fn createchain(db_path: &Path, wallet_name: &str) -> Result<()> {
    let wallet = Wallet::load(db_path, wallet_name)?;
    let address = wallet.get_address()?;
    Blockchain::create(db_path, &address)?;
    info!(address, "created genesis block");
    Ok(())
}

fn createwallet(db_path: &Path, name: &str) -> Result<()> {
    let wallet = Wallet::new()?;
    wallet.save(db_path, name)?;
    info!(address = %wallet.get_address()?, "created wallet");
    Ok(())
}

fn sync_local_chain(blockchain: &Blockchain, node_addr: &str, address: &str) -> Result<()> {
    let height = blockchain.len()?;
    match pull_chain(node_addr, height, address) {
        Ok(Some(blocks)) => {
            for block in blocks {
                blockchain.add_block(&block)?;
            }
        }
        Ok(None) => {}
        Err(e) => info!(error = %e, "could not reach mining node, using local chain only"),
    }
    Ok(())
}

fn getbalance(db_path: &Path, node_addr: &str, wallet_name: &str) -> Result<()> {
    let wallet = Wallet::load(db_path, wallet_name)?;
    let address = wallet.get_address()?;
    let blockchain = Blockchain::open(db_path)?;
    sync_local_chain(&blockchain, node_addr, &address)?;
    let balance = blockchain.get_balance(&address)?;
    println!("Balance of {}: {}", wallet_name, cents_to_string(balance));
    Ok(())
}

fn send(db_path: &Path, node_addr: &str, wallet_name: &str, to: &str, amount: f64) -> Result<()> {
    let wallet = Wallet::load(db_path, wallet_name)?;
    let address = wallet.get_address()?;
    let blockchain = Blockchain::open(db_path)?;
    sync_local_chain(&blockchain, node_addr, &address)?;

    let tx = Transaction::new_transaction(&wallet, to, amount_to_cents(amount), &blockchain)?;
    match send_transactions(node_addr, std::slice::from_ref(&tx))? {
        Some(block) => {
            blockchain.add_block(&block)?;
            println!("Mined block {}", block.get_hash());
        }
        None => println!("Transaction {} is pending", tx.get_id()),
    }
    Ok(())
}

fn format_transaction(tx: &Transaction) -> String {
    let mut lines = vec![format!("  tx {}", tx.get_id())];
    if !tx.is_coinbase() {
        for input in tx.get_vin() {
            lines.push(format!(
                "    in  {}:{}",
                input.get_txid(),
                input.get_vout()
            ));
        }
    }
    for output in tx.get_vout() {
        lines.push(format!(
            "    out value={} spent={}",
            output.get_value(),
            output.is_spent()
        ));
    }
    lines.join("\n")
}

fn printchain(db_path: &Path, node_addr: &str) -> Result<()> {
    let blockchain = Blockchain::open(db_path)?;
    sync_local_chain(&blockchain, node_addr, "")?;

    for block in blockchain.iterator()? {
        let block = block?;
        println!(
            "block {} (prev {}, nonce {})",
            block.get_hash(),
            block.get_pre_block_hash(),
            block.get_nonce()
        );
        println!(
            "  POW validation: {}",
            if block.validate()? { "Pass" } else { "Failed" }
        );
        for tx in block.get_transactions() {
            println!("{}", format_transaction(tx));
        }
    }

    println!("Unspent transactions set:");
    for tx in blockchain.unspent_transactions()? {
        println!("{}", format_transaction(&tx));
    }
    Ok(())
}

fn startserver(db_path: &Path, node_addr: &str, wallet_name: &str) -> Result<()> {
    let wallet = Wallet::load(db_path, wallet_name)?;
    let address = wallet.get_address()?;
    let blockchain = match Blockchain::create(db_path, &address) {
        Ok(blockchain) => blockchain,
        Err(BtcError::ChainExists) => Blockchain::open(db_path)?,
        Err(e) => return Err(e),
    };
    run_server(&blockchain, node_addr, &address)
}

fn process_command(command: Command, db_path: &Path, node_addr: &str) -> Result<()> {
    match command {
        Command::Createchain { wallet } => createchain(db_path, &wallet),
        Command::Createwallet { name } => createwallet(db_path, &name),
        Command::Getbalance { wallet } => getbalance(db_path, node_addr, &wallet),
        Command::Send { wallet, to, amount } => send(db_path, node_addr, &wallet, &to, amount),
        Command::Printchain => printchain(db_path, node_addr),
        Command::Startserver { wallet } => startserver(db_path, node_addr, &wallet),
    }
}

fn main() {
    initialize_logging();
    let opt = Opt::parse();

    let db_path = opt
        .db_path
        .unwrap_or_else(|| PathBuf::from(GLOBAL_CONFIG.get_db_path()));
    let node_addr = opt
        .node_addr
        .unwrap_or_else(|| GLOBAL_CONFIG.get_node_addr());

    if let Err(e) = process_command(opt.command, &db_path, &node_addr) {
        error!(error = %e, "command failed");
        eprintln!("Execution failed with the following error: {e}");
        std::process::exit(1);
    }
}
