
use assert_cmd::Command as AssertCommand;
use std::process::{Command as StdCommand, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;
use test_helpers::{coinbase_tx, create_temp_blockchain, create_test_wallet, mine_n_blocks};
use tinychain::core::transaction::Transaction;
use tinychain::wallet::Wallet;

#[test]
fn genesis_block_rewards_the_creating_wallet() {
    let (blockchain, _dir, wallet) = create_temp_blockchain();
    let address = wallet.get_address().unwrap();
    assert_eq!(blockchain.len().unwrap(), 1);
    assert_eq!(blockchain.get_balance(&address).unwrap(), 100);
}

#[test]
fn mining_additional_blocks_grows_the_chain_and_balance() {
    let (blockchain, _dir, wallet) = create_temp_blockchain();
    let address = wallet.get_address().unwrap();
    mine_n_blocks(&blockchain, &address, 4);

    assert_eq!(blockchain.len().unwrap(), 5);
    assert_eq!(blockchain.get_balance(&address).unwrap(), 500);
}

#[test]
fn a_spent_transaction_moves_value_between_wallets() {
    let (blockchain, _dir, sender) = create_temp_blockchain();
    let (_receiver, receiver_address) = create_test_wallet();

    let tx = Transaction::new_transaction(&sender, &receiver_address, 30, &blockchain).unwrap();
    assert!(tx.verify().unwrap());
    blockchain
        .create_block(&[tx], &sender.get_address().unwrap())
        .unwrap();

    assert_eq!(blockchain.get_balance(&receiver_address).unwrap(), 30);
    assert_eq!(
        blockchain.get_balance(&sender.get_address().unwrap()).unwrap(),
        170
    );
}

#[test]
fn adding_a_received_block_folds_its_coinbase_into_the_utxo_set() {
    let (blockchain, _dir, _wallet) = create_temp_blockchain();
    let (_miner, miner_address) = create_test_wallet();

    let _tx = coinbase_tx(&miner_address);
    let prior_height = blockchain.len().unwrap();
    let new_block = blockchain.create_block(&[], &miner_address).unwrap();
    assert_eq!(blockchain.len().unwrap(), prior_height + 1);
    assert!(new_block.validate().unwrap());
}

fn unique_data_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// Polls `node_addr` until a raw TCP connection succeeds, to avoid racing the
/// server's startup against the first request.
fn wait_for_node_ready(node_addr: &str) {
    use std::net::TcpStream;
    for _ in 0..50 {
        if TcpStream::connect(node_addr).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(100));
    }
    panic!("mining node at {node_addr} never became reachable");
}

#[test]
fn cli_createwallet_then_createchain_then_printchain() {
    let dir = unique_data_dir();
    let db_path = dir.path();

    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "createwallet", "--name", "alice"])
        .assert()
        .success();

    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "createchain", "--wallet", "alice"])
        .assert()
        .success();

    let getbalance = AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "getbalance", "--wallet", "alice"])
        .output()
        .expect("getbalance failed to run");
    assert!(getbalance.status.success());
    let stdout = String::from_utf8_lossy(&getbalance.stdout);
    assert!(stdout.contains("Balance of alice: 1.00"));

    let printchain = AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "printchain"])
        .output()
        .expect("printchain failed to run");
    assert!(printchain.status.success());
    let stdout = String::from_utf8_lossy(&printchain.stdout);
    assert!(stdout.contains("block "));
    assert!(stdout.contains("POW validation: Pass"));
    assert!(stdout.contains("Unspent transactions set:"));
}

#[test]
fn cli_honors_db_path_env_var_when_the_flag_is_omitted() {
    let dir = unique_data_dir();
    let db_path = dir.path();

    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .env("DB_PATH", db_path.to_str().unwrap())
        .args(["createwallet", "--name", "carol"])
        .assert()
        .success();

    let getbalance = AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .env("DB_PATH", db_path.to_str().unwrap())
        .args(["createchain", "--wallet", "carol"])
        .output()
        .expect("createchain failed to run");
    assert!(getbalance.status.success());
    assert!(db_path.join("carol.txt").exists());
}

#[test]
fn cli_createchain_twice_fails() {
    let dir = unique_data_dir();
    let db_path = dir.path();

    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "createwallet", "--name", "bob"])
        .assert()
        .success();
    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "createchain", "--wallet", "bob"])
        .assert()
        .success();
    AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .args(["--db-path", db_path.to_str().unwrap(), "createchain", "--wallet", "bob"])
        .assert()
        .failure();
}

/// Exercises the mining node end to end: start a server, submit two
/// transactions from the CLI, and confirm the receiving address ends up funded.
#[test]
fn cli_send_against_a_running_node_mines_a_block() {
    let bin = AssertCommand::cargo_bin("tinychain")
        .unwrap()
        .get_program()
        .to_owned();

    let node_dir = unique_data_dir();
    let node_addr = "127.0.0.1:14770";

    AssertCommand::new(&bin)
        .args([
            "--db-path",
            node_dir.path().to_str().unwrap(),
            "createwallet",
            "--name",
            "miner",
        ])
        .assert()
        .success();
    AssertCommand::new(&bin)
        .args([
            "--db-path",
            node_dir.path().to_str().unwrap(),
            "createchain",
            "--wallet",
            "miner",
        ])
        .assert()
        .success();

    let mut server = StdCommand::new(&bin)
        .args([
            "--db-path",
            node_dir.path().to_str().unwrap(),
            "--node-addr",
            node_addr,
            "startserver",
            "--wallet",
            "miner",
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start mining node");
    wait_for_node_ready(node_addr);

    // The client reuses the miner's wallet file (copied into its own data dir)
    // so it has funds to send once it pulls the chain from the node.
    let client_dir = unique_data_dir();
    std::fs::copy(
        node_dir.path().join("miner.txt"),
        client_dir.path().join("miner.txt"),
    )
    .unwrap();

    let bob = Wallet::new().unwrap();
    bob.save(client_dir.path(), "bob").unwrap();
    let bob_address = bob.get_address().unwrap();

    // The node needs two distinct pending transactions before it mines; two
    // identical sends would collapse into the same signed transaction (the
    // signer is deterministic), so vary the amount to keep them distinct.
    for amount in ["0.01", "0.02"] {
        AssertCommand::new(&bin)
            .args([
                "--db-path",
                client_dir.path().to_str().unwrap(),
                "--node-addr",
                node_addr,
                "send",
                "--wallet",
                "miner",
                "--to",
                &bob_address,
                "--amount",
                amount,
            ])
            .assert()
            .success();
    }

    let bob_balance = AssertCommand::new(&bin)
        .args([
            "--db-path",
            client_dir.path().to_str().unwrap(),
            "--node-addr",
            node_addr,
            "getbalance",
            "--wallet",
            "bob",
        ])
        .output()
        .expect("getbalance failed to run");
    assert!(bob_balance.status.success());
    let stdout = String::from_utf8_lossy(&bob_balance.stdout);
    assert!(stdout.contains("Balance of bob: 0.03"), "unexpected output: {stdout}");

    let _ = server.kill();
    let _ = server.wait();
}
