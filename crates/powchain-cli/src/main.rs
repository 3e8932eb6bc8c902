use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use powchain_core::{constants::DEFAULT_DIFFICULTY, BlockData, Blockchain};
use serde_json::json;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "powchain")]
#[command(about = "Mine and verify a minimal proof-of-work chain")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine the two demo transfers and print the chain
    Demo {
        /// Number of leading zero hex digits each block hash needs
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: usize,
        /// Overwrite the first mined block's data afterwards and verify again
        #[arg(long)]
        tamper: bool,
    },
    /// Mine one block per payload and print the chain
    Mine {
        #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
        difficulty: usize,
        /// Block payload, repeat for several blocks
        #[arg(long = "data", required = true)]
        data: Vec<String>,
    },
    /// Read a chain as JSON from stdin and verify it
    Verify,
}

fn demo_transfers() -> Result<Vec<Vec<u8>>> {
    [
        json!({ "from": "Savy", "to": "josy", "amount": 100, "prof": "sdfds934msdcsdcd" }),
        json!({ "from": "day", "to": "josy", "amount": 100, "prof": "sdfds934msdcsdcd" }),
    ]
    .iter()
    .map(|record| serde_json::to_vec(record).context("encode demo transfer"))
    .collect()
}

fn mine_all(difficulty: usize, payloads: Vec<Vec<u8>>) -> Result<Blockchain> {
    let mut chain = Blockchain::new(difficulty);
    for payload in payloads {
        let stats = chain.mine_block(payload)?;
        info!(
            attempts = stats.attempts,
            elapsed = ?stats.elapsed,
            hash_rate = stats.hash_rate(),
            "block appended"
        );
    }
    Ok(chain)
}

fn print_chain(chain: &Blockchain) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(chain)?);
    Ok(())
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Demo { difficulty, tamper } => {
            let chain = mine_all(difficulty, demo_transfers()?)?;
            chain.validate().context("freshly mined chain failed validation")?;
            print_chain(&chain)?;
            println!("valid");

            if tamper {
                let mut raw = serde_json::to_value(&chain)?;
                raw["blocks"][1]["data"] = serde_json::to_value(BlockData::from("tempered data"))?;
                let tampered: Blockchain = serde_json::from_value(raw)?;
                match tampered.validate() {
                    Ok(()) => bail!("tampered chain passed validation"),
                    Err(e) => println!("tampered: {e}"),
                }
            }
        }
        Command::Mine { difficulty, data } => {
            let chain = mine_all(difficulty, data.into_iter().map(String::into_bytes).collect())?;
            print_chain(&chain)?;
        }
        Command::Verify => {
            let input = io::read_to_string(io::stdin()).context("read chain from stdin")?;
            let chain: Blockchain = serde_json::from_str(&input).context("parse chain JSON")?;
            match chain.validate() {
                Ok(()) => println!("valid ({} blocks)", chain.len()),
                Err(e) => bail!("chain invalid: {e}"),
            }
        }
    }
    Ok(())
}
