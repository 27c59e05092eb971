//! drip-cli — Command-line driver for the Drip emission engine.
//!
//! Keeps a minter, an in-memory ledger, and a simulated chain height in a
//! JSON state file. Each invocation loads the state, runs one operation, and
//! writes the state back.

mod state;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use drip_core::address::AccountId;
use drip_core::amount::{format_tokens, parse_amount};
use drip_core::ledger::{ManualClock, MemoryLedger};
use drip_core::traits::{BlockClock, Ledger};
use drip_core::types::{DecayParams, Pool};
use drip_minter::{Minter, MinterConfig};
use primitive_types::U256;
use tracing::info;

use crate::state::{CliMinter, State, resolve_state_path};

/// Drip emission engine command-line interface.
#[derive(Parser)]
#[command(name = "drip-cli")]
#[command(version, about = "Block-synchronized token emission")]
struct Cli {
    /// Path to state file (default: <data dir>/drip/state.json).
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Account the command runs as (default: the current admin).
    #[arg(long, global = true)]
    caller: Option<AccountId>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh state file.
    Init(InitArgs),
    /// Append an emission pool.
    AddPool(PoolArgs),
    /// Replace the pool at an index.
    UpdatePool {
        index: usize,
        #[command(flatten)]
        pool: PoolArgs,
    },
    /// Remove the pool at an index; the last pool takes its place.
    RemovePool { index: usize },
    /// List all pools.
    Pools,
    /// Show one pool.
    Pool { index: usize },
    /// Move the simulated chain forward.
    Advance { blocks: u64 },
    /// Pay all pools for the blocks since the last mint.
    Mint,
    /// Apply due decay periods to one pool.
    UpdateEmissions { index: usize },
    /// Apply due decay periods to every pool.
    UpdateAllEmissions,
    /// Set the supply cap, or remove it with "none".
    SetCap { cap: String },
    /// Hand the admin role to another account.
    SetAdmin { new_admin: AccountId },
    /// Show engine status.
    Status,
    /// Show an account's ledger balance.
    Balance { account: AccountId },
}

#[derive(Args)]
struct InitArgs {
    /// Admin account (required unless --config provides one).
    #[arg(long)]
    admin: Option<AccountId>,

    /// Account the engine mints as (default: the admin).
    #[arg(long)]
    minter_account: Option<AccountId>,

    /// Blocks up to and including this one are never paid for.
    #[arg(long, default_value_t = 0)]
    start_block: u64,

    /// Supply cap in base units (e.g. 3e27).
    #[arg(long, value_parser = parse_amount)]
    cap: Option<U256>,

    /// Configuration file; DRIP_* environment variables override it.
    #[arg(long, conflicts_with_all = ["admin", "minter_account", "cap"])]
    config: Option<PathBuf>,

    /// Overwrite an existing state file.
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
struct PoolArgs {
    /// Receiving account.
    receiver: AccountId,

    /// Base units paid per block.
    #[arg(value_parser = parse_amount)]
    amount_per_block: U256,

    /// Decay per period in basis points (10000 = 100%).
    #[arg(long, requires = "decay_period")]
    decay_bp: Option<u32>,

    /// Decay period length in blocks.
    #[arg(long, requires = "decay_bp")]
    decay_period: Option<u64>,
}

impl PoolArgs {
    fn decay(&self) -> Option<DecayParams> {
        match (self.decay_bp, self.decay_period) {
            (Some(bp), Some(period)) => Some(DecayParams::new(bp, period)),
            _ => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let path = resolve_state_path(cli.state.clone())?;
    let command = match cli.command {
        Commands::Init(args) => return init(&path, args),
        command => command,
    };

    let mut minter = State::load(&path)?.into_minter()?;
    let caller = cli.caller.unwrap_or_else(|| minter.admin());
    let dirty = run(&mut minter, &caller, command)?;
    if dirty {
        State::from_minter(minter).save(&path)?;
    }
    Ok(())
}

/// Create the initial state file.
fn init(path: &std::path::Path, args: InitArgs) -> Result<()> {
    if path.exists() && !args.force {
        bail!("State file already exists: {} (use --force)", path.display());
    }

    let config = match &args.config {
        Some(file) => MinterConfig::load(Some(file.as_path()))
            .with_context(|| format!("Failed to load config: {}", file.display()))?,
        None => {
            let admin = args.admin.context("--admin is required without --config")?;
            MinterConfig {
                admin,
                minter_account: args.minter_account.unwrap_or(admin),
                start_block: args.start_block,
                supply_cap: args.cap,
                pools: Vec::new(),
            }
        }
    };

    let ledger = MemoryLedger::with_minter(config.minter_account);
    let clock = ManualClock::at(config.start_block);
    let minter = Minter::from_config(&config, ledger, clock).context("Failed to create minter")?;
    info!(path = %path.display(), "initialized state");
    State::from_minter(minter).save(path)?;

    println!("Initialized: {}", path.display());
    println!("Admin: {}", config.admin);
    println!("Start block: {}", config.start_block);
    println!("Pools: {}", config.pools.len());
    Ok(())
}

/// Run one command. Returns whether the state changed.
fn run(minter: &mut CliMinter, caller: &AccountId, command: Commands) -> Result<bool> {
    match command {
        Commands::Init(_) => bail!("State is already initialized"),
        Commands::AddPool(args) => {
            let id = minter.add_pool(caller, args.receiver, args.amount_per_block, args.decay())?;
            println!("Added {id} at index {}", minter.pool_length() - 1);
            Ok(true)
        }
        Commands::UpdatePool { index, pool } => {
            minter.update_pool(caller, index, pool.receiver, pool.amount_per_block, pool.decay())?;
            print_pool(index, minter.get_pool(index)?);
            Ok(true)
        }
        Commands::RemovePool { index } => {
            let removed = minter.remove_pool(caller, index)?;
            println!("Removed {} (receiver {})", removed.id, removed.receiver);
            if let Ok(moved) = minter.get_pool(index) {
                println!("{} moved to index {index}", moved.id);
            }
            Ok(true)
        }
        Commands::Pools => {
            if minter.pool_length() == 0 {
                println!("No pools");
            }
            for (index, pool) in minter.pools().iter().enumerate() {
                print_pool(index, pool);
            }
            Ok(false)
        }
        Commands::Pool { index } => {
            print_pool(index, minter.get_pool(index)?);
            Ok(false)
        }
        Commands::Advance { blocks } => {
            let height = minter.clock().advance(blocks);
            println!("Block: {height}");
            Ok(true)
        }
        Commands::Mint => {
            let receipt = minter.mint()?;
            if receipt.is_noop() {
                println!("Nothing to mint at block {}", receipt.to_block);
                return Ok(false);
            }
            println!("Minted blocks {}..{}", receipt.from_block, receipt.to_block);
            for payout in &receipt.payouts {
                println!("  [{}] {} -> {} ({})", payout.index, payout.pool_id, payout.receiver, payout.amount);
            }
            println!("Total: {} ({} tokens)", receipt.total, format_tokens(receipt.total));
            if receipt.clamped {
                println!("Clamped by supply cap");
            }
            Ok(true)
        }
        Commands::UpdateEmissions { index } => {
            match minter.update_emissions(index)? {
                Some(update) => println!(
                    "[{}] {}: {} -> {} over {} period(s)",
                    update.index, update.pool_id, update.old_rate, update.new_rate, update.periods
                ),
                None => println!("[{index}] no decay due"),
            }
            Ok(true)
        }
        Commands::UpdateAllEmissions => {
            let updates = minter.update_all_emissions()?;
            if updates.is_empty() {
                println!("No decay due");
            }
            for update in &updates {
                println!(
                    "[{}] {}: {} -> {} over {} period(s)",
                    update.index, update.pool_id, update.old_rate, update.new_rate, update.periods
                );
            }
            Ok(!updates.is_empty())
        }
        Commands::SetCap { cap } => {
            let cap = match cap.as_str() {
                "none" => None,
                s => Some(parse_amount(s).context("Invalid cap")?),
            };
            minter.update_supply_cap(caller, cap)?;
            match cap {
                Some(c) => println!("Supply cap: {c}"),
                None => println!("Supply cap removed"),
            }
            Ok(true)
        }
        Commands::SetAdmin { new_admin } => {
            minter.update_admin(caller, new_admin)?;
            println!("Admin: {new_admin}");
            Ok(true)
        }
        Commands::Status => {
            print_status(minter)?;
            Ok(false)
        }
        Commands::Balance { account } => {
            let balance = minter.ledger().balance_of(&account);
            println!("{balance} ({} tokens)", format_tokens(balance));
            Ok(false)
        }
    }
}

fn print_pool(index: usize, pool: &Pool) {
    print!("[{index}] {} receiver={} rate={}", pool.id, pool.receiver, pool.amount_per_block);
    match pool.decay {
        Some(d) => println!(
            " decay={}bp/{} blocks (timer at {})",
            d.percent_bp, d.period_blocks, d.last_update_block
        ),
        None => println!(),
    }
}

fn print_status(minter: &CliMinter) -> Result<()> {
    let supply = minter.ledger().total_supply();
    println!("Block: {}", minter.clock().current_block());
    println!("Admin: {}", minter.admin());
    println!("Minter account: {}", minter.minter_account());
    println!("Start block: {}", minter.start_block());
    println!("Last mint block: {}", minter.last_mint_block());
    println!("Pools: {}", minter.pool_length());
    println!("Total supply: {supply} ({} tokens)", format_tokens(supply));
    println!("Minted by engine: {}", minter.total_minted());
    match (minter.supply_cap(), minter.remaining_supply()) {
        (Some(cap), Some(left)) => println!("Supply cap: {cap} (remaining {left})"),
        _ => println!("Supply cap: none"),
    }
    println!("Pending emission: {}", minter.pending_emission()?);
    Ok(())
}

fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
