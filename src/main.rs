//! SPV core CLI application
//!
//! A command-line interface for address conversion and chain navigation.

use clap::{Parser, Subcommand};
use spv_core::cli;
use spv_core::network::Network;
use spv_core::wallet::AddressType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spv-core")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Address codec and chain navigation for SPV clients", long_about = None)]
struct Cli {
    /// Network whose address parameters apply
    #[arg(short, long, default_value = "mainnet", global = true)]
    network: Network,

    /// JSON file with custom network parameters (overrides --network)
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an address into its key hash
    Decode {
        /// Address to decode
        address: String,
    },

    /// Encode a key hash as an address
    Encode {
        /// Key hash or witness program (hex)
        #[arg(long)]
        hash: String,

        /// Address type (p2pkh, p2sh, p2wpkh, p2wsh)
        #[arg(short = 't', long = "type", default_value = "p2pkh")]
        address_type: AddressType,
    },

    /// Derive an address from a public key
    Pubkey {
        /// SEC-encoded public key (hex)
        #[arg(short, long)]
        key: String,

        /// Address type (p2pkh, p2wpkh)
        #[arg(short = 't', long = "type", default_value = "p2pkh")]
        address_type: AddressType,
    },

    /// Show the block a number of heights below another
    Previous {
        /// Chain snapshot file (JSON)
        #[arg(long)]
        chain: PathBuf,

        /// Height of the starting block
        #[arg(long)]
        height: u32,

        /// Number of heights to step back
        #[arg(short, long, default_value = "1")]
        count: u32,
    },

    /// Show the blocks directly below another
    Window {
        /// Chain snapshot file (JSON)
        #[arg(long)]
        chain: PathBuf,

        /// Height of the starting block
        #[arg(long)]
        height: u32,

        /// Number of blocks in the window
        #[arg(short, long, default_value = "2016")]
        count: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { address } => {
            let params = cli::load_params(cli.network, cli.params.as_deref())?;
            cli::cmd_decode(params, &address)?;
        }

        Commands::Encode { hash, address_type } => {
            let params = cli::load_params(cli.network, cli.params.as_deref())?;
            cli::cmd_encode(params, &hash, address_type)?;
        }

        Commands::Pubkey { key, address_type } => {
            let params = cli::load_params(cli.network, cli.params.as_deref())?;
            cli::cmd_pubkey(params, &key, address_type)?;
        }

        Commands::Previous {
            chain,
            height,
            count,
        } => {
            cli::cmd_previous(&chain, height, count)?;
        }

        Commands::Window {
            chain,
            height,
            count,
        } => {
            cli::cmd_window(&chain, height, count)?;
        }
    }

    Ok(())
}
