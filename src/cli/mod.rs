use clap::{Parser, Subcommand};

pub mod claims;
pub mod clear;
pub mod config;
pub mod context;
pub mod history;
pub mod register;
pub mod retrieve;
pub mod verify;
pub mod verify_proof;
pub mod version;

#[derive(Parser)]
#[command(name = "storyproof")]
#[command(author = "StoryProof Project")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Register and verify tamper-evident file version checkpoints", long_about = None)]
pub struct Cli {
    /// Path to config file (default: ~/.local/share/storyproof/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register a file as the next version in an identity's history
    Register {
        /// File to register
        #[arg(long)]
        file: String,

        /// Creator identity (wallet address)
        #[arg(long)]
        identity: String,

        /// Version note
        #[arg(long, default_value = "")]
        note: String,

        /// MIME type recorded with the stored copy
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Show an identity's checkpoint history
    History {
        #[arg(long)]
        identity: String,

        /// List the most recent version first
        #[arg(long)]
        newest_first: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Check a file against a hash
    Verify {
        #[arg(long)]
        file: String,

        /// Expected SHA-256 hash (hex, any case)
        #[arg(long)]
        hash: String,
    },

    /// Re-verify the proof and ownership of a stored version
    VerifyProof {
        #[arg(long)]
        identity: String,

        /// Version number (1 = first registration)
        #[arg(long)]
        version: usize,
    },

    /// Write the stored copy of a registered file
    Retrieve {
        /// File hash
        #[arg(long)]
        hash: String,

        /// Output path
        #[arg(long)]
        output: String,
    },

    /// List an identity's ownership claims
    Claims {
        #[arg(long)]
        identity: String,
    },

    /// Delete an identity's local checkpoint history
    ClearHistory {
        #[arg(long)]
        identity: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.config;
    match cli.command {
        Commands::Register {
            file,
            identity,
            note,
            mime_type,
        } => register::execute(file, identity, note, mime_type, config).await,
        Commands::History {
            identity,
            newest_first,
            json,
        } => history::execute(identity, newest_first, json, config).await,
        Commands::Verify { file, hash } => verify::execute(file, hash),
        Commands::VerifyProof { identity, version } => {
            verify_proof::execute(identity, version, config).await
        }
        Commands::Retrieve { hash, output } => retrieve::execute(hash, output, config).await,
        Commands::Claims { identity } => claims::execute(identity, config).await,
        Commands::ClearHistory { identity, yes } => clear::execute(identity, yes, config).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}
