//! infergov CLI
//!
//! Operator commands over a governed inference store

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "infergov")]
#[command(about = "infergov - governed inference artifacts and receipts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Re-verify every hash in a receipt's closure
    Replay(commands::replay::ReplayArgs),
    /// Registry inspection
    Registry(commands::registry::RegistryArgs),
    /// Print a stored artifact
    Show(commands::show::ShowArgs),
    /// Policy matrix operations
    Policy(commands::policy::PolicyArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay(args) => commands::replay::execute(args),
        Commands::Registry(args) => commands::registry::execute(args),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Policy(args) => commands::policy::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
