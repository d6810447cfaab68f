//! CLI frontend for the Loreweaver lore engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "lw",
    about = "Loreweaver — rule-based lore injection for role-play agents",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one turn against a lore book and print the output buffers
    Run(commands::run::RunArgs),

    /// Load and compile a lore book, reporting counts and diagnostics
    Check {
        /// Path to the lore book JSON
        #[arg(short, long)]
        book: PathBuf,
    },

    /// List the compiled rules in a table
    List {
        /// Path to the lore book JSON
        #[arg(short, long)]
        book: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&args),
        Commands::Check { book } => commands::check::run(&book),
        Commands::List { book } => commands::list::run(&book),
    };

    if let Err(e) = result {
        eprintln!("{e:?}");
        process::exit(1);
    }
}
