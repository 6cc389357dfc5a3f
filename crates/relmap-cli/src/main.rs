//! relmap CLI
//!
//! Command-line front end over the repository, managing the demo
//! `Document` aggregate

use clap::{Parser, Subcommand};
use relmap_core::logging_facility::{self, Profile};

mod commands;
mod demo;

#[derive(Debug, Parser)]
#[command(name = "relmap")]
#[command(about = "relmap - one-to-one aggregate persistence", long_about = None)]
struct Cli {
    #[command(flatten)]
    store: commands::StoreArgs,

    /// Logging profile (dev, prod); logs go to stderr
    #[arg(long, global = true)]
    log: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create or upgrade the schema
    Migrate,
    /// Save a new document with an optional summary
    Save(commands::save::SaveArgs),
    /// Print a document as JSON
    Show(commands::show::ShowArgs),
    /// Print every document as a JSON array
    List,
    /// Delete a document and its summary
    Delete(commands::delete::DeleteArgs),
    /// Print the number of stored documents
    Count,
}

fn main() {
    let cli = Cli::parse();

    if let Some(profile) = cli.log {
        logging_facility::init(profile);
    }

    let result = match cli.command {
        Commands::Migrate => commands::migrate::execute(&cli.store),
        Commands::Save(args) => commands::save::execute(&cli.store, args),
        Commands::Show(args) => commands::show::execute(&cli.store, args),
        Commands::List => commands::show::execute_list(&cli.store),
        Commands::Delete(args) => commands::delete::execute(&cli.store, args),
        Commands::Count => commands::count::execute(&cli.store),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
