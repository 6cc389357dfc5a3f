//! Save command

use clap::Args;

use super::StoreArgs;
use crate::demo::Document;

#[derive(Debug, Args)]
pub struct SaveArgs {
    /// Document title
    #[arg(long)]
    pub title: String,

    /// Optional summary stored as the owned child
    #[arg(long)]
    pub summary: Option<String>,
}

pub fn execute(store: &StoreArgs, args: SaveArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = store.repository()?;
    let saved = repo.save(Document::new(args.title, args.summary))?;

    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}
