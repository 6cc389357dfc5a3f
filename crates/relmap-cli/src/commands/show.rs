//! Show and list commands

use clap::Args;
use uuid::Uuid;

use super::StoreArgs;

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document id
    pub id: Uuid,
}

pub fn execute(store: &StoreArgs, args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = store.repository()?;
    let document = repo
        .find_by_id(args.id)?
        .ok_or_else(|| format!("Document {} not found", args.id))?;

    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}

pub fn execute_list(store: &StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = store.repository()?;
    let documents = repo.find_all()?;

    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}
