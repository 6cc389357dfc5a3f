//! Delete command

use clap::Args;
use uuid::Uuid;

use super::StoreArgs;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Document id
    pub id: Uuid,
}

pub fn execute(store: &StoreArgs, args: DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = store.repository()?;

    if !repo.delete_by_id(args.id)? {
        return Err(format!("Document {} not found", args.id).into());
    }

    println!("Deleted document {}", args.id);
    Ok(())
}
