//! Schema migration command

use relmap_store::{apply_migrations, Migration};

use super::StoreArgs;
use crate::demo::{Document, SCHEMA_MIGRATION_ID};

pub fn execute(store: &StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let db = store.open_database()?;
    let migrations = [Migration::for_aggregate::<Document>(SCHEMA_MIGRATION_ID)?];

    let mut conn = db.acquire()?;
    let applied = apply_migrations(&mut conn, &migrations)?;

    println!("Applied {} migration(s)", applied);
    Ok(())
}
