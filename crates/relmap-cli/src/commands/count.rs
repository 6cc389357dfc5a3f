//! Count command

use super::StoreArgs;

pub fn execute(store: &StoreArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repo = store.repository()?;
    println!("{}", repo.count()?);
    Ok(())
}
