//! CLI commands

pub mod count;
pub mod delete;
pub mod migrate;
pub mod save;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use relmap_store::{Database, Repository, StoreConfig};

use crate::demo::Document;

/// Database used when neither flags, config nor environment name one
pub const DEFAULT_DB_PATH: &str = ".relmap/store.db";

/// Store selection shared by every command
#[derive(Debug, Args)]
pub struct StoreArgs {
    /// SQLite database file (overrides --config and RELMAP_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML store config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    /// Resolve the effective store config
    ///
    /// Precedence: `--db`, then the config file, then `RELMAP_DB_PATH`,
    /// then `DEFAULT_DB_PATH`.
    pub fn store_config(&self) -> relmap_store::Result<StoreConfig> {
        let mut config = match &self.config {
            Some(path) => StoreConfig::load(path)?,
            None => StoreConfig::from_env(),
        };
        if let Some(db) = &self.db {
            config.path = Some(db.clone());
        }
        if config.path.is_none() {
            config.path = Some(PathBuf::from(DEFAULT_DB_PATH));
        }
        Ok(config)
    }

    pub fn open_database(&self) -> relmap_store::Result<Arc<Database>> {
        let config = self.store_config()?;
        tracing::debug!(path = ?config.path, "Opening store");
        Ok(Arc::new(Database::open(&config)?))
    }

    pub fn repository(&self) -> relmap_store::Result<Repository<Document>> {
        Ok(Repository::new(self.open_database()?))
    }
}
