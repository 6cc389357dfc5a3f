//! Database connection management
//!
//! Provides utilities for opening SQLite connections and the `Database`
//! handle the repository borrows one connection from per operation.

use crate::config::StoreConfig;
use crate::errors::{from_rusqlite, io_error, lock_poisoned, Result};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Apply connection settings from the config
pub fn configure(conn: &Connection, config: &StoreConfig) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", config.foreign_keys)
        .map_err(from_rusqlite)?;

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(from_rusqlite)?;

    if !config.is_memory() {
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", &config.journal_mode, |row| row.get(0))
            .map_err(from_rusqlite)?;
        tracing::debug!(journal_mode = %mode, "Configured journal mode");
    }

    Ok(())
}

/// Source of connections for repository operations
///
/// `Shared` serializes every operation on one connection (required for
/// in-memory databases, which vanish with their connection). `File` opens
/// and configures a fresh connection per lease.
#[derive(Debug)]
pub enum Database {
    Shared(Mutex<Connection>),
    File { path: PathBuf, config: StoreConfig },
}

impl Database {
    /// Open according to the config, creating parent directories for files
    pub fn open(config: &StoreConfig) -> Result<Self> {
        config.validate()?;
        match &config.path {
            None => {
                let conn = open_in_memory()?;
                configure(&conn, config)?;
                Ok(Database::Shared(Mutex::new(conn)))
            }
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
                }
                // Open once up front so a bad path fails here, not on first use
                let conn = open(path)?;
                configure(&conn, config)?;
                Ok(Database::File {
                    path: path.clone(),
                    config: config.clone(),
                })
            }
        }
    }

    /// Shared in-memory database with default settings
    pub fn in_memory() -> Result<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Wrap an already configured connection
    pub fn from_connection(conn: Connection) -> Self {
        Database::Shared(Mutex::new(conn))
    }

    /// Borrow a connection for the duration of one operation
    ///
    /// The lease releases the connection (unlock or close) when dropped.
    pub fn acquire(&self) -> Result<ConnectionLease<'_>> {
        match self {
            Database::Shared(conn) => conn
                .lock()
                .map(ConnectionLease::Shared)
                .map_err(|_| lock_poisoned()),
            Database::File { path, config } => {
                let conn = open(path)?;
                configure(&conn, config)?;
                Ok(ConnectionLease::Owned(conn))
            }
        }
    }
}

/// A connection held for one operation
pub enum ConnectionLease<'a> {
    Shared(MutexGuard<'a, Connection>),
    Owned(Connection),
}

impl Deref for ConnectionLease<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            ConnectionLease::Shared(guard) => &**guard,
            ConnectionLease::Owned(conn) => conn,
        }
    }
}

impl DerefMut for ConnectionLease<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        match self {
            ConnectionLease::Shared(guard) => &mut **guard,
            ConnectionLease::Owned(conn) => conn,
        }
    }
}
