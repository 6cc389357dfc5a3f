//! Repository façade
//!
//! Typed entry point per aggregate type. Each call leases one connection
//! from the `Database`, delegates to `AggregateEngine` and emits the
//! canonical start/end/end_error log events.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::errors::Result;
use crate::repo::engine::AggregateEngine;
use relmap_core::{
    log_op_end, log_op_error, log_op_start, AggregateRoot, DefaultIdentifierStrategy,
    IdentifierStrategy, Value,
};
use relmap_core_types::RequestId;
use rusqlite::Connection;

pub struct Repository<A, S = DefaultIdentifierStrategy> {
    db: Arc<Database>,
    strategy: S,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: AggregateRoot> Repository<A> {
    /// Repository using the default identifier rules
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_strategy(db, DefaultIdentifierStrategy)
    }
}

impl<A: AggregateRoot, S: IdentifierStrategy> Repository<A, S> {
    pub fn with_strategy(db: Arc<Database>, strategy: S) -> Self {
        Self {
            db,
            strategy,
            _aggregate: PhantomData,
        }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Save the aggregate and return it with generated ids filled in
    ///
    /// # Errors
    ///
    /// See `AggregateEngine::save`. On error nothing is written.
    pub fn save(&self, mut aggregate: A) -> Result<A> {
        self.run("save", |conn| {
            let outcome = AggregateEngine::save(conn, &self.strategy, &mut aggregate)?;
            tracing::debug!(
                aggregate = A::descriptor().name,
                root_id = %outcome.root_id,
                child_id = ?outcome.child_id,
                root_inserted = outcome.root_inserted,
                "Saved aggregate"
            );
            Ok(())
        })?;
        Ok(aggregate)
    }

    /// # Errors
    ///
    /// `MultipleChildren` if the stored data violates the one-child rule.
    pub fn find_by_id(&self, id: impl Into<Value>) -> Result<Option<A>> {
        let id = id.into();
        self.run("find_by_id", |conn| AggregateEngine::find_by_id::<A>(conn, &id))
    }

    pub fn find_all(&self) -> Result<Vec<A>> {
        self.run("find_all", |conn| AggregateEngine::find_all::<A>(conn))
    }

    pub fn exists_by_id(&self, id: impl Into<Value>) -> Result<bool> {
        let id = id.into();
        self.run("exists_by_id", |conn| {
            AggregateEngine::exists_by_id::<A>(conn, &id)
        })
    }

    pub fn count(&self) -> Result<u64> {
        self.run("count", |conn| AggregateEngine::count::<A>(conn))
    }

    /// Delete the aggregate; `false` if it did not exist
    pub fn delete_by_id(&self, id: impl Into<Value>) -> Result<bool> {
        let id = id.into();
        self.run("delete_by_id", |conn| {
            AggregateEngine::delete_by_id::<A>(conn, &id)
        })
    }

    fn run<T>(&self, op: &'static str, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let request_id = RequestId::new();
        let aggregate = A::descriptor().name;
        let start = Instant::now();

        log_op_start!(op, aggregate = aggregate, request_id = %request_id);

        let result = self
            .db
            .acquire()
            .and_then(|mut lease| f(&mut *lease));
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(value) => {
                log_op_end!(
                    op,
                    duration_ms = duration_ms,
                    aggregate = aggregate,
                    request_id = %request_id
                );
                Ok(value)
            }
            Err(err) => {
                log_op_error!(
                    op,
                    err.clone(),
                    duration_ms = duration_ms,
                    aggregate = aggregate,
                    request_id = %request_id
                );
                let err = if err.op().is_none() { err.with_op(op) } else { err };
                Err(err.with_request_id(request_id))
            }
        }
    }
}
