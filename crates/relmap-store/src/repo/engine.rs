//! Persistence engine
//!
//! Writes and reads one aggregate (root plus optional owned child) using
//! the statements of its cached `PersistencePlan`. Every save runs in a
//! single transaction: root first, then child. Dropping the transaction
//! on an error path rolls everything back, and generated ids are written
//! onto the in-memory aggregate only after commit.

use std::iter;

use crate::codec::{from_sql, read_raw, to_sql};
use crate::errors::{from_rusqlite, Result};
use crate::repo::hydration;
use relmap_core::errors::{ExError, ExErrorKind};
use relmap_core::{
    plan, AggregateRoot, Entity, IdentifierDecision, IdentifierStrategy, PersistencePlan,
    TablePlan, Value,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Transaction};

/// Progress of a single save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Start,
    RootInserted,
    ChildInserted,
    Committed,
    Failed,
}

/// Identifiers written by a committed save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub root_id: Value,
    pub child_id: Option<Value>,
    /// `false` when the root row was updated in place
    pub root_inserted: bool,
}

struct PreparedChild {
    decision: IdentifierDecision,
    values: Vec<Value>,
}

/// Stateless engine; all per-type knowledge comes from the plan
pub struct AggregateEngine;

impl AggregateEngine {
    /// Persist an aggregate and its owned child atomically
    ///
    /// Identifier decisions and column values are resolved before the
    /// transaction opens, so mapping errors never touch the database.
    ///
    /// # Errors
    ///
    /// - `IdentifierMissing` when a client-generated id is absent
    /// - `UnexpectedValue` / `InvalidMapping` for values that do not fit the plan
    /// - `NotFound` when an update matches no root row
    /// - `ConstraintViolation` / `Persistence` for SQLite failures
    pub fn save<A, S>(conn: &mut Connection, strategy: &S, aggregate: &mut A) -> Result<SaveOutcome>
    where
        A: AggregateRoot,
        S: IdentifierStrategy + ?Sized,
    {
        let plan = plan::<A>()?;

        let root_decision =
            strategy.assign_or_validate(A::descriptor(), aggregate.id_value().as_ref())?;
        if let Some(id) = root_decision.known_id() {
            plan.root.check_id(id)?;
        }
        let root_values = plan.root.ordered_values(&aggregate.to_record())?;

        let child = match aggregate.child() {
            Some(child) => {
                let decision = strategy
                    .owned_decision(<A::Child as Entity>::descriptor(), child.id_value().as_ref())?;
                if let Some(id) = decision.known_id() {
                    plan.child.check_id(id)?;
                }
                let values = plan.child.ordered_values(&child.to_record())?;
                Some(PreparedChild { decision, values })
            }
            None => None,
        };

        let mut state = SaveState::Start;
        trace_state(&plan, state);

        let (root_id, child_id) = match write(
            conn,
            &plan,
            &root_decision,
            &root_values,
            child.as_ref(),
            &mut state,
        ) {
            Ok(ids) => ids,
            Err(err) => {
                tracing::debug!(
                    aggregate = plan.root.entity,
                    failed_after = ?state,
                    save_state = ?SaveState::Failed,
                    "Save rolled back"
                );
                return Err(err);
            }
        };

        if matches!(root_decision, IdentifierDecision::InsertGenerated) {
            aggregate.assign_id(root_id.clone())?;
        }
        if let (Some(id), Some(prepared)) = (&child_id, &child) {
            if matches!(prepared.decision, IdentifierDecision::InsertGenerated) {
                if let Some(child) = aggregate.child_mut() {
                    child.assign_id(id.clone())?;
                }
            }
        }

        Ok(SaveOutcome {
            root_id,
            child_id,
            root_inserted: root_decision.is_insert(),
        })
    }

    /// Load an aggregate by root id; `Ok(None)` when no root row exists
    ///
    /// Root and child are read inside one transaction so both rows come
    /// from the same committed state.
    ///
    /// # Errors
    ///
    /// `MultipleChildren` if the root has more than one child row,
    /// `UnexpectedValue` if `id` or a stored value has the wrong kind.
    pub fn find_by_id<A: AggregateRoot>(conn: &mut Connection, id: &Value) -> Result<Option<A>> {
        let plan = plan::<A>()?;
        plan.root.check_id(id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        let width = 1 + plan.root.columns.len();
        let raw = tx
            .query_row(&plan.statements.select_root, [to_sql(id)], |row| {
                read_raw(row, width)
            })
            .optional()
            .map_err(storage(plan.root.table))?;

        let aggregate = match raw {
            None => None,
            Some(raw) => Some(hydration::assemble::<A>(&tx, &plan, raw)?),
        };
        tx.commit().map_err(from_rusqlite)?;
        Ok(aggregate)
    }

    /// Every aggregate, ordered by root id, read from one snapshot
    pub fn find_all<A: AggregateRoot>(conn: &mut Connection) -> Result<Vec<A>> {
        let plan = plan::<A>()?;
        let width = 1 + plan.root.columns.len();

        let tx = conn.transaction().map_err(from_rusqlite)?;
        let rows = {
            let mut stmt = tx
                .prepare(&plan.statements.select_all_roots)
                .map_err(from_rusqlite)?;
            let rows = stmt
                .query_map([], |row| read_raw(row, width))
                .map_err(from_rusqlite)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(storage(plan.root.table))?;
            rows
        };

        let aggregates = rows
            .into_iter()
            .map(|raw| hydration::assemble::<A>(&tx, &plan, raw))
            .collect::<Result<Vec<A>>>()?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(aggregates)
    }

    pub fn exists_by_id<A: AggregateRoot>(conn: &Connection, id: &Value) -> Result<bool> {
        let plan = plan::<A>()?;
        plan.root.check_id(id)?;

        let exists: i64 = conn
            .query_row(&plan.statements.exists_root, [to_sql(id)], |row| row.get(0))
            .map_err(storage(plan.root.table))?;
        Ok(exists != 0)
    }

    pub fn count<A: AggregateRoot>(conn: &Connection) -> Result<u64> {
        let plan = plan::<A>()?;
        let count: i64 = conn
            .query_row(&plan.statements.count_roots, [], |row| row.get(0))
            .map_err(storage(plan.root.table))?;
        Ok(count.max(0) as u64)
    }

    /// Delete an aggregate, child rows first
    ///
    /// Returns whether a root row was removed.
    pub fn delete_by_id<A: AggregateRoot>(conn: &mut Connection, id: &Value) -> Result<bool> {
        let plan = plan::<A>()?;
        plan.root.check_id(id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        tx.execute(&plan.statements.delete_children, [to_sql(id)])
            .map_err(storage(plan.child.table))?;
        let removed = tx
            .execute(&plan.statements.delete_root, [to_sql(id)])
            .map_err(storage(plan.root.table))?;
        tx.commit().map_err(from_rusqlite)?;

        Ok(removed > 0)
    }
}

fn write(
    conn: &mut Connection,
    plan: &PersistencePlan,
    root_decision: &IdentifierDecision,
    root_values: &[Value],
    child: Option<&PreparedChild>,
    state: &mut SaveState,
) -> Result<(Value, Option<Value>)> {
    let tx = conn.transaction().map_err(from_rusqlite)?;

    let root_id = write_root(&tx, plan, root_decision, root_values)?;
    advance(plan, state, SaveState::RootInserted);

    let child_id = match child {
        Some(prepared) => {
            let id = insert_child(&tx, plan, &root_id, prepared)?;
            advance(plan, state, SaveState::ChildInserted);
            Some(id)
        }
        None => None,
    };

    tx.commit().map_err(from_rusqlite)?;
    advance(plan, state, SaveState::Committed);

    Ok((root_id, child_id))
}

fn write_root(
    tx: &Transaction<'_>,
    plan: &PersistencePlan,
    decision: &IdentifierDecision,
    values: &[Value],
) -> Result<Value> {
    let statements = &plan.statements;
    let table = plan.root.table;

    match decision {
        IdentifierDecision::InsertWithId(id) => {
            let params = iter::once(id).chain(values).map(to_sql);
            tx.execute(&statements.insert_root_with_id, params_from_iter(params))
                .map_err(storage(table))?;
            Ok(id.clone())
        }
        IdentifierDecision::InsertGenerated => {
            let raw: SqlValue = tx
                .query_row(
                    &statements.insert_root_generated,
                    params_from_iter(values.iter().map(to_sql)),
                    |row| row.get(0),
                )
                .map_err(storage(table))?;
            Ok(decode_id(&plan.root, raw)?)
        }
        IdentifierDecision::Update(id) => {
            let params = values.iter().chain(iter::once(id)).map(to_sql);
            let updated = tx
                .execute(&statements.update_root, params_from_iter(params))
                .map_err(storage(table))?;
            if updated == 0 {
                return Err(ExError::new(ExErrorKind::NotFound)
                    .with_op("save")
                    .with_entity(plan.root.entity)
                    .with_entity_id(id.to_string())
                    .with_table(table)
                    .with_message("update matched no row"));
            }
            // The owned child is replaced wholesale
            tx.execute(&statements.delete_children, [to_sql(id)])
                .map_err(storage(plan.child.table))?;
            Ok(id.clone())
        }
    }
}

fn insert_child(
    tx: &Transaction<'_>,
    plan: &PersistencePlan,
    root_id: &Value,
    prepared: &PreparedChild,
) -> Result<Value> {
    let statements = &plan.statements;
    let fk = iter::once(to_sql(root_id));
    let values = prepared.values.iter().map(to_sql);

    let (sql, params): (&str, Vec<SqlValue>) = match &prepared.decision {
        IdentifierDecision::InsertGenerated => {
            (statements.insert_child_generated.as_str(), fk.chain(values).collect())
        }
        IdentifierDecision::InsertWithId(id) | IdentifierDecision::Update(id) => (
            statements.insert_child_with_id.as_str(),
            fk.chain(iter::once(to_sql(id))).chain(values).collect(),
        ),
    };

    let raw: SqlValue = tx
        .query_row(sql, params_from_iter(params), |row| row.get(0))
        .map_err(storage(plan.child.table))?;
    Ok(decode_id(&plan.child, raw)?)
}

fn decode_id(table: &TablePlan, raw: SqlValue) -> relmap_core::Result<Value> {
    from_sql(table.entity, table.id_column, table.id_kind, raw)
}

fn advance(plan: &PersistencePlan, state: &mut SaveState, next: SaveState) {
    *state = next;
    trace_state(plan, next);
}

fn trace_state(plan: &PersistencePlan, state: SaveState) {
    tracing::debug!(aggregate = plan.root.entity, save_state = ?state, "Save state");
}

fn storage(table: &'static str) -> impl Fn(rusqlite::Error) -> ExError {
    move |err| from_rusqlite(err).with_table(table)
}
