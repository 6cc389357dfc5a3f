//! Hydration layer - rebuilds aggregates from SQLite rows
//!
//! A root row is decoded first, then its child is looked up by foreign
//! key. More than one child row for a root is a data error, not a choice.

use crate::codec::{decode_row, read_raw, to_sql};
use crate::errors::{from_rusqlite, Result};
use relmap_core::errors::RelmapError;
use relmap_core::{AggregateRoot, Entity, PersistencePlan, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

/// Build an aggregate from a raw root row, loading its child
pub fn assemble<A: AggregateRoot>(
    conn: &Connection,
    plan: &PersistencePlan,
    raw_root: Vec<SqlValue>,
) -> Result<A> {
    let (root_id, record) = decode_row(&plan.root, raw_root)?;
    let child = load_child::<A>(conn, plan, &root_id)?;

    let mut aggregate = A::from_record(root_id, &record)?;
    aggregate.set_child(child);
    Ok(aggregate)
}

/// Load the owned child of the root identified by `root_id`, if any
///
/// # Errors
///
/// `ExErrorKind::MultipleChildren` if more than one child row references
/// the root.
pub fn load_child<A: AggregateRoot>(
    conn: &Connection,
    plan: &PersistencePlan,
    root_id: &Value,
) -> Result<Option<A::Child>> {
    let width = 1 + plan.child.columns.len();

    let mut stmt = conn
        .prepare(&plan.statements.select_children)
        .map_err(from_rusqlite)?;
    let mut rows = stmt
        .query_map([to_sql(root_id)], |row| read_raw(row, width))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    if rows.len() > 1 {
        return Err(RelmapError::MultipleChildren {
            root: plan.root.entity.to_string(),
            root_id: root_id.to_string(),
            child: plan.child.entity.to_string(),
            count: rows.len(),
        }
        .into());
    }

    match rows.pop() {
        None => Ok(None),
        Some(raw) => {
            let (child_id, record) = decode_row(&plan.child, raw)?;
            Ok(Some(<A::Child as Entity>::from_record(child_id, &record)?))
        }
    }
}
