//! CREATE TABLE statements rendered from a persistence plan
//!
//! The child table gets the foreign-key column (typed like the root id)
//! with `ON DELETE CASCADE` and a plain, non-unique index. At most one
//! child per root is enforced on load, not by the schema.

use relmap_core::errors::{RelmapError, Result};
use relmap_core::mapper::quote;
use relmap_core::{ColumnKind, IdGeneration, PersistencePlan, TablePlan};

fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Integer | ColumnKind::Bool => "INTEGER",
        ColumnKind::Real => "REAL",
        ColumnKind::Text | ColumnKind::Uuid => "TEXT",
    }
}

fn id_definition(table: &TablePlan) -> Result<String> {
    let id = quote(table.id_column);
    match (table.id_generation, table.id_kind) {
        (IdGeneration::Store, ColumnKind::Integer) => {
            Ok(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", id))
        }
        (IdGeneration::Store, other) => Err(RelmapError::InvalidMapping {
            entity: table.entity.to_string(),
            reason: format!(
                "store-generated ids must be integer, '{}' is {}",
                table.id_column,
                other.name()
            ),
        }),
        (IdGeneration::Client, kind) => {
            Ok(format!("{} {} PRIMARY KEY NOT NULL", id, sql_type(kind)))
        }
    }
}

fn column_definitions(table: &TablePlan) -> Vec<String> {
    table
        .columns
        .iter()
        .map(|c| {
            let null = if c.nullable { "" } else { " NOT NULL" };
            format!("{} {}{}", quote(c.name), sql_type(c.kind), null)
        })
        .collect()
}

/// Render the DDL for both tables of an aggregate
///
/// # Errors
///
/// `RelmapError::InvalidMapping` for id shapes SQLite cannot generate.
pub fn create_tables_sql(plan: &PersistencePlan) -> Result<String> {
    let root = &plan.root;
    let child = &plan.child;

    let mut root_defs = vec![id_definition(root)?];
    root_defs.extend(column_definitions(root));

    let mut child_defs = vec![
        id_definition(child)?,
        format!(
            "{} {} NOT NULL REFERENCES {} ({}) ON DELETE CASCADE",
            quote(plan.fk_column),
            sql_type(root.id_kind),
            quote(root.table),
            quote(root.id_column)
        ),
    ];
    child_defs.extend(column_definitions(child));

    let index_name = format!("{}_{}_idx", child.table, plan.fk_column);

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n\
         CREATE TABLE IF NOT EXISTS {} (\n    {}\n);\n\
         CREATE INDEX IF NOT EXISTS {} ON {} ({});\n",
        quote(root.table),
        root_defs.join(",\n    "),
        quote(child.table),
        child_defs.join(",\n    "),
        quote(&index_name),
        quote(child.table),
        quote(plan.fk_column),
    ))
}
