//! Aggregate mapper
//!
//! Turns the static descriptors of an aggregate root, its owned child and
//! the linking relation into a `PersistencePlan`: validated table shapes
//! plus every SQL statement the engine runs. Plans are built once per
//! aggregate type and cached for the life of the process.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};

use crate::errors::{RelmapError, Result};
use crate::model::{
    AggregateRoot, ColumnDescriptor, ColumnKind, Entity, EntityDescriptor, IdGeneration,
    InsertPolicy, OwnedRelation, Record, Value,
};

/// Validated shape of one mapped table
#[derive(Debug, Clone, PartialEq)]
pub struct TablePlan {
    pub entity: &'static str,
    pub table: &'static str,
    pub id_column: &'static str,
    pub id_kind: ColumnKind,
    pub id_generation: IdGeneration,
    pub insert_policy: InsertPolicy,
    pub columns: Vec<ColumnDescriptor>,
}

impl TablePlan {
    fn from_descriptor(descriptor: &EntityDescriptor) -> Self {
        Self {
            entity: descriptor.name,
            table: descriptor.table,
            id_column: descriptor.id.name,
            id_kind: descriptor.id.kind,
            id_generation: descriptor.id.generation,
            insert_policy: descriptor.insert_policy,
            columns: descriptor.columns.to_vec(),
        }
    }

    /// Column values in plan order, checked against the declared kinds
    ///
    /// # Errors
    ///
    /// `InvalidMapping` when the record lacks a mapped column,
    /// `UnexpectedValue` when a value has the wrong kind or is null in a
    /// non-nullable column.
    pub fn ordered_values(&self, record: &Record) -> Result<Vec<Value>> {
        self.columns
            .iter()
            .map(|column| {
                let value = record.get(column.name).ok_or_else(|| RelmapError::InvalidMapping {
                    entity: self.entity.to_string(),
                    reason: format!("record has no value for column '{}'", column.name),
                })?;
                self.check_kind(column.name, column.kind, column.nullable, value)?;
                Ok(value.clone())
            })
            .collect()
    }

    /// Verify an identifier value matches the declared id kind
    ///
    /// # Errors
    ///
    /// `UnexpectedValue` on a null or mistyped id.
    pub fn check_id(&self, id: &Value) -> Result<()> {
        self.check_kind(self.id_column, self.id_kind, false, id)
    }

    fn check_kind(
        &self,
        column: &str,
        kind: ColumnKind,
        nullable: bool,
        value: &Value,
    ) -> Result<()> {
        let ok = match value.kind() {
            None => nullable,
            Some(found) => {
                found == kind || (kind == ColumnKind::Real && found == ColumnKind::Integer)
            }
        };
        if ok {
            Ok(())
        } else {
            Err(RelmapError::UnexpectedValue {
                entity: self.entity.to_string(),
                column: column.to_string(),
                expected: kind.name().to_string(),
                found: value.kind_name().to_string(),
            })
        }
    }

    fn column_list(&self) -> Vec<String> {
        self.columns.iter().map(|c| quote(c.name)).collect()
    }
}

/// Rendered SQL for every engine operation
///
/// Placeholders are positional (`?1`, `?2`, ...). Parameter order:
/// root inserts take the id first, root updates take it last, child
/// inserts take the foreign key first, then the id (when supplied), then
/// the scalar columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statements {
    pub insert_root_with_id: String,
    pub insert_root_generated: String,
    pub update_root: String,
    pub select_root: String,
    pub select_all_roots: String,
    pub exists_root: String,
    pub count_roots: String,
    pub delete_root: String,
    pub insert_child_with_id: String,
    pub insert_child_generated: String,
    pub select_children: String,
    pub delete_children: String,
}

/// Everything the engine needs to persist one aggregate type
#[derive(Debug, Clone, PartialEq)]
pub struct PersistencePlan {
    pub root: TablePlan,
    pub child: TablePlan,
    pub fk_column: &'static str,
    pub statements: Statements,
}

/// Build (and validate) a plan from raw descriptors
///
/// # Errors
///
/// `RelmapError::InvalidMapping` describing the first structural problem.
pub fn build_plan(
    root: &EntityDescriptor,
    child: &EntityDescriptor,
    relation: &OwnedRelation,
) -> Result<PersistencePlan> {
    validate_entity(root)?;
    validate_entity(child)?;
    validate_relation(root, child, relation)?;

    let root = TablePlan::from_descriptor(root);
    let child = TablePlan::from_descriptor(child);
    let statements = render_statements(&root, &child, relation.fk_column);

    Ok(PersistencePlan {
        root,
        child,
        fk_column: relation.fk_column,
        statements,
    })
}

static PLAN_CACHE: OnceLock<RwLock<HashMap<TypeId, Arc<PersistencePlan>>>> = OnceLock::new();

/// Cached plan for aggregate type `A`
///
/// The first call for a type builds the plan; later calls return the same
/// `Arc`. Invalid mappings are not cached and fail on every call.
///
/// # Errors
///
/// `RelmapError::InvalidMapping` if the descriptors do not validate.
pub fn plan<A: AggregateRoot>() -> Result<Arc<PersistencePlan>> {
    let key = TypeId::of::<A>();
    let cache = PLAN_CACHE.get_or_init(Default::default);

    if let Some(plan) = cache.read().ok().and_then(|plans| plans.get(&key).cloned()) {
        return Ok(plan);
    }

    let built = Arc::new(build_plan(
        A::descriptor(),
        <A::Child as Entity>::descriptor(),
        A::relation(),
    )?);

    tracing::debug!(
        aggregate = built.root.entity,
        root_table = built.root.table,
        child_table = built.child.table,
        "Built persistence plan"
    );

    match cache.write() {
        Ok(mut plans) => Ok(plans.entry(key).or_insert(built).clone()),
        Err(_) => Ok(built),
    }
}

fn validate_entity(descriptor: &EntityDescriptor) -> Result<()> {
    let invalid = |reason: String| RelmapError::InvalidMapping {
        entity: descriptor.name.to_string(),
        reason,
    };

    if descriptor.table.trim().is_empty() {
        return Err(invalid("table name is empty".to_string()));
    }
    if descriptor.id.name.trim().is_empty() {
        return Err(invalid("id column name is empty".to_string()));
    }

    let mut seen = HashSet::new();
    for column in descriptor.columns {
        if column.name.trim().is_empty() {
            return Err(invalid("column name is empty".to_string()));
        }
        if column.name == descriptor.id.name {
            return Err(invalid(format!(
                "id column '{}' is also listed as a scalar column",
                column.name
            )));
        }
        if !seen.insert(column.name) {
            return Err(invalid(format!("duplicate column '{}'", column.name)));
        }
    }

    Ok(())
}

fn validate_relation(
    root: &EntityDescriptor,
    child: &EntityDescriptor,
    relation: &OwnedRelation,
) -> Result<()> {
    let invalid = |reason: String| RelmapError::InvalidMapping {
        entity: root.name.to_string(),
        reason,
    };

    if root.table == child.table {
        return Err(invalid(format!(
            "root and child share table '{}'",
            root.table
        )));
    }
    if relation.fk_column.trim().is_empty() {
        return Err(invalid("foreign-key column name is empty".to_string()));
    }
    if relation.fk_column == child.id.name
        || child.columns.iter().any(|c| c.name == relation.fk_column)
    {
        return Err(invalid(format!(
            "foreign-key column '{}' collides with a column of {}",
            relation.fk_column, child.name
        )));
    }

    Ok(())
}

fn render_statements(root: &TablePlan, child: &TablePlan, fk_column: &str) -> Statements {
    let root_table = quote(root.table);
    let root_id = quote(root.id_column);
    let root_cols = root.column_list();

    let child_table = quote(child.table);
    let child_id = quote(child.id_column);
    let child_cols = child.column_list();
    let fk = quote(fk_column);

    let root_select_cols = std::iter::once(root_id.clone())
        .chain(root_cols.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ");

    let insert_root_with_id = insert_sql(
        &root_table,
        &std::iter::once(root_id.clone())
            .chain(root_cols.iter().cloned())
            .collect::<Vec<_>>(),
        None,
    );
    let insert_root_generated = insert_sql(&root_table, &root_cols, Some(&root_id));

    let update_root = if root_cols.is_empty() {
        format!(
            "UPDATE {} SET {} = {} WHERE {} = ?1",
            root_table, root_id, root_id, root_id
        )
    } else {
        let assignments = root_cols
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = ?{}", c, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {} WHERE {} = ?{}",
            root_table,
            assignments,
            root_id,
            root_cols.len() + 1
        )
    };

    let child_with_id_cols = [fk.clone(), child_id.clone()]
        .into_iter()
        .chain(child_cols.iter().cloned())
        .collect::<Vec<_>>();
    let child_generated_cols = std::iter::once(fk.clone())
        .chain(child_cols.iter().cloned())
        .collect::<Vec<_>>();
    let child_select_cols = std::iter::once(child_id.clone())
        .chain(child_cols.iter().cloned())
        .collect::<Vec<_>>()
        .join(", ");

    Statements {
        insert_root_with_id,
        insert_root_generated,
        update_root,
        select_root: format!(
            "SELECT {} FROM {} WHERE {} = ?1",
            root_select_cols, root_table, root_id
        ),
        select_all_roots: format!(
            "SELECT {} FROM {} ORDER BY {}",
            root_select_cols, root_table, root_id
        ),
        exists_root: format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
            root_table, root_id
        ),
        count_roots: format!("SELECT COUNT(*) FROM {}", root_table),
        delete_root: format!("DELETE FROM {} WHERE {} = ?1", root_table, root_id),
        insert_child_with_id: insert_sql(&child_table, &child_with_id_cols, Some(&child_id)),
        insert_child_generated: insert_sql(&child_table, &child_generated_cols, Some(&child_id)),
        select_children: format!(
            "SELECT {} FROM {} WHERE {} = ?1 ORDER BY {}",
            child_select_cols, child_table, fk, child_id
        ),
        delete_children: format!("DELETE FROM {} WHERE {} = ?1", child_table, fk),
    }
}

fn insert_sql(table: &str, columns: &[String], returning: Option<&str>) -> String {
    let mut sql = if columns.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", table)
    } else {
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        )
    };
    if let Some(column) = returning {
        sql.push_str(" RETURNING ");
        sql.push_str(column);
    }
    sql
}

/// Quote an SQL identifier
pub fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}
