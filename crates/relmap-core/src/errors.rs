use relmap_core_types::RequestId;
use thiserror::Error;

/// Result type alias using RelmapError
pub type Result<T> = std::result::Result<T, RelmapError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on
/// programmatically without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Identity
    IdentifierMissing,

    // Mapping
    InvalidMapping,
    UnexpectedValue,

    // Load integrity
    MultipleChildren,
    NotFound,

    // Storage
    ConstraintViolation,
    Persistence,
    ChecksumMismatch,

    // Integration/IO
    Io,
    Config,
    Concurrency,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::IdentifierMissing => "ERR_IDENTIFIER_MISSING",
            ExErrorKind::InvalidMapping => "ERR_INVALID_MAPPING",
            ExErrorKind::UnexpectedValue => "ERR_UNEXPECTED_VALUE",
            ExErrorKind::MultipleChildren => "ERR_MULTIPLE_CHILDREN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::ChecksumMismatch => "ERR_CHECKSUM_MISMATCH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
        }
    }

    /// True for the storage failures callers see as "the database refused"
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            ExErrorKind::ConstraintViolation | ExErrorKind::Persistence
        )
    }
}

/// Canonical structured error type
///
/// Carries a classification plus optional context (operation, entity,
/// table, request) for debugging. This is the error every public store
/// operation returns.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    entity_id: Option<String>,
    table: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            entity_id: None,
            table: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity type context
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity type context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by the storage-neutral core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelmapError {
    /// A client-generated identifier was required but absent at save time
    #[error("Identifier missing for {entity}: client-generated id must be set before save")]
    IdentifierMissing { entity: String },

    /// More than one child row references the same root (1:0..1 violated)
    #[error("Found {count} {child} rows for {root} {root_id}, expected at most one")]
    MultipleChildren {
        root: String,
        root_id: String,
        child: String,
        count: usize,
    },

    /// Entity descriptor or relation is structurally invalid
    #[error("Invalid mapping for {entity}: {reason}")]
    InvalidMapping { entity: String, reason: String },

    /// A column value could not be converted to the declared kind
    #[error("Unexpected value in {entity}.{column}: expected {expected}, found {found}")]
    UnexpectedValue {
        entity: String,
        column: String,
        expected: String,
        found: String,
    },
}

impl From<RelmapError> for ExError {
    fn from(err: RelmapError) -> Self {
        let message = err.to_string();
        match err {
            RelmapError::IdentifierMissing { entity } => {
                ExError::new(ExErrorKind::IdentifierMissing)
                    .with_entity(entity)
                    .with_message(message)
            }
            RelmapError::MultipleChildren { root, root_id, .. } => {
                ExError::new(ExErrorKind::MultipleChildren)
                    .with_entity(root)
                    .with_entity_id(root_id)
                    .with_message(message)
            }
            RelmapError::InvalidMapping { entity, .. } => ExError::new(ExErrorKind::InvalidMapping)
                .with_entity(entity)
                .with_message(message),
            RelmapError::UnexpectedValue { entity, .. } => {
                ExError::new(ExErrorKind::UnexpectedValue)
                    .with_entity(entity)
                    .with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kinds() {
        assert!(ExErrorKind::Persistence.is_storage());
        assert!(ExErrorKind::ConstraintViolation.is_storage());
        assert!(!ExErrorKind::IdentifierMissing.is_storage());
        assert!(!ExErrorKind::MultipleChildren.is_storage());
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("save")
            .with_entity_id("abc")
            .with_message("update affected no rows");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("in operation 'save'"));
        assert!(rendered.contains("(entity_id: abc)"));
    }
}
