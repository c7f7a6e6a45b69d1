use thiserror::Error;

/// Store failures. Everything except `Io`/`Serde` is caused by the caller's
/// input and is safe to show back to it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },

    #[error("unknown operator '{op}' on '{field}'")]
    UnknownOperator { field: String, op: String },

    #[error("Cast to {expected} failed for value \"{value}\" at path \"{field}\"")]
    Cast {
        field: String,
        value: String,
        expected: &'static str,
    },

    #[error("invalid projection: {0}")]
    InvalidProjection(String),

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("unknown relation '{relation}' on collection '{collection}'")]
    UnknownRelation { collection: String, relation: String },

    #[error("duplicate value for unique field '{field}'")]
    Duplicate { field: String },

    #[error("document must be a JSON object")]
    NotADocument,

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    pub fn invalid_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn cast(field: &str, value: &serde_json::Value, expected: &'static str) -> Self {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self::Cast {
            field: field.to_string(),
            value,
            expected,
        }
    }

    /// Errors caused by the query itself rather than the store.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidFilter { .. }
                | StoreError::UnknownOperator { .. }
                | StoreError::Cast { .. }
                | StoreError::InvalidProjection(_)
                | StoreError::UnknownRelation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
