use axum::Json;
use query_core::ResultEnvelope;
use serde::{Deserialize, Serialize};

/// Short aliases for JSON responses
pub type JsonBody<T> = Json<DataEnvelope<T>>;
pub type JsonList<T = query_core::Document> = Json<ResultEnvelope<T>>;

/// Single-resource body: `{ "success": true, "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

impl DataEnvelope<serde_json::Value> {
    /// `{ "success": true, "data": {} }`, returned by deletes.
    pub fn empty() -> Self {
        Self::new(serde_json::Value::Object(Default::default()))
    }
}
