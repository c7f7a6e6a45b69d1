//! Query-string → document query translation types.
//!
//! Everything here is pure: parsing of the raw parameter map, operator rewrite,
//! projection/sort/window planning and the list envelope. Execution against a
//! store lives in `docstore`.

pub mod filter;
pub mod order;
pub mod page;
pub mod params;
pub mod projection;
pub mod query;

pub use filter::{rewrite_operators, CompareOp, Filter, OPERATOR_TOKENS};
pub use order::{SortDir, SortKey, SortSpec};
pub use page::{parse_int_prefix, PageLink, PageWindow, Pagination, ResultEnvelope};
pub use params::{ParamMap, ParamValue};
pub use projection::Projection;
pub use query::{AdvancedQuery, FindQuery, ParamNames, RelationSpec, TranslatorConfig};

/// A stored document: a JSON object keyed by field name.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Identity field every document carries.
pub const ID_FIELD: &str = "_id";

#[cfg(test)]
mod tests;
