//! HTTP edge helpers shared by REST modules: RFC 9457 problems, JSON
//! response shapes and the list-query extractor.

pub mod params;
pub mod problem;
pub mod response;
pub mod store_error;

pub use params::AdvancedParams;
pub use problem::{
    internal_error, Problem, ProblemResponse, ValidationError, APPLICATION_PROBLEM_JSON,
};
pub use response::{DataEnvelope, JsonBody, JsonList};
pub use store_error::store_error_to_problem;
