// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE WIRING ===
pub mod config;
pub mod module;
pub use module::{Devcamper, Ports};

// === INTERNAL MODULES ===
// Exposed for tests and the seeding CLI. Other crates should only rely on
// `contract`, `config` and `Devcamper`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
