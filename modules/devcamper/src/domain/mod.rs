pub mod aggregate;
pub mod error;
pub mod ports;
pub mod repo;
pub mod service;
pub mod slug;
pub mod validation;
