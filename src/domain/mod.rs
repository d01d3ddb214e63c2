//! Domain layer for Thicket
//!
//! Core models of the tree-of-thought search, the ports the services depend
//! on, and the domain error type.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
