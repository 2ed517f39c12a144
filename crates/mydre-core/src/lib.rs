//! Core types for the myDRE workspace configuration client.
//!
//! Holds the data model for `.mydre` configuration bundles, the shared
//! error taxonomy, and the validation rules (PIN length, filename
//! derivation) every other crate builds on.

pub mod error;
pub mod models;
pub mod validation;

pub use error::AppError;
pub use models::*;
