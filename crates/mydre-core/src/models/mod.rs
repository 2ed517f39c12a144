//! Data models for `.mydre` configuration bundles.

mod status;
mod workspace;

pub use status::*;
pub use workspace::*;
