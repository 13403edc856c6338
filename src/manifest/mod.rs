//! Model manifest module
//!
//! Provides decoding and read-only access to the profile manifest
//! published by a NIM container:
//! - Profile records and their workspace layout
//! - Normalization of heterogeneous workspace file lists
//! - Zero-value lookups by profile id

mod model;
mod parser;
mod store;

pub use model::*;
pub use parser::*;
pub use store::*;
