//! Configuration module for nimprofile
//!
//! Provides CLI arguments and assembly of match criteria from
//! model spec files and flags.

mod settings;

pub use settings::*;
