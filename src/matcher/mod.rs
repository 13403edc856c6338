//! Profile matching module
//!
//! Selects the manifest profiles compatible with a requested model spec:
//! - Scalar tag filters (precision, tensor parallelism, QoS profile)
//! - LoRA and backend/engine gates
//! - GPU compatibility against requested and discovered hardware

mod gpu;
mod profile;
mod spec;

pub use gpu::*;
pub use profile::*;
pub use spec::*;
