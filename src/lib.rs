//! # nimprofile - NIM profile manifest matching
//!
//! A NIM container publishes a model manifest listing the precomputed
//! engine variants ("profiles") it ships, each tagged with precision,
//! parallelism, target GPU and backend. This crate parses that manifest and
//! selects the profiles compatible with a requested model spec and the GPUs
//! discovered in a cluster.
//!
//! ## Features
//!
//! - **Manifest parsing**: YAML or JSON, with normalization of the two
//!   workspace file-list encodings
//! - **Profile matching**: precision, tensor parallelism, QoS profile, LoRA,
//!   engine and GPU gates, evaluated per profile
//! - **GPU compatibility**: product names, PCI device ids and product-label
//!   regexes
//!
//! ## Quick Start
//!
//! ```no_run
//! use nimprofile::prelude::*;
//! use std::path::Path;
//!
//! let manifest = ManifestParser::parse_file(Path::new("model_manifest.yaml")).unwrap();
//!
//! let spec = ModelSpec::default()
//!     .with_precision("fp16")
//!     .with_tensor_parallelism("2")
//!     .with_gpu(GpuSpec::new("H100"));
//! let discovered = vec!["NVIDIA-H100-80GB-HBM3".to_string()];
//!
//! for id in manifest.match_profiles(&spec, &discovered) {
//!     println!("{} {}", id, manifest.profile_release(&id));
//! }
//! ```
//!
//! ## Sharing a manifest
//!
//! A parsed `Manifest` is immutable. Wrap it in an `Arc` to match from
//! several reconciliations at once; no locking is needed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod manifest;
pub mod matcher;
pub mod output;

// Re-export commonly used types
pub use error::{NimProfileError, Result};
pub use manifest::{parse_manifest, Manifest, ManifestParser, Profile, ProfileManifest};
pub use matcher::{is_gpu_compatible, match_profiles, GpuSpec, MatchResult, ModelSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use nimprofile::prelude::*;
    //! ```

    pub use crate::error::{NimProfileError, Result};
    pub use crate::manifest::{Manifest, ManifestParser, Profile, ProfileManifest};
    pub use crate::matcher::{match_profiles, GpuSpec, MatchResult, ModelSpec};
}
