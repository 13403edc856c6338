//! Profile selection
//!
//! Every profile is evaluated on its own against a fixed sequence of gates.
//! Matching never fails: a profile that trips a gate is left out and the
//! reason is logged at trace level.

use super::gpu::is_gpu_compatible;
use super::spec::{MatchResult, ModelSpec};
use crate::manifest::{tag_keys, Manifest, Profile};
use std::fmt;
use tracing::{debug, trace};

/// Substring identifying optimized (TensorRT) backends
pub const BACKEND_TYPE_TENSORRT: &str = "tensorrt";

/// Conventional suffix of LLM engine names ("tensorrt_llm", "vllm_llm")
const ENGINE_SUFFIX: &str = "_llm";

/// Gate that excluded a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `precision` tag differs from the request
    Precision,
    /// `tp` tag differs from the request
    TensorParallelism,
    /// `profile` tag differs from the request
    QosProfile,
    /// `feat_lora` tag does not fit the LoRA request
    Lora,
    /// Backend does not contain the requested engine
    Engine,
    /// GPU matching required, but the profile is not an optimized one
    NotOptimized,
    /// Profile hardware tags do not fit the GPUs
    Gpu,
}

impl Rejection {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Precision => "precision",
            Self::TensorParallelism => "tensor_parallelism",
            Self::QosProfile => "qos_profile",
            Self::Lora => "lora",
            Self::Engine => "engine",
            Self::NotOptimized => "not_optimized",
            Self::Gpu => "gpu",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for non-empty engine/backend names that contain "tensorrt" in any case
pub fn is_optimized_engine(engine: &str) -> bool {
    !engine.is_empty() && engine.to_lowercase().contains(BACKEND_TYPE_TENSORRT)
}

/// Backend of a profile: `llm_engine`, falling back to `backend`
pub fn resolve_backend(profile: &Profile) -> &str {
    match profile.tag(tag_keys::LLM_ENGINE) {
        "" => profile.tag(tag_keys::BACKEND),
        engine => engine,
    }
}

/// Run a single profile through every gate.
///
/// Returns the first gate that rejected it, or `None` when it matches.
pub fn check_profile(
    profile: &Profile,
    spec: &ModelSpec,
    discovered_gpus: &[String],
) -> Option<Rejection> {
    if spec
        .precision()
        .is_some_and(|p| profile.tag(tag_keys::PRECISION) != p)
    {
        return Some(Rejection::Precision);
    }
    if spec
        .tensor_parallelism()
        .is_some_and(|tp| profile.tag(tag_keys::TENSOR_PARALLELISM) != tp)
    {
        return Some(Rejection::TensorParallelism);
    }
    if spec
        .qos_profile()
        .is_some_and(|q| profile.tag(tag_keys::QOS_PROFILE) != q)
    {
        return Some(Rejection::QosProfile);
    }

    // Unset means "no LoRA"; an explicit request needs the exact flag.
    let feat_lora = profile.tag(tag_keys::FEAT_LORA);
    let lora_ok = match spec.lora {
        None => feat_lora != "true",
        Some(true) => feat_lora == "true",
        Some(false) => feat_lora == "false",
    };
    if !lora_ok {
        return Some(Rejection::Lora);
    }

    let backend = resolve_backend(profile);

    if let Some(engine) = spec.engine() {
        let engine = engine.strip_suffix(ENGINE_SUFFIX).unwrap_or(engine);
        if !backend.contains(engine) {
            return Some(Rejection::Engine);
        }
    }

    let optimized_backend = is_optimized_engine(backend);
    let gpu_gate = optimized_backend
        || spec.engine().is_some_and(is_optimized_engine)
        || !spec.gpus.is_empty();

    if gpu_gate {
        if !optimized_backend {
            return Some(Rejection::NotOptimized);
        }
        let has_gpu_info = !spec.gpus.is_empty() || !discovered_gpus.is_empty();
        if has_gpu_info && !is_gpu_compatible(&spec.gpus, &profile.tags, discovered_gpus) {
            return Some(Rejection::Gpu);
        }
    }

    None
}

/// Select every profile of `manifest` compatible with `spec` and the
/// discovered GPU product labels.
pub fn match_profiles(
    manifest: &Manifest,
    spec: &ModelSpec,
    discovered_gpus: &[String],
) -> MatchResult {
    let selected: MatchResult = manifest
        .iter()
        .filter_map(|(id, profile)| match check_profile(profile, spec, discovered_gpus) {
            None => Some(id.clone()),
            Some(reason) => {
                trace!(profile = %id, %reason, "profile rejected");
                None
            }
        })
        .collect();

    debug!(
        considered = manifest.len(),
        selected = selected.len(),
        discovered_gpus = discovered_gpus.len(),
        "matched manifest profiles"
    );
    selected
}
