//! Matching criteria supplied by the reconciler

use crate::error::{IoResultExt, NimProfileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Set of matching profile ids, sorted lexicographically
pub type MatchResult = BTreeSet<String>;

/// A GPU requested by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuSpec {
    /// Product name (e.g. "H100", "a100")
    pub product: String,
    /// PCI device ids (e.g. "2330")
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

impl GpuSpec {
    /// Create a GPU descriptor without device ids
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            ids: Vec::new(),
        }
    }

    /// Add a device id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }
}

/// Model selection criteria, mirroring the `model` block of a NIMCache spec
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelSpec {
    /// Precision (e.g. "fp16", "fp8", "bf16")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<String>,
    /// Tensor parallelism degree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tensor_parallelism: Option<String>,
    /// QoS profile ("latency" or "throughput")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos_profile: Option<String>,
    /// Backend engine (e.g. "tensorrt_llm", "vllm")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// LoRA requirement; unset means "no LoRA"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lora: Option<bool>,
    /// Explicitly requested GPUs
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<GpuSpec>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ModelSpec {
    /// Builder: set precision
    pub fn with_precision(mut self, precision: impl Into<String>) -> Self {
        self.precision = Some(precision.into());
        self
    }

    /// Builder: set tensor parallelism
    pub fn with_tensor_parallelism(mut self, tp: impl Into<String>) -> Self {
        self.tensor_parallelism = Some(tp.into());
        self
    }

    /// Builder: set QoS profile
    pub fn with_qos_profile(mut self, profile: impl Into<String>) -> Self {
        self.qos_profile = Some(profile.into());
        self
    }

    /// Builder: set engine
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    /// Builder: set LoRA requirement
    pub fn with_lora(mut self, lora: bool) -> Self {
        self.lora = Some(lora);
        self
    }

    /// Builder: add a requested GPU
    pub fn with_gpu(mut self, gpu: GpuSpec) -> Self {
        self.gpus.push(gpu);
        self
    }

    /// Requested precision, if non-empty
    pub fn precision(&self) -> Option<&str> {
        non_empty(&self.precision)
    }

    /// Requested tensor parallelism, if non-empty
    pub fn tensor_parallelism(&self) -> Option<&str> {
        non_empty(&self.tensor_parallelism)
    }

    /// Requested QoS profile, if non-empty
    pub fn qos_profile(&self) -> Option<&str> {
        non_empty(&self.qos_profile)
    }

    /// Requested engine, if non-empty
    pub fn engine(&self) -> Option<&str> {
        non_empty(&self.engine)
    }

    /// Load a model spec from a YAML or JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_path(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|e| {
            NimProfileError::spec(format!("{}: {}", path.display(), e))
        })
    }
}
