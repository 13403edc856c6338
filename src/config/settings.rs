//! Command-line configuration for nimprofile
//!
//! Defines the CLI arguments and how match criteria are assembled from
//! a model spec file and command-line overrides.

use crate::error::Result;
use crate::matcher::{GpuSpec, ModelSpec};
use crate::output::OutputFormat;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// nimprofile - inspect NIM model manifests and select compatible profiles
#[derive(Parser, Debug, Clone)]
#[command(name = "nimprofile")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect NIM model manifests and select compatible profiles")]
#[command(long_about = r#"
nimprofile reads the model manifest shipped inside a NIM container and
selects the profiles that fit a model spec and the GPUs of a cluster.

Examples:
  nimprofile list model_manifest.yaml
  nimprofile show model_manifest.yaml 8af967d80ae8f30f4635a59b2140fdc2b38d3004e16e66c9667fa032e56497fd
  nimprofile match model_manifest.yaml --precision fp16 --tp 2 --gpu H100=2330
  nimprofile match model_manifest.yaml --spec model.yaml --discovered NVIDIA-A100-SXM4-80GB -o json
"#)]
pub struct CliArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "table", global = true)]
    pub output: OutputFormat,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Log filter directive used when RUST_LOG is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List all profiles of a manifest
    #[command(name = "list")]
    List {
        /// Manifest file path
        manifest: PathBuf,
    },

    /// Show one profile in detail
    #[command(name = "show")]
    Show {
        /// Manifest file path
        manifest: PathBuf,
        /// Profile id
        profile_id: String,
    },

    /// Select the profiles compatible with a model spec
    #[command(name = "match")]
    Match {
        /// Manifest file path
        manifest: PathBuf,

        /// Match criteria
        #[command(flatten)]
        criteria: MatchArgs,

        /// Print matching ids only, one per line
        #[arg(long)]
        ids_only: bool,
    },
}

/// Match criteria flags
#[derive(Args, Debug, Clone, Default)]
pub struct MatchArgs {
    /// Model spec file (YAML or JSON, NIMCache `model` field names)
    #[arg(long, value_name = "FILE")]
    pub spec: Option<PathBuf>,

    /// Precision (e.g. fp16, fp8, bf16)
    #[arg(long, value_name = "PRECISION")]
    pub precision: Option<String>,

    /// Tensor parallelism
    #[arg(long = "tp", value_name = "N")]
    pub tensor_parallelism: Option<String>,

    /// QoS profile (latency or throughput)
    #[arg(long, value_name = "PROFILE")]
    pub qos_profile: Option<String>,

    /// Engine (e.g. tensorrt_llm, vllm)
    #[arg(long, value_name = "ENGINE")]
    pub engine: Option<String>,

    /// Require (true) or exclude (false) LoRA profiles
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub lora: Option<bool>,

    /// Requested GPU, optionally with device ids (H100 or H100=2330,2331)
    #[arg(long = "gpu", value_name = "PRODUCT[=IDS]", value_parser = parse_gpu_spec)]
    pub gpus: Vec<GpuSpec>,

    /// GPU product label discovered in the cluster (repeatable)
    #[arg(long = "discovered", value_name = "LABEL")]
    pub discovered_gpus: Vec<String>,
}

impl MatchArgs {
    /// Build the model spec: file values first, then flag overrides.
    ///
    /// `--gpu` flags replace the GPU list of the file when given.
    pub fn model_spec(&self) -> Result<ModelSpec> {
        let mut spec = match &self.spec {
            Some(path) => ModelSpec::load(path)?,
            None => ModelSpec::default(),
        };

        if let Some(precision) = &self.precision {
            spec.precision = Some(precision.clone());
        }
        if let Some(tp) = &self.tensor_parallelism {
            spec.tensor_parallelism = Some(tp.clone());
        }
        if let Some(qos) = &self.qos_profile {
            spec.qos_profile = Some(qos.clone());
        }
        if let Some(engine) = &self.engine {
            spec.engine = Some(engine.clone());
        }
        if self.lora.is_some() {
            spec.lora = self.lora;
        }
        if !self.gpus.is_empty() {
            spec.gpus = self.gpus.clone();
        }

        Ok(spec)
    }
}

/// Parse a `--gpu` value: `PRODUCT` or `PRODUCT=ID[,ID...]`
pub fn parse_gpu_spec(value: &str) -> std::result::Result<GpuSpec, String> {
    let (product, ids) = match value.split_once('=') {
        Some((product, ids)) => (product, Some(ids)),
        None => (value, None),
    };

    let product = product.trim();
    if product.is_empty() {
        return Err(format!("Missing GPU product in '{}'", value));
    }

    let mut gpu = GpuSpec::new(product);
    for id in ids.into_iter().flat_map(|ids| ids.split(',')) {
        let id = id.trim();
        if !id.is_empty() {
            gpu = gpu.with_id(id);
        }
    }
    Ok(gpu)
}
