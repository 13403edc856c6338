//! Profile records as published in a NIM container's model manifest
//!
//! The wire format is a YAML (or JSON) mapping from profile id to a profile
//! record. Producers disagree on how workspace files are listed, so `Src` is
//! decoded through an untyped value and normalized by hand.

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Well-known tag keys read by the matcher
///
/// Tags are open-ended; these are only the keys this crate interprets.
pub mod tag_keys {
    /// Numeric precision of the engine (e.g. "fp16", "fp8")
    pub const PRECISION: &str = "precision";
    /// Tensor parallelism degree
    pub const TENSOR_PARALLELISM: &str = "tp";
    /// QoS profile ("latency" or "throughput")
    pub const QOS_PROFILE: &str = "profile";
    /// LoRA support flag ("true" / "false")
    pub const FEAT_LORA: &str = "feat_lora";
    /// Backend of LLM profiles
    pub const LLM_ENGINE: &str = "llm_engine";
    /// Backend of non-LLM profiles
    pub const BACKEND: &str = "backend";
    /// Target GPU product (e.g. "H100")
    pub const GPU: &str = "gpu";
    /// Alternate GPU key (e.g. "H100_80GB")
    pub const KEY: &str = "key";
    /// PCI device id of the target GPU, optionally with the ":10de" vendor suffix
    pub const GPU_DEVICE: &str = "gpu_device";
    /// Regex matched against discovered GPU product labels
    pub const PRODUCT_NAME_REGEX: &str = "product_name_regex";
}

/// A single model file fetched into the workspace
///
/// Serialized as a bare file name, the canonical form of a `files` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct File {
    /// File name relative to the source repository
    pub name: String,
}

impl File {
    /// Create a file record
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Source repository of a workspace component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Src {
    /// Repository identifier (e.g. "ngc://nim/meta/llama3-8b-instruct:hf")
    pub repo_id: String,
    /// Files pulled from the repository
    pub files: Vec<File>,
}

impl<'de> Deserialize<'de> for Src {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Mapping>::deserialize(deserializer)?.unwrap_or_default();

        let repo_id = raw
            .get("repo_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let files = match raw.get("files") {
            Some(Value::Sequence(entries)) => entries.iter().flat_map(file_entry).collect(),
            _ => Vec::new(),
        };

        Ok(Self { repo_id, files })
    }
}

/// Normalize one entry of a `files` list.
///
/// Entries are either a bare name or a mapping keyed by name whose values
/// carry per-file metadata we do not use. Anything else is dropped.
fn file_entry(entry: &Value) -> Vec<File> {
    match entry {
        Value::String(name) => vec![File::new(name.as_str())],
        Value::Mapping(map) => map.keys().filter_map(Value::as_str).map(File::new).collect(),
        _ => Vec::new(),
    }
}

/// Source/destination pair inside a profile workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Component {
    /// Destination directory inside the model store
    pub dst: String,
    /// Where the files come from
    pub src: Src,
}

/// Workspace layout of a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    /// Components making up the workspace
    pub components: Vec<Component>,
}

impl Workspace {
    /// All file names across components, in manifest order
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.components
            .iter()
            .flat_map(|c| c.src.files.iter().map(|f| f.name.as_str()))
    }
}

/// One precomputed model-engine variant shipped by a NIM container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Model name
    pub model: String,
    /// Release version
    pub release: String,
    /// Free-form hardware/software tags
    #[serde(deserialize_with = "deserialize_tags")]
    pub tags: BTreeMap<String, String>,
    /// Container image URL
    pub container_url: String,
    /// Files making up the profile
    pub workspace: Workspace,
}

impl Profile {
    /// Look up a tag, empty when absent
    pub fn tag(&self, key: &str) -> &str {
        self.tags.get(key).map(String::as_str).unwrap_or_default()
    }
}

/// Tags are strings on the wire, but producers emit unquoted scalars such as
/// `tp: 2` or `feat_lora: True`. Scalars are taken as written; null is empty.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?
        .unwrap_or_default();

    Ok(raw
        .into_iter()
        .map(|(key, value)| (key, value.unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_src_string_and_mapping_files_normalize_alike() {
        let src: Src = serde_yaml::from_str(
            r#"
repo_id: ngc://nim/meta/llama3-8b-instruct:0.10.0+a
files:
  - config.json
  - rank0.engine:
      sha256: deadbeef
      size: 1024
"#,
        )
        .unwrap();

        assert_eq!(src.repo_id, "ngc://nim/meta/llama3-8b-instruct:0.10.0+a");
        assert_eq!(
            src.files,
            vec![File::new("config.json"), File::new("rank0.engine")]
        );
    }

    #[test]
    fn test_src_drops_unknown_file_shapes() {
        let src: Src = serde_yaml::from_str(
            r#"
files:
  - 42
  - [a, b]
  - tokenizer.json
  - ~
"#,
        )
        .unwrap();

        assert_eq!(src.repo_id, "");
        assert_eq!(src.files, vec![File::new("tokenizer.json")]);
    }

    #[test]
    fn test_src_ignores_malformed_fields() {
        let src: Src = serde_yaml::from_str("repo_id: [1, 2]\nfiles: not-a-list\n").unwrap();
        assert_eq!(src, Src::default());
    }

    #[test]
    fn test_src_must_be_mapping() {
        assert!(serde_yaml::from_str::<Src>("- a\n- b\n").is_err());
    }

    #[test]
    fn test_profile_scalar_tags() {
        let profile: Profile = serde_yaml::from_str(
            r#"
model: meta/llama3-8b-instruct
tags:
  tp: 2
  feat_lora: true
  gpu: H100
  pp: ~
"#,
        )
        .unwrap();

        assert_eq!(profile.tag("tp"), "2");
        assert_eq!(profile.tag("feat_lora"), "true");
        assert_eq!(profile.tag("gpu"), "H100");
        assert_eq!(profile.tag("pp"), "");
        assert_eq!(profile.tag("missing"), "");
        assert_eq!(profile.release, "");
    }

    #[test]
    fn test_profile_tags_keep_source_text() {
        let profile: Profile = serde_yaml::from_str(
            r#"
release: 1.10
tags:
  feat_lora: True
  gpu_device: 0x2330
  key: 1e3
  tp: 01
  pp: 1.0
"#,
        )
        .unwrap();

        assert_eq!(profile.release, "1.10");
        assert_eq!(profile.tag("feat_lora"), "True");
        assert_eq!(profile.tag("gpu_device"), "0x2330");
        assert_eq!(profile.tag("key"), "1e3");
        assert_eq!(profile.tag("tp"), "01");
        assert_eq!(profile.tag("pp"), "1.0");
    }

    #[test]
    fn test_profile_rejects_nested_tag() {
        let result = serde_yaml::from_str::<Profile>("tags:\n  gpu:\n    name: H100\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_workspace_file_names() {
        let workspace: Workspace = serde_yaml::from_str(
            r#"
components:
  - dst: trtllm_engine
    src:
      repo_id: repo-a
      files: [rank0.engine, config.json]
  - dst: ""
    src:
      repo_id: repo-b
      files:
        - {tokenizer.model: {}}
"#,
        )
        .unwrap();

        let names: Vec<&str> = workspace.file_names().collect();
        assert_eq!(names, vec!["rank0.engine", "config.json", "tokenizer.model"]);
    }
}
