//! Manifest decoding
//!
//! A malformed document is an error and no partial manifest is returned.
//! Malformed file entries inside a workspace are dropped while decoding
//! (see `model::Src`), never reported.

use super::model::Profile;
use super::store::Manifest;
use crate::error::{IoResultExt, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parser for NIM model manifests (`model_manifest.yaml`)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestParser;

impl ManifestParser {
    /// Parse a manifest from raw bytes (YAML or JSON)
    pub fn parse_bytes(data: &[u8]) -> Result<Manifest> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Manifest::default());
        }

        // A document holding only `~` decodes to nothing; treat it as empty.
        let profiles: Option<HashMap<String, Profile>> = serde_yaml::from_slice(data)?;
        let manifest = Manifest::from_profiles(profiles.unwrap_or_default());

        debug!(profiles = manifest.len(), "parsed model manifest");
        Ok(manifest)
    }

    /// Parse a manifest from a string
    pub fn parse_str(data: &str) -> Result<Manifest> {
        Self::parse_bytes(data.as_bytes())
    }

    /// Read and parse a manifest file
    pub fn parse_file(path: &Path) -> Result<Manifest> {
        let data = std::fs::read(path).with_path(path)?;
        debug!(path = %path.display(), bytes = data.len(), "read model manifest");
        Self::parse_bytes(&data)
    }
}

/// Parse a manifest from raw bytes
pub fn parse_manifest(data: &[u8]) -> Result<Manifest> {
    ManifestParser::parse_bytes(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NimProfileError;
    use crate::manifest::{File, ProfileManifest};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"
a1b2c3:
  model: meta/llama3-8b-instruct
  release: 1.0.0
  tags:
    feat_lora: 'false'
    gpu: H100
    gpu_device: 2330:10de
    llm_engine: tensorrt_llm
    pp: '1'
    precision: fp16
    profile: latency
    tp: '2'
  container_url: nvcr.io/nim/meta/llama3-8b-instruct:1.0.0
  workspace:
    components:
      - dst: trtllm_engine
        src:
          repo_id: ngc://nim/meta/llama3-8b-instruct:0.10.0+1.0.0-h100x2-fp16-lat
          files:
            - rank0.engine
            - rank1.engine:
                checksum: abc
            - config.json
d4e5f6:
  model: meta/llama3-8b-instruct
  release: 1.0.0
  tags:
    feat_lora: 'true'
    llm_engine: vllm
    precision: fp16
    tp: '1'
  container_url: nvcr.io/nim/meta/llama3-8b-instruct:1.0.0
  workspace:
    components:
      - dst: ''
        src:
          repo_id: ngc://nim/meta/llama3-8b-instruct:hf
          files: [model.safetensors]
"#;

    #[test]
    fn test_parse_round_trip_accessors() {
        let manifest = ManifestParser::parse_str(MANIFEST).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.profile_model("a1b2c3"), "meta/llama3-8b-instruct");
        assert_eq!(manifest.profile_release("a1b2c3"), "1.0.0");

        let tags = manifest.profile_tags("a1b2c3");
        assert_eq!(tags.len(), 8);
        assert_eq!(tags["gpu_device"], "2330:10de");
        assert_eq!(tags["llm_engine"], "tensorrt_llm");
        assert_eq!(tags["tp"], "2");

        assert_eq!(
            manifest.container_url("d4e5f6"),
            "nvcr.io/nim/meta/llama3-8b-instruct:1.0.0"
        );
        assert_eq!(manifest.profile_tags("d4e5f6")["feat_lora"], "true");
    }

    #[test]
    fn test_parse_workspace_files() {
        let manifest = ManifestParser::parse_str(MANIFEST).unwrap();
        let profile = manifest.profile("a1b2c3").unwrap();

        let component = &profile.workspace.components[0];
        assert_eq!(component.dst, "trtllm_engine");
        assert_eq!(
            component.src.files,
            vec![
                File::new("rank0.engine"),
                File::new("rank1.engine"),
                File::new("config.json"),
            ]
        );
    }

    #[test]
    fn test_parse_json_manifest() {
        let json = r#"{"id1": {"model": "m", "release": "r", "tags": {"gpu": "A100"}}}"#;
        let manifest = parse_manifest(json.as_bytes()).unwrap();
        assert_eq!(manifest.profile_tags("id1")["gpu"], "A100");
        assert_eq!(manifest.profile_release("id1"), "r");
    }

    #[test]
    fn test_parse_empty_document() {
        assert!(ManifestParser::parse_str("").unwrap().is_empty());
        assert!(ManifestParser::parse_str("  \n\t\n").unwrap().is_empty());
        assert!(ManifestParser::parse_str("~\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_document() {
        let err = ManifestParser::parse_str("id1: {model: [unterminated\n").unwrap_err();
        assert!(matches!(err, NimProfileError::Parse(_)));

        // Top-level must be a mapping of profiles
        let err = ManifestParser::parse_str("- id1\n- id2\n").unwrap_err();
        assert!(matches!(err, NimProfileError::Parse(_)));
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MANIFEST.as_bytes()).unwrap();

        let manifest = ManifestParser::parse_file(file.path()).unwrap();
        assert!(manifest.contains("d4e5f6"));
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("model_manifest.yaml");

        let err = ManifestParser::parse_file(&path).unwrap_err();
        assert_eq!(err.path(), Some(&path));
    }
}
