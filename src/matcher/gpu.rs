//! GPU compatibility between a profile and the requested/discovered hardware

use super::spec::GpuSpec;
use crate::manifest::tag_keys;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// PCI vendor suffix carried by `gpu_device` tags ("2330:10de")
pub const NVIDIA_VENDOR_SUFFIX: &str = ":10de";

fn tag<'a>(tags: &'a BTreeMap<String, String>, key: &str) -> &'a str {
    tags.get(key).map(String::as_str).unwrap_or_default()
}

/// Check whether a profile's hardware tags fit the GPUs at hand.
///
/// Explicitly requested GPUs are checked first against the `gpu` and `key`
/// tags. Once a product has matched, any descriptor carrying device ids must
/// list the profile's `gpu_device`, or the profile is rejected outright.
/// Without an explicit match, the discovered product labels are tried
/// against the `gpu` tag and then against `product_name_regex`.
pub fn is_gpu_compatible(
    gpus: &[GpuSpec],
    tags: &BTreeMap<String, String>,
    discovered_gpus: &[String],
) -> bool {
    let gpu_tag = tag(tags, tag_keys::GPU).to_lowercase();
    let key_tag = tag(tags, tag_keys::KEY).to_lowercase();
    let device = tag(tags, tag_keys::GPU_DEVICE);
    let device = device.strip_suffix(NVIDIA_VENDOR_SUFFIX).unwrap_or(device);

    let mut found = false;
    for gpu in gpus.iter().filter(|g| !g.product.is_empty()) {
        let product = gpu.product.to_lowercase();
        if gpu_tag.contains(&product) || key_tag.contains(&product) {
            found = true;
        }

        // `found` is sticky: later descriptors with ids are still checked.
        if found && !gpu.ids.is_empty() && !gpu.ids.iter().any(|id| id == device) {
            trace!(product = %gpu.product, device, "gpu device id mismatch");
            return false;
        }
    }

    if found {
        return true;
    }

    let pattern = tag(tags, tag_keys::PRODUCT_NAME_REGEX);
    discovered_gpus
        .iter()
        .filter(|label| !label.is_empty())
        .any(|label| label.to_lowercase().contains(&gpu_tag) || matches_regex(label, pattern))
}

/// Match a product label against a regex pattern.
///
/// Empty and invalid patterns never match.
pub fn matches_regex(product_label: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }

    match Regex::new(pattern) {
        Ok(regex) => regex.is_match(product_label),
        Err(e) => {
            debug!(pattern, error = %e, "ignoring invalid product_name_regex");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_product_matches_gpu_tag_case_insensitively() {
        let tags = tags(&[("gpu", "H100")]);
        assert!(is_gpu_compatible(&[GpuSpec::new("h100")], &tags, &[]));
        assert!(!is_gpu_compatible(&[GpuSpec::new("a100")], &tags, &[]));
    }

    #[test]
    fn test_product_matches_key_tag() {
        let tags = tags(&[("gpu", "H100"), ("key", "H100_NVL")]);
        assert!(is_gpu_compatible(&[GpuSpec::new("nvl")], &tags, &[]));
    }

    #[test]
    fn test_empty_product_is_skipped() {
        let tags = tags(&[("gpu", "H100")]);
        assert!(!is_gpu_compatible(&[GpuSpec::new("")], &tags, &[]));
    }

    #[test]
    fn test_device_id_match_strips_vendor_suffix() {
        let tags = tags(&[("gpu", "H100"), ("gpu_device", "2330:10de")]);
        let gpu = GpuSpec::new("H100").with_id("1234").with_id("2330");
        assert!(is_gpu_compatible(&[gpu], &tags, &[]));
    }

    #[test]
    fn test_device_id_mismatch_is_hard_reject() {
        let tags = tags(&[("gpu", "H100"), ("gpu_device", "2330:10de")]);
        let gpu = GpuSpec::new("H100").with_id("2331");

        // Discovered labels would otherwise match
        assert!(!is_gpu_compatible(&[gpu], &tags, &labels(&["NVIDIA H100 80GB HBM3"])));
    }

    #[test]
    fn test_suffix_only_stripped_from_tag() {
        let tags = tags(&[("gpu", "H100"), ("gpu_device", "2330:10de")]);
        let gpu = GpuSpec::new("H100").with_id("2330:10de");
        assert!(!is_gpu_compatible(&[gpu], &tags, &[]));
    }

    #[test]
    fn test_found_is_sticky_across_descriptors() {
        let tags = tags(&[("gpu", "H100"), ("gpu_device", "2330:10de")]);
        let gpus = [GpuSpec::new("H100"), GpuSpec::new("A100").with_id("20b2")];
        assert!(!is_gpu_compatible(&gpus, &tags, &[]));

        // Without ids on the second descriptor the earlier match stands
        let gpus = [GpuSpec::new("H100"), GpuSpec::new("A100")];
        assert!(is_gpu_compatible(&gpus, &tags, &[]));
    }

    #[test]
    fn test_unmatched_ids_ignored_before_product_match() {
        let tags = tags(&[("gpu", "H100"), ("gpu_device", "2330:10de")]);
        let gpus = [GpuSpec::new("A100").with_id("20b2"), GpuSpec::new("H100")];
        assert!(is_gpu_compatible(&gpus, &tags, &[]));
    }

    #[test]
    fn test_discovered_label_contains_gpu_tag() {
        let tags = tags(&[("gpu", "A100")]);
        assert!(is_gpu_compatible(&[], &tags, &labels(&["NVIDIA-A100-SXM4-80GB"])));
        assert!(!is_gpu_compatible(&[], &tags, &labels(&["NVIDIA-L40S"])));
    }

    #[test]
    fn test_explicit_miss_falls_back_to_discovered() {
        let tags = tags(&[("gpu", "A100")]);
        let gpus = [GpuSpec::new("H100")];
        assert!(is_gpu_compatible(&gpus, &tags, &labels(&["NVIDIA A100 80GB PCIe"])));
    }

    #[test]
    fn test_regex_fallback() {
        let tags = tags(&[("product_name_regex", "^NVIDIA A100.*")]);
        assert!(is_gpu_compatible(&[], &tags, &labels(&["", "NVIDIA A100 80GB"])));
    }

    #[test]
    fn test_empty_labels_are_skipped() {
        let tags = tags(&[("product_name_regex", ".*")]);
        assert!(!is_gpu_compatible(&[], &tags, &labels(&["", ""])));
        assert!(!is_gpu_compatible(&[], &tags, &[]));
    }

    #[test]
    fn test_empty_gpu_tag_matches_any_label() {
        let tags = tags(&[("precision", "fp16")]);
        assert!(is_gpu_compatible(&[], &tags, &labels(&["Tesla T4"])));
    }

    #[test]
    fn test_invalid_regex_never_matches() {
        assert!(!matches_regex("NVIDIA A100", "(unclosed"));
        assert!(!matches_regex("NVIDIA A100", ""));
        assert!(matches_regex("NVIDIA A100", "A1[0-9]{2}"));

        let tags = tags(&[("gpu", "H100"), ("product_name_regex", "[")]);
        assert!(!is_gpu_compatible(&[], &tags, &labels(&["NVIDIA A100"])));
    }
}
