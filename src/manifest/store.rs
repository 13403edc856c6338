//! In-memory model manifest
//!
//! A `Manifest` is built once per reconciliation pass and never mutated, so
//! it can be shared across threads and matched against any number of specs.

use super::model::Profile;
use crate::matcher::{match_profiles, MatchResult, ModelSpec};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

static EMPTY_TAGS: BTreeMap<String, String> = BTreeMap::new();

/// Read-only view of a parsed manifest, as consumed by the reconciler
///
/// Lookups of unknown ids return empty values instead of failing.
pub trait ProfileManifest {
    /// All profile ids, in no particular order
    fn profile_ids(&self) -> Vec<String>;

    /// Model name of a profile
    fn profile_model(&self, profile_id: &str) -> &str;

    /// Tags of a profile
    fn profile_tags(&self, profile_id: &str) -> &BTreeMap<String, String>;

    /// Release of a profile
    fn profile_release(&self, profile_id: &str) -> &str;

    /// Ids of every profile compatible with `spec` and the discovered GPUs
    fn match_profiles(&self, spec: &ModelSpec, discovered_gpus: &[String]) -> MatchResult;
}

/// Model manifest: profile id -> profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    profiles: HashMap<String, Profile>,
}

impl Manifest {
    /// Build a manifest from already decoded profiles
    pub fn from_profiles(profiles: impl IntoIterator<Item = (String, Profile)>) -> Self {
        Self {
            profiles: profiles.into_iter().collect(),
        }
    }

    /// Get a profile by id
    pub fn profile(&self, profile_id: &str) -> Option<&Profile> {
        self.profiles.get(profile_id)
    }

    /// Container URL of a profile, empty when unknown
    pub fn container_url(&self, profile_id: &str) -> &str {
        self.profiles
            .get(profile_id)
            .map(|p| p.container_url.as_str())
            .unwrap_or_default()
    }

    /// Check if the manifest has a profile
    pub fn contains(&self, profile_id: &str) -> bool {
        self.profiles.contains_key(profile_id)
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// True when the manifest has no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over (id, profile) pairs in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Profile)> {
        self.profiles.iter()
    }

    /// Profile ids sorted lexicographically
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl ProfileManifest for Manifest {
    fn profile_ids(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    fn profile_model(&self, profile_id: &str) -> &str {
        self.profiles
            .get(profile_id)
            .map(|p| p.model.as_str())
            .unwrap_or_default()
    }

    fn profile_tags(&self, profile_id: &str) -> &BTreeMap<String, String> {
        self.profiles
            .get(profile_id)
            .map(|p| &p.tags)
            .unwrap_or(&EMPTY_TAGS)
    }

    fn profile_release(&self, profile_id: &str) -> &str {
        self.profiles
            .get(profile_id)
            .map(|p| p.release.as_str())
            .unwrap_or_default()
    }

    fn match_profiles(&self, spec: &ModelSpec, discovered_gpus: &[String]) -> MatchResult {
        match_profiles(self, spec, discovered_gpus)
    }
}
