//! Output formatting for the nimprofile CLI

use crate::error::{NimProfileError, Result};
use crate::manifest::{tag_keys, Manifest, Profile};
use crate::matcher::resolve_backend;
use clap::ValueEnum;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde::{Deserialize, Serialize};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// One-line view of a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    /// Profile id
    pub id: String,
    /// Model name
    pub model: String,
    /// Release version
    pub release: String,
    /// `precision` tag
    pub precision: String,
    /// `tp` tag
    pub tp: String,
    /// `profile` (QoS) tag
    pub profile: String,
    /// `gpu` tag
    pub gpu: String,
    /// Resolved backend
    pub backend: String,
    /// `feat_lora` tag
    pub lora: String,
}

impl ProfileSummary {
    /// Summarize a profile
    pub fn new(id: &str, profile: &Profile) -> Self {
        Self {
            id: id.to_string(),
            model: profile.model.clone(),
            release: profile.release.clone(),
            precision: profile.tag(tag_keys::PRECISION).to_string(),
            tp: profile.tag(tag_keys::TENSOR_PARALLELISM).to_string(),
            profile: profile.tag(tag_keys::QOS_PROFILE).to_string(),
            gpu: profile.tag(tag_keys::GPU).to_string(),
            backend: resolve_backend(profile).to_string(),
            lora: profile.tag(tag_keys::FEAT_LORA).to_string(),
        }
    }

    fn table_headers() -> [&'static str; 9] {
        [
            "ID", "MODEL", "RELEASE", "PRECISION", "TP", "PROFILE", "GPU", "BACKEND", "LORA",
        ]
    }

    fn table_row(&self) -> [&str; 9] {
        [
            &self.id,
            &self.model,
            &self.release,
            &self.precision,
            &self.tp,
            &self.profile,
            &self.gpu,
            &self.backend,
            &self.lora,
        ]
    }
}

/// Summaries for the given ids, skipping ids missing from the manifest
pub fn summarize<'a>(
    manifest: &Manifest,
    ids: impl IntoIterator<Item = &'a str>,
) -> Vec<ProfileSummary> {
    ids.into_iter()
        .filter_map(|id| manifest.profile(id).map(|p| ProfileSummary::new(id, p)))
        .collect()
}

#[derive(Serialize)]
struct ProfileDetail<'a> {
    id: &'a str,
    #[serde(flatten)]
    profile: &'a Profile,
}

/// Output formatter
pub struct OutputFormatter {
    format: OutputFormat,
    width: Option<u16>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            width: None,
        }
    }

    /// Fix the table width instead of following the terminal
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Render a list of profile summaries
    pub fn render_summaries(&self, rows: &[ProfileSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(rows)?)),
            OutputFormat::Yaml => to_yaml(rows),
            OutputFormat::Table if rows.is_empty() => Ok("No profiles found\n".to_string()),
            OutputFormat::Table => Ok(self.render_table(
                &ProfileSummary::table_headers(),
                rows.iter().map(ProfileSummary::table_row),
            )),
        }
    }

    /// Render a single profile with all of its tags and files
    pub fn render_profile(&self, id: &str, profile: &Profile) -> Result<String> {
        let detail = ProfileDetail { id, profile };
        match self.format {
            OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&detail)?)),
            OutputFormat::Yaml => to_yaml(&detail),
            OutputFormat::Table => Ok(self.render_detail(id, profile)),
        }
    }

    /// Print a list of profile summaries
    pub fn print_summaries(&self, rows: &[ProfileSummary]) -> Result<()> {
        print!("{}", self.render_summaries(rows)?);
        Ok(())
    }

    /// Print a single profile
    pub fn print_profile(&self, id: &str, profile: &Profile) -> Result<()> {
        print!("{}", self.render_profile(id, profile)?);
        Ok(())
    }
}

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| NimProfileError::Output(e.to_string()))
}

impl OutputFormatter {
    fn new_table(&self, preset: &str) -> Table {
        let mut table = Table::new();
        table
            .load_preset(preset)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.width {
            table.set_width(width);
        }
        table
    }

    fn render_table<'a, const N: usize>(
        &self,
        headers: &[&str; N],
        rows: impl Iterator<Item = [&'a str; N]>,
    ) -> String {
        let mut table = self.new_table(UTF8_FULL);
        table.set_header(headers.iter().map(|h| header_cell(h)));
        for row in rows {
            table.add_row(row.map(display_cell));
        }
        format!("{}\n", table)
    }

    fn render_detail(&self, id: &str, profile: &Profile) -> String {
        let mut fields = self.new_table(NOTHING);
        fields.add_row(vec![header_cell("ID"), Cell::new(id)]);
        fields.add_row(vec![header_cell("Model"), Cell::new(display_cell(&profile.model))]);
        fields.add_row(vec![
            header_cell("Release"),
            Cell::new(display_cell(&profile.release)),
        ]);
        fields.add_row(vec![
            header_cell("Container URL"),
            Cell::new(display_cell(&profile.container_url)),
        ]);

        let mut tags = self.new_table(UTF8_FULL);
        tags.set_header(vec![header_cell("TAG"), header_cell("VALUE")]);
        for (key, value) in &profile.tags {
            tags.add_row(vec![key.as_str(), display_cell(value)]);
        }

        let mut files = self.new_table(UTF8_FULL);
        files.set_header(vec![
            header_cell("DESTINATION"),
            header_cell("REPOSITORY"),
            header_cell("FILE"),
        ]);
        for component in &profile.workspace.components {
            let dst = display_cell(&component.dst);
            let repo = display_cell(&component.src.repo_id);
            if component.src.files.is_empty() {
                files.add_row(vec![dst, repo, "-"]);
            }
            for file in &component.src.files {
                files.add_row(vec![dst, repo, file.name.as_str()]);
            }
        }

        format!("{}\n\nTags:\n{}\n\nWorkspace:\n{}\n", fields, tags, files)
    }
}

fn header_cell(name: &str) -> Cell {
    Cell::new(name).add_attribute(Attribute::Bold)
}

fn display_cell(cell: &str) -> &str {
    if cell.is_empty() {
        "-"
    } else {
        cell
    }
}
