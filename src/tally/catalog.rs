use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::tally::report::StatRecord;
use crate::tally::window::Window;

/// Persistent catalog entry. `link` is the only stable identity across runs;
/// titles may collide. Unrecognized fields on incoming objects are kept in
/// `extra` so a candidate's payload survives the copy into the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub created_order: u64,
    #[serde(default)]
    pub tips_all_time: u64,
    #[serde(default)]
    pub on_platform_all_time: u64,
    #[serde(default)]
    pub off_platform_all_time: u64,
    #[serde(default)]
    pub total_earnings_all_time: u64,
    #[serde(default)]
    pub tips_day: u64,
    #[serde(default)]
    pub total_earnings_day: u64,
    #[serde(default)]
    pub tips_week: u64,
    #[serde(default)]
    pub total_earnings_week: u64,
    #[serde(default)]
    pub tips_month: u64,
    #[serde(default)]
    pub total_earnings_month: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Project {
    /// Copy all four all-time statistics fields from a matched record.
    pub fn apply_all_time(&mut self, record: &StatRecord) {
        self.tips_all_time = record.tips;
        self.on_platform_all_time = record.on_platform;
        self.off_platform_all_time = record.off_platform;
        self.total_earnings_all_time = record.total;
    }

    pub fn zero_all_time(&mut self) {
        self.tips_all_time = 0;
        self.on_platform_all_time = 0;
        self.off_platform_all_time = 0;
        self.total_earnings_all_time = 0;
    }

    pub fn set_window_earnings(&mut self, window: Window, tips: u64, total: u64) {
        match window {
            Window::Day => {
                self.tips_day = tips;
                self.total_earnings_day = total;
            }
            Window::Week => {
                self.tips_week = tips;
                self.total_earnings_week = total;
            }
            Window::Month => {
                self.tips_month = tips;
                self.total_earnings_month = total;
            }
            Window::AllTime => {
                self.tips_all_time = tips;
                self.total_earnings_all_time = total;
            }
        }
    }
}

fn created_key(project: &Project) -> &str {
    project.created.as_deref().unwrap_or("")
}

/// Overwrite every entry's chronological rank with its 1-based position in
/// the `created`-ascending order (missing dates sort first, ties keep their
/// prior relative order). Leaves the slice in that order.
pub fn assign_created_order(projects: &mut [Project]) {
    projects.sort_by(|a, b| created_key(a).cmp(created_key(b)));
    for (idx, project) in projects.iter_mut().enumerate() {
        project.created_order = (idx + 1) as u64;
    }
}

/// The persisted on-disk order: descending by all-time tips, then all-time
/// total earnings, stable for ties. Presentation only; identity is `link`.
pub fn sort_by_popularity(projects: &mut [Project]) {
    projects.sort_by_key(|p| Reverse((p.tips_all_time, p.total_earnings_all_time)));
}

/// Load a catalog or candidate batch; a missing file means an empty list.
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: Vec<Project> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

/// Rewrite the catalog in full. The write goes through a sibling temp file
/// persisted over the target, so an interrupted run leaves the previous
/// catalog intact.
pub fn save_catalog(path: &Path, projects: &[Project]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
            parent
        }
        _ => Path::new("."),
    };

    let data = serde_json::to_string_pretty(projects)?;
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    file.write_all(data.as_bytes())?;
    file.write_all(b"\n")?;
    file.persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
