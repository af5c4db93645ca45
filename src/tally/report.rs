use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::BlockParseError;
use crate::tally::config::ReportLayout;
use crate::tally::warn;
use crate::tally::window::Window;

/// One earnings row extracted from a raw export, scoped to a single window.
///
/// Carries no identity beyond `title` plus `views`; records are matched into
/// the catalog and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRecord {
    pub title: String,
    pub views: u64,
    pub on_platform: u64,
    pub off_platform: u64,
    pub tips: u64,
    pub total: u64,
}

/// Parsed statistics for all windows, keyed by window name on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsBundle {
    pub day: Vec<StatRecord>,
    pub week: Vec<StatRecord>,
    pub month: Vec<StatRecord>,
    pub all_time: Vec<StatRecord>,
}

impl StatsBundle {
    pub fn window(&self, window: Window) -> &[StatRecord] {
        match window {
            Window::Day => &self.day,
            Window::Week => &self.week,
            Window::Month => &self.month,
            Window::AllTime => &self.all_time,
        }
    }

    pub fn set_window(&mut self, window: Window, records: Vec<StatRecord>) {
        match window {
            Window::Day => self.day = records,
            Window::Week => self.week = records,
            Window::Month => self.month = records,
            Window::AllTime => self.all_time = records,
        }
    }

    pub fn is_empty(&self) -> bool {
        Window::ALL.iter().all(|w| self.window(*w).is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub records: Vec<StatRecord>,
    /// Offsets of blocks that failed to parse and forced a one-line resync.
    pub skipped_lines: Vec<usize>,
}

fn parse_count(raw: &str, field: &'static str) -> Result<u64, BlockParseError> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0);
    }
    cleaned
        .parse::<u64>()
        .map_err(|_| BlockParseError::InvalidCount {
            field,
            value: raw.to_string(),
        })
}

// Block grid: title, repeated title, views, on-platform, separator,
// off-platform, separator, tips, separator, total, separator.
fn record_from_block(block: &[&str]) -> Result<StatRecord, BlockParseError> {
    Ok(StatRecord {
        title: block[0].to_string(),
        views: parse_count(block[2], "views")?,
        on_platform: parse_count(block[3], "on_platform")?,
        off_platform: parse_count(block[5], "off_platform")?,
        tips: parse_count(block[7], "tips")?,
        total: parse_count(block[9], "total")?,
    })
}

fn data_start_line(lines: &[String], layout: &ReportLayout) -> usize {
    for (idx, line) in lines.iter().enumerate() {
        if layout
            .header_tokens
            .iter()
            .all(|token| line.contains(token.as_str()))
        {
            return idx + 1;
        }
    }
    layout.fallback_start_line
}

/// Parse one export's line sequence into statistics records.
///
/// Blocks are consumed at the layout's fixed stride. A block that fails
/// numeric extraction is logged with its offset and the cursor advances a
/// single line instead of a full stride, so a one-off grid glitch costs at
/// most a stride of skipped lines before realignment. Parsing stops once
/// fewer than a full block of lines remains.
pub fn parse_report(lines: &[String], window: Window, layout: &ReportLayout) -> ParseOutcome {
    let mut out = ParseOutcome::default();

    let mut i = data_start_line(lines, layout);
    while i + layout.block_lines <= lines.len() {
        let block: Vec<&str> = lines[i..i + layout.block_lines]
            .iter()
            .map(String::as_str)
            .collect();
        match record_from_block(&block) {
            Ok(record) => {
                out.records.push(record);
                i += layout.block_lines;
            }
            Err(err) => {
                warn::emit(
                    "BLOCK_PARSE_FAILED",
                    "parse",
                    window.as_str(),
                    i,
                    "resync-one-line",
                    &err.to_string(),
                );
                out.skipped_lines.push(i);
                i += 1;
            }
        }
    }

    out
}

/// Read a raw export, trimming every line the way the report template pads
/// them.
pub fn read_export_lines(path: &Path) -> Result<Vec<String>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(raw.lines().map(|line| line.trim().to_string()).collect())
}

/// Load the combined stats bundle; a missing file means no data.
pub fn load_bundle(path: &Path) -> Result<StatsBundle> {
    if !path.exists() {
        return Ok(StatsBundle::default());
    }

    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: StatsBundle = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}
