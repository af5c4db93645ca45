use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Line-grid shape of one raw export.
///
/// The header-token scan and the hard-coded fallback offset are heuristics
/// tied to the upstream report template; they live here so a template change
/// never touches the matcher or the merge engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLayout {
    pub header_tokens: Vec<String>,
    pub fallback_start_line: usize,
    pub block_lines: usize,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            header_tokens: vec![
                "Project".to_string(),
                "Views".to_string(),
                "Total".to_string(),
            ],
            fallback_start_line: 21,
            block_lines: 11,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TallyConfig {
    pub layout: ReportLayout,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PartialTallyConfig {
    layout: Option<ReportLayout>,
}

// The monetary total sits at offset 9 within a block, so anything shorter
// cannot hold a full record.
const MIN_BLOCK_LINES: usize = 10;

fn env_or_usize(var: &str, fallback: usize) -> usize {
    match env::var(var) {
        Ok(v) => v.trim().parse::<usize>().ok().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_or_csv(var: &str, fallback: &[String]) -> Vec<String> {
    match env::var(var) {
        Ok(v) => {
            let out = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>();
            if out.is_empty() { fallback.to_vec() } else { out }
        }
        Err(_) => fallback.to_vec(),
    }
}

fn validate(cfg: &TallyConfig) -> Result<()> {
    if cfg.layout.header_tokens.is_empty() {
        return Err(anyhow!(
            "invalid report layout: header token list cannot be empty"
        ));
    }
    if cfg.layout.block_lines < MIN_BLOCK_LINES {
        return Err(anyhow!(
            "invalid report layout: block must span at least {MIN_BLOCK_LINES} lines"
        ));
    }
    Ok(())
}

fn resolve_config_path() -> PathBuf {
    if let Ok(custom) = env::var("TALLY_CONFIG_PATH") {
        let trimmed = custom.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    PathBuf::from("tally.toml")
}

fn merge_file_config(base: &mut TallyConfig) -> Result<()> {
    let path = resolve_config_path();
    if !path.exists() {
        return Ok(());
    }

    let raw = fs::read_to_string(&path)?;
    let parsed: PartialTallyConfig = toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse tally config {}: {err}", path.display()))?;
    if let Some(layout) = parsed.layout {
        base.layout = layout;
    }
    Ok(())
}

pub fn load_config() -> Result<TallyConfig> {
    let mut cfg = TallyConfig::default();
    merge_file_config(&mut cfg)?;

    cfg.layout.header_tokens = env_or_csv("TALLY_HEADER_TOKENS", &cfg.layout.header_tokens);
    cfg.layout.fallback_start_line = env_or_usize(
        "TALLY_FALLBACK_START_LINE",
        cfg.layout.fallback_start_line,
    );
    cfg.layout.block_lines = env_or_usize("TALLY_BLOCK_LINES", cfg.layout.block_lines);

    validate(&cfg)?;
    Ok(cfg)
}
