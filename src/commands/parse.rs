use anyhow::{Context, Result};
use std::fs;

use crate::commands::CommandReport;
use crate::tally::config::load_config;
use crate::tally::paths::resolve_paths;
use crate::tally::report::{StatsBundle, parse_report, read_export_lines};
use crate::tally::window::Window;

/// Turn the raw per-window export text files into per-window JSON files plus
/// the combined stats bundle. Missing exports are skipped, not fatal.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let cfg = load_config()?;
    let mut report = CommandReport::new("parse");

    report.detail(format!("input_dir={}", paths.input_dir.display()));
    report.detail(format!("output_dir={}", paths.output_dir.display()));

    fs::create_dir_all(&paths.output_dir)
        .with_context(|| format!("failed to create {}", paths.output_dir.display()))?;

    let mut bundle = StatsBundle::default();
    let mut parsed_windows = 0usize;

    for window in Window::ALL {
        let source = paths.input_dir.join(window.export_file_name());
        if !source.exists() {
            report.detail(format!("{}: no export file, skipped", window.as_str()));
            continue;
        }

        let lines = read_export_lines(&source)?;
        let outcome = parse_report(&lines, window, &cfg.layout);
        report.detail(format!(
            "{}: records={} skipped_blocks={}",
            window.as_str(),
            outcome.records.len(),
            outcome.skipped_lines.len()
        ));
        if !outcome.skipped_lines.is_empty() {
            report.issue(format!(
                "{}: unparseable blocks at lines {:?}",
                window.as_str(),
                outcome.skipped_lines
            ));
        }

        let out_path = paths.output_dir.join(window.parsed_file_name());
        let data = serde_json::to_string_pretty(&outcome.records)?;
        fs::write(&out_path, format!("{data}\n"))
            .with_context(|| format!("failed to write {}", out_path.display()))?;

        bundle.set_window(window, outcome.records);
        parsed_windows += 1;
    }

    let data = serde_json::to_string_pretty(&bundle)?;
    fs::write(&paths.bundle_file, format!("{data}\n"))
        .with_context(|| format!("failed to write {}", paths.bundle_file.display()))?;
    report.detail(format!(
        "bundle={} windows_parsed={parsed_windows}",
        paths.bundle_file.display()
    ));

    Ok(report)
}
