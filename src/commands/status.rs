use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;

use crate::commands::CommandReport;
use crate::tally::catalog::{Project, load_projects};
use crate::tally::paths::resolve_paths;

fn created_order_is_dense(projects: &[Project]) -> bool {
    let mut orders: Vec<u64> = projects.iter().map(|p| p.created_order).collect();
    orders.sort_unstable();
    orders
        .iter()
        .enumerate()
        .all(|(idx, order)| *order == (idx + 1) as u64)
}

/// Read-only summary of the catalog on disk, with sanity checks on the
/// orderings the merge pass is supposed to maintain.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("status");

    report.detail(format!("catalog={}", paths.catalog_file.display()));
    if !paths.catalog_file.exists() {
        report.issue("catalog file does not exist; run merge first");
        return Ok(report);
    }

    let meta = fs::metadata(&paths.catalog_file)
        .with_context(|| format!("failed to stat {}", paths.catalog_file.display()))?;
    if let Ok(modified) = meta.modified() {
        let stamp: DateTime<Local> = modified.into();
        report.detail(format!("last_written={}", stamp.format("%Y-%m-%d %H:%M:%S")));
    }

    let projects = load_projects(&paths.catalog_file)?;
    report.detail(format!("projects={}", projects.len()));

    let max_order = projects.iter().map(|p| p.created_order).max().unwrap_or(0);
    report.detail(format!("max_created_order={max_order}"));

    let tips_sum: u64 = projects.iter().map(|p| p.tips_all_time).sum();
    let earnings_sum: u64 = projects.iter().map(|p| p.total_earnings_all_time).sum();
    report.detail(format!("tips_all_time_sum={tips_sum}"));
    report.detail(format!("total_earnings_all_time_sum={earnings_sum}"));

    for project in projects.iter().take(5) {
        report.detail(format!(
            "top: {} tips_all_time={} total_earnings_all_time={}",
            project.title.as_deref().unwrap_or(project.link.as_str()),
            project.tips_all_time,
            project.total_earnings_all_time
        ));
    }

    if !projects.is_empty() && !created_order_is_dense(&projects) {
        report.issue("created_order is not a dense 1..N permutation; re-run merge");
    }

    let sorted = projects.windows(2).all(|pair| {
        (pair[0].tips_all_time, pair[0].total_earnings_all_time)
            >= (pair[1].tips_all_time, pair[1].total_earnings_all_time)
    });
    if !sorted {
        report.issue("catalog is not in popularity order; re-run merge or refresh");
    }

    Ok(report)
}
