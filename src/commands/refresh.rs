use anyhow::Result;

use crate::commands::CommandReport;
use crate::tally::catalog::{load_projects, save_catalog};
use crate::tally::index::StatsIndex;
use crate::tally::merge::refresh_catalog;
use crate::tally::paths::resolve_paths;
use crate::tally::report::load_bundle;

/// Re-match the latest parsed bundle into every catalog entry, existing ones
/// included, and rewrite the catalog in popularity order.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("refresh");

    report.detail(format!("catalog={}", paths.catalog_file.display()));
    report.detail(format!("bundle={}", paths.bundle_file.display()));

    let mut projects = load_projects(&paths.catalog_file)?;
    let bundle = load_bundle(&paths.bundle_file)?;

    if projects.is_empty() || bundle.is_empty() {
        report.issue("missing catalog or stats bundle; nothing to refresh");
        return Ok(report);
    }

    let mut index = StatsIndex::from_bundle(bundle);
    let outcome = refresh_catalog(&mut projects, &mut index);

    save_catalog(&paths.catalog_file, &projects)?;

    report.detail(format!("projects_refreshed={}", outcome.refreshed));
    report.detail(format!("all_time_matches={}", outcome.matched_all_time));
    report.detail(format!("unmatched_stat_records={}", index.remaining_total()));
    Ok(report)
}
