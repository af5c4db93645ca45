use anyhow::Result;

use crate::commands::CommandReport;
use crate::tally::catalog::{load_projects, save_catalog};
use crate::tally::index::StatsIndex;
use crate::tally::merge::merge_candidates;
use crate::tally::paths::resolve_paths;
use crate::tally::report::load_bundle;

/// Ingest the candidate batch into the master catalog, filling statistics
/// from the parsed bundle, then rewrite the catalog in popularity order.
pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths();
    let mut report = CommandReport::new("merge");

    let candidates_file = paths.input_dir.join("projects.json");
    report.detail(format!("catalog={}", paths.catalog_file.display()));
    report.detail(format!("candidates={}", candidates_file.display()));
    report.detail(format!("bundle={}", paths.bundle_file.display()));

    let mut projects = load_projects(&paths.catalog_file)?;
    let candidates = load_projects(&candidates_file)?;
    let bundle = load_bundle(&paths.bundle_file)?;
    let mut index = StatsIndex::from_bundle(bundle);

    let outcome = merge_candidates(&mut projects, candidates, &mut index);

    save_catalog(&paths.catalog_file, &projects)?;

    report.detail(format!("new_projects_added={}", outcome.added));
    report.detail(format!("total_projects={}", outcome.total));
    report.detail(format!("unmatched_stat_records={}", index.remaining_total()));
    Ok(report)
}
