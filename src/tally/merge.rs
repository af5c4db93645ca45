use std::collections::BTreeSet;

use crate::tally::catalog::{self, Project};
use crate::tally::index::StatsIndex;
use crate::tally::matcher;
use crate::tally::window::Window;

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOutcome {
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOutcome {
    pub refreshed: usize,
    pub matched_all_time: usize,
}

/// Fill a freshly ingested entry's statistics from the index, consuming the
/// matched records. Unmatched windows zero-fill so every statistics field is
/// populated after a merge pass.
fn fill_statistics(project: &mut Project, index: &mut StatsIndex) {
    let title = project.title.clone();

    let all_time = title
        .as_deref()
        .and_then(|t| matcher::take_closest(index.window_mut(Window::AllTime), t, project.views));
    match all_time {
        Some(record) => project.apply_all_time(&record),
        None => project.zero_all_time(),
    }

    for window in Window::SHORT {
        let matched = title
            .as_deref()
            .and_then(|t| matcher::take_first(index.window_mut(window), t));
        match matched {
            Some(record) => project.set_window_earnings(window, record.tips, record.total),
            None => project.set_window_earnings(window, 0, 0),
        }
    }
}

/// Ingest `candidates` into `projects`, then reassign both global orderings.
///
/// Entries already present by `link` are left untouched, statistics included;
/// only unseen links are ingested. Chronological ranks are provisionally
/// continued past the catalog's current maximum during ingestion, then
/// re-derived from scratch over the whole catalog, and the final slice order
/// is the persisted popularity order.
pub fn merge_candidates(
    projects: &mut Vec<Project>,
    candidates: Vec<Project>,
    index: &mut StatsIndex,
) -> MergeOutcome {
    let existing_links: BTreeSet<String> =
        projects.iter().map(|p| p.link.clone()).collect();
    let mut next_order = projects
        .iter()
        .map(|p| p.created_order)
        .max()
        .unwrap_or(0);

    let mut added = 0usize;
    for mut candidate in candidates {
        if existing_links.contains(&candidate.link) {
            continue;
        }

        if let Some(created) = candidate.created.clone() {
            candidate.updated = Some(created);
        }
        next_order += 1;
        candidate.created_order = next_order;

        fill_statistics(&mut candidate, index);

        projects.push(candidate);
        added += 1;
    }

    catalog::assign_created_order(projects);
    catalog::sort_by_popularity(projects);

    MergeOutcome {
        added,
        total: projects.len(),
    }
}

/// Re-match the bundle into every entry, existing ones included, walking the
/// catalog in its current on-disk order.
///
/// Short-window fields are only overwritten when the all-time match lands
/// (an exhausted short bucket keeps the previous value), while an all-time
/// miss zero-fills every statistics field. Chronological ranks are not
/// touched; the slice ends in popularity order.
pub fn refresh_catalog(projects: &mut [Project], index: &mut StatsIndex) -> RefreshOutcome {
    let mut out = RefreshOutcome {
        refreshed: projects.len(),
        matched_all_time: 0,
    };

    for project in projects.iter_mut() {
        let title = project.title.clone();
        let all_time = title.as_deref().and_then(|t| {
            matcher::take_closest(index.window_mut(Window::AllTime), t, project.views)
        });

        match all_time {
            Some(record) => {
                out.matched_all_time += 1;
                project.apply_all_time(&record);
                for window in Window::SHORT {
                    if let Some(matched) = title
                        .as_deref()
                        .and_then(|t| matcher::take_first(index.window_mut(window), t))
                    {
                        project.set_window_earnings(window, matched.tips, matched.total);
                    }
                }
            }
            None => {
                project.zero_all_time();
                for window in Window::SHORT {
                    project.set_window_earnings(window, 0, 0);
                }
            }
        }
    }

    catalog::sort_by_popularity(projects);
    out
}

#[cfg(test)]
mod tests {
    use super::{merge_candidates, refresh_catalog};
    use crate::tally::catalog::Project;
    use crate::tally::index::StatsIndex;
    use crate::tally::report::{StatRecord, StatsBundle};

    fn record(title: &str, views: u64, tips: u64, total: u64) -> StatRecord {
        StatRecord {
            title: title.into(),
            views,
            on_platform: views / 2,
            off_platform: views / 4,
            tips,
            total,
        }
    }

    fn candidate(link: &str, title: &str, created: &str, views: u64) -> Project {
        Project {
            link: link.into(),
            title: Some(title.into()),
            created: Some(created.into()),
            views,
            ..Project::default()
        }
    }

    fn empty_index() -> StatsIndex {
        StatsIndex::from_bundle(StatsBundle::default())
    }

    #[test]
    fn new_catalog_single_candidate_gets_rank_one_and_zero_stats() {
        let mut projects = Vec::new();
        let mut index = empty_index();

        let outcome = merge_candidates(
            &mut projects,
            vec![candidate("a", "X", "2024-01-01", 10)],
            &mut index,
        );

        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.total, 1);
        let p = &projects[0];
        assert_eq!(p.link, "a");
        assert_eq!(p.created_order, 1);
        assert_eq!(p.updated.as_deref(), Some("2024-01-01"));
        assert_eq!(p.tips_all_time, 0);
        assert_eq!(p.on_platform_all_time, 0);
        assert_eq!(p.off_platform_all_time, 0);
        assert_eq!(p.total_earnings_all_time, 0);
        assert_eq!((p.tips_day, p.total_earnings_day), (0, 0));
        assert_eq!((p.tips_week, p.total_earnings_week), (0, 0));
        assert_eq!((p.tips_month, p.total_earnings_month), (0, 0));
    }

    #[test]
    fn all_time_match_disambiguates_duplicate_titles_by_views() {
        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![record("X", 5, 1, 100), record("X", 50, 2, 200)];
        let mut index = StatsIndex::from_bundle(bundle);

        let mut projects = Vec::new();
        merge_candidates(
            &mut projects,
            vec![candidate("a", "X", "2024-01-01", 48)],
            &mut index,
        );

        let p = &projects[0];
        assert_eq!(p.tips_all_time, 2);
        assert_eq!(p.total_earnings_all_time, 200);
        assert_eq!(p.on_platform_all_time, 25);
        assert_eq!(p.off_platform_all_time, 12);
    }

    #[test]
    fn short_windows_take_first_available() {
        let mut bundle = StatsBundle::default();
        bundle.day = vec![record("X", 3, 7, 70), record("X", 900, 8, 80)];
        let mut index = StatsIndex::from_bundle(bundle);

        let mut projects = Vec::new();
        merge_candidates(
            &mut projects,
            vec![candidate("a", "X", "2024-01-01", 899)],
            &mut index,
        );

        // First-available, not closest-views: short-window view counts are
        // not comparable to the catalog's all-time views.
        assert_eq!(projects[0].tips_day, 7);
        assert_eq!(projects[0].total_earnings_day, 70);
    }

    #[test]
    fn each_stat_record_is_consumed_at_most_once() {
        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![record("X", 10, 1, 100), record("X", 20, 2, 200)];
        let mut index = StatsIndex::from_bundle(bundle);

        let mut projects = Vec::new();
        merge_candidates(
            &mut projects,
            vec![
                candidate("a", "X", "2024-01-01", 10),
                candidate("b", "X", "2024-01-02", 20),
                candidate("c", "X", "2024-01-03", 15),
            ],
            &mut index,
        );

        let matched: Vec<u64> = projects
            .iter()
            .filter(|p| p.total_earnings_all_time > 0)
            .map(|p| p.tips_all_time)
            .collect();
        assert_eq!(matched.len(), 2);
        let unmatched = projects
            .iter()
            .find(|p| p.link == "c")
            .expect("third project");
        assert_eq!(unmatched.tips_all_time, 0);
        assert_eq!(index.window(crate::tally::window::Window::AllTime).remaining(), 0);
    }

    #[test]
    fn merge_is_idempotent_across_runs() {
        let candidates = vec![
            candidate("a", "X", "2024-01-01", 10),
            candidate("b", "Y", "2024-02-01", 20),
        ];

        let mut projects = Vec::new();
        let first = merge_candidates(&mut projects, candidates.clone(), &mut empty_index());
        assert_eq!(first.added, 2);

        let snapshot = projects.clone();
        let second = merge_candidates(&mut projects, candidates, &mut empty_index());
        assert_eq!(second.added, 0);
        assert_eq!(second.total, 2);
        assert_eq!(projects, snapshot);
    }

    #[test]
    fn existing_entries_keep_their_statistics() {
        let mut seeded = candidate("a", "X", "2024-01-01", 10);
        seeded.tips_all_time = 99;
        seeded.total_earnings_all_time = 990;
        let mut projects = vec![seeded];

        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![record("X", 10, 1, 100)];
        let mut index = StatsIndex::from_bundle(bundle);

        merge_candidates(
            &mut projects,
            vec![candidate("a", "X", "2024-01-01", 10)],
            &mut index,
        );

        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].tips_all_time, 99);
        // The skipped candidate consumed nothing.
        assert_eq!(index.window(crate::tally::window::Window::AllTime).remaining(), 1);
    }

    #[test]
    fn created_order_is_a_dense_permutation_after_merge() {
        let mut projects = Vec::new();
        merge_candidates(
            &mut projects,
            vec![
                candidate("c", "C", "2024-03-01", 0),
                candidate("a", "A", "2024-01-01", 0),
                Project {
                    link: "undated".into(),
                    title: Some("U".into()),
                    ..Project::default()
                },
                candidate("b", "B", "2024-02-01", 0),
            ],
            &mut empty_index(),
        );

        let mut orders: Vec<u64> = projects.iter().map(|p| p.created_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4]);

        let undated = projects.iter().find(|p| p.link == "undated").expect("undated");
        assert_eq!(undated.created_order, 1);
    }

    #[test]
    fn catalog_ends_in_popularity_order() {
        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![
            record("A", 1, 5, 50),
            record("B", 1, 9, 10),
            record("C", 1, 5, 80),
        ];
        let mut index = StatsIndex::from_bundle(bundle);

        let mut projects = Vec::new();
        merge_candidates(
            &mut projects,
            vec![
                candidate("a", "A", "2024-01-01", 1),
                candidate("b", "B", "2024-01-02", 1),
                candidate("c", "C", "2024-01-03", 1),
            ],
            &mut index,
        );

        let keys: Vec<(u64, u64)> = projects
            .iter()
            .map(|p| (p.tips_all_time, p.total_earnings_all_time))
            .collect();
        assert_eq!(keys, vec![(9, 10), (5, 80), (5, 50)]);
    }

    #[test]
    fn refresh_updates_existing_entries() {
        let mut stale = candidate("a", "X", "2024-01-01", 10);
        stale.tips_all_time = 1;
        stale.total_earnings_all_time = 10;
        stale.tips_day = 3;
        let mut projects = vec![stale];

        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![record("X", 10, 4, 400)];
        bundle.day = vec![record("X", 2, 5, 50)];
        let mut index = StatsIndex::from_bundle(bundle);

        let outcome = refresh_catalog(&mut projects, &mut index);

        assert_eq!(outcome.refreshed, 1);
        assert_eq!(outcome.matched_all_time, 1);
        assert_eq!(projects[0].tips_all_time, 4);
        assert_eq!(projects[0].total_earnings_all_time, 400);
        assert_eq!(projects[0].tips_day, 5);
    }

    #[test]
    fn refresh_keeps_short_window_values_when_bucket_is_exhausted() {
        let mut first = candidate("a", "X", "2024-01-01", 10);
        first.tips_day = 1;
        let mut second = candidate("b", "X", "2024-01-02", 20);
        second.tips_day = 2;
        let mut projects = vec![first, second];

        let mut bundle = StatsBundle::default();
        bundle.all_time = vec![record("X", 10, 4, 400), record("X", 20, 6, 600)];
        bundle.day = vec![record("X", 5, 9, 90)];
        let mut index = StatsIndex::from_bundle(bundle);

        refresh_catalog(&mut projects, &mut index);

        let a = projects.iter().find(|p| p.link == "a").expect("a");
        let b = projects.iter().find(|p| p.link == "b").expect("b");
        // Catalog order decided who drained the lone day record.
        assert_eq!(a.tips_day, 9);
        assert_eq!(b.tips_day, 2);
        assert_eq!(b.tips_all_time, 6);
    }

    #[test]
    fn refresh_zero_fills_on_all_time_miss() {
        let mut stale = candidate("a", "X", "2024-01-01", 10);
        stale.tips_all_time = 7;
        stale.tips_week = 3;
        let mut projects = vec![stale];

        let mut bundle = StatsBundle::default();
        // Day data exists but is unreachable without an all-time hit.
        bundle.day = vec![record("X", 5, 9, 90)];
        let mut index = StatsIndex::from_bundle(bundle);

        refresh_catalog(&mut projects, &mut index);

        assert_eq!(projects[0].tips_all_time, 0);
        assert_eq!(projects[0].tips_week, 0);
        assert_eq!(projects[0].tips_day, 0);
    }
}
