use crate::tally::index::WindowIndex;
use crate::tally::report::StatRecord;

/// Index of the candidate whose view count is closest to `target_views`.
/// Stable: the first record at the minimal distance wins.
fn closest_by_views(bucket: &[StatRecord], target_views: u64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (idx, record) in bucket.iter().enumerate() {
        let diff = record.views.abs_diff(target_views);
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((idx, diff)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Consume the best all-time candidate for a title, disambiguating duplicate
/// titles by view-count distance. A lone candidate is taken unconditionally.
pub fn take_closest(
    index: &mut WindowIndex,
    title: &str,
    target_views: u64,
) -> Option<StatRecord> {
    let idx = closest_by_views(index.bucket(title), target_views)?;
    index.remove(title, idx)
}

/// Consume the first remaining candidate for a title.
///
/// Short-window view counts are not comparable to the catalog's all-time
/// views, so no distance metric applies; first-available is the accepted
/// approximation when titles collide.
pub fn take_first(index: &mut WindowIndex, title: &str) -> Option<StatRecord> {
    if index.bucket(title).is_empty() {
        return None;
    }
    index.remove(title, 0)
}
