use std::collections::BTreeMap;

use crate::tally::report::{StatRecord, StatsBundle};
use crate::tally::window::Window;

/// Title-keyed buckets for a single window, preserving first-seen order.
///
/// Removal is the only mutation; a record leaves its bucket exactly once and
/// is never re-inserted, which is what keeps matching at-most-once.
#[derive(Debug, Default)]
pub struct WindowIndex {
    buckets: BTreeMap<String, Vec<StatRecord>>,
}

impl WindowIndex {
    pub fn from_records(records: Vec<StatRecord>) -> Self {
        let mut buckets: BTreeMap<String, Vec<StatRecord>> = BTreeMap::new();
        for record in records {
            buckets
                .entry(record.title.clone())
                .or_default()
                .push(record);
        }
        Self { buckets }
    }

    /// Remaining candidates for a title; empty when unseen or exhausted.
    pub fn bucket(&self, title: &str) -> &[StatRecord] {
        self.buckets.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove(&mut self, title: &str, idx: usize) -> Option<StatRecord> {
        let bucket = self.buckets.get_mut(title)?;
        if idx >= bucket.len() {
            return None;
        }
        let record = bucket.remove(idx);
        if bucket.is_empty() {
            self.buckets.remove(title);
        }
        Some(record)
    }

    pub fn remaining(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Per-window indexes over one parsed bundle, rebuilt fresh every run.
#[derive(Debug, Default)]
pub struct StatsIndex {
    day: WindowIndex,
    week: WindowIndex,
    month: WindowIndex,
    all_time: WindowIndex,
}

impl StatsIndex {
    pub fn from_bundle(bundle: StatsBundle) -> Self {
        Self {
            day: WindowIndex::from_records(bundle.day),
            week: WindowIndex::from_records(bundle.week),
            month: WindowIndex::from_records(bundle.month),
            all_time: WindowIndex::from_records(bundle.all_time),
        }
    }

    pub fn window(&self, window: Window) -> &WindowIndex {
        match window {
            Window::Day => &self.day,
            Window::Week => &self.week,
            Window::Month => &self.month,
            Window::AllTime => &self.all_time,
        }
    }

    pub fn window_mut(&mut self, window: Window) -> &mut WindowIndex {
        match window {
            Window::Day => &mut self.day,
            Window::Week => &mut self.week,
            Window::Month => &mut self.month,
            Window::AllTime => &mut self.all_time,
        }
    }

    /// Records left unconsumed across all windows after matching.
    pub fn remaining_total(&self) -> usize {
        Window::ALL.iter().map(|w| self.window(*w).remaining()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::WindowIndex;
    use crate::tally::report::StatRecord;

    fn record(title: &str, views: u64) -> StatRecord {
        StatRecord {
            title: title.into(),
            views,
            on_platform: 0,
            off_platform: 0,
            tips: 0,
            total: 0,
        }
    }

    #[test]
    fn buckets_preserve_first_seen_order() {
        let index = WindowIndex::from_records(vec![
            record("X", 5),
            record("Y", 1),
            record("X", 50),
        ]);

        let views: Vec<u64> = index.bucket("X").iter().map(|r| r.views).collect();
        assert_eq!(views, vec![5, 50]);
        assert_eq!(index.bucket("Z"), &[]);
    }

    #[test]
    fn remove_consumes_exactly_one_record() {
        let mut index = WindowIndex::from_records(vec![record("X", 5), record("X", 50)]);

        assert_eq!(index.remove("X", 1).map(|r| r.views), Some(50));
        assert_eq!(index.remaining(), 1);
        assert_eq!(index.remove("X", 0).map(|r| r.views), Some(5));
        assert_eq!(index.remaining(), 0);
        assert!(index.remove("X", 0).is_none());
    }

    #[test]
    fn remove_out_of_range_is_none() {
        let mut index = WindowIndex::from_records(vec![record("X", 5)]);
        assert!(index.remove("X", 3).is_none());
        assert_eq!(index.remaining(), 1);
    }
}
