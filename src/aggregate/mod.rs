//! Aggregation engine - pure functions over record slices.
//!
//! Everything here is side-effect-free and operates on a borrowed slice,
//! never the live store, so each function can be tested in isolation and
//! the view layer can compose them freely. Counts are exact integers; the
//! only floating-point step is the single divide-and-round in
//! [`percentage_of`].

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::record::ErrorRecord;

/// Occurrence count per key, in first-encounter order of the keys.
///
/// Accepts any iterator of record references so filtered subsets can be
/// counted without copying them first.
pub fn count_by<'a, I, K, F>(records: I, key_fn: F) -> Vec<(K, usize)>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
    K: Eq + Hash + Clone,
    F: Fn(&ErrorRecord) -> K,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    let mut order: Vec<K> = Vec::new();
    for record in records {
        let key = key_fn(record);
        if !counts.contains_key(&key) {
            order.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    order
        .into_iter()
        .map(|key| {
            let count = counts.remove(&key).unwrap_or(0);
            (key, count)
        })
        .collect()
}

/// The `n` keys with the highest counts, descending.
///
/// Ties keep first-encounter order from the input (stable sort). When `n`
/// exceeds the number of distinct keys, all keys are returned.
pub fn ranked_top_n<'a, I, K, F>(records: I, key_fn: F, n: usize) -> Vec<(K, usize)>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
    K: Eq + Hash + Clone,
    F: Fn(&ErrorRecord) -> K,
{
    let mut ranked = count_by(records, key_fn);
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(n);
    ranked
}

/// Share of `count` in `total` as a percentage, rounded to one decimal.
///
/// A zero total yields 0.0 rather than dividing by zero.
pub fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 * 100.0 / total as f64;
    (raw * 10.0).round() / 10.0
}

/// Unique values of a field, sorted by the supplied comparator.
pub fn distinct_sorted<K, F, C>(records: &[ErrorRecord], key_fn: F, mut comparator: C) -> Vec<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&ErrorRecord) -> K,
    C: FnMut(&K, &K) -> Ordering,
{
    let mut seen: HashSet<K> = HashSet::new();
    let mut values: Vec<K> = Vec::new();
    for record in records {
        let key = key_fn(record);
        if seen.insert(key.clone()) {
            values.push(key);
        }
    }
    values.sort_by(|a, b| comparator(a, b));
    values
}

/// Case-insensitive substring match against subject, topic, or exam source.
/// An empty query matches everything.
pub fn filter_by_text<'a>(records: &'a [ErrorRecord], query: &str) -> Vec<&'a ErrorRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.subject.to_lowercase().contains(&needle)
                || r.topic.to_lowercase().contains(&needle)
                || r.exam_source.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Exact-match subject filter. `None` or an empty subject passes all
/// records through.
pub fn filter_by_subject<'a>(
    records: &'a [ErrorRecord],
    subject: Option<&str>,
) -> Vec<&'a ErrorRecord> {
    match subject {
        Some(s) if !s.is_empty() => records.iter().filter(|r| r.subject == s).collect(),
        _ => records.iter().collect(),
    }
}

/// Count per year, ascending.
pub fn group_by_year<'a, I>(records: I) -> Vec<(i32, usize)>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    let mut grouped = count_by(records, |r| r.year);
    grouped.sort_by_key(|&(year, _)| year);
    grouped
}

/// Count per `"YYYY-MM"` period key, chronologically ascending. Keys are
/// zero-padded so lexicographic and chronological order coincide.
pub fn group_by_month_year<'a, I>(records: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a ErrorRecord>,
{
    let mut grouped = count_by(records, |r| format!("{:04}-{:02}", r.year, r.month));
    grouped.sort_by(|a, b| a.0.cmp(&b.0));
    grouped
}
