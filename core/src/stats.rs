use std::cmp::Ordering;
use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{DashboardStats, Entry, TrendPoint};
use crate::ratio::round1;

/// Newest first; equal timestamps fall back to id so the order never depends
/// on the input order.
fn newest_first(a: &Entry, b: &Entry) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.id.cmp(&a.id))
}

/// Dashboard summary for a list of entries. The caller filters by user.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn get_stats(entries: &[Entry]) -> DashboardStats {
    if entries.is_empty() {
        return DashboardStats::default();
    }

    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| newest_first(a, b));
    let current = sorted[0];
    let previous = sorted.get(1);

    let weight_change = previous.map_or(0.0, |p| round1(current.weight - p.weight));
    let total_ratio: f64 = entries.iter().map(|e| e.ratio).sum();
    let count = entries.len();

    DashboardStats {
        current_weight: current.weight,
        weight_change,
        last_ratio: round1(current.ratio),
        avg_ratio: round1(total_ratio / count as f64),
        entries_count: count,
    }
}

/// A copy of `entries` ordered newest first, for history views.
#[must_use]
pub fn sorted_newest_first(entries: &[Entry]) -> Vec<Entry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(newest_first);
    sorted
}

/// Weight and metabolic series in chronological order, labelled in `tz`.
#[must_use]
pub fn trend_series<Tz>(entries: &[Entry], tz: &Tz) -> Vec<TrendPoint>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut sorted = sorted_newest_first(entries);
    sorted.reverse();
    sorted
        .into_iter()
        .map(|e| TrendPoint {
            date: format_short_date(&e.timestamp, tz),
            timestamp: e.timestamp,
            weight: e.weight,
            body_fat: e.body_fat_percentage,
            glucose: e.glucose,
            ketones: e.ketones,
            ratio: e.ratio,
        })
        .collect()
}

/// `Dec 10, 25`
#[must_use]
pub fn format_short_date<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    ts.with_timezone(tz).format("%b %-d, %y").to_string()
}
