//! Day bucketing.
//!
//! Groups normalized activity candidates into calendar days. The bucket key
//! is the date prefix of the raw `timeStart` string, not a timezone-aware
//! conversion: the date portion of the raw timestamp is the authoritative
//! local trip date, so viewers in other timezones see no day drift.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use tracing::debug;

use crate::domain::{Activity, Day};
use crate::observability::metrics;
use crate::pipeline::normalize::ActivityCandidate;

/// Inclusive calendar-date filter, both bounds optional. Keys compare
/// lexicographically, which is chronological for `YYYY-MM-DD`.
#[derive(Debug, Clone, Default)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    /// Build a range from optional ISO timestamps by taking their date
    /// prefix, e.g. `2025-06-02T00:00:00` becomes `2025-06-02`.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> DateRange {
        DateRange {
            start: start.map(|s| date_key(s).to_string()),
            end: end.map(|s| date_key(s).to_string()),
        }
    }

    fn contains(&self, key: &str) -> bool {
        if let Some(start) = &self.start {
            if key < start.as_str() {
                return false;
            }
        }
        if let Some(end) = &self.end {
            if key > end.as_str() {
                return false;
            }
        }
        true
    }
}

/// Extract the calendar-date portion of a raw timestamp string.
pub fn date_key(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Parse a timestamp for in-day ordering. Offset-carrying and naive ISO
/// forms both appear upstream; anything unparseable sorts first and keeps
/// its original relative position.
fn parse_instant(timestamp: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.naive_local())
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok())
}

/// Bucket candidates into sorted, order-normalized days.
///
/// Candidates outside the range are dropped, not clamped. A date with zero
/// surviving candidates produces no day at all; if the filter removes every
/// candidate the result is empty, which callers treat as a valid (if
/// useless) zero-day itinerary.
pub fn bucket_days(candidates: Vec<ActivityCandidate>, range: &DateRange) -> Vec<Day> {
    let mut buckets: BTreeMap<String, Vec<ActivityCandidate>> = BTreeMap::new();
    let mut dropped = 0usize;

    for candidate in candidates {
        let key = date_key(&candidate.time_start).to_string();
        if !range.contains(&key) {
            dropped += 1;
            continue;
        }
        buckets.entry(key).or_default().push(candidate);
    }

    if dropped > 0 {
        debug!("Range filter dropped {dropped} activities");
        metrics::bucket::activities_filtered(dropped);
    }

    let days: Vec<Day> = buckets
        .into_iter()
        .enumerate()
        .map(|(index, (key, mut items))| {
            // Stable sort: equal timestamps keep their upstream order.
            items.sort_by_key(|c| parse_instant(&c.time_start));

            let activities: Vec<Activity> = items
                .into_iter()
                .enumerate()
                .map(|(order, c)| Activity {
                    name: c.name,
                    location_name: c.location_name,
                    location_geo: c.location_geo,
                    time_start: c.time_start,
                    time_end: c.time_end,
                    tags: c.tags,
                    description: c.description,
                    url: c.url,
                    order,
                })
                .collect();

            Day {
                date: format!("{key}T00:00:00"),
                day_number: index + 1,
                notes: Some(format!(
                    "Day {}: {} activities planned",
                    index + 1,
                    activities.len()
                )),
                activities,
            }
        })
        .collect();

    metrics::bucket::days_produced(days.len());
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, DEFAULT_TAG, NA};

    fn candidate(name: &str, start: &str) -> ActivityCandidate {
        ActivityCandidate {
            name: name.into(),
            location_name: NA.into(),
            location_geo: GeoPoint::UNPINNED,
            time_start: start.into(),
            time_end: String::new(),
            tags: vec![DEFAULT_TAG.into()],
            description: NA.into(),
            url: None,
        }
    }

    #[test]
    fn groups_by_date_prefix_and_sorts_days() {
        let days = bucket_days(
            vec![
                candidate("Park", "2025-07-05T10:00:00"),
                candidate("Pier", "2025-07-04T09:00:00"),
                candidate("Museum", "2025-07-04T13:00:00"),
            ],
            &DateRange::default(),
        );

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2025-07-04T00:00:00");
        assert_eq!(days[0].day_number, 1);
        assert_eq!(days[1].date, "2025-07-05T00:00:00");
        assert_eq!(days[1].day_number, 2);

        let names: Vec<&str> = days[0].activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Pier", "Museum"]);
        assert_eq!(days[1].activities[0].name, "Park");
    }

    #[test]
    fn orders_are_contiguous_and_follow_time_sort() {
        let days = bucket_days(
            vec![
                candidate("Late", "2025-07-04T20:00:00"),
                candidate("Early", "2025-07-04T08:00:00"),
                candidate("Noon", "2025-07-04T12:00:00"),
            ],
            &DateRange::default(),
        );

        let day = &days[0];
        let names: Vec<&str> = day.activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Noon", "Late"]);
        let orders: Vec<usize> = day.activities.iter().map(|a| a.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn equal_timestamps_keep_upstream_order() {
        let days = bucket_days(
            vec![
                candidate("First", "2025-07-04T09:00:00"),
                candidate("Second", "2025-07-04T09:00:00"),
            ],
            &DateRange::default(),
        );
        let names: Vec<&str> = days[0].activities.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn inclusive_range_filter_drops_out_of_window_days() {
        let candidates: Vec<ActivityCandidate> = (1..=5)
            .map(|d| candidate(&format!("Stop {d}"), &format!("2025-06-0{d}T10:00:00")))
            .collect();

        let range = DateRange::from_bounds(
            Some("2025-06-02T00:00:00"),
            Some("2025-06-03T23:59:59"),
        );
        let days = bucket_days(candidates, &range);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2025-06-02T00:00:00");
        assert_eq!(days[1].date, "2025-06-03T00:00:00");
        let total: usize = days.iter().map(|d| d.activities.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn filter_removing_everything_yields_zero_days() {
        let range = DateRange::from_bounds(Some("2030-01-01"), Some("2030-01-02"));
        let days = bucket_days(vec![candidate("Pier", "2025-07-04T09:00:00")], &range);
        assert!(days.is_empty());
    }

    #[test]
    fn rebucketing_flattened_output_is_idempotent() {
        let first = bucket_days(
            vec![
                candidate("Park", "2025-07-05T10:00:00"),
                candidate("Pier", "2025-07-04T09:00:00"),
                candidate("Museum", "2025-07-04T13:00:00"),
            ],
            &DateRange::default(),
        );

        let flattened: Vec<ActivityCandidate> = first
            .iter()
            .flat_map(|d| d.activities.iter())
            .map(|a| ActivityCandidate {
                name: a.name.clone(),
                location_name: a.location_name.clone(),
                location_geo: a.location_geo,
                time_start: a.time_start.clone(),
                time_end: a.time_end.clone(),
                tags: a.tags.clone(),
                description: a.description.clone(),
                url: a.url.clone(),
            })
            .collect();

        let second = bucket_days(flattened, &DateRange::default());
        assert_eq!(first, second);
    }

    #[test]
    fn auto_notes_summarize_the_day() {
        let days = bucket_days(
            vec![
                candidate("Pier", "2025-07-04T09:00:00"),
                candidate("Museum", "2025-07-04T13:00:00"),
            ],
            &DateRange::default(),
        );
        assert_eq!(
            days[0].notes.as_deref(),
            Some("Day 1: 2 activities planned")
        );
    }
}
