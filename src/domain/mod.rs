use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel string substituted for genuinely absent upstream text fields.
/// Consumers must treat it as "no value", never as literal display text.
pub const NA: &str = "N/A";

/// Default category assigned when neither the upstream tags, an explicit
/// category, nor the keyword classifier produce one.
pub const DEFAULT_TAG: &str = "attraction";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// The `{0, 0}` sentinel meaning "no map pin", not an actual coordinate.
    pub const UNPINNED: GeoPoint = GeoPoint {
        latitude: 0.0,
        longitude: 0.0,
    };

    pub fn is_unpinned(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// One scheduled stop within a day.
///
/// Timestamps stay ISO-8601 strings end to end: the date portion of the raw
/// `start_time` is authoritative for day bucketing, and converting through a
/// timezone-aware type would reintroduce the off-by-one-day drift the string
/// representation avoids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub name: String,
    pub location_name: String,
    pub location_geo: GeoPoint,
    pub time_start: String,
    pub time_end: String,
    /// Non-empty; the first tag drives icon/color selection downstream.
    pub tags: Vec<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Zero-based position within the parent day. For a day with N
    /// activities the values are exactly `0..N`.
    pub order: usize,
}

/// One calendar day of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// Calendar date at midnight, e.g. `2025-07-04T00:00:00`.
    pub date: String,
    /// 1-based position among the itinerary's days, strictly increasing
    /// with `date`.
    pub day_number: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub activities: Vec<Activity>,
}

/// One trip, exclusively owned by its `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub user_id: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub interests: Vec<String>,
    /// IANA zone used for display-time conversions for this trip.
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub days: Vec<Day>,
}

/// Ephemeral positional pointer into one itinerary snapshot.
///
/// Indices are positional, not IDs: the selection is invalidated the moment
/// the pointed-at day's activity list is mutated ahead of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub day_index: usize,
    pub activity_index: usize,
}

impl Day {
    /// Reassign `order` to `0..N` in current array order. Does not re-sort
    /// by time; manual edits may intentionally break chronological order.
    pub fn renumber(&mut self) {
        for (idx, activity) in self.activities.iter_mut().enumerate() {
            activity.order = idx;
        }
    }
}
