//! Raw-event normalization.
//!
//! Converts one untyped event record from the external generation service
//! into a canonical activity candidate. Normalization never fails: every
//! missing or malformed field degrades to its sentinel, because the upstream
//! service is not under this system's control.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::domain::{GeoPoint, DEFAULT_TAG, NA};
use crate::observability::metrics;

/// One raw event as emitted by the generation service. Only `start_time` is
/// required; every other field is optional and shape-tolerant.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub start_time: String,
    #[serde(default, deserialize_with = "lenient")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: LocationField,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, deserialize_with = "lenient")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub source: Option<SourceRef>,
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// The known upstream shapes of the `location` field, matched in priority
/// order. Anything unrecognized falls through to `Other` and renders as the
/// `"N/A"` sentinel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum LocationField {
    Text(String),
    AddressCity { address: String, city: String },
    Venue { venue: String },
    Other(Value),
    #[default]
    Absent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Coordinates {
    #[serde(default, deserialize_with = "lenient")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub lng: f64,
}

/// Nested provenance object; only `url` is of interest here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceRef {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// A normalized activity awaiting day assignment. `order` is assigned by the
/// bucketer once the candidate's position within its day is known.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCandidate {
    pub name: String,
    pub location_name: String,
    pub location_geo: GeoPoint,
    pub time_start: String,
    pub time_end: String,
    pub tags: Vec<String>,
    pub description: String,
    pub url: Option<String>,
}

/// Deserialize a field, degrading to the default on shape mismatch instead
/// of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

impl RawEvent {
    /// Parse a raw JSON record into a `RawEvent`, or `None` when even the
    /// required `start_time` is missing or unusable.
    pub fn from_value(value: &Value) -> Option<RawEvent> {
        match RawEvent::deserialize(value) {
            Ok(event) => Some(event),
            Err(err) => {
                warn!("Skipping raw event without usable start_time: {err}");
                metrics::normalize::event_skipped();
                None
            }
        }
    }
}

/// Normalize one raw event into an activity candidate. Total: every absent
/// field degrades to its sentinel.
pub fn normalize_event(event: RawEvent) -> ActivityCandidate {
    let name = non_empty(event.name).unwrap_or_else(|| NA.to_string());
    let description = non_empty(event.description).unwrap_or_else(|| NA.to_string());

    let location_name = match event.location {
        LocationField::Text(text) => text,
        LocationField::AddressCity { address, city } => format!("{address}, {city}"),
        LocationField::Venue { venue } => venue,
        LocationField::Other(_) | LocationField::Absent => NA.to_string(),
    };

    let location_geo = match event.coordinates {
        Some(coords) => GeoPoint {
            latitude: coords.lat,
            longitude: coords.lng,
        },
        None => GeoPoint::UNPINNED,
    };

    // Upstream tags win; otherwise a single inferred tag.
    let tags = match event.tags {
        Some(tags) if !tags.is_empty() => tags,
        _ => {
            let inferred = event
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| classify(&name, &description).to_string());
            vec![inferred]
        }
    };

    let url = event
        .source
        .and_then(|s| s.url)
        .or(event.url)
        .and_then(non_empty_owned);

    metrics::normalize::event_normalized();

    ActivityCandidate {
        name,
        location_name,
        location_geo,
        time_start: event.start_time,
        time_end: event.end_time.unwrap_or_default(),
        tags,
        description,
        url,
    }
}

const RESTAURANT_KEYWORDS: &[&str] = &["restaurant", "cafe", "bakery", "dining", "food"];
const HOTEL_KEYWORDS: &[&str] = &["hotel", "resort", "accommodation"];

/// Keyword heuristic used when the upstream supplies neither tags nor a
/// category. Case-insensitive substring match, first category wins: a
/// restaurant inside a resort classifies as a restaurant.
pub fn classify(name: &str, description: &str) -> &'static str {
    let name = name.to_lowercase();
    let description = description.to_lowercase();
    let matches = |keywords: &[&str]| {
        keywords
            .iter()
            .any(|kw| name.contains(kw) || description.contains(kw))
    };

    if matches(RESTAURANT_KEYWORDS) {
        "restaurant"
    } else if matches(HOTEL_KEYWORDS) {
        "hotel"
    } else {
        DEFAULT_TAG
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn non_empty_owned(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
