//! Itinerary assembly.
//!
//! Combines bucketed days with trip-level metadata into a complete,
//! persistence-ready itinerary.

use chrono::Utc;

use crate::domain::{Day, Itinerary};
use crate::pipeline::bucket::date_key;

/// Trip-level inputs supplied by the caller alongside the raw generation
/// payload.
#[derive(Debug, Clone)]
pub struct TripRequest {
    pub user_id: String,
    pub city: String,
    /// Comma-separated interest labels as captured by the UI.
    pub interests: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Maps a destination name to an IANA timezone.
///
/// The default table-based resolver is a deliberate approximation; callers
/// with real geocoding swap in their own implementation.
pub trait TimezoneResolver: Send + Sync {
    fn resolve(&self, destination: &str) -> String;
}

/// Substring lookup over a small fixed destination table, defaulting to
/// Eastern time. Known limitation: this is not a geocoding service.
#[derive(Debug, Default)]
pub struct DestinationTableResolver;

const DESTINATION_ZONES: &[(&str, &str)] = &[
    ("los angeles", "America/Los_Angeles"),
    ("chicago", "America/Chicago"),
];

const DEFAULT_ZONE: &str = "America/New_York";

impl TimezoneResolver for DestinationTableResolver {
    fn resolve(&self, destination: &str) -> String {
        let needle = destination.to_lowercase();
        DESTINATION_ZONES
            .iter()
            .find(|(name, _)| needle.contains(name))
            .map(|(_, zone)| zone.to_string())
            .unwrap_or_else(|| DEFAULT_ZONE.to_string())
    }
}

/// Split a comma-separated interests string into a trimmed, non-empty list.
pub fn parse_interests(interests: &str) -> Vec<String> {
    interests
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Assemble the final itinerary. Explicit trip bounds win; otherwise bounds
/// derive from the first and last day (start of first, end of last). A
/// zero-day input passes through as a zero-day itinerary.
pub fn assemble(
    days: Vec<Day>,
    request: &TripRequest,
    upstream_timezone: Option<String>,
    resolver: &dyn TimezoneResolver,
) -> Itinerary {
    let now = Utc::now();
    let now_stamp = now.format("%Y-%m-%dT%H:%M:%S").to_string();

    let start_date = request.start_date.clone().unwrap_or_else(|| {
        days.first()
            .map(|d| format!("{}T00:00:00", date_key(&d.date)))
            .unwrap_or_else(|| now_stamp.clone())
    });
    let end_date = request.end_date.clone().unwrap_or_else(|| {
        days.last()
            .map(|d| format!("{}T23:59:59", date_key(&d.date)))
            .unwrap_or_else(|| now_stamp.clone())
    });

    let timezone = upstream_timezone
        .filter(|tz| !tz.trim().is_empty())
        .unwrap_or_else(|| resolver.resolve(&request.city));

    Itinerary {
        user_id: request.user_id.clone(),
        destination: request.city.clone(),
        start_date,
        end_date,
        interests: parse_interests(&request.interests),
        timezone,
        created_at: now,
        updated_at: now,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Day;

    fn request() -> TripRequest {
        TripRequest {
            user_id: "user-1".into(),
            city: "Seattle".into(),
            interests: "museums, food , ,hiking".into(),
            start_date: None,
            end_date: None,
        }
    }

    fn day(date: &str, number: usize) -> Day {
        Day {
            date: format!("{date}T00:00:00"),
            day_number: number,
            notes: None,
            activities: vec![],
        }
    }

    #[test]
    fn derives_bounds_from_first_and_last_day() {
        let itinerary = assemble(
            vec![day("2025-07-04", 1), day("2025-07-06", 2)],
            &request(),
            None,
            &DestinationTableResolver,
        );
        assert_eq!(itinerary.start_date, "2025-07-04T00:00:00");
        assert_eq!(itinerary.end_date, "2025-07-06T23:59:59");
    }

    #[test]
    fn explicit_bounds_win_over_derived() {
        let mut req = request();
        req.start_date = Some("2025-07-01T00:00:00".into());
        req.end_date = Some("2025-07-10T23:59:59".into());
        let itinerary = assemble(
            vec![day("2025-07-04", 1)],
            &req,
            None,
            &DestinationTableResolver,
        );
        assert_eq!(itinerary.start_date, "2025-07-01T00:00:00");
        assert_eq!(itinerary.end_date, "2025-07-10T23:59:59");
    }

    #[test]
    fn interests_are_trimmed_and_filtered() {
        let itinerary = assemble(vec![], &request(), None, &DestinationTableResolver);
        assert_eq!(itinerary.interests, vec!["museums", "food", "hiking"]);
    }

    #[test]
    fn upstream_timezone_wins_over_resolver() {
        let itinerary = assemble(
            vec![],
            &request(),
            Some("America/Denver".into()),
            &DestinationTableResolver,
        );
        assert_eq!(itinerary.timezone, "America/Denver");
    }

    #[test]
    fn destination_table_resolver_matches_substrings() {
        let resolver = DestinationTableResolver;
        assert_eq!(resolver.resolve("Los Angeles, CA"), "America/Los_Angeles");
        assert_eq!(resolver.resolve("downtown Chicago"), "America/Chicago");
        assert_eq!(resolver.resolve("New York"), "America/New_York");
        assert_eq!(resolver.resolve("Paris"), "America/New_York");
        // Cities merely containing "la" must not match the Pacific zone.
        assert_eq!(resolver.resolve("Atlanta"), "America/New_York");
    }

    #[test]
    fn zero_days_pass_through() {
        let itinerary = assemble(vec![], &request(), None, &DestinationTableResolver);
        assert!(itinerary.days.is_empty());
        assert_eq!(itinerary.start_date, itinerary.end_date);
    }

    #[test]
    fn created_and_updated_match_at_assembly() {
        let itinerary = assemble(vec![], &request(), None, &DestinationTableResolver);
        assert_eq!(itinerary.created_at, itinerary.updated_at);
    }
}
