//! Patch application: apply one edit-service operation to an itinerary.
//!
//! Copy-on-write semantics throughout; the input itinerary is never mutated.
//! After any operation the affected day's `order` values are renumbered in
//! current array order. They are deliberately not re-sorted by time: a
//! manual edit may intentionally place an activity out of chronological
//! order, and the applicator trusts the operation's placement.

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{Activity, GeoPoint, Itinerary, Selection, DEFAULT_TAG, NA};
use crate::error::{ItineraryError, Result, SelectionIndex};
use crate::observability::metrics;
use crate::pipeline::normalize::Coordinates;

/// Fallback summary when the edit service omits one.
const DEFAULT_CHANGE_SUMMARY: &str = "Itinerary updated.";

/// Name given to an inserted activity the service left nameless.
const DEFAULT_NEW_ACTIVITY_NAME: &str = "New activity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOperation {
    Update,
    Add,
    Delete,
}

/// One single-activity edit as returned by the edit service. Activity
/// fields arrive in the upstream wire shape (`location` string,
/// `coordinates {lat, lng}`, snake_case times).
#[derive(Debug, Clone, Deserialize)]
pub struct EditResponse {
    #[serde(default)]
    pub operation: Option<EditOperation>,
    #[serde(default)]
    pub updated_activity: Option<ActivityPatch>,
    #[serde(default)]
    pub new_activity: Option<ActivityPatch>,
    #[serde(default)]
    pub change_summary: Option<String>,
}

/// Partial activity fields; absent fields leave the original untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Result of a successful patch application.
#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub itinerary: Itinerary,
    pub change_summary: String,
    pub operation: EditOperation,
}

impl EditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOperation::Update => "update",
            EditOperation::Add => "add",
            EditOperation::Delete => "delete",
        }
    }
}

impl EditResponse {
    /// The effective operation; services that send only `updated_activity`
    /// mean an update.
    pub fn operation(&self) -> EditOperation {
        self.operation.unwrap_or(EditOperation::Update)
    }
}

/// Apply one validated edit to an itinerary, returning a new itinerary with
/// the affected day renumbered and `updatedAt` refreshed.
///
/// The selection must have been validated against this snapshot; if the
/// referenced day or activity has since disappeared the apply fails with
/// `StaleSelection` instead of touching the wrong element.
pub fn apply_patch(
    itinerary: &Itinerary,
    selection: Selection,
    response: &EditResponse,
) -> Result<PatchOutcome> {
    let mut next = itinerary.clone();
    let operation = response.operation();

    let day = next
        .days
        .get_mut(selection.day_index)
        .ok_or(ItineraryError::StaleSelection {
            index: SelectionIndex::Day,
            value: selection.day_index,
        })?;
    if selection.activity_index >= day.activities.len() {
        return Err(ItineraryError::StaleSelection {
            index: SelectionIndex::Activity,
            value: selection.activity_index,
        });
    }

    match operation {
        EditOperation::Update => {
            if let Some(patch) = &response.updated_activity {
                let activity = &mut day.activities[selection.activity_index];
                apply_update(activity, patch);
            }
        }
        EditOperation::Add => {
            if let Some(patch) = &response.new_activity {
                let selected = &day.activities[selection.activity_index];
                let activity = build_inserted(patch, selected);
                day.activities.insert(selection.activity_index + 1, activity);
            }
        }
        EditOperation::Delete => {
            day.activities.remove(selection.activity_index);
        }
    }

    day.renumber();
    next.updated_at = Utc::now();

    debug!(
        "Applied {:?} at day {} activity {}",
        operation, selection.day_index, selection.activity_index
    );
    metrics::patch::applied(operation.as_str());

    Ok(PatchOutcome {
        itinerary: next,
        change_summary: response
            .change_summary
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CHANGE_SUMMARY.to_string()),
        operation,
    })
}

/// Partial-patch semantics: only fields present in the response overwrite
/// the existing activity.
fn apply_update(activity: &mut Activity, patch: &ActivityPatch) {
    if let Some(name) = &patch.name {
        activity.name = name.clone();
    }
    if let Some(location) = &patch.location {
        activity.location_name = location.clone();
    }
    if let Some(coords) = &patch.coordinates {
        activity.location_geo = GeoPoint {
            latitude: coords.lat,
            longitude: coords.lng,
        };
    }
    if let Some(start) = &patch.start_time {
        activity.time_start = start.clone();
    }
    if let Some(end) = &patch.end_time {
        activity.time_end = end.clone();
    }
    if let Some(tags) = &patch.tags {
        if !tags.is_empty() {
            activity.tags = tags.clone();
        }
    }
    if let Some(description) = &patch.description {
        activity.description = description.clone();
    }
    if let Some(url) = &patch.url {
        activity.url = Some(url.clone());
    }
}

/// Build the activity spliced in immediately after the selection. A missing
/// start time defaults to the selected activity's end time so the day's
/// timeline stays contiguous.
fn build_inserted(patch: &ActivityPatch, selected: &Activity) -> Activity {
    Activity {
        name: patch
            .name
            .clone()
            .unwrap_or_else(|| DEFAULT_NEW_ACTIVITY_NAME.to_string()),
        location_name: patch.location.clone().unwrap_or_else(|| NA.to_string()),
        location_geo: patch
            .coordinates
            .as_ref()
            .map(|c| GeoPoint {
                latitude: c.lat,
                longitude: c.lng,
            })
            .unwrap_or(GeoPoint::UNPINNED),
        time_start: patch
            .start_time
            .clone()
            .unwrap_or_else(|| selected.time_end.clone()),
        time_end: patch.end_time.clone().unwrap_or_default(),
        tags: patch
            .tags
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_TAG.to_string()]),
        description: patch.description.clone().unwrap_or_else(|| NA.to_string()),
        url: patch.url.clone(),
        // Placeholder; the whole day is renumbered right after the splice.
        order: 0,
    }
}
