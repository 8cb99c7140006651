//! Selection validation: the sole gate against out-of-bounds mutation.

use crate::domain::{Itinerary, Selection};
use crate::error::{ItineraryError, Result, SelectionIndex};

/// Confirm both indices of a selection are in bounds against this exact
/// itinerary snapshot. Must run before any patch is attempted.
pub fn validate_selection(itinerary: &Itinerary, selection: Selection) -> Result<Selection> {
    let days = &itinerary.days;
    if selection.day_index >= days.len() {
        return Err(ItineraryError::InvalidSelection {
            index: SelectionIndex::Day,
            value: selection.day_index,
            len: days.len(),
        });
    }

    let activities = &days[selection.day_index].activities;
    if selection.activity_index >= activities.len() {
        return Err(ItineraryError::InvalidSelection {
            index: SelectionIndex::Activity,
            value: selection.activity_index,
            len: activities.len(),
        });
    }

    Ok(selection)
}
