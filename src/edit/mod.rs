//! Conversational edit flow: validate the selection, ask the edit service
//! for a patch, apply it. At most one edit per itinerary may be in flight;
//! serializing requests against a snapshot is the caller's contract, and a
//! `StaleSelection` failure means refetch and retry.

pub mod patch;
pub mod selection;

pub use patch::{apply_patch, ActivityPatch, EditOperation, EditResponse, PatchOutcome};
pub use selection::validate_selection;

use crate::apis::edit::EditClient;
use crate::domain::{Itinerary, Selection};
use crate::error::Result;

/// Full edit round trip against one itinerary snapshot.
pub async fn apply_edit(
    client: &EditClient,
    itinerary: &Itinerary,
    selection: Selection,
    edit_request: &str,
) -> Result<PatchOutcome> {
    let selection = validate_selection(itinerary, selection)?;
    let response = client.request_edit(itinerary, selection, edit_request).await?;
    apply_patch(itinerary, selection, &response)
}
