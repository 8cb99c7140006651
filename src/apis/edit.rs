//! Client for the conversational edit service.

use std::time::Duration;

use serde_json::json;
use tracing::{info, instrument};

use crate::apis::check_health;
use crate::config::Config;
use crate::domain::{Itinerary, Selection};
use crate::edit::{validate_selection, EditResponse};
use crate::error::{ItineraryError, Result};

pub struct EditClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl EditClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.itinerary_service.base_url.clone(),
            health_timeout: Duration::from_secs(config.itinerary_service.health_timeout_seconds),
            request_timeout: Duration::from_secs(config.itinerary_service.edit_timeout_seconds),
        }
    }

    /// Send one free-text edit request for the selected activity and parse
    /// the service's single-operation response.
    ///
    /// The selection is re-validated against this snapshot before any I/O;
    /// the selected activity is serialized back into the upstream wire shape
    /// so the service sees what it originally produced.
    #[instrument(skip(self, itinerary, edit_request), fields(destination = %itinerary.destination))]
    pub async fn request_edit(
        &self,
        itinerary: &Itinerary,
        selection: Selection,
        edit_request: &str,
    ) -> Result<EditResponse> {
        let selection = validate_selection(itinerary, selection)?;
        check_health(&self.client, &self.base_url, self.health_timeout).await?;

        let day = &itinerary.days[selection.day_index];
        let activity = &day.activities[selection.activity_index];

        let body = json!({
            "edit_request": edit_request,
            "current_activity": {
                "name": activity.name,
                "location": activity.location_name,
                "coordinates": {
                    "lat": activity.location_geo.latitude,
                    "lng": activity.location_geo.longitude,
                },
                "start_time": activity.time_start,
                "end_time": activity.time_end,
                "description": activity.description,
                "tags": activity.tags,
            },
            "city": itinerary.destination,
            "day_date": day.date,
            "interests": itinerary.interests,
        });

        let url = format!("{}/api/edit-itinerary", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ItineraryError::UpstreamServiceUnavailable { status, message });
        }

        let edit: EditResponse = response.json().await?;
        info!("Edit service proposed operation {:?}", edit.operation());
        Ok(edit)
    }
}
