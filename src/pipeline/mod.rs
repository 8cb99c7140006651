//! The generation transform pipeline: raw service payload in, canonical
//! itinerary out. Normalization, bucketing, and assembly each live in their
//! own module; this module wires them together as a single use case so the
//! transform exists in exactly one place.

pub mod assemble;
pub mod bucket;
pub mod normalize;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::domain::Itinerary;
use crate::error::{ItineraryError, Result};
use crate::observability::metrics;
use crate::pipeline::assemble::{assemble, DestinationTableResolver, TimezoneResolver, TripRequest};
use crate::pipeline::bucket::{bucket_days, DateRange};
use crate::pipeline::normalize::{normalize_event, RawEvent};

/// Final payload from the generation service, identical for the single-shot
/// and streaming variants. Events stay raw JSON here: individual records
/// are parsed leniently one at a time so one malformed event cannot sink
/// the batch.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationPayload {
    #[serde(default)]
    pub itinerary: Vec<Value>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Use case turning one complete generation payload into an itinerary.
pub struct GenerationPipeline {
    resolver: Box<dyn TimezoneResolver>,
}

impl Default for GenerationPipeline {
    fn default() -> Self {
        Self::new(Box::new(DestinationTableResolver))
    }
}

impl GenerationPipeline {
    pub fn new(resolver: Box<dyn TimezoneResolver>) -> Self {
        Self { resolver }
    }

    /// Run the full transform: normalize each event, bucket into days,
    /// assemble trip metadata.
    ///
    /// Fails with `EmptyGenerationResult` when the service produced no
    /// events or the date-range filter removed all of them; the caller
    /// surfaces that as a "no activities found" condition.
    #[instrument(skip(self, payload), fields(city = %request.city))]
    pub fn run(&self, payload: GenerationPayload, request: &TripRequest) -> Result<Itinerary> {
        if payload.itinerary.is_empty() {
            return Err(ItineraryError::EmptyGenerationResult);
        }

        let candidates: Vec<_> = payload
            .itinerary
            .iter()
            .filter_map(RawEvent::from_value)
            .map(normalize_event)
            .collect();

        let range = DateRange::from_bounds(
            request.start_date.as_deref(),
            request.end_date.as_deref(),
        );
        let days = bucket_days(candidates, &range);

        if days.is_empty() {
            return Err(ItineraryError::EmptyGenerationResult);
        }

        let itinerary = assemble(days, request, payload.timezone, self.resolver.as_ref());
        info!(
            "Assembled itinerary for {} with {} days",
            itinerary.destination,
            itinerary.days.len()
        );
        metrics::pipeline::itinerary_assembled(itinerary.days.len());
        Ok(itinerary)
    }
}
