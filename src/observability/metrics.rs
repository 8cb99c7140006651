//! Metric recording helpers, namespaced by pipeline phase.
//!
//! Names follow Prometheus conventions (`tripweaver_<phase>_<what>_total`).

/// Normalize phase: raw events in, activity candidates out.
pub mod normalize {
    pub fn event_normalized() {
        ::metrics::counter!("tripweaver_normalize_events_total").increment(1);
    }

    /// An event missing its required start time was dropped.
    pub fn event_skipped() {
        ::metrics::counter!("tripweaver_normalize_events_skipped_total").increment(1);
    }
}

/// Bucket phase: candidates grouped into days.
pub mod bucket {
    pub fn activities_filtered(count: usize) {
        ::metrics::counter!("tripweaver_bucket_activities_filtered_total")
            .increment(count as u64);
    }

    pub fn days_produced(count: usize) {
        ::metrics::histogram!("tripweaver_bucket_days_per_itinerary").record(count as f64);
    }
}

/// Whole-pipeline outcomes.
pub mod pipeline {
    pub fn itinerary_assembled(days: usize) {
        ::metrics::counter!("tripweaver_pipeline_itineraries_total").increment(1);
        ::metrics::histogram!("tripweaver_pipeline_days_per_itinerary").record(days as f64);
    }
}

/// Patch application outcomes, labeled by operation.
pub mod patch {
    pub fn applied(operation: &'static str) {
        ::metrics::counter!("tripweaver_patch_applied_total", "operation" => operation)
            .increment(1);
    }
}
