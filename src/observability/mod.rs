// Observability: pipeline counters behind the `metrics` facade.
//
// Only the facade is wired here; installing an exporter (or not) is the
// calling layer's decision.

pub mod metrics;
