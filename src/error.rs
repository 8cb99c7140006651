use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation service returned no usable activities")]
    EmptyGenerationResult,

    #[error("Invalid selection: {index} index {value} out of bounds (len {len})")]
    InvalidSelection {
        index: SelectionIndex,
        value: usize,
        len: usize,
    },

    #[error("Stale selection: {index} index {value} no longer resolves against this itinerary")]
    StaleSelection { index: SelectionIndex, value: usize },

    #[error("Upstream service unavailable ({status}): {message}")]
    UpstreamServiceUnavailable { status: u16, message: String },
}

/// Which half of a `(dayIndex, activityIndex)` selection failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionIndex {
    Day,
    Activity,
}

impl std::fmt::Display for SelectionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionIndex::Day => write!(f, "day"),
            SelectionIndex::Activity => write!(f, "activity"),
        }
    }
}

pub type Result<T> = std::result::Result<T, ItineraryError>;
