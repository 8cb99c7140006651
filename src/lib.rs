pub mod apis;
pub mod config;
pub mod domain;
pub mod edit;
pub mod error;
pub mod logging;
pub mod observability;
pub mod pipeline;
