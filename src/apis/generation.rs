//! Client for the itinerary generation service.
//!
//! Two modes against the same final payload shape: a single blocking POST,
//! and a server-sent-events stream that reports progress frames before one
//! `complete` frame. In both modes the transform pipeline runs exactly once,
//! on the final payload; partial results are never transformed.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::apis::check_health;
use crate::config::Config;
use crate::error::{ItineraryError, Result};
use crate::pipeline::assemble::TripRequest;
use crate::pipeline::GenerationPayload;

/// Wire request for both generation endpoints.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    city: &'a str,
    interests: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<&'a str>,
}

/// One `progress` frame from the streaming endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub phase: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub percent: Option<f64>,
}

/// Receives progress frames while a streaming generation is in flight.
#[async_trait]
pub trait ProgressObserver: Send + Sync {
    async fn on_progress(&self, update: ProgressUpdate);
}

/// Observer that drops every update, for callers that only want the final
/// payload.
pub struct NoopObserver;

#[async_trait]
impl ProgressObserver for NoopObserver {
    async fn on_progress(&self, _update: ProgressUpdate) {}
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StreamFrame {
    Progress(ProgressUpdate),
    Complete {
        data: Value,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Split complete lines off the front of the buffer and parse their
/// `data: ` frames. The trailing partial line stays buffered until the next
/// chunk completes it; non-`data:` lines and unparseable frames are skipped,
/// matching the tolerant consumer contract for this stream.
fn drain_frames(buffer: &mut String) -> Vec<StreamFrame> {
    let mut frames = Vec::new();
    while let Some(newline) = buffer.find('\n') {
        let line = buffer[..newline].trim().to_string();
        buffer.drain(..=newline);

        let Some(data) = line.strip_prefix("data: ") else {
            continue;
        };
        match serde_json::from_str::<StreamFrame>(data) {
            Ok(frame) => frames.push(frame),
            Err(err) => warn!("Ignoring unparseable stream frame: {err}"),
        }
    }
    frames
}

pub struct GenerationClient {
    client: reqwest::Client,
    base_url: String,
    health_timeout: Duration,
    request_timeout: Duration,
}

impl GenerationClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.itinerary_service.base_url.clone(),
            health_timeout: Duration::from_secs(config.itinerary_service.health_timeout_seconds),
            request_timeout: Duration::from_secs(
                config.itinerary_service.generation_timeout_seconds,
            ),
        }
    }

    /// Single-shot generation: one blocking POST returning the complete
    /// payload.
    #[instrument(skip(self, request), fields(city = %request.city))]
    pub async fn generate(
        &self,
        request: &TripRequest,
        max_results: u32,
    ) -> Result<GenerationPayload> {
        check_health(&self.client, &self.base_url, self.health_timeout).await?;
        info!("Generation service is up, requesting itinerary");

        let url = format!("{}/api/generate-itinerary", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&GenerateRequest {
                city: &request.city,
                interests: &request.interests,
                max_results: Some(max_results),
                start_date: request.start_date.as_deref(),
                end_date: request.end_date.as_deref(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ItineraryError::UpstreamServiceUnavailable { status, message });
        }

        let payload: GenerationPayload = response.json().await?;
        info!(
            "Generation service returned {} raw events",
            payload.itinerary.len()
        );
        Ok(payload)
    }

    /// Streaming generation: consume SSE frames, forwarding `progress` to
    /// the observer, and return the payload carried by the `complete` frame.
    #[instrument(skip(self, request, observer), fields(city = %request.city))]
    pub async fn generate_streaming(
        &self,
        request: &TripRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationPayload> {
        check_health(&self.client, &self.base_url, self.health_timeout).await?;

        let url = format!("{}/api/generate-itinerary-stream", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.request_timeout)
            .json(&GenerateRequest {
                city: &request.city,
                interests: &request.interests,
                max_results: None,
                start_date: request.start_date.as_deref(),
                end_date: request.end_date.as_deref(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ItineraryError::UpstreamServiceUnavailable { status, message });
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut final_payload: Option<Value> = None;

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            for frame in drain_frames(&mut buffer) {
                match frame {
                    StreamFrame::Progress(update) => {
                        debug!(
                            "Generation progress: {}",
                            update.message.as_deref().unwrap_or("(no message)")
                        );
                        observer.on_progress(update).await;
                    }
                    StreamFrame::Complete { data } => {
                        final_payload = Some(data);
                        break 'outer;
                    }
                    StreamFrame::Error { message } => {
                        return Err(ItineraryError::UpstreamServiceUnavailable {
                            status: 0,
                            message: message
                                .unwrap_or_else(|| "generation stream reported an error".into()),
                        });
                    }
                }
            }
        }

        let data = final_payload.ok_or(ItineraryError::UpstreamServiceUnavailable {
            status: 0,
            message: "generation stream ended without a complete frame".into(),
        })?;

        // The complete frame carries its own success flag plus the payload.
        if data.get("success").and_then(Value::as_bool) == Some(false) {
            let message = data
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("generation failed")
                .to_string();
            return Err(ItineraryError::UpstreamServiceUnavailable { status: 0, message });
        }

        let payload = GenerationPayload::deserialize(&data)?;
        info!(
            "Streaming generation completed with {} raw events",
            payload.itinerary.len()
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn progress_frame_parses() {
        let frame: StreamFrame = serde_json::from_str(
            r#"{"type":"progress","phase":"scout","message":"Scouting","percent":40}"#,
        )
        .unwrap();
        match frame {
            StreamFrame::Progress(update) => {
                assert_eq!(update.phase.as_deref(), Some("scout"));
                assert_eq!(update.percent, Some(40.0));
            }
            other => panic!("expected progress frame, got {other:?}"),
        }
    }

    #[test]
    fn complete_frame_carries_payload() {
        let frame: StreamFrame = serde_json::from_value(json!({
            "type": "complete",
            "data": {
                "success": true,
                "itinerary": [{ "start_time": "2025-07-04T09:00:00" }],
                "timezone": "America/Chicago"
            }
        }))
        .unwrap();
        match frame {
            StreamFrame::Complete { data } => {
                let payload = GenerationPayload::deserialize(&data).unwrap();
                assert_eq!(payload.itinerary.len(), 1);
                assert_eq!(payload.timezone.as_deref(), Some("America/Chicago"));
            }
            other => panic!("expected complete frame, got {other:?}"),
        }
    }

    #[test]
    fn error_frame_parses_without_message() {
        let frame: StreamFrame = serde_json::from_str(r#"{"type":"error"}"#).unwrap();
        assert!(matches!(frame, StreamFrame::Error { message: None }));
    }

    #[test]
    fn frame_split_across_chunks_reassembles() {
        let mut buffer = String::from(r#"data: {"type":"progress","mes"#);
        assert!(drain_frames(&mut buffer).is_empty());
        // The partial line is still buffered, waiting for the rest.
        assert!(!buffer.is_empty());

        buffer.push_str("sage\":\"Scouting\",\"percent\":40}\n\n");
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            StreamFrame::Progress(update) => {
                assert_eq!(update.message.as_deref(), Some("Scouting"));
                assert_eq!(update.percent, Some(40.0));
            }
            other => panic!("expected progress frame, got {other:?}"),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn multiple_frames_in_one_chunk_all_drain() {
        let mut buffer = String::from(
            "data: {\"type\":\"progress\",\"phase\":\"scout\"}\n\ndata: {\"type\":\"error\"}\n\n",
        );
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], StreamFrame::Progress(_)));
        assert!(matches!(frames[1], StreamFrame::Error { .. }));
    }

    #[test]
    fn unparseable_and_foreign_lines_are_skipped() {
        let mut buffer = String::from(
            "retry: 100\ndata: {oops\ndata: {\"type\":\"complete\",\"data\":{\"itinerary\":[]}}\n",
        );
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames.len(), 1);
        assert!(matches!(frames[0], StreamFrame::Complete { .. }));
        assert!(buffer.is_empty());
    }

    #[test]
    fn crlf_delimited_frames_parse() {
        let mut buffer = String::from("data: {\"type\":\"error\",\"message\":\"boom\"}\r\n\r\n");
        let frames = drain_frames(&mut buffer);
        assert_eq!(frames.len(), 1);
        match &frames[0] {
            StreamFrame::Error { message } => assert_eq!(message.as_deref(), Some("boom")),
            other => panic!("expected error frame, got {other:?}"),
        }
    }
}
