//! SSE answer stream for the conversation service.
//!
//! Each `data:` payload is one JSON [`ResponseEnvelope`]. The stream ends
//! after an envelope with status `COMPLETED` or when the server closes the
//! connection. An envelope with status `FAILED` or `CANCELED` is still
//! yielded so its fragments reach the caller, then the stream ends with an
//! error. Unrecognized statuses count as in progress. Keep-alive events
//! without data are skipped.

use eventsource_stream::Eventsource;
use futures_util::StreamExt;

use cadet_core::chat::backend::EnvelopeStream;
use cadet_types::conversation::{BackendError, ResponseEnvelope, StreamStatus};

use super::client::{ensure_success, transport_error};
use super::types::StreamRequest;

/// Open a streaming answer for `body` at `url`.
///
/// Nothing is sent until the returned stream is first polled. The stream is
/// never reconnected.
pub fn create_envelope_stream(
    client: reqwest::Client,
    url: String,
    body: StreamRequest,
) -> EnvelopeStream {
    Box::pin(async_stream::try_stream! {
        let response = client
            .post(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let mut events = response.bytes_stream().eventsource();
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| BackendError::Stream(e.to_string()))?;
            if event.data.trim().is_empty() {
                continue;
            }

            let envelope = parse_envelope(&event.data)?;
            let finished = is_final(&envelope);
            yield envelope;
            if finished? {
                break;
            }
        }
    })
}

fn parse_envelope(data: &str) -> Result<ResponseEnvelope, BackendError> {
    serde_json::from_str(data)
        .map_err(|e| BackendError::Deserialization(format!("invalid answer envelope: {e}")))
}

/// `Ok(true)` once the answer is complete, an error if the server gave up on it.
fn is_final(envelope: &ResponseEnvelope) -> Result<bool, BackendError> {
    match envelope.status {
        Some(status @ (StreamStatus::Failed | StreamStatus::Canceled)) => Err(
            BackendError::Stream(format!("answer ended with status {status:?}")),
        ),
        _ => Ok(envelope.is_completed()),
    }
}
