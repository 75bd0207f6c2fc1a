//! Server-sent cache events, so open views can refresh after a mutation.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;

use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "Cache refresh events", body = String, content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("New SSE client connected");

    let stream = BroadcastStream::new(state.cache.subscribe()).filter_map(|result| async move {
        match result {
            Ok(event) => match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().event(event.name()).data(json))),
                Err(e) => {
                    tracing::warn!("Failed to serialize cache event: {}", e);
                    None
                }
            },
            Err(e) => {
                // Lagged receivers skip ahead; the next refresh carries the full list.
                tracing::warn!("SSE stream error: {:?}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
