//! Server-Sent Events support

use super::types::SessionView;
use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init: SessionView,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move {
        Ok(to_axum(
            "init",
            json!({
                "type": "init",
                "session": init
            }),
        ))
    });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => {
            let (name, data) = event_payload(event);
            Some(Ok(to_axum(name, data)))
        }
        Err(_) => None, // Skip lagged messages
    });

    Sse::new(init.chain(broadcasts)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn event_payload(event: SseEvent) -> (&'static str, Value) {
    match event {
        SseEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        SseEvent::StateChange { state } => (
            "state_change",
            json!({
                "type": "state_change",
                "state": state,
                "activity": state.activity_name(),
                "is_classifying": state.is_classifying(),
                "is_submitting": state.is_submitting()
            }),
        ),
        SseEvent::Toast { toast } => (
            "toast",
            json!({
                "type": "toast",
                "toast": toast
            }),
        ),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}

fn to_axum(name: &str, data: Value) -> Event {
    Event::default().event(name).data(data.to_string())
}
