//! Server-Sent Events endpoint.
//!
//! Each connection is one observer. The stream starts with a `retry` hint,
//! then carries one `draft` event per successful draft. When the client goes
//! away axum drops the stream, which drops the subscription and removes the
//! observer from the hub.

use crate::handlers::AppState;
use crate::metrics::ConnectionMetricsGuard;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::stream::{self, Stream, StreamExt};
use huddle_core::{DraftEvent, Subscription};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// An SSE observer: the hub subscription plus its connection metrics.
struct SseObserver {
    subscription: Subscription,
    _metrics: ConnectionMetricsGuard,
}

/// Open an event stream.
pub async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let observer = SseObserver {
        subscription: state.room.subscribe(),
        _metrics: ConnectionMetricsGuard::new("sse"),
    };
    debug!(observer = %observer.subscription.id(), "SSE observer connected");

    let retry = Duration::from_millis(state.config.stream.retry_ms);
    let hello = stream::iter([Ok(Event::default().retry(retry))]);

    let events = stream::unfold(observer, |mut observer| async move {
        loop {
            let event = observer.subscription.recv().await?;
            match draft_event(&event) {
                Ok(frame) => return Some((Ok(frame), observer)),
                Err(e) => {
                    warn!(observer = %observer.subscription.id(), error = %e, "Failed to encode draft event");
                }
            }
        }
    });

    Sse::new(hello.chain(events)).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(state.config.stream.keep_alive_secs)),
    )
}

/// Encode a draft event as an SSE frame named after its kind.
pub fn draft_event(event: &DraftEvent) -> Result<Event, axum::Error> {
    Event::default().event(event.kind.as_str()).json_data(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_event_encodes() {
        assert!(draft_event(&DraftEvent::new(2, 1)).is_ok());
    }
}
