use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Extension,
};
use futures::stream::{self, Stream};
use mentionwatch_monitor::BrandEvent;
use tokio::sync::broadcast::{error::RecvError, Receiver};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// `GET /api/v1/brands/{brand}/events`: live `new_mention` and
/// `spike_detected` events for one tracked brand.
pub(super) async fn brand_events(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand): Path<String>,
) -> Response {
    let Some(brand) = state.tracked_brand(&brand) else {
        return ApiError::new(
            req_id.0,
            "not_found",
            format!("brand '{brand}' is not tracked"),
        )
        .into_response();
    };

    let receiver = state.publisher.subscribe(brand);
    tracing::info!(brand = %brand, request_id = %req_id.0, "event subscriber connected");

    Sse::new(event_stream(receiver))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
        .into_response()
}

/// Adapt a broadcast receiver into an SSE stream. Lagged receivers skip the
/// missed events and continue; the stream ends when the publisher is dropped.
fn event_stream(
    receiver: Receiver<Arc<BrandEvent>>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => match to_sse(&event) {
                    Some(sse) => return Some((Ok(sse), receiver)),
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged; events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

fn to_sse(event: &BrandEvent) -> Option<Event> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(sse),
        Err(e) => {
            tracing::warn!(event = event.name(), error = %e, "failed to encode event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use futures::StreamExt;
    use mentionwatch_core::{Alert, SpikeWindowStat, TrackedBrand};
    use mentionwatch_monitor::{BroadcastPublisher, EventPublisher};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::api::build_app;

    fn state() -> AppState {
        AppState {
            pool: PgPoolOptions::new()
                .connect_lazy("postgres://mentionwatch@127.0.0.1:1/mentionwatch")
                .expect("lazy pool"),
            publisher: Arc::new(BroadcastPublisher::default()),
            brands: vec![TrackedBrand::new("Tesla")].into(),
        }
    }

    fn spike_alert() -> Alert {
        Alert::spike(
            &SpikeWindowStat {
                brand: TrackedBrand::new("Tesla"),
                current_hour_count: 25,
                previous_hour_count: 4,
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn untracked_brand_is_not_found() {
        let app = build_app(state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/brands/Nokia/events")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tracked_brand_opens_event_stream() {
        let state = state();
        let publisher = Arc::clone(&state.publisher);
        let app = build_app(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/brands/tesla/events")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("text/event-stream")
        );
        assert_eq!(publisher.subscriber_count(&TrackedBrand::new("Tesla")), 1);
    }

    #[tokio::test]
    async fn stream_yields_published_events() {
        let publisher = BroadcastPublisher::default();
        let brand = TrackedBrand::new("Tesla");
        let mut events = Box::pin(event_stream(publisher.subscribe(&brand)));

        publisher
            .publish_alert(&brand, spike_alert())
            .await
            .expect("publish");

        let next = events.next().await;
        assert!(matches!(next, Some(Ok(_))));
    }

    #[tokio::test]
    async fn stream_ends_when_publisher_is_dropped() {
        let publisher = BroadcastPublisher::default();
        let mut events = Box::pin(event_stream(publisher.subscribe(&TrackedBrand::new("Tesla"))));
        drop(publisher);
        assert!(events.next().await.is_none());
    }

    #[test]
    fn events_encode_with_their_wire_name() {
        let event = BrandEvent::SpikeDetected(spike_alert());
        assert!(to_sse(&event).is_some());
        assert_eq!(event.name(), "spike_detected");
    }
}
