//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single catch-all front controller
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Translate dispatch outcomes into HTTP responses
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - The active `Dispatcher` sits behind `ArcSwap`; reload swaps it
//!   without blocking in-flight requests
//! - Handlers are synchronous, so dispatch runs on the blocking pool
//! - Redirects are `302 Found`; handler failures become `500`

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{DispatcherConfig, ListenerConfig, TimeoutConfig};
use crate::dispatch::{DispatchOutcome, Dispatcher, HeaderSignal, MobileDetector, UserAgentDetector};
use crate::http::request::{request_id, UuidRequestId};

/// Application state injected into the front controller.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
    pub detector: Arc<dyn MobileDetector>,
}

/// HTTP server in front of a `Dispatcher`.
pub struct HttpServer {
    listener: ListenerConfig,
    timeouts: TimeoutConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a server for `dispatcher` using the bundled `User-Agent`
    /// detector.
    pub fn new(config: &DispatcherConfig, dispatcher: Dispatcher) -> Self {
        Self {
            listener: config.listener.clone(),
            timeouts: config.timeouts.clone(),
            state: AppState {
                dispatcher: Arc::new(ArcSwap::from_pointee(dispatcher)),
                detector: Arc::new(UserAgentDetector::default()),
            },
        }
    }

    /// Replace the mobile detector.
    pub fn with_detector(mut self, detector: Arc<dyn MobileDetector>) -> Self {
        self.state.detector = detector;
        self
    }

    /// Handle for swapping in a rebuilt dispatcher.
    pub fn dispatcher(&self) -> Arc<ArcSwap<Dispatcher>> {
        self.state.dispatcher.clone()
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn app(&self) -> Router {
        Router::new()
            .fallback(front_controller)
            .with_state(self.state.clone())
            .layer(DefaultBodyLimit::max(self.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(self.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the dispatcher.
async fn front_controller(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let dispatcher = state.dispatcher.load_full();
    let detector = state.detector.clone();
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let result = tokio::task::spawn_blocking(move || {
        let request = dispatcher.router().normalize(method.as_str(), &target, body);
        let signal = HeaderSignal::new(detector.as_ref(), &headers);
        dispatcher.dispatch(&request, &signal)
    })
    .await;

    match result {
        Ok(Ok(DispatchOutcome::Invoked(response))) => response,
        Ok(Ok(DispatchOutcome::Redirected(location))) => match HeaderValue::try_from(location.as_str()) {
            Ok(value) => {
                tracing::debug!(location = %location, "Redirecting");
                (StatusCode::FOUND, [(header::LOCATION, value)]).into_response()
            }
            Err(_) => {
                tracing::error!(location = ?location, "Redirect location is not a valid header value");
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
            }
        },
        Ok(Ok(DispatchOutcome::NotFound(err))) => {
            tracing::debug!(method = %err.method, path = %err.path, "No route matched");
            (StatusCode::NOT_FOUND, err.to_string()).into_response()
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Handler failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Handler failed").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Dispatch task aborted");
            (StatusCode::INTERNAL_SERVER_ERROR, "Handler failed").into_response()
        }
    }
}
