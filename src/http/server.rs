//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with one catch-all dispatch handler
//! - Wire up middleware (request id, tracing, timeout)
//! - Run each dispatch on a blocking worker
//! - Swap the dispatcher when the configuration is reloaded
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::{Request, State},
    response::IntoResponse,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::dispatch::{ConfigurationError, Dispatcher};
use crate::http::request::{request_id, to_dispatch_request};
use crate::http::response::internal_error;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resolve::Registry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<ArcSwap<Dispatcher>>,
}

/// HTTP front end for the dispatcher.
pub struct HttpServer {
    router: Router,
    state: AppState,
    registry: Arc<Registry>,
}

impl HttpServer {
    /// Create a new HTTP server serving the controllers in `registry`.
    pub fn new(config: AppConfig, registry: Arc<Registry>) -> Result<Self, ConfigurationError> {
        let dispatcher = Dispatcher::from_config(&config, Arc::clone(&registry))?;
        let state = AppState {
            dispatcher: Arc::new(ArcSwap::from_pointee(dispatcher)),
        };
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            registry,
        })
    }

    /// Build the axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` is triggered.
    ///
    /// Each configuration received on `config_updates` replaces the
    /// dispatcher; listener and middleware settings need a restart.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: Option<mpsc::UnboundedReceiver<AppConfig>>,
        shutdown: Shutdown,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(updates) = config_updates {
            tokio::spawn(apply_updates(
                updates,
                Arc::clone(&self.state.dispatcher),
                Arc::clone(&self.registry),
                shutdown.clone(),
            ));
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown.signalled())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn apply_updates(
    mut updates: mpsc::UnboundedReceiver<AppConfig>,
    dispatcher: Arc<ArcSwap<Dispatcher>>,
    registry: Arc<Registry>,
    shutdown: Shutdown,
) {
    let mut stop = shutdown.subscribe();
    loop {
        tokio::select! {
            _ = stop.recv() => break,
            update = updates.recv() => {
                let Some(config) = update else { break };
                match Dispatcher::from_config(&config, Arc::clone(&registry)) {
                    Ok(next) => {
                        dispatcher.store(Arc::new(next));
                        tracing::info!("Dispatcher reloaded");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Rejected reloaded configuration, keeping current dispatcher");
                    }
                }
            }
        }
    }
}

/// Catch-all handler: every method and path is dispatched.
async fn dispatch_handler(State(state): State<AppState>, request: Request) -> axum::response::Response {
    let method = request.method().clone();
    let id = request_id(request.headers()).unwrap_or_else(|| "unknown".to_string());
    let dispatcher = state.dispatcher.load_full();
    let dispatch_request = to_dispatch_request(&dispatcher, &method, request.uri(), request.headers());

    tracing::debug!(request_id = %id, method = %method, url = %dispatch_request.url(), "Dispatching request");

    let span = tracing::Span::current();
    let joined = tokio::task::spawn_blocking(move || span.in_scope(|| dispatcher.dispatch(dispatch_request))).await;

    let response = match joined {
        Ok(Ok(report)) => report.response.into_response(),
        Ok(Err(_)) => internal_error(),
        Err(e) => {
            tracing::error!(request_id = %id, error = %e, "Dispatch task panicked");
            internal_error()
        }
    };

    metrics::record_http(method.as_str(), response.status().as_u16());
    response
}
