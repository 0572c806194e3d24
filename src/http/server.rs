//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one catch-all handler
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Keep middleware rejections JSON like every other body
//! - Decode JSON bodies for post and put
//! - Offer each request to the mounted resources in registration order
//! - Turn dispatch outcomes into 404 / 405 responses
//! - Serve over plain TCP or TLS with graceful shutdown

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::Request,
    middleware::map_response,
    response::Response,
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::http::response;
use crate::lifecycle::wait_for;
use crate::observability::metrics;
use crate::resource::{parse_url, Dispatch, Dispatcher, ResourceRegistry, ResourceRequest, Verb};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mounts: Arc<Vec<Arc<Dispatcher>>>,
    pub body_limit: usize,
}

/// HTTP host for the registered resources.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Mount every root resource of `registry`.
    pub fn new(config: ServiceConfig, registry: &ResourceRegistry) -> Self {
        let mounts = registry.mounts();
        for mount in &mounts {
            tracing::info!(
                resource = %mount.descriptor().name(),
                base_url = %mount.descriptor().base_url(),
                routes = ?mount.routes().keys(),
                "Resource mounted"
            );
        }

        let state = AppState {
            mounts: Arc::new(mounts),
            body_limit: config.security.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(resource_handler))
            .route("/{*path}", any(resource_handler))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(map_response(response::json_rejections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// In-flight requests get `timeouts.shutdown_secs` to finish; after that
    /// the server task is aborted.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let deadline = shutdown.resubscribe();
        let app = self.router;
        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(wait_for(shutdown))
                .await
        });

        tokio::select! {
            result = &mut server => return result.map_err(io::Error::other)?,
            _ = wait_for(deadline) => {}
        }

        match tokio::time::timeout(grace, &mut server).await {
            Ok(result) => result.map_err(io::Error::other)??,
            Err(_) => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, aborting");
                server.abort();
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve TLS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let grace = Duration::from_secs(self.config.timeouts.shutdown_secs);
        let stopper = handle.clone();
        tokio::spawn(async move {
            wait_for(shutdown).await;
            stopper.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Path relative to a mount at `base_url`, if the mount owns `path`.
fn mount_relative<'a>(base_url: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(base_url)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Metrics label for a dispatched request.
fn route_label(relative: &str, method: &str) -> String {
    let route = parse_url(relative).route;
    if route.is_empty() {
        method.to_string()
    } else {
        route
    }
}

/// Read and decode the body of post and put requests.
///
/// Other verbs never read the body. An empty body decodes to `None`.
async fn read_body(method: &str, body: Body, limit: usize) -> Result<Option<Value>, Response> {
    if !Verb::parse(method).is_some_and(|v| v.has_body()) {
        return Ok(None);
    }

    let bytes = to_bytes(body, limit)
        .await
        .map_err(|_| response::body_too_large(limit))?;
    if bytes.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| response::malformed_body(&e))
}

/// Catch-all handler: offers the request to each mount in turn.
async fn resource_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id();
    let raw_path = request.uri().path().to_string();
    let path = raw_path.to_lowercase();
    let method = request.method().as_str().to_lowercase();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %raw_path,
        "Dispatching request"
    );

    let body = match read_body(&method, request.into_body(), state.body_limit).await {
        Ok(body) => body,
        Err(rejection) => {
            tracing::info!(request_id = %request_id, status = %rejection.status(), "Body rejected");
            return rejection;
        }
    };

    for mount in state.mounts.iter() {
        let descriptor = mount.descriptor();
        let Some(relative) = mount_relative(descriptor.base_url(), &path) else {
            continue;
        };

        let resource_request = ResourceRequest {
            method: method.clone(),
            path: relative.to_string(),
            body: body.clone(),
            request_id: request_id.clone(),
        };
        match mount.dispatch(resource_request, None).await {
            Dispatch::Handled(response) => {
                let status = response.status();
                tracing::info!(
                    request_id = %request_id,
                    resource = %descriptor.name(),
                    status = %status,
                    "Request handled"
                );
                metrics::record_request(
                    descriptor.name(),
                    &route_label(relative, &method),
                    status.as_u16(),
                    start,
                );
                return response;
            }
            Dispatch::MethodNotAllowed { resource, allowed } => {
                tracing::info!(
                    request_id = %request_id,
                    resource = %resource,
                    method = %method,
                    "Method not allowed"
                );
                metrics::record_request(&resource, &method, 405, start);
                return response::method_not_allowed(&method, &allowed);
            }
            Dispatch::Next => continue,
        }
    }

    tracing::info!(request_id = %request_id, path = %raw_path, "No resource matched");
    metrics::record_unmatched();
    response::not_found(&raw_path)
}
