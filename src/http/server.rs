//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with one catch-all handler
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Start the health monitor next to the listener
//! - Select a backend per request and release its slot per the release policy
//! - Render the dashboard or forward to the backend
//!
//! There is no admission control: every accepted request gets its own task.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode, Uri, Version},
    response::{Html, IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{BalancerConfig, DispatchMode, ReleasePolicy};
use crate::health::HealthMonitor;
use crate::http::dashboard::Dashboard;
use crate::load_balancer::{ServerPool, Selector};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<Selector>,
    pub dashboard: Dashboard,
    pub client: Client<HttpConnector, Body>,
    pub release_policy: ReleasePolicy,
    pub mode: DispatchMode,
}

/// HTTP front end of the load balancer.
pub struct HttpServer {
    router: Router,
    config: BalancerConfig,
    pool: Arc<ServerPool>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: BalancerConfig) -> Self {
        let pool = Arc::new(ServerPool::from_config(&config.servers));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            selector: Arc::new(Selector::new(pool.clone())),
            dashboard: Dashboard::new(config.template_path.clone()),
            client,
            release_policy: config.release_policy,
            mode: config.mode,
        };

        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &BalancerConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", any(dispatch_handler))
            .route("/{*path}", any(dispatch_handler))
            .with_state(state);

        // Without a timeout, requests queued behind a health cycle wait it out.
        if let Some(timeout) = config.request_timeout() {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The pool shared by the dispatcher and the health monitor.
    pub fn pool(&self) -> Arc<ServerPool> {
        self.pool.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let monitor = HealthMonitor::new(self.pool.clone(), &self.config);
        monitor.spawn(shutdown.resubscribe());

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server shutting down");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: select, respond, release.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        "Received request"
    );

    let reservation = match state.selector.acquire().await {
        Ok(reservation) => reservation,
        Err(e) => {
            metrics::record_request(method.as_str(), 503, start_time);
            return (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response();
        }
    };
    let server_url = reservation.url().to_string();

    let response = match state.release_policy {
        ReleasePolicy::Immediate => {
            reservation.release().await;
            respond(&state, &server_url, &request_id, request).await
        }
        ReleasePolicy::AfterResponse => {
            let response = respond(&state, &server_url, &request_id, request).await;
            reservation.release().await;
            response
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}

async fn respond(
    state: &AppState,
    server_url: &str,
    request_id: &str,
    request: Request<Body>,
) -> Response {
    match state.mode {
        DispatchMode::Dashboard => render_dashboard(state, server_url, request_id).await,
        DispatchMode::Proxy => forward(state, server_url, request_id, request).await,
    }
}

async fn render_dashboard(state: &AppState, server_url: &str, request_id: &str) -> Response {
    match state.dashboard.render(server_url).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Error loading template");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading template").into_response()
        }
    }
}

/// Forward the request to `server_url`, keeping method, path, query, headers and body.
async fn forward(
    state: &AppState,
    server_url: &str,
    request_id: &str,
    request: Request<Body>,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let target = format!("{}{}", server_url.trim_end_matches('/'), path_and_query);

    parts.uri = match target.parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, target = %target, error = %e, "Invalid upstream uri");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };
    parts.version = Version::HTTP_11;
    parts.headers.remove(header::HOST);

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, addr = %server_url, error = %e, "Upstream error");
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
