use anyhow::Context;
use axum::Router;
use axum::routing::{get, patch, post};
use axum_prometheus::PrometheusMetricLayer;
use tokio::net;

use crate::domain::AppState;
use crate::infrastructure::http::handlers::{admin, course, health_check, session};

mod api;
mod auth;
mod handlers;
mod querystring;

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpServerConfig<'a> {
    pub port: &'a str,
}

/// The application's HTTP server. The underlying HTTP package is opaque to module consumers.
pub struct HttpServer {
    router: axum::Router,
    listener: net::TcpListener,
}

impl HttpServer {
    /// Returns a new HTTP server bound to the port specified in `config`.
    pub async fn new(state: impl AppState, config: HttpServerConfig<'_>) -> anyhow::Result<Self> {
        let trace_layer = tower_http::trace::TraceLayer::new_for_http().make_span_with(
            |request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                tracing::info_span!("http_request", method = ?request.method(), uri)
            },
        );
        // installs the global metrics recorder, so only once per process
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

        let router = app_router(state)
            .route("/metrics", get(|| async move { metric_handle.render() }))
            .layer(trace_layer)
            .layer(prometheus_layer);

        let listener = net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
            .await
            .with_context(|| format!("failed to listen on {}", config.port))?;

        Ok(Self { router, listener })
    }

    /// Runs the HTTP server.
    pub async fn run(self) -> anyhow::Result<()> {
        let address = self
            .listener
            .local_addr()
            .context("listener has no local address")?;
        tracing::info!("listening on {}", address);

        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}

/// Every route of the service, without the metrics layer.
pub fn app_router<S: AppState>(state: S) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route("/session", get(session::session_status::<S>))
        .route("/session/redeem", post(session::redeem::<S>))
        .route("/session/logout", post(session::logout::<S>))
        .route("/course", get(course::course_overview::<S>))
        .route("/course/chapters/{id}", get(course::open_chapter::<S>))
        .route(
            "/course/chapters/{id}/complete",
            post(course::complete_chapter::<S>),
        )
        .route(
            "/course/chapters/{id}/downloads/{index}",
            get(course::download::<S>),
        )
        .nest("/admin", admin_routes())
}

fn admin_routes<S: AppState>() -> Router<S> {
    Router::new()
        .route("/login", post(admin::login::<S>))
        .route(
            "/codes",
            get(admin::list_codes::<S>)
                .post(admin::generate_code::<S>)
                .delete(admin::reset_codes::<S>),
        )
        .route("/codes/{id}", axum::routing::delete(admin::delete_code::<S>))
        .route(
            "/course",
            get(admin::get_course::<S>).patch(admin::update_course::<S>),
        )
        .route("/course/chapters/{id}", patch(admin::update_chapter::<S>))
}
