use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::ToSocketAddrs;

use crate::encode;
use crate::metrics::{MetricFamily, Registry};

/// Runs one collection pass off the async runtime; sources may block.
async fn gather(registry: Arc<Registry>) -> Option<Vec<MetricFamily>> {
    match tokio::task::spawn_blocking(move || registry.gather()).await {
        Ok(families) => Some(families),
        Err(err) => {
            log::error!("metrics collection task failed: {}", err);
            None
        }
    }
}

async fn metrics_text(State(registry): State<Arc<Registry>>) -> Response {
    let Some(families) = gather(registry).await else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to collect metrics").into_response();
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, encode::text::CONTENT_TYPE)],
        encode::text::render(&families),
    )
        .into_response()
}

async fn metrics_json(State(registry): State<Arc<Registry>>) -> Response {
    let Some(families) = gather(registry).await else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to collect metrics").into_response();
    };

    (StatusCode::OK, Json(encode::json::render(&families))).into_response()
}

pub struct APIServer {
    router: axum::Router,
}

impl APIServer {
    pub fn new(registry: Arc<Registry>) -> Self {
        let router = axum::Router::new()
            .route("/metrics", get(metrics_text))
            .route("/metrics/json", get(metrics_json))
            .with_state(registry);
        Self { router }
    }

    pub fn router(&self) -> axum::Router {
        self.router.clone()
    }

    pub async fn listen(self, addr: impl ToSocketAddrs) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("serving metrics on {}", listener.local_addr()?);
        axum::serve(listener, self.router.into_make_service()).await
    }
}
