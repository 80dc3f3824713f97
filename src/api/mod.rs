//! REST surface of the dashboard backend.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | ANY | `/proxy/{*subpath}` | Forward to the Kubernetes API server |
//! | GET | `/ingress` | Host of the dashboard Ingress |
//! | GET | `/endpoints` | Route and Ingress hosts of the dashboard |
//! | GET | `/properties` | Installation properties |
//! | GET | `/dashboard-version` | Dashboard version or `Unknown` |
//! | GET | `/pipeline-version` | Pipelines version or `Unknown` |

pub mod handlers;

use crate::config::Settings;
use crate::k8s::cluster::ClusterApi;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub cluster: Arc<dyn ClusterApi>,
    pub settings: Arc<Settings>,
}

impl ApiState {
    pub fn new(cluster: Arc<dyn ClusterApi>, settings: Settings) -> Self {
        Self {
            cluster,
            settings: Arc::new(settings),
        }
    }
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/proxy/{*subpath}",
            any(handlers::proxy).layer(DefaultBodyLimit::disable()),
        )
        .route("/ingress", get(handlers::get_ingress))
        .route("/endpoints", get(handlers::get_endpoints))
        .route("/properties", get(handlers::get_properties))
        .route("/dashboard-version", get(handlers::get_dashboard_version))
        .route("/pipeline-version", get(handlers::get_pipeline_version))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
