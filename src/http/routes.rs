use crate::http::handlers::{credentials, events, heatmap, ops};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ops/liveness", get(ops::liveness))
        .route("/ops/readiness", get(ops::readiness))
        .route("/scan", post(credentials::scan))
        .route("/credentials", post(credentials::issue_credential))
        .route("/events", post(events::push_event))
        .route("/heatmap", get(heatmap::get_heatmap))
        .route("/heatmap/export", get(heatmap::export_csv))
        .route("/heatmap/stats", get(heatmap::stats))
        .with_state(state)
}
