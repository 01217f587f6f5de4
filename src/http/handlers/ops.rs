use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

pub async fn liveness() -> impl IntoResponse {
    (axum::http::StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let push_ok = state.publisher.as_ref().map(|p| !p.is_closed()).unwrap_or(true);
    let status = if push_ok {
        axum::http::StatusCode::OK
    } else {
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(serde_json::json!({
            "ready": push_ok,
            "push_subscription": state.publisher.is_some(),
            "heatmap_version": state.heatmap_feed.current().version,
        })),
    )
        .into_response()
}
