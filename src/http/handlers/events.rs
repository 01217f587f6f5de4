use crate::domain::event::PaymentEvent;
use crate::http::error::error_response;
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn push_event(State(state): State<AppState>, Json(event): Json<PaymentEvent>) -> impl IntoResponse {
    let Some(publisher) = state.publisher.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "PUSH_DISABLED",
            "push ingestion is not the active event source",
            None,
        );
    };

    let event_id = event.event_id;
    match publisher.publish(event).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(serde_json::json!({"accepted": event_id}))).into_response(),
        Err(e) => error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "SUBSCRIPTION_CLOSED",
            "event subscription is closed",
            Some(e.to_string()),
        ),
    }
}
