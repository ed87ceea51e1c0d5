use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core::error::EventError;
use crate::core::event::{InboundEvent, OutboundRender};
use crate::response::AppError;
use crate::state::AppState;

#[derive(Serialize)]
struct SuccessResponse<T> {
    success: bool,
    data: T,
}

/// Transport boundary: one inbound user event in, one rendering
/// instruction out.
pub async fn handle_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Response {
    let Some(controller) = state.controller() else {
        return AppError::service_unavailable("сервис временно недоступен").into_response();
    };

    let user_id = event.user_id;
    match controller.handle_event(event).await {
        Ok(render) => Json(SuccessResponse::<OutboundRender> {
            success: true,
            data: render,
        })
        .into_response(),
        Err(err) => {
            match &err {
                EventError::Store(store_err) => {
                    tracing::warn!(user_id, error = %store_err, "store failure while handling event");
                }
                EventError::NoActiveQuiz | EventError::UnhandledEvent => {
                    tracing::debug!(user_id, error = %err, "event rejected");
                }
            }
            AppError::from(&err).into_response()
        }
    }
}
