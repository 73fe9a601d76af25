//! Event submission.

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::{Json, Router, routing::post};
use overseer_core::caller::Caller;
use overseer_core::error::DomainError;
use overseer_core::event::Event;
use overseer_core::receipt::Receipt;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_HEADER: &str = "x-overseer-user";

/// Header naming the actor the user is playing as.
pub const ACTOR_HEADER: &str = "x-overseer-actor";

/// Caller identity taken from request headers; `None` when no user header is
/// present. Authentication happens in front of this service.
#[derive(Debug)]
pub struct CallerIdentity(pub Option<Caller>);

impl<S: Send + Sync> FromRequestParts<S> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(user) = header(parts, USER_HEADER)? else {
            return Ok(Self(None));
        };
        let actor_id = header(parts, ACTOR_HEADER)?
            .map(|raw| {
                raw.parse::<Uuid>().map_err(|e| {
                    ApiError(DomainError::InvalidArgument(format!(
                        "{ACTOR_HEADER} is not a valid id: {e}"
                    )))
                })
            })
            .transpose()?;
        Ok(Self(Some(Caller::new(user, actor_id))))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<Option<&'a str>, ApiError> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| {
        ApiError(DomainError::InvalidArgument(format!(
            "{name} must be visible ASCII"
        )))
    })?;
    let value = value.trim();
    Ok((!value.is_empty()).then_some(value))
}

/// Response body for a processed submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// Every receipt delivered for the event, in delivery order.
    pub receipts: Vec<Receipt>,
}

/// POST /api/v1/events
#[instrument(
    skip(state, caller, event),
    fields(game_id = %event.game_id, actor_id = %event.actor_id)
)]
async fn submit_event(
    State(state): State<AppState>,
    CallerIdentity(caller): CallerIdentity,
    Json(event): Json<Event>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let stream = state.dispatcher.submit(caller.as_ref(), event).await?;
    let receipts = stream.collect_all().await;

    info!(receipts = receipts.len(), "submission processed");

    Ok(Json(SubmitResponse { receipts }))
}

/// Returns the router for event submission.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/v1/events", post(submit_event))
}
