//! Audit trail endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::event_log::{EventLogEntry, EventQuery},
    AppState,
};

use super::AuthenticatedUser;

/// One page of audit entries
#[derive(Serialize, ToSchema)]
pub struct EventPageResponse {
    pub items: Vec<EventLogEntry>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// List audit entries, most recent first
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    security(("bearer_auth" = [])),
    params(EventQuery),
    responses(
        (status = 200, description = "Audit entries", body = EventPageResponse),
        (status = 400, description = "Invalid event kind"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<EventPageResponse>> {
    let page = state.services.events.list(&query).await?;

    Ok(Json(EventPageResponse {
        items: page.entries,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}
