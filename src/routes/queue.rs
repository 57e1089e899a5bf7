use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::history::HistoryWithLines,
    dto::queue::{CompleteRequest, EnqueueRequest, MoveRequest, QueueEntryWithServices, SnapshotList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::SnapshotQuery,
    services::{queue_service, settlement_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(snapshot).post(enqueue))
        .route("/{id}/move", post(move_entry))
        .route("/{id}", delete(cancel))
        .route("/{id}/services/{service_id}", delete(remove_queued_service))
        .route("/{id}/complete", post(complete))
}

#[utoipa::path(
    post,
    path = "/api/queue",
    request_body = EnqueueRequest,
    responses(
        (status = 200, description = "Join a barber's waiting line", body = ApiResponse<QueueEntryWithServices>),
        (status = 400, description = "Invalid barber or services"),
        (status = 409, description = "User already queued"),
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn enqueue(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EnqueueRequest>,
) -> AppResult<Json<ApiResponse<QueueEntryWithServices>>> {
    let resp = queue_service::enqueue(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/queue",
    params(
        ("barber_id" = Option<Uuid>, Query, description = "Restrict to one barber's line")
    ),
    responses(
        (status = 200, description = "Waiting entries with positions and estimated waits", body = ApiResponse<SnapshotList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn snapshot(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SnapshotQuery>,
) -> AppResult<Json<ApiResponse<SnapshotList>>> {
    let resp = queue_service::snapshot(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/queue/{id}/move",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Swap rank with the adjacent entry"),
        (status = 400, description = "Already at the boundary"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Entry not waiting"),
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn move_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = queue_service::move_entry(&state, &user, id, payload.direction).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/queue/{id}",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    responses(
        (status = 200, description = "Cancel a waiting entry"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Entry already terminal"),
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn cancel(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = queue_service::cancel(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/queue/{id}/services/{service_id}",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID"),
        ("service_id" = Uuid, Path, description = "Service ID to drop")
    ),
    responses(
        (status = 200, description = "Remove one requested service before completion"),
        (status = 400, description = "Cannot remove the last service"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn remove_queued_service(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, service_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = queue_service::remove_queued_service(&state, &user, id, service_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/queue/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Queue entry ID")
    ),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Settle the visit into history", body = ApiResponse<HistoryWithLines>),
        (status = 400, description = "Invalid services, products or installments"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Entry not waiting or insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn complete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteRequest>,
) -> AppResult<Json<ApiResponse<HistoryWithLines>>> {
    let resp = settlement_service::complete(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
