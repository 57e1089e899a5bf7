use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::history::{HistoryList, HistoryWithLines},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::HistoryListQuery,
    services::history_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_history))
        .route("/{id}", get(get_history))
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("barber_id" = Option<Uuid>, Query, description = "Filter by barber"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List settled visits (admin only)", body = ApiResponse<HistoryList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn list_history(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryListQuery>,
) -> AppResult<Json<ApiResponse<HistoryList>>> {
    let resp = history_service::list_history(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/history/{id}",
    params(
        ("id" = Uuid, Path, description = "History ID")
    ),
    responses(
        (status = 200, description = "Settled visit with service and item lines", body = ApiResponse<HistoryWithLines>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "History"
)]
pub async fn get_history(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<HistoryWithLines>>> {
    let resp = history_service::get_history(&state, &user, id).await?;
    Ok(Json(resp))
}
