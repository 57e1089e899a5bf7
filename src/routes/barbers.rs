use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, put},
};
use uuid::Uuid;

use crate::{
    dto::barbers::{BarberList, CreateBarberRequest, UpdateBarberRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Barber,
    response::ApiResponse,
    routes::params::BarberListQuery,
    services::barber_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_barbers).post(create_barber))
        .route("/{id}", get(get_barber))
        .route("/{id}", put(update_barber))
        .route("/{id}", delete(delete_barber))
}

#[utoipa::path(
    get,
    path = "/api/barbers",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: active, inactive")
    ),
    responses(
        (status = 200, description = "List barbers", body = ApiResponse<BarberList>)
    ),
    tag = "Barbers"
)]
pub async fn list_barbers(
    State(state): State<AppState>,
    Query(query): Query<BarberListQuery>,
) -> AppResult<Json<ApiResponse<BarberList>>> {
    let resp = barber_service::list_barbers(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/barbers/{id}",
    params(
        ("id" = Uuid, Path, description = "Barber ID")
    ),
    responses(
        (status = 200, description = "Get barber", body = ApiResponse<Barber>),
        (status = 404, description = "Barber not found"),
    ),
    tag = "Barbers"
)]
pub async fn get_barber(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Barber>>> {
    let resp = barber_service::get_barber(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/barbers",
    request_body = CreateBarberRequest,
    responses(
        (status = 201, description = "Create barber", body = ApiResponse<Barber>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Barbers"
)]
pub async fn create_barber(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBarberRequest>,
) -> AppResult<Json<ApiResponse<Barber>>> {
    let resp = barber_service::create_barber(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/barbers/{id}",
    params(
        ("id" = Uuid, Path, description = "Barber ID")
    ),
    request_body = UpdateBarberRequest,
    responses(
        (status = 200, description = "Updated barber", body = ApiResponse<Barber>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Barbers"
)]
pub async fn update_barber(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBarberRequest>,
) -> AppResult<Json<ApiResponse<Barber>>> {
    let resp = barber_service::update_barber(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/barbers/{id}",
    params(
        ("id" = Uuid, Path, description = "Barber ID")
    ),
    responses(
        (status = 200, description = "Deleted barber"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Barbers"
)]
pub async fn delete_barber(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = barber_service::delete_barber(&state, &user, id).await?;
    Ok(Json(resp))
}
