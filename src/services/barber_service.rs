use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::barbers::{BarberList, CreateBarberRequest, UpdateBarberRequest},
    entity::barbers::{ActiveModel, Column, Entity as Barbers, Model as BarberModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Barber, BarberStatus, QueueStatus},
    response::{ApiResponse, Meta},
    routes::params::BarberListQuery,
    state::AppState,
};

pub async fn list_barbers(state: &AppState, query: BarberListQuery) -> AppResult<ApiResponse<BarberList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status.as_str()));
    }

    let finder = Barbers::find().filter(condition).order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(barber_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Barbers", BarberList { items }, Some(meta)))
}

pub async fn get_barber(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Barber>> {
    let barber = Barbers::find_by_id(id).one(&state.orm).await?;
    let barber = match barber {
        Some(b) => barber_from_entity(b)?,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Barber", barber, None))
}

pub async fn create_barber(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBarberRequest,
) -> AppResult<ApiResponse<Barber>> {
    ensure_admin(user)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    let commission = payload.commission_rate_bps.unwrap_or(0);
    validate_commission(commission)?;

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        status: Set(BarberStatus::Active.as_str().to_string()),
        queue_status: Set(QueueStatus::Open.as_str().to_string()),
        commission_rate_bps: Set(commission),
        created_at: NotSet,
    };
    let barber = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "barber_create",
        Some("barbers"),
        Some(serde_json::json!({ "barber_id": barber.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Barber created",
        barber_from_entity(barber)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_barber(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBarberRequest,
) -> AppResult<ApiResponse<Barber>> {
    ensure_admin(user)?;
    let existing = Barbers::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(status) = payload.status {
        // Deactivation does not touch waiting entries; they stay serviceable,
        // the barber just stops admitting new ones.
        active.status = Set(status.as_str().to_string());
    }
    if let Some(queue_status) = payload.queue_status {
        active.queue_status = Set(queue_status.as_str().to_string());
    }
    if let Some(commission) = payload.commission_rate_bps {
        validate_commission(commission)?;
        active.commission_rate_bps = Set(commission);
    }

    let barber = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "barber_update",
        Some("barbers"),
        Some(serde_json::json!({ "barber_id": barber.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        barber_from_entity(barber)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_barber(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Barbers::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "barber_delete",
        Some("barbers"),
        Some(serde_json::json!({ "barber_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn validate_commission(bps: i32) -> Result<(), AppError> {
    if !(0..=10_000).contains(&bps) {
        return Err(AppError::Validation(
            "commission_rate_bps must be between 0 and 10000".into(),
        ));
    }
    Ok(())
}

pub(crate) fn barber_from_entity(model: BarberModel) -> AppResult<Barber> {
    let status = BarberStatus::from_str_opt(&model.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("bad barber status in db")))?;
    let queue_status = QueueStatus::from_str_opt(&model.queue_status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("bad queue status in db")))?;
    Ok(Barber {
        id: model.id,
        name: model.name,
        status,
        queue_status,
        commission_rate_bps: model.commission_rate_bps,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
