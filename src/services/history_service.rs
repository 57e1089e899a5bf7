use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use crate::{
    dto::history::{HistoryList, HistoryWithLines},
    entity::{
        histories::{Column as HistoryCol, Entity as Histories, Model as HistoryModel},
        history_items::{Column as HistoryItemCol, Entity as HistoryItems},
        history_services::{Column as HistoryServiceCol, Entity as HistoryServices},
    },
    error::{AppError, AppResult},
    fees::PaymentMethod,
    middleware::auth::{AuthUser, ensure_admin},
    models::{History, HistoryItem, HistoryService},
    response::{ApiResponse, Meta},
    routes::params::{HistoryListQuery, SortOrder},
    state::AppState,
};

pub async fn list_history(
    state: &AppState,
    user: &AuthUser,
    query: HistoryListQuery,
) -> AppResult<ApiResponse<HistoryList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(barber_id) = query.barber_id {
        condition = condition.add(HistoryCol::BarberId.eq(barber_id));
    }

    let mut finder = Histories::find().filter(condition);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(HistoryCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(HistoryCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(history_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("History", HistoryList { items }, Some(meta)))
}

pub async fn get_history(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<HistoryWithLines>> {
    ensure_admin(user)?;
    let history = Histories::find_by_id(id).one(&state.orm).await?;
    let history = match history {
        Some(h) => history_from_entity(h)?,
        None => return Err(AppError::NotFound),
    };

    let services = HistoryServices::find()
        .filter(HistoryServiceCol::HistoryId.eq(id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|line| HistoryService {
            id: line.id,
            history_id: line.history_id,
            service_id: line.service_id,
            price_cents: line.price_cents,
            is_extra: line.is_extra,
        })
        .collect();

    let items = HistoryItems::find()
        .filter(HistoryItemCol::HistoryId.eq(id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|line| HistoryItem {
            id: line.id,
            history_id: line.history_id,
            item_id: line.item_id,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        })
        .collect();

    Ok(ApiResponse::success(
        "History record",
        HistoryWithLines {
            history,
            services,
            items,
        },
        Some(Meta::empty()),
    ))
}

fn history_from_entity(model: HistoryModel) -> AppResult<History> {
    let payment_method = PaymentMethod::from_str_opt(&model.payment_method)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("bad payment method in db")))?;
    Ok(History {
        id: model.id,
        user_id: model.user_id,
        barber_id: model.barber_id,
        payment_method,
        installments: model.installments,
        gross_cents: model.gross_cents,
        fee_cents: model.fee_cents,
        net_cents: model.net_cents,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
