use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::history::HistoryWithLines,
    dto::queue::CompleteRequest,
    entity::{
        histories::ActiveModel as HistoryActive,
        history_items::ActiveModel as HistoryItemActive,
        history_services::ActiveModel as HistoryServiceActive,
        items::{Column as ItemCol, Entity as Items},
        queue_entries::{Column as EntryCol, Entity as QueueEntries},
        services::{Column as ServiceCol, Entity as Services},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    fees,
    middleware::auth::{AuthUser, ensure_admin},
    models::{EntryStatus, History, HistoryItem, HistoryService},
    notify::QueueEvent,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Settle a waiting entry into History, exactly once: flip the entry status,
/// decrement stock, and write the ledger rows in a single transaction.
pub async fn complete(
    state: &AppState,
    user: &AuthUser,
    entry_id: Uuid,
    payload: CompleteRequest,
) -> AppResult<ApiResponse<HistoryWithLines>> {
    ensure_admin(user)?;

    let installments = payload.installments.unwrap_or(1);
    let rate_bps = state.fees.rate_bps(payload.payment_method, installments)?;

    if payload.service_ids.is_empty()
        && payload.extra_service_ids.is_empty()
        && payload.products.is_empty()
    {
        return Err(AppError::Validation(
            "completion must bill at least one service or product".into(),
        ));
    }
    for line in &payload.products {
        if line.quantity <= 0 {
            return Err(AppError::Validation(
                "product quantity must be positive".into(),
            ));
        }
    }

    let txn = state.orm.begin().await?;

    // Terminal states are final. The conditional update is the sole gate
    // against a concurrent double completion: the loser sees zero rows.
    let res = QueueEntries::update_many()
        .col_expr(EntryCol::Status, Expr::value(EntryStatus::Completed.as_str()))
        .filter(EntryCol::Id.eq(entry_id))
        .filter(EntryCol::Status.eq(EntryStatus::Waiting.as_str()))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "queue entry does not exist or is not waiting".into(),
        ));
    }
    let entry = QueueEntries::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("queue entry vanished mid-transaction")))?;

    let mut service_ids: Vec<Uuid> = payload
        .service_ids
        .iter()
        .chain(payload.extra_service_ids.iter())
        .copied()
        .collect();
    service_ids.sort();
    service_ids.dedup();
    let services_by_id: HashMap<Uuid, _> = Services::find()
        .filter(ServiceCol::Id.is_in(service_ids.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    for id in &service_ids {
        if !services_by_id.contains_key(id) {
            return Err(AppError::Validation(format!("unknown service id {id}")));
        }
    }

    let mut item_ids: Vec<Uuid> = payload.products.iter().map(|p| p.item_id).collect();
    item_ids.sort();
    item_ids.dedup();
    let items_by_id: HashMap<Uuid, _> = Items::find()
        .filter(ItemCol::Id.is_in(item_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|i| (i.id, i))
        .collect();

    let mut gross_cents: i64 = 0;

    // (service_id, price at completion, is_extra)
    let mut service_lines: Vec<(Uuid, i64, bool)> = Vec::new();
    for (ids, is_extra) in [
        (&payload.service_ids, false),
        (&payload.extra_service_ids, true),
    ] {
        for id in ids {
            let service = &services_by_id[id];
            gross_cents += service.price_cents;
            service_lines.push((service.id, service.price_cents, is_extra));
        }
    }

    for line in &payload.products {
        let item = items_by_id
            .get(&line.item_id)
            .ok_or_else(|| AppError::Validation(format!("unknown item id {}", line.item_id)))?;

        // Conditional decrement: never lets stock go negative, even with a
        // concurrent completion drawing from the same item.
        let res = Items::update_many()
            .col_expr(ItemCol::Stock, Expr::col(ItemCol::Stock).sub(line.quantity))
            .filter(ItemCol::Id.eq(line.item_id))
            .filter(ItemCol::Stock.gte(line.quantity))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::InsufficientStock(format!(
                "insufficient stock for {}",
                item.name
            )));
        }

        gross_cents += item.price_cents * line.quantity as i64;
    }

    // Fee rounds once, on the summed gross, never per line.
    let fee_cents = fees::fee_cents(gross_cents, rate_bps);
    let net_cents = gross_cents - fee_cents;

    let history_id = Uuid::new_v4();
    let history = HistoryActive {
        id: Set(history_id),
        user_id: Set(entry.user_id),
        barber_id: Set(entry.barber_id),
        payment_method: Set(payload.payment_method.as_str().to_string()),
        installments: Set(installments),
        gross_cents: Set(gross_cents),
        fee_cents: Set(fee_cents),
        net_cents: Set(net_cents),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut history_services: Vec<HistoryService> = Vec::new();
    for (service_id, price_cents, is_extra) in service_lines {
        let line = HistoryServiceActive {
            id: Set(Uuid::new_v4()),
            history_id: Set(history_id),
            service_id: Set(service_id),
            price_cents: Set(price_cents),
            is_extra: Set(is_extra),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        history_services.push(HistoryService {
            id: line.id,
            history_id: line.history_id,
            service_id: line.service_id,
            price_cents: line.price_cents,
            is_extra: line.is_extra,
        });
    }

    let mut history_items: Vec<HistoryItem> = Vec::new();
    for line in &payload.products {
        let item = &items_by_id[&line.item_id];
        let row = HistoryItemActive {
            id: Set(Uuid::new_v4()),
            history_id: Set(history_id),
            item_id: Set(line.item_id),
            quantity: Set(line.quantity),
            unit_price_cents: Set(item.price_cents),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        history_items.push(HistoryItem {
            id: row.id,
            history_id: row.history_id,
            item_id: row.item_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        });
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "queue_complete",
        Some("histories"),
        Some(serde_json::json!({
            "entry_id": entry_id,
            "history_id": history_id,
            "gross_cents": gross_cents,
            "fee_cents": fee_cents,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let recipient = Users::find_by_id(entry.user_id)
        .one(&state.orm)
        .await
        .ok()
        .flatten()
        .and_then(|u| u.phone);
    state.notifier.queue_event(
        recipient,
        QueueEvent::Completed {
            entry_id,
            net_cents,
        },
    );

    Ok(ApiResponse::success(
        "Visit settled",
        HistoryWithLines {
            history: History {
                id: history.id,
                user_id: history.user_id,
                barber_id: history.barber_id,
                payment_method: payload.payment_method,
                installments: history.installments,
                gross_cents: history.gross_cents,
                fee_cents: history.fee_cents,
                net_cents: history.net_cents,
                created_at: history.created_at.with_timezone(&Utc),
            },
            services: history_services,
            items: history_items,
        },
        Some(Meta::empty()),
    ))
}
