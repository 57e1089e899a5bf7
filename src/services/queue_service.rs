use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::queue::{
        EnqueueRequest, MoveDirection, QueueEntryWithServices, QueueServiceLine, SnapshotEntry,
        SnapshotList,
    },
    entity::{
        barbers::Entity as Barbers,
        queue_entries::{
            ActiveModel as EntryActive, Column as EntryCol, Entity as QueueEntries,
            Model as EntryModel,
        },
        queue_services::{
            ActiveModel as QueueServiceActive, Column as QsCol, Entity as QueueServices,
            Relation as QsRelation,
        },
        services::{Column as ServiceCol, Entity as Services},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, is_admin},
    models::{BarberStatus, EntryStatus, QueueEntry, QueueStatus},
    notify::QueueEvent,
    response::{ApiResponse, Meta},
    routes::params::SnapshotQuery,
    state::AppState,
};

/// Admit a customer into a barber's waiting line. All rank mutations for a
/// barber serialize on its row lock, so the appended position is unique.
pub async fn enqueue(
    state: &AppState,
    user: &AuthUser,
    payload: EnqueueRequest,
) -> AppResult<ApiResponse<QueueEntryWithServices>> {
    let target_user_id = payload.user_id.unwrap_or(user.user_id);
    if target_user_id != user.user_id {
        ensure_admin(user)?;
    }
    if payload.service_ids.is_empty() {
        return Err(AppError::Validation(
            "at least one service must be requested".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let barber = Barbers::find_by_id(payload.barber_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Validation("barber not found".into()))?;
    if barber.status != BarberStatus::Active.as_str() {
        return Err(AppError::Validation("barber is not active".into()));
    }
    if barber.queue_status != QueueStatus::Open.as_str() {
        return Err(AppError::Validation("barber's queue is closed".into()));
    }

    let customer = Users::find_by_id(target_user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Validation("user not found".into()))?;

    let mut unique_ids = payload.service_ids.clone();
    unique_ids.sort();
    unique_ids.dedup();
    let services = Services::find()
        .filter(ServiceCol::Id.is_in(unique_ids.clone()))
        .all(&txn)
        .await?;
    if services.len() != unique_ids.len() {
        return Err(AppError::Validation("unknown service id".into()));
    }
    let services_by_id: HashMap<Uuid, _> = services.into_iter().map(|s| (s.id, s)).collect();

    let already_waiting = QueueEntries::find()
        .filter(EntryCol::UserId.eq(target_user_id))
        .filter(EntryCol::Status.eq(EntryStatus::Waiting.as_str()))
        .count(&txn)
        .await?;
    if already_waiting > 0 {
        return Err(AppError::Conflict(
            "user already has a waiting queue entry".into(),
        ));
    }

    let last = QueueEntries::find()
        .filter(EntryCol::BarberId.eq(payload.barber_id))
        .filter(EntryCol::Status.eq(EntryStatus::Waiting.as_str()))
        .order_by_desc(EntryCol::Position)
        .one(&txn)
        .await?;
    let next_position = last.map(|e| e.position).unwrap_or(0) + 1;

    let entry = EntryActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(target_user_id),
        barber_id: Set(payload.barber_id),
        status: Set(EntryStatus::Waiting.as_str().to_string()),
        position: Set(next_position),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut lines: Vec<QueueServiceLine> = Vec::new();
    for service_id in &payload.service_ids {
        QueueServiceActive {
            id: Set(Uuid::new_v4()),
            queue_entry_id: Set(entry.id),
            service_id: Set(*service_id),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let service = &services_by_id[service_id];
        lines.push(QueueServiceLine {
            service_id: service.id,
            name: service.name.clone(),
            price_cents: service.price_cents,
            average_minutes: service.average_minutes,
        });
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "queue_enqueue",
        Some("queue_entries"),
        Some(serde_json::json!({ "entry_id": entry.id, "barber_id": payload.barber_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    state.notifier.queue_event(
        customer.phone.clone(),
        QueueEvent::Joined {
            entry_id: entry.id,
            barber_name: barber.name.clone(),
            position: next_position as i64,
        },
    );

    Ok(ApiResponse::success(
        "Joined the queue",
        QueueEntryWithServices {
            entry: entry_from_model(entry)?,
            services: lines,
        },
        Some(Meta::empty()),
    ))
}

/// Swap an entry's rank with its immediate waiting neighbor.
pub async fn move_entry(
    state: &AppState,
    user: &AuthUser,
    entry_id: Uuid,
    direction: MoveDirection,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let entry = QueueEntries::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let _barber = Barbers::find_by_id(entry.barber_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    // Re-read under the barber lock; a concurrent move may have shifted ranks
    // between the first fetch and the lock.
    let entry = QueueEntries::find_by_id(entry_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if entry.status != EntryStatus::Waiting.as_str() {
        return Err(AppError::InvalidState(
            "only waiting entries can be moved".into(),
        ));
    }

    let neighbor_finder = QueueEntries::find()
        .filter(EntryCol::BarberId.eq(entry.barber_id))
        .filter(EntryCol::Status.eq(EntryStatus::Waiting.as_str()));
    let neighbor = match direction {
        MoveDirection::Up => {
            neighbor_finder
                .filter(EntryCol::Position.lt(entry.position))
                .order_by_desc(EntryCol::Position)
                .one(&txn)
                .await?
        }
        MoveDirection::Down => {
            neighbor_finder
                .filter(EntryCol::Position.gt(entry.position))
                .order_by_asc(EntryCol::Position)
                .one(&txn)
                .await?
        }
    };
    let neighbor = neighbor.ok_or_else(|| {
        AppError::Validation(match direction {
            MoveDirection::Up => "entry is already first in the queue".into(),
            MoveDirection::Down => "entry is already last in the queue".into(),
        })
    })?;

    let entry_pos = entry.position;
    let neighbor_pos = neighbor.position;

    let mut entry_active: EntryActive = entry.into();
    entry_active.position = Set(neighbor_pos);
    entry_active.update(&txn).await?;

    let mut neighbor_active: EntryActive = neighbor.into();
    neighbor_active.position = Set(entry_pos);
    neighbor_active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "queue_move",
        Some("queue_entries"),
        Some(serde_json::json!({ "entry_id": entry_id, "direction": direction })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Moved",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Drop a waiting entry without settling it. Unknown ids are NotFound;
/// entries that already reached a terminal state are InvalidState.
pub async fn cancel(
    state: &AppState,
    user: &AuthUser,
    entry_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let entry = QueueEntries::find_by_id(entry_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if !is_admin(user) && entry.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let res = QueueEntries::update_many()
        .col_expr(EntryCol::Status, Expr::value(EntryStatus::Cancelled.as_str()))
        .filter(EntryCol::Id.eq(entry_id))
        .filter(EntryCol::Status.eq(EntryStatus::Waiting.as_str()))
        .exec(&state.orm)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::InvalidState(
            "queue entry is already completed or cancelled".into(),
        ));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "queue_cancel",
        Some("queue_entries"),
        Some(serde_json::json!({ "entry_id": entry_id })),
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
    state
        .notifier
        .queue_event(recipient, QueueEvent::Cancelled { entry_id });

    Ok(ApiResponse::success(
        "Cancelled",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Pre-completion edit: drop one requested service from a waiting entry.
/// The last remaining service cannot be removed, so a waiting entry always
/// has something left to bill.
pub async fn remove_queued_service(
    state: &AppState,
    user: &AuthUser,
    entry_id: Uuid,
    service_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;

    let entry = QueueEntries::find_by_id(entry_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if entry.status != EntryStatus::Waiting.as_str() {
        return Err(AppError::InvalidState(
            "services can only be edited while the entry is waiting".into(),
        ));
    }

    let total = QueueServices::find()
        .filter(QsCol::QueueEntryId.eq(entry_id))
        .count(&txn)
        .await?;

    let res = QueueServices::delete_many()
        .filter(QsCol::QueueEntryId.eq(entry_id))
        .filter(QsCol::ServiceId.eq(service_id))
        .exec(&txn)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    if total <= res.rows_affected {
        // Rolls back on drop.
        return Err(AppError::Validation(
            "cannot remove the last remaining service".into(),
        ));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "queue_service_remove",
        Some("queue_services"),
        Some(serde_json::json!({ "entry_id": entry_id, "service_id": service_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Service removed",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[derive(Debug, FromQueryResult)]
struct EntryServiceRow {
    queue_entry_id: Uuid,
    service_id: Uuid,
    name: String,
    price_cents: i64,
    average_minutes: i32,
}

#[derive(Debug, FromQueryResult)]
struct UserNameRow {
    id: Uuid,
    name: String,
}

/// Waiting entries in rank order, with the 1-based position and the
/// cumulative estimated wait derived from everyone ahead in the same line.
pub async fn snapshot(state: &AppState, query: SnapshotQuery) -> AppResult<ApiResponse<SnapshotList>> {
    let mut condition = Condition::all().add(EntryCol::Status.eq(EntryStatus::Waiting.as_str()));
    if let Some(barber_id) = query.barber_id {
        condition = condition.add(EntryCol::BarberId.eq(barber_id));
    }

    let entries = QueueEntries::find()
        .filter(condition)
        .order_by_asc(EntryCol::BarberId)
        .order_by_asc(EntryCol::Position)
        .all(&state.orm)
        .await?;

    if entries.is_empty() {
        return Ok(ApiResponse::success(
            "Queue",
            SnapshotList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    }

    let entry_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
    let service_rows = QueueServices::find()
        .select_only()
        .column(QsCol::QueueEntryId)
        .column(QsCol::ServiceId)
        .column_as(ServiceCol::Name, "name")
        .column_as(ServiceCol::PriceCents, "price_cents")
        .column_as(ServiceCol::AverageMinutes, "average_minutes")
        .join(JoinType::InnerJoin, QsRelation::Services.def())
        .filter(QsCol::QueueEntryId.is_in(entry_ids))
        .into_model::<EntryServiceRow>()
        .all(&state.orm)
        .await?;

    let mut services_by_entry: HashMap<Uuid, Vec<QueueServiceLine>> = HashMap::new();
    for row in service_rows {
        services_by_entry
            .entry(row.queue_entry_id)
            .or_default()
            .push(QueueServiceLine {
                service_id: row.service_id,
                name: row.name,
                price_cents: row.price_cents,
                average_minutes: row.average_minutes,
            });
    }

    let user_ids: Vec<Uuid> = entries.iter().map(|e| e.user_id).collect();
    let names: HashMap<Uuid, String> = Users::find()
        .select_only()
        .column(UserCol::Id)
        .column(UserCol::Name)
        .filter(UserCol::Id.is_in(user_ids))
        .into_model::<UserNameRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| (row.id, row.name))
        .collect();

    let per_entry_minutes: Vec<(Uuid, i64)> = entries
        .iter()
        .map(|entry| {
            let minutes = services_by_entry
                .get(&entry.id)
                .map(|lines| lines.iter().map(|l| l.average_minutes as i64).sum())
                .unwrap_or(0);
            (entry.barber_id, minutes)
        })
        .collect();
    let ranks = rank_with_waits(&per_entry_minutes);

    let items = entries
        .into_iter()
        .zip(ranks)
        .map(|(entry, (position, wait))| SnapshotEntry {
            id: entry.id,
            user_name: names.get(&entry.user_id).cloned().unwrap_or_default(),
            user_id: entry.user_id,
            barber_id: entry.barber_id,
            position,
            estimated_wait_minutes: wait,
            services: services_by_entry.remove(&entry.id).unwrap_or_default(),
            created_at: entry.created_at.with_timezone(&Utc),
        })
        .collect();

    Ok(ApiResponse::success(
        "Queue",
        SnapshotList { items },
        Some(Meta::empty()),
    ))
}

/// Derive (1-based position, cumulative wait) for entries already sorted by
/// barber and rank. Persisted positions may carry gaps after cancellations;
/// the client-visible sequence is always contiguous.
fn rank_with_waits(entries: &[(Uuid, i64)]) -> Vec<(i64, i64)> {
    let mut out = Vec::with_capacity(entries.len());
    let mut current_barber: Option<Uuid> = None;
    let mut position = 0_i64;
    let mut wait = 0_i64;
    for (barber_id, minutes) in entries {
        if current_barber != Some(*barber_id) {
            current_barber = Some(*barber_id);
            position = 0;
            wait = 0;
        }
        position += 1;
        out.push((position, wait));
        wait += minutes;
    }
    out
}

pub(crate) fn entry_from_model(model: EntryModel) -> AppResult<QueueEntry> {
    let status = EntryStatus::from_str_opt(&model.status)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("bad entry status in db")))?;
    Ok(QueueEntry {
        id: model.id,
        user_id: model.user_id,
        barber_id: model.barber_id,
        status,
        position: model.position,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::rank_with_waits;
    use uuid::Uuid;

    #[test]
    fn positions_restart_per_barber() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ranks = rank_with_waits(&[(a, 30), (a, 45), (a, 15), (b, 20)]);
        assert_eq!(ranks, vec![(1, 0), (2, 30), (3, 75), (1, 0)]);
    }

    #[test]
    fn wait_is_sum_of_entries_strictly_ahead() {
        let a = Uuid::new_v4();
        let ranks = rank_with_waits(&[(a, 40), (a, 25)]);
        // First in line waits nothing; second waits exactly the first's time.
        assert_eq!(ranks[0], (1, 0));
        assert_eq!(ranks[1], (2, 40));
    }

    #[test]
    fn empty_queue_yields_nothing() {
        assert!(rank_with_waits(&[]).is_empty());
    }
}
