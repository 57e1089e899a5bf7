use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::fees::PaymentMethod;
use crate::models::QueueEntry;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EnqueueRequest {
    pub barber_id: Uuid,
    pub service_ids: Vec<Uuid>,
    /// Admins may enqueue on behalf of another customer.
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueueServiceLine {
    pub service_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub average_minutes: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QueueEntryWithServices {
    pub entry: QueueEntry,
    pub services: Vec<QueueServiceLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub barber_id: Uuid,
    pub position: i64,
    pub estimated_wait_minutes: i64,
    pub services: Vec<QueueServiceLine>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotList {
    pub items: Vec<SnapshotEntry>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRequest {
    /// Queued services still to be billed; pre-completion edits may have
    /// trimmed the original request.
    pub service_ids: Vec<Uuid>,
    #[serde(default)]
    pub extra_service_ids: Vec<Uuid>,
    #[serde(default)]
    pub products: Vec<ProductLine>,
    pub payment_method: PaymentMethod,
    pub installments: Option<i16>,
}
