use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::fees::PaymentMethod;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BarberStatus {
    Active,
    Inactive,
}

impl BarberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarberStatus::Active => "active",
            BarberStatus::Inactive => "inactive",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "active" => Some(BarberStatus::Active),
            "inactive" => Some(BarberStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Open,
    Closed,
}

impl QueueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueStatus::Open => "open",
            QueueStatus::Closed => "closed",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "open" => Some(QueueStatus::Open),
            "closed" => Some(QueueStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Waiting,
    Completed,
    Cancelled,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Waiting => "waiting",
            EntryStatus::Completed => "completed",
            EntryStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        match value {
            "waiting" => Some(EntryStatus::Waiting),
            "completed" => Some(EntryStatus::Completed),
            "cancelled" => Some(EntryStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Barber {
    pub id: Uuid,
    pub name: String,
    pub status: BarberStatus,
    pub queue_status: QueueStatus,
    pub commission_rate_bps: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub average_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueueEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub status: EntryStatus,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct History {
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub payment_method: PaymentMethod,
    pub installments: i16,
    pub gross_cents: i64,
    pub fee_cents: i64,
    pub net_cents: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryService {
    pub id: Uuid,
    pub history_id: Uuid,
    pub service_id: Uuid,
    pub price_cents: i64,
    pub is_extra: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryItem {
    pub id: Uuid,
    pub history_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}
