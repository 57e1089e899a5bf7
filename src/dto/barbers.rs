use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Barber, BarberStatus, QueueStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBarberRequest {
    pub name: String,
    pub commission_rate_bps: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBarberRequest {
    pub name: Option<String>,
    pub status: Option<BarberStatus>,
    pub queue_status: Option<QueueStatus>,
    pub commission_rate_bps: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BarberList {
    pub items: Vec<Barber>,
}
