use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{History, HistoryItem, HistoryService};

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryWithLines {
    pub history: History,
    pub services: Vec<HistoryService>,
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryList {
    pub items: Vec<History>,
}
