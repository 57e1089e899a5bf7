use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::BarberStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CatalogQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BarberListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<BarberStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SnapshotQuery {
    pub barber_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub barber_id: Option<Uuid>,
    pub sort_order: Option<SortOrder>,
}
