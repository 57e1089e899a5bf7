use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        barbers::BarberList,
        catalog::{ItemList, ServiceList},
        history::{HistoryList, HistoryWithLines},
        queue::{QueueEntryWithServices, QueueServiceLine, SnapshotEntry, SnapshotList},
    },
    fees::PaymentMethod,
    models::{
        Barber, BarberStatus, EntryStatus, History, HistoryItem, HistoryService, Item, QueueEntry,
        QueueStatus, Service, User,
    },
    response::{ApiResponse, Meta},
    routes::{auth, barbers, health, history, items, params, queue, services},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        barbers::list_barbers,
        barbers::get_barber,
        barbers::create_barber,
        barbers::update_barber,
        barbers::delete_barber,
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        items::adjust_stock,
        queue::enqueue,
        queue::snapshot,
        queue::move_entry,
        queue::cancel,
        queue::remove_queued_service,
        queue::complete,
        history::list_history,
        history::get_history
    ),
    components(
        schemas(
            User,
            Barber,
            BarberStatus,
            QueueStatus,
            EntryStatus,
            PaymentMethod,
            Service,
            Item,
            QueueEntry,
            History,
            HistoryService,
            HistoryItem,
            BarberList,
            ServiceList,
            ItemList,
            QueueEntryWithServices,
            QueueServiceLine,
            SnapshotEntry,
            SnapshotList,
            HistoryList,
            HistoryWithLines,
            params::Pagination,
            params::CatalogQuery,
            params::BarberListQuery,
            params::HistoryListQuery,
            Meta,
            ApiResponse<Barber>,
            ApiResponse<BarberList>,
            ApiResponse<Service>,
            ApiResponse<ServiceList>,
            ApiResponse<Item>,
            ApiResponse<ItemList>,
            ApiResponse<QueueEntryWithServices>,
            ApiResponse<SnapshotList>,
            ApiResponse<HistoryList>,
            ApiResponse<HistoryWithLines>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Barbers", description = "Barber administration"),
        (name = "Services", description = "Service catalog"),
        (name = "Items", description = "Retail item catalog and stock"),
        (name = "Queue", description = "Waiting line and settlement"),
        (name = "History", description = "Settled visit ledger"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
