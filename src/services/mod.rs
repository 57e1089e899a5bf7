pub mod auth_service;
pub mod barber_service;
pub mod catalog_service;
pub mod history_service;
pub mod queue_service;
pub mod settlement_service;
