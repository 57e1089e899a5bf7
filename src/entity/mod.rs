pub mod audit_logs;
pub mod barbers;
pub mod histories;
pub mod history_items;
pub mod history_services;
pub mod items;
pub mod queue_entries;
pub mod queue_services;
pub mod services;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use barbers::Entity as Barbers;
pub use histories::Entity as Histories;
pub use history_items::Entity as HistoryItems;
pub use history_services::Entity as HistoryServices;
pub use items::Entity as Items;
pub use queue_entries::Entity as QueueEntries;
pub use queue_services::Entity as QueueServices;
pub use services::Entity as Services;
pub use users::Entity as Users;
