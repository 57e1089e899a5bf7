pub mod auth;
pub mod barbers;
pub mod catalog;
pub mod history;
pub mod queue;
