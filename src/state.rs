use crate::db::{DbPool, OrmConn};
use crate::fees::FeeTable;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub fees: FeeTable,
    pub notifier: Notifier,
}
