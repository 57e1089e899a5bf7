use std::env;

use crate::fees::FeeTable;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub fees: FeeTable,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let fees = FeeTable {
            debit_bps: env_bps("FEE_DEBIT_BPS", FeeTable::DEFAULT_DEBIT_BPS),
            credit_bps: [
                env_bps("FEE_CREDIT_1X_BPS", FeeTable::DEFAULT_CREDIT_BPS[0]),
                env_bps("FEE_CREDIT_2X_BPS", FeeTable::DEFAULT_CREDIT_BPS[1]),
                env_bps("FEE_CREDIT_3X_BPS", FeeTable::DEFAULT_CREDIT_BPS[2]),
            ],
        };
        Ok(Self {
            port,
            database_url,
            host,
            fees,
        })
    }
}

fn env_bps(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|bps| (0..=10_000).contains(bps))
        .unwrap_or(default)
}
