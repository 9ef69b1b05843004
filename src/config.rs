use std::env;
use std::path::PathBuf;

use crate::error::HarvestError;

/// Run-wide knobs, passed explicitly into each component so tests can
/// inject alternate rates and windows.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub base_url: String,
    /// Site job-category code; 5 is Computer / Information Technology.
    pub job_category: u32,
    /// HKD per USD, used to normalize salary text.
    pub exchange_rate: f64,
    /// Records older than this many days are pruned after each walk.
    pub retention_days: i64,
    pub database: String,
    pub table: String,
    pub schema_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        HarvestConfig {
            base_url: "https://www2.jobs.gov.hk".to_string(),
            job_category: 5,
            exchange_rate: 7.8,
            retention_days: 182,
            database: "itjobs".to_string(),
            table: "jobs".to_string(),
            schema_path: PathBuf::from("schema/jobs.sql"),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbCredentials {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl DbCredentials {
    /// Reads `MYSQL_HOST`, `MYSQL_USER` and `MYSQL_PASSWORD`. A missing
    /// variable is fatal at startup.
    pub fn from_env() -> Result<Self, HarvestError> {
        Ok(DbCredentials {
            host: require("MYSQL_HOST")?,
            user: require("MYSQL_USER")?,
            password: require("MYSQL_PASSWORD")?,
        })
    }
}

fn require(key: &str) -> Result<String, HarvestError> {
    env::var(key).map_err(|_| HarvestError::Credential(key.to_string()))
}
