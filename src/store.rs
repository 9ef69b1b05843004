use std::fs;

use chrono::{Duration, Utc};
use log::info;
use mysql::prelude::Queryable;
use mysql::{params, Conn, Opts, OptsBuilder};

use crate::config::{DbCredentials, HarvestConfig};
use crate::error::HarvestError;
use crate::model::JobListing;

/// Persistence seam for the pipeline. Records are append-only; the only
/// deletion path is retention pruning.
pub trait JobStore {
    fn exists(&mut self, order_num: &str) -> Result<bool, HarvestError>;
    /// Fails with `DuplicateKey` when the order number is already stored.
    fn insert(&mut self, listing: &JobListing) -> Result<(), HarvestError>;
    /// Deletes records whose create_date is strictly older than today minus
    /// `days`. Returns the number of rows removed.
    fn prune_older_than(&mut self, days: i64) -> Result<u64, HarvestError>;
}

const ER_DUP_ENTRY: u16 = 1062;

pub struct MySqlStore {
    conn: Conn,
    table: String,
}

impl MySqlStore {
    /// Connects with env-supplied credentials and bootstraps the schema:
    /// create database and table if absent, from the external schema file.
    pub fn connect(credentials: &DbCredentials, config: &HarvestConfig) -> Result<Self, HarvestError> {
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(credentials.host.clone()))
            .user(Some(credentials.user.clone()))
            .pass(Some(credentials.password.clone()));
        let mut conn = Conn::new(Opts::from(opts))?;

        conn.query_drop(format!("CREATE DATABASE IF NOT EXISTS {}", config.database))?;
        conn.query_drop(format!("USE {}", config.database))?;
        let schema = fs::read_to_string(&config.schema_path)?;
        conn.query_drop(schema)?;
        info!("Connected to database '{}'", config.database);

        Ok(MySqlStore {
            conn,
            table: config.table.clone(),
        })
    }
}

impl JobStore for MySqlStore {
    fn exists(&mut self, order_num: &str) -> Result<bool, HarvestError> {
        // The order number comes from remote markup; always bind it.
        let row: Option<String> = self.conn.exec_first(
            format!("SELECT order_num FROM {} WHERE order_num = ?", self.table),
            (order_num,),
        )?;
        Ok(row.is_some())
    }

    fn insert(&mut self, listing: &JobListing) -> Result<(), HarvestError> {
        let sql = format!(
            "INSERT INTO {} (order_num, job_title, usd_salary_range, salary_period, \
             vacancy_count, posting_ordinal_number, create_date, employer_name, district, \
             industry, responsibilities, requirements, raw_employment_terms, application_info, \
             remarks) VALUES (:order_num, :job_title, :usd_salary_range, :salary_period, \
             :vacancy_count, :posting_ordinal_number, :create_date, :employer_name, :district, \
             :industry, :responsibilities, :requirements, :raw_employment_terms, \
             :application_info, :remarks)",
            self.table
        );
        let result = self.conn.exec_drop(
            sql,
            params! {
                "order_num" => &listing.order_num,
                "job_title" => &listing.job_title,
                "usd_salary_range" => &listing.usd_salary_range,
                "salary_period" => listing.salary_period.as_str(),
                "vacancy_count" => &listing.vacancy_count,
                "posting_ordinal_number" => &listing.posting_ordinal_number,
                "create_date" => &listing.create_date,
                "employer_name" => &listing.employer_name,
                "district" => &listing.district,
                "industry" => &listing.industry,
                "responsibilities" => &listing.responsibilities,
                "requirements" => &listing.requirements,
                "raw_employment_terms" => &listing.raw_employment_terms,
                "application_info" => &listing.application_info,
                "remarks" => &listing.remarks,
            },
        );
        match result {
            Ok(()) => Ok(()),
            Err(mysql::Error::MySqlError(ref server)) if server.code == ER_DUP_ENTRY => {
                Err(HarvestError::DuplicateKey(listing.order_num.clone()))
            }
            Err(other) => Err(other.into()),
        }
    }

    fn prune_older_than(&mut self, days: i64) -> Result<u64, HarvestError> {
        let cutoff = (Utc::now().date_naive() - Duration::days(days))
            .format("%Y-%m-%d")
            .to_string();
        let result = self.conn.exec_iter(
            format!("DELETE FROM {} WHERE create_date < ?", self.table),
            (cutoff,),
        )?;
        Ok(result.affected_rows())
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use chrono::NaiveDate;

    use super::*;

    /// In-memory stand-in with the same key and retention semantics as the
    /// MySQL store, backing the pipeline and retention tests.
    #[derive(Default)]
    pub struct MemoryStore {
        pub rows: Vec<JobListing>,
    }

    impl JobStore for MemoryStore {
        fn exists(&mut self, order_num: &str) -> Result<bool, HarvestError> {
            Ok(self.rows.iter().any(|row| row.order_num == order_num))
        }

        fn insert(&mut self, listing: &JobListing) -> Result<(), HarvestError> {
            if self.rows.iter().any(|row| row.order_num == listing.order_num) {
                return Err(HarvestError::DuplicateKey(listing.order_num.clone()));
            }
            self.rows.push(listing.clone());
            Ok(())
        }

        fn prune_older_than(&mut self, days: i64) -> Result<u64, HarvestError> {
            let cutoff = Utc::now().date_naive() - Duration::days(days);
            let before = self.rows.len();
            self.rows.retain(|row| {
                NaiveDate::parse_from_str(&row.create_date, "%Y-%m-%d")
                    .map(|date| date >= cutoff)
                    .unwrap_or(true)
            });
            Ok((before - self.rows.len()) as u64)
        }
    }
}
