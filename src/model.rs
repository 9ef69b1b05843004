use std::fmt;

use serde::Serialize;

/// Order number + detail link pair discovered while paging the index.
/// Transient; never persisted directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub order_num: String,
    pub detail_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SalaryPeriod {
    #[serde(rename = "per month")]
    PerMonth,
    #[serde(rename = "per day")]
    PerDay,
}

impl SalaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryPeriod::PerMonth => "per month",
            SalaryPeriod::PerDay => "per day",
        }
    }
}

impl fmt::Display for SalaryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully enriched representation of one job posting, keyed by the
/// site-assigned order number. Immutable once inserted; removed only by
/// retention pruning.
#[derive(Debug, Clone, Serialize)]
pub struct JobListing {
    pub order_num: String,
    pub job_title: String,
    pub usd_salary_range: String,
    pub salary_period: SalaryPeriod,
    pub vacancy_count: String,
    pub posting_ordinal_number: String,
    /// ISO date (YYYY-MM-DD) the posting went up.
    pub create_date: String,
    pub employer_name: String,
    pub district: String,
    pub industry: String,
    pub responsibilities: String,
    pub requirements: String,
    pub raw_employment_terms: String,
    pub application_info: String,
    pub remarks: String,
}
