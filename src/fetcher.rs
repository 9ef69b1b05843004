use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::model::{JobListing, ListingSummary};
use crate::normalizer::{reformat_posting_date, SalaryNormalizer};

/// Seam for the pipeline: anything that can turn a summary into a full
/// record. The real implementation fetches the detail page; tests script it.
pub trait DetailSource {
    fn fetch_listing(&self, summary: &ListingSummary) -> Result<JobListing, HarvestError>;
}

// Semantic field label -> element id the site tags it with. A markup
// change on the site only requires updating this table.
const VACANCY_COUNT: (&str, &str) = ("vacancy count", "noVac");
const POSTING_ORDINAL: (&str, &str) = ("posting ordinal number", "ordNo");
const POSTED_DATE: (&str, &str) = ("posted date", "postedDt");
const JOB_TITLE: (&str, &str) = ("job title", "jobTitle");
const EMPLOYER_NAME: (&str, &str) = ("employer name", "empName");
const DISTRICT: (&str, &str) = ("district", "locDesc");
const INDUSTRY: (&str, &str) = ("industry", "indsDesc");
const RESPONSIBILITIES: (&str, &str) = ("responsibilities", "jobRemark");
const REQUIREMENTS: (&str, &str) = ("requirements", "eduRemark");
const EMPLOYMENT_TERMS: (&str, &str) = ("employment terms", "empTerm");
const APPLICATION_INFO: (&str, &str) = ("application info", "openupRemark");
const REMARKS: (&str, &str) = ("remarks", "propRemark");

pub struct ListingFetcher {
    client: Client,
    normalizer: SalaryNormalizer,
}

impl ListingFetcher {
    pub fn new(config: &HarvestConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        ListingFetcher {
            client,
            normalizer: SalaryNormalizer::new(config.exchange_rate),
        }
    }

    /// Extracts the thirteen structured fields from a detail page. An
    /// expected element being absent means the site changed shape; an
    /// element with empty content is just an empty field.
    pub fn parse_detail(&self, html: &str, order_num: &str) -> Result<JobListing, HarvestError> {
        let document = Html::parse_document(html);

        let vacancy_count = field_text(&document, VACANCY_COUNT)?;
        let posting_ordinal_number = field_text(&document, POSTING_ORDINAL)?;
        let posted_date = field_text(&document, POSTED_DATE)?;
        let job_title = field_text(&document, JOB_TITLE)?;
        let employer_name = field_text(&document, EMPLOYER_NAME)?;
        let district = field_text(&document, DISTRICT)?;
        let industry = field_text(&document, INDUSTRY)?;
        let responsibilities = field_text(&document, RESPONSIBILITIES)?;
        let requirements = field_text(&document, REQUIREMENTS)?;
        let raw_employment_terms = field_text(&document, EMPLOYMENT_TERMS)?;
        let application_info = field_text(&document, APPLICATION_INFO)?;
        let remarks = field_text(&document, REMARKS)?;

        let create_date = reformat_posting_date(&posted_date)?;
        let usd_salary_range = self.normalizer.format_pay_range(&raw_employment_terms)?;
        let salary_period = self.normalizer.classify_pay_period(&raw_employment_terms);

        Ok(JobListing {
            order_num: order_num.to_string(),
            job_title,
            usd_salary_range,
            salary_period,
            vacancy_count,
            posting_ordinal_number,
            create_date,
            employer_name,
            district,
            industry,
            responsibilities,
            requirements,
            raw_employment_terms,
            application_info,
            remarks,
        })
    }
}

impl DetailSource for ListingFetcher {
    /// One unauthenticated GET per listing, no retries; a transport failure
    /// propagates and the orchestrator decides what to do with the run.
    fn fetch_listing(&self, summary: &ListingSummary) -> Result<JobListing, HarvestError> {
        debug!("Fetching detail page {}", summary.detail_url);
        let response = self.client.get(&summary.detail_url).send()?;
        let html = response.text()?;
        self.parse_detail(&html, &summary.order_num)
    }
}

fn field_text(document: &Html, (label, id): (&str, &str)) -> Result<String, HarvestError> {
    let selector = Selector::parse(&format!("#{id}")).expect("element id selector");
    let element = document
        .select(&selector)
        .next()
        .ok_or_else(|| HarvestError::PageStructure(label.to_string()))?;
    Ok(element.text().collect::<String>().trim().to_string())
}
