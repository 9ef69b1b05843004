use std::time::Duration;

use log::info;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use scraper::{Html, Selector};
use url::Url;

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::model::ListingSummary;
use crate::throttle;

/// Seam for the pipeline: session bootstrap, search submission and
/// page-by-page enumeration. The real implementation talks HTTP; tests
/// script it.
pub trait IndexSource {
    fn establish_session(&mut self) -> Result<(), HarvestError>;
    /// Returns the HTTP status of the search submission for the
    /// orchestrator to surface.
    fn submit_search(&mut self) -> Result<u16, HarvestError>;
    /// An empty page signals the end of pagination; the protocol has no
    /// explicit last-page indicator.
    fn fetch_index_page(&mut self, page: u32) -> Result<Vec<ListingSummary>, HarvestError>;
}

// Fixed browser-identifying header set, reused across every request.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("cache-control", "max-age=0"),
    (
        "sec-ch-ua",
        "\" Not;A Brand\";v=\"99\", \"Google Chrome\";v=\"91\", \"Chromium\";v=\"91\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("upgrade-insecure-requests", "1"),
    (
        "user-agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.77 Safari/537.36",
    ),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9",
    ),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-user", "?1"),
    ("sec-fetch-dest", "document"),
    (
        "referer",
        "https://www2.jobs.gov.hk/0/tc/JobSeeker/jobsearch/joblist/simple/?direct=False",
    ),
    ("accept-language", "en-US,en;q=0.9,fr;q=0.8"),
];

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

/// Walks the paginated search results. The cookie store on the client is
/// the session context: filled once by `establish_session`, then carried
/// implicitly by the search submission and every index-page fetch.
pub struct IndexWalker {
    client: Client,
    base_url: Url,
    job_category: u32,
}

impl IndexWalker {
    pub fn new(config: &HarvestConfig) -> Result<Self, HarvestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers(browser_headers())
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Ok(IndexWalker {
            client,
            base_url: Url::parse(&config.base_url)?,
            job_category: config.job_category,
        })
    }

    /// Parses one page of the summary grid into order number + absolute
    /// detail link pairs. A row without an anchor means the grid markup
    /// changed, which is terminal for the run.
    pub fn parse_index(html: &str, base_url: &Url) -> Result<Vec<ListingSummary>, HarvestError> {
        let row_selector = Selector::parse("div.jobseeker_grid_body > div").unwrap();
        let anchor_selector = Selector::parse("a").unwrap();

        let document = Html::parse_document(html);
        let mut summaries = Vec::new();
        for row in document.select(&row_selector) {
            let anchor = row
                .select(&anchor_selector)
                .next()
                .ok_or_else(|| HarvestError::PageStructure("index row anchor".to_string()))?;
            let href = anchor
                .value()
                .attr("href")
                .ok_or_else(|| HarvestError::PageStructure("index row link".to_string()))?;
            summaries.push(ListingSummary {
                order_num: anchor.text().collect::<String>().trim().to_string(),
                detail_url: base_url.join(href)?.to_string(),
            });
        }
        Ok(summaries)
    }
}

impl IndexSource for IndexWalker {
    fn establish_session(&mut self) -> Result<(), HarvestError> {
        let url = self.base_url.join("/0/en")?;
        info!("Establishing session at {}", url);
        self.client.get(url).send()?;
        Ok(())
    }

    fn submit_search(&mut self) -> Result<u16, HarvestError> {
        let url = self.base_url.join("/0/tc/JobSeeker/jobsearch/search/simple/")?;
        let category = self.job_category.to_string();
        let form = [
            ("criteria.jobType", category.as_str()),
            ("criteria.displayMoreVac", "false"),
            ("criteria.searchByOption", "1"),
            ("isMobile", "true"),
        ];
        let response = self.client.post(url).form(&form).send()?;
        Ok(response.status().as_u16())
    }

    fn fetch_index_page(&mut self, page: u32) -> Result<Vec<ListingSummary>, HarvestError> {
        if page > 1 {
            throttle::page_delay();
        }
        let url = self.base_url.join("/0/en/JobSeeker/jobsearch/joblist/simple/")?;
        let page_param = page.to_string();
        let response = self
            .client
            .get(url)
            .query(&[("direct", "False"), ("page", page_param.as_str())])
            .send()?;
        let html = response.text()?;
        Self::parse_index(&html, &self.base_url)
    }
}
