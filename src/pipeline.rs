use log::{error, info, warn};

use crate::error::HarvestError;
use crate::fetcher::DetailSource;
use crate::model::ListingSummary;
use crate::store::JobStore;
use crate::walker::IndexSource;

/// Expected control flow, not a failure: whether the walk goes on after a
/// page. The site lists newest first, so the first already-stored order
/// number means everything after it was ingested by a prior run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Continue,
    Stop,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub pages_walked: u32,
    pub inserted: u64,
    /// Listings rejected for unparseable fields; the walk went on past them.
    pub skipped: u64,
    pub pruned: u64,
}

/// Sequences one harvest run: session, search, page walk with early stop on
/// the first duplicate, then retention pruning.
pub struct Pipeline<'a, W, F, S> {
    walker: &'a mut W,
    fetcher: &'a F,
    store: &'a mut S,
    retention_days: i64,
}

impl<'a, W, F, S> Pipeline<'a, W, F, S>
where
    W: IndexSource,
    F: DetailSource,
    S: JobStore,
{
    pub fn new(walker: &'a mut W, fetcher: &'a F, store: &'a mut S, retention_days: i64) -> Self {
        Pipeline {
            walker,
            fetcher,
            store,
            retention_days,
        }
    }

    pub fn run(&mut self) -> Result<RunReport, HarvestError> {
        self.walker.establish_session()?;

        let status = self.walker.submit_search()?;
        if (200..300).contains(&status) {
            info!("Search submitted, status {}", status);
        } else {
            warn!("Search submission returned status {}", status);
        }

        let mut report = RunReport::default();
        let mut page = 1;
        loop {
            let summaries = self.walker.fetch_index_page(page)?;
            if summaries.is_empty() {
                info!("Page {} is empty, pagination finished", page);
                break;
            }
            report.pages_walked += 1;
            if self.process_page(&summaries, &mut report)? == PageOutcome::Stop {
                break;
            }
            page += 1;
        }

        report.pruned = self.store.prune_older_than(self.retention_days)?;
        info!(
            "Update complete: {} pages walked, {} inserted, {} skipped, {} pruned",
            report.pages_walked, report.inserted, report.skipped, report.pruned
        );
        Ok(report)
    }

    /// Summaries are processed strictly in the order the page presents
    /// them; that ordering is what makes the early stop sound.
    fn process_page(
        &mut self,
        summaries: &[ListingSummary],
        report: &mut RunReport,
    ) -> Result<PageOutcome, HarvestError> {
        for summary in summaries {
            if self.store.exists(&summary.order_num)? {
                info!("{} already stored, stopping the walk", summary.order_num);
                return Ok(PageOutcome::Stop);
            }
            match self.fetcher.fetch_listing(summary) {
                Ok(listing) => {
                    self.store.insert(&listing)?;
                    report.inserted += 1;
                    info!("{} record inserted", summary.order_num);
                }
                Err(
                    err @ (HarvestError::PageStructure(_)
                    | HarvestError::MalformedSalary(_)
                    | HarvestError::DateFormat(_)),
                ) => {
                    error!("Skipping {}: {}", summary.order_num, err);
                    report.skipped += 1;
                }
                Err(fatal) => return Err(fatal),
            }
        }
        Ok(PageOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::model::{JobListing, SalaryPeriod};
    use crate::store::memory::MemoryStore;

    struct ScriptedIndex {
        pages: Vec<Vec<ListingSummary>>,
    }

    impl IndexSource for ScriptedIndex {
        fn establish_session(&mut self) -> Result<(), HarvestError> {
            Ok(())
        }

        fn submit_search(&mut self) -> Result<u16, HarvestError> {
            Ok(200)
        }

        fn fetch_index_page(&mut self, page: u32) -> Result<Vec<ListingSummary>, HarvestError> {
            Ok(self
                .pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_default())
        }
    }

    struct CannedFetcher {
        fetched: Cell<u32>,
        /// Order numbers whose detail page has unparseable salary text.
        malformed: Vec<String>,
    }

    impl CannedFetcher {
        fn new() -> Self {
            CannedFetcher {
                fetched: Cell::new(0),
                malformed: Vec::new(),
            }
        }
    }

    impl DetailSource for CannedFetcher {
        fn fetch_listing(&self, summary: &ListingSummary) -> Result<JobListing, HarvestError> {
            self.fetched.set(self.fetched.get() + 1);
            if self.malformed.contains(&summary.order_num) {
                return Err(HarvestError::MalformedSalary("negotiable".to_string()));
            }
            Ok(listing(&summary.order_num, 0))
        }
    }

    fn listing(order_num: &str, age_days: i64) -> JobListing {
        let create_date = (Utc::now().date_naive() - Duration::days(age_days))
            .format("%Y-%m-%d")
            .to_string();
        JobListing {
            order_num: order_num.to_string(),
            job_title: "Programmer".to_string(),
            usd_salary_range: "$2000 - $3000".to_string(),
            salary_period: SalaryPeriod::PerMonth,
            vacancy_count: "1".to_string(),
            posting_ordinal_number: order_num.to_string(),
            create_date,
            employer_name: "ACME Engineering Ltd".to_string(),
            district: "Kwun Tong".to_string(),
            industry: "Information Technology".to_string(),
            responsibilities: "Maintain in-house systems".to_string(),
            requirements: "Degree holder".to_string(),
            raw_employment_terms: "$15,600 - $23,400 per month".to_string(),
            application_info: "Email CV".to_string(),
            remarks: String::new(),
        }
    }

    fn summaries(order_nums: &[&str]) -> Vec<ListingSummary> {
        order_nums
            .iter()
            .map(|num| ListingSummary {
                order_num: (*num).to_string(),
                detail_url: format!("https://example.test/job/{num}"),
            })
            .collect()
    }

    #[test]
    fn walk_stops_at_first_known_listing_mid_page() {
        let mut store = MemoryStore::default();
        store.insert(&listing("OLD1", 3)).unwrap();

        let mut walker = ScriptedIndex {
            pages: vec![
                summaries(&["N1", "N2", "N3", "N4", "N5"]),
                summaries(&["OLD1", "OLD2", "OLD3"]),
            ],
        };
        let fetcher = CannedFetcher::new();

        let report = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap();

        assert_eq!(report.inserted, 5);
        assert_eq!(report.pages_walked, 2);
        // OLD2 and OLD3 were never even fetched.
        assert_eq!(fetcher.fetched.get(), 5);
        assert_eq!(store.rows.len(), 6);
    }

    #[test]
    fn rerun_with_no_new_listings_inserts_nothing() {
        let mut store = MemoryStore::default();
        let pages = vec![summaries(&["N1", "N2", "N3"])];

        let mut walker = ScriptedIndex { pages: pages.clone() };
        let fetcher = CannedFetcher::new();
        let first = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap();
        assert_eq!(first.inserted, 3);

        let mut walker = ScriptedIndex { pages };
        let fetcher = CannedFetcher::new();
        let second = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap();

        assert_eq!(second.inserted, 0);
        // The duplicate check short-circuits on the newest summary.
        assert_eq!(fetcher.fetched.get(), 0);
        assert_eq!(store.rows.len(), 3);
    }

    #[test]
    fn unparseable_listing_is_skipped_and_the_walk_continues() {
        let mut store = MemoryStore::default();
        let mut walker = ScriptedIndex {
            pages: vec![summaries(&["N1", "N2", "N3"])],
        };
        let fetcher = CannedFetcher {
            fetched: Cell::new(0),
            malformed: vec!["N2".to_string()],
        };

        let report = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
        assert!(store.exists("N1").unwrap());
        assert!(!store.exists("N2").unwrap());
        assert!(store.exists("N3").unwrap());
    }

    #[test]
    fn pruning_runs_after_the_walk() {
        let mut store = MemoryStore::default();
        store.insert(&listing("STALE", 200)).unwrap();

        let mut walker = ScriptedIndex { pages: vec![] };
        let fetcher = CannedFetcher::new();
        let report = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap();

        assert_eq!(report.pages_walked, 0);
        assert_eq!(report.pruned, 1);
        assert!(store.rows.is_empty());
    }

    #[test]
    fn non_listing_error_during_fetch_aborts_the_run() {
        struct FailingFetcher;
        impl DetailSource for FailingFetcher {
            fn fetch_listing(&self, _: &ListingSummary) -> Result<JobListing, HarvestError> {
                // Any error outside the listing-local set is fatal.
                Err(HarvestError::Credential("unreachable".to_string()))
            }
        }

        let mut store = MemoryStore::default();
        let mut walker = ScriptedIndex {
            pages: vec![summaries(&["N1", "N2"])],
        };
        let fetcher = FailingFetcher;

        let err = Pipeline::new(&mut walker, &fetcher, &mut store, 182)
            .run()
            .unwrap_err();
        assert!(matches!(err, HarvestError::Credential(_)));
        assert!(store.rows.is_empty());
    }
}
