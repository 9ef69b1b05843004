use std::error::Error;

use log::info;

use itjobs_harvester::logger;
use itjobs_harvester::{DbCredentials, HarvestConfig, IndexWalker, ListingFetcher, MySqlStore, Pipeline};

fn main() -> Result<(), Box<dyn Error>> {
    logger::init();
    dotenvy::dotenv().ok();

    info!("Starting jobs.gov.hk IT listing harvest...");

    let config = HarvestConfig::default();
    let credentials = DbCredentials::from_env()?;

    let mut store = MySqlStore::connect(&credentials, &config)?;
    let mut walker = IndexWalker::new(&config)?;
    let fetcher = ListingFetcher::new(&config);

    let report = Pipeline::new(&mut walker, &fetcher, &mut store, config.retention_days).run()?;

    info!(
        "Harvest finished: {} new listings, {} skipped, {} pruned.",
        report.inserted, report.skipped, report.pruned
    );
    Ok(())
}
