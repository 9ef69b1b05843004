pub mod config;
pub mod error;
pub mod fetcher;
pub mod logger;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod store;
pub mod throttle;
pub mod walker;

// Exporting types for convenience
pub use config::{DbCredentials, HarvestConfig};
pub use error::HarvestError;
pub use fetcher::{DetailSource, ListingFetcher};
pub use model::{JobListing, ListingSummary, SalaryPeriod};
pub use normalizer::SalaryNormalizer;
pub use pipeline::{PageOutcome, Pipeline, RunReport};
pub use store::{JobStore, MySqlStore};
pub use walker::{IndexSource, IndexWalker};
