use thiserror::Error;

/// Everything that can go wrong during a harvest run.
///
/// Transport, store and credential failures are fatal to the run; the
/// per-listing variants (`PageStructure`, `MalformedSalary`, `DateFormat`)
/// only reject the listing they occurred on.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("page structure changed: no element for '{0}'")]
    PageStructure(String),

    #[error("no dollar amount in salary text {0:?}")]
    MalformedSalary(String),

    #[error("malformed posting date {0:?}, expected DD/MM/YYYY")]
    DateFormat(String),

    #[error("order number '{0}' already stored")]
    DuplicateKey(String),

    #[error("missing database credential '{0}'")]
    Credential(String),

    #[error("store failure: {0}")]
    Store(#[from] mysql::Error),

    #[error("schema file unreadable: {0}")]
    Schema(#[from] std::io::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}
