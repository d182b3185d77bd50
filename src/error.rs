// src/error.rs

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised while paging through a metric endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Rejected before any request went out.
    #[error("page_size {page_size} exceeds the maximum of {max}")]
    InvalidArgument { page_size: usize, max: usize },

    /// The endpoint could not be reached or the transport broke mid-request.
    #[error("could not reach {url}: {source}")]
    Connectivity {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },

    /// The body was not a `{next, count, results}` page of records.
    #[error("unexpected response shape from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failures raised while turning raw records into a table.
#[derive(Debug, Error)]
pub enum ReshapeError {
    #[error("date {date:?} does not match YYYY-MM-DD")]
    MalformedDate { date: String },
}

/// Why a panel refresh did not replace its table.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("cannot connect to the statistics API: {0}")]
    Connectivity(#[source] FetchError),

    #[error("could not process the fetched data: {0}")]
    DataShape(#[source] BoxError),

    #[error("refresh failed: {0}")]
    Other(#[source] BoxError),

    #[error("refresh is disabled until the panel is reset")]
    Disabled,
}

impl RefreshError {
    /// Sorts a fetch failure into the class the dashboard reports.
    pub fn from_fetch(err: FetchError) -> Self {
        match err {
            FetchError::Connectivity { .. } => RefreshError::Connectivity(err),
            FetchError::Decode { .. } => RefreshError::DataShape(Box::new(err)),
            other => RefreshError::Other(Box::new(other)),
        }
    }
}

impl From<ReshapeError> for RefreshError {
    fn from(err: ReshapeError) -> Self {
        RefreshError::DataShape(Box::new(err))
    }
}
