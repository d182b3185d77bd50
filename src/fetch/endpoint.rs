// src/fetch/endpoint.rs

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::FetchError;

/// Identity of one metric series on the statistics API.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Endpoint {
    pub theme: String,
    pub sub_theme: String,
    pub topic: String,
    pub geography_type: String,
    pub geography: String,
    pub metric: String,
}

impl Endpoint {
    /// Build the sweep's starting URL under `host`.
    ///
    /// Each identity part is pushed as its own path segment, so spaces and
    /// other reserved characters get percent-encoded.
    pub fn base_url(&self, host: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(host).map_err(|source| FetchError::Url {
            url: host.to_string(),
            source,
        })?;

        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::Url {
                url: host.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            })?;
            segments
                .pop_if_empty()
                .extend(["themes", self.theme.as_str()])
                .extend(["sub_themes", self.sub_theme.as_str()])
                .extend(["topics", self.topic.as_str()])
                .extend(["geography_types", self.geography_type.as_str()])
                .extend(["geographies", self.geography.as_str()])
                .extend(["metrics", self.metric.as_str()]);
        }

        Ok(url)
    }
}
