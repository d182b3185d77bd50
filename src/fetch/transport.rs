// src/fetch/transport.rs

use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// A blocking GET that returns the response body as text.
///
/// `url` already carries every query parameter the request needs.
pub trait Transport {
    fn get_text(&self, url: &Url) -> Result<String, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        (**self).get_text(url)
    }
}

/// `Transport` over a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Fails only on local client setup, never on the network.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fludash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        debug!(%url, "GET");
        let connectivity = |e: reqwest::Error| FetchError::Connectivity {
            url: url.to_string(),
            source: Box::new(e),
        };

        let resp = self.client.get(url.clone()).send().map_err(connectivity)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        resp.text().map_err(connectivity)
    }
}
