#![allow(dead_code)]

use fludash::{
    fetch::Transport,
    record::{Page, RawRecord},
    FetchError,
};
use std::cell::RefCell;
use std::collections::HashMap;
use url::Url;

/// In-memory stand-in for the metrics API.
///
/// Records are keyed by the metric name (last path segment) and served in
/// `page_size` chunks with `page=N` next links.
#[derive(Default)]
pub struct FakeApi {
    pub metrics: HashMap<String, Vec<RawRecord>>,
    pub requests: RefCell<Vec<Url>>,
    pub offline: bool,
}

impl FakeApi {
    pub fn with_metric(mut self, metric: &str, records: Vec<RawRecord>) -> Self {
        self.metrics.insert(metric.to_string(), records);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for FakeApi {
    fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.borrow_mut().push(url.clone());
        if self.offline {
            return Err(FetchError::Connectivity {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            });
        }

        let metric = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string();
        let Some(records) = self.metrics.get(&metric) else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let page_size: usize = query["page_size"].parse().unwrap();
        let page: usize = query.get("page").map_or(1, |p| p.parse().unwrap());
        let start = (page - 1) * page_size;

        let next = (start + page_size < records.len()).then(|| {
            let mut next = url.clone();
            next.query_pairs_mut()
                .clear()
                .append_pair("page_size", &page_size.to_string())
                .append_pair("page", &(page + 1).to_string());
            next.to_string()
        });
        let page = Page {
            next,
            count: records.len() as u64,
            results: records.iter().skip(start).take(page_size).cloned().collect(),
        };
        Ok(serde_json::to_string(&page).unwrap())
    }
}

/// `n` weekly records per age label, starting 2023-12-04.
pub fn weekly(n: usize, ages: &[&str]) -> Vec<RawRecord> {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 12, 4).unwrap();
    let mut out = Vec::new();
    for week in 0..n {
        let date = start + chrono::Duration::weeks(week as i64);
        for (i, age) in ages.iter().enumerate() {
            out.push(RawRecord::new(
                date.format("%Y-%m-%d").to_string(),
                *age,
                week as f64 + i as f64 / 10.0,
            ));
        }
    }
    out
}
