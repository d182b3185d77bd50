// src/fetch/client.rs

use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{endpoint::Endpoint, filters::Filters, rate_limit::RateLimiter, transport::Transport};
use crate::error::FetchError;
use crate::record::{Page, RawRecord};

/// Largest `page_size` the API accepts.
pub const MAX_PAGE_SIZE: usize = 365;

#[derive(Debug, Clone, PartialEq)]
enum Cursor {
    /// Next request goes to the base URL.
    Start,
    Next(Url),
    Exhausted,
}

/// Walks the pages of a single metric endpoint.
///
/// The cursor belongs to the `(filters, page_size)` pair it was started
/// with; asking for a page with anything different starts over from the
/// base URL.
pub struct PaginatedClient<T> {
    base_url: Url,
    transport: T,
    limiter: RateLimiter,
    cursor: Cursor,
    last_filters: Option<Filters>,
    last_page_size: Option<usize>,
    count: Option<u64>,
}

impl<T: Transport> PaginatedClient<T> {
    pub fn new(
        endpoint: &Endpoint,
        host: &str,
        transport: T,
        limiter: RateLimiter,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            base_url: endpoint.base_url(host)?,
            transport,
            limiter,
            cursor: Cursor::Start,
            last_filters: None,
            last_page_size: None,
            count: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Total result count from the last page served, if any.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == Cursor::Exhausted
    }

    /// Forget the cursor so the next call starts a fresh sweep.
    pub fn reset(&mut self) {
        self.cursor = Cursor::Start;
        self.last_filters = None;
        self.last_page_size = None;
        self.count = None;
    }

    /// Fetch the next page for `filters`.
    ///
    /// Returns an empty page, without touching the network, once the sweep
    /// has run out of `next` links.
    pub fn get_page(
        &mut self,
        filters: &Filters,
        page_size: usize,
    ) -> Result<Vec<RawRecord>, FetchError> {
        if page_size > MAX_PAGE_SIZE {
            return Err(FetchError::InvalidArgument {
                page_size,
                max: MAX_PAGE_SIZE,
            });
        }

        if self.last_filters.as_ref() != Some(filters) || self.last_page_size != Some(page_size) {
            if self.last_filters.is_some() {
                debug!(url = %self.base_url, "query changed, restarting pagination");
            }
            self.reset();
            self.last_filters = Some(filters.clone());
            self.last_page_size = Some(page_size);
        }

        let target = match &self.cursor {
            Cursor::Start => self.base_url.clone(),
            Cursor::Next(url) => url.clone(),
            Cursor::Exhausted => return Ok(Vec::new()),
        };
        let url = with_query(target, filters, page_size);

        self.limiter.wait();
        let body = self.transport.get_text(&url)?;
        let page: Page = serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        self.cursor = match page.next.as_deref() {
            Some(next) => Cursor::Next(self.base_url.join(next).map_err(|source| {
                FetchError::Url {
                    url: next.to_string(),
                    source,
                }
            })?),
            None => Cursor::Exhausted,
        };
        self.count = Some(page.count);
        debug!(%url, results = page.results.len(), count = page.count, "page fetched");

        Ok(page.results)
    }

    /// Fetch every page for `filters`, starting from the base URL.
    ///
    /// The sweep ends at the first empty page.
    #[instrument(level = "info", skip(self, filters), fields(url = %self.base_url))]
    pub fn get_all_pages(
        &mut self,
        filters: &Filters,
        page_size: usize,
    ) -> Result<Vec<RawRecord>, FetchError> {
        self.reset();
        let mut records = Vec::new();
        loop {
            let page = self.get_page(filters, page_size)?;
            if page.is_empty() {
                break;
            }
            records.extend(page);
        }

        match self.count {
            Some(count) if count as usize != records.len() => {
                warn!(count, fetched = records.len(), "server count differs from records fetched");
            }
            _ => {}
        }
        info!(records = records.len(), "sweep complete");
        Ok(records)
    }
}

/// Add the filters and `page_size` to `url`, skipping any key the URL
/// already carries (a server `next` link repeats the original query).
fn with_query(mut url: Url, filters: &Filters, page_size: usize) -> Url {
    let present: HashSet<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
    let missing: Vec<(&str, String)> = filters
        .query_pairs()
        .into_iter()
        .chain(std::iter::once(("page_size", page_size.to_string())))
        .filter(|(k, _)| !present.contains(*k))
        .collect();

    if !missing.is_empty() {
        let mut query = url.query_pairs_mut();
        for (k, v) in &missing {
            query.append_pair(k, v);
        }
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::time::Duration;

    const HOST: &str = "https://api.example.test";

    /// Serves `records` page by page, the way the metrics API does.
    struct FakeApi {
        records: Vec<RawRecord>,
        calls: RefCell<Vec<Url>>,
        body_override: Option<String>,
    }

    impl FakeApi {
        fn new(records: Vec<RawRecord>) -> Self {
            Self {
                records,
                calls: RefCell::new(Vec::new()),
                body_override: None,
            }
        }

        fn calls(&self) -> usize {
            self.calls.borrow().len()
        }

        fn last_query(&self) -> HashMap<String, String> {
            let calls = self.calls.borrow();
            calls.last().unwrap().query_pairs().into_owned().collect()
        }
    }

    impl Transport for FakeApi {
        fn get_text(&self, url: &Url) -> Result<String, FetchError> {
            self.calls.borrow_mut().push(url.clone());
            if let Some(body) = &self.body_override {
                return Ok(body.clone());
            }

            let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
            let page_size: usize = query["page_size"].parse().unwrap();
            let page: usize = query.get("page").map_or(1, |p| p.parse().unwrap());
            let matching: Vec<&RawRecord> = self
                .records
                .iter()
                .filter(|r| query.get("age").map_or(true, |a| &r.age == a))
                .collect();

            let start = (page - 1) * page_size;
            let results = matching
                .iter()
                .skip(start)
                .take(page_size)
                .map(|r| (*r).clone())
                .collect();
            let next = (start + page_size < matching.len()).then(|| {
                let mut next = url.clone();
                next.query_pairs_mut()
                    .clear()
                    .extend_pairs(query.iter().filter(|(k, _)| k.as_str() != "page"))
                    .append_pair("page", &(page + 1).to_string());
                next.to_string()
            });

            Ok(serde_json::to_string(&Page {
                next,
                count: matching.len() as u64,
                results,
            })
            .unwrap())
        }
    }

    fn endpoint() -> Endpoint {
        Endpoint {
            theme: "infectious_disease".into(),
            sub_theme: "respiratory".into(),
            topic: "Influenza".into(),
            geography_type: "Nation".into(),
            geography: "England".into(),
            metric: "influenza_testing_positivityByWeek".into(),
        }
    }

    fn records(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                let age = if i % 2 == 0 { "all" } else { "15-44" };
                RawRecord::new(format!("2024-01-{:02}", i % 28 + 1), age, i as f64)
            })
            .collect()
    }

    fn client(api: &FakeApi) -> PaginatedClient<&FakeApi> {
        PaginatedClient::new(&endpoint(), HOST, api, RateLimiter::new(Duration::ZERO)).unwrap()
    }

    #[test]
    fn test_get_page_walks_the_cursor() {
        let api = FakeApi::new(records(5));
        let mut c = client(&api);
        let f = Filters::default();

        assert_eq!(c.get_page(&f, 2).unwrap().len(), 2);
        assert!(!api.last_query().contains_key("page"));
        assert_eq!(c.get_page(&f, 2).unwrap().len(), 2);
        assert_eq!(api.last_query()["page"], "2");
        assert_eq!(c.get_page(&f, 2).unwrap().len(), 1);
        assert!(c.is_exhausted());
        assert_eq!(c.count(), Some(5));
    }

    #[test]
    fn test_exhausted_cursor_makes_no_request() {
        let api = FakeApi::new(records(3));
        let mut c = client(&api);
        let f = Filters::default();

        c.get_page(&f, 365).unwrap();
        assert!(c.is_exhausted());
        let calls = api.calls();

        for _ in 0..3 {
            assert!(c.get_page(&f, 365).unwrap().is_empty());
        }
        assert_eq!(api.calls(), calls);
    }

    #[test]
    fn test_oversized_page_is_rejected_before_any_request() {
        let api = FakeApi::new(records(3));
        let mut c = client(&api);

        for size in [366, 400, usize::MAX] {
            let err = c.get_page(&Filters::default(), size).unwrap_err();
            assert!(matches!(err, FetchError::InvalidArgument { max: 365, .. }));
            assert!(matches!(
                c.get_all_pages(&Filters::default(), size),
                Err(FetchError::InvalidArgument { .. })
            ));
        }
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn test_all_pages_is_independent_of_page_size() {
        let api = FakeApi::new(records(23));
        let mut c = client(&api);
        let f = Filters::default();

        let full = c.get_all_pages(&f, 365).unwrap();
        assert_eq!(full, records(23));
        for size in [1, 2, 7, 22, 23, 100] {
            assert_eq!(c.get_all_pages(&f, size).unwrap(), full, "page_size {size}");
        }
        // re-running with the same arguments starts over rather than
        // returning the exhausted cursor's empty page
        assert_eq!(c.get_all_pages(&f, 7).unwrap(), full);
    }

    #[test]
    fn test_changed_filters_restart_from_base_url() {
        let api = FakeApi::new(records(10));
        let mut c = client(&api);

        c.get_page(&Filters::default(), 2).unwrap();
        c.get_page(&Filters::default(), 2).unwrap();
        assert_eq!(api.last_query()["page"], "2");

        let by_age = Filters::default().with_age("all");
        let page = c.get_page(&by_age, 2).unwrap();
        let q = api.last_query();
        assert!(!q.contains_key("page"));
        assert_eq!(q["age"], "all");
        assert!(page.iter().all(|r| r.age == "all"));
        assert_eq!(api.calls.borrow().last().unwrap().path(), c.base_url().path());
    }

    #[test]
    fn test_changed_page_size_restarts_from_base_url() {
        let api = FakeApi::new(records(10));
        let mut c = client(&api);
        let f = Filters::default();

        c.get_page(&f, 2).unwrap();
        c.get_page(&f, 2).unwrap();
        let first = c.get_page(&f, 3).unwrap();
        assert!(!api.last_query().contains_key("page"));
        assert_eq!(first, records(10)[..3].to_vec());
    }

    #[test]
    fn test_query_has_only_set_filters_and_page_size() {
        let api = FakeApi::new(records(1));
        let mut c = client(&api);

        c.get_page(&Filters::default().with_year(2024), 50).unwrap();
        let q = api.last_query();
        assert_eq!(q.len(), 2);
        assert_eq!(q["year"], "2024");
        assert_eq!(q["page_size"], "50");
    }

    #[test]
    fn test_next_link_query_is_not_duplicated() {
        let api = FakeApi::new(records(4));
        let mut c = client(&api);
        let f = Filters::default().with_age("all");

        c.get_page(&f, 1).unwrap();
        c.get_page(&f, 1).unwrap();
        let calls = api.calls.borrow();
        let pairs: Vec<_> = calls.last().unwrap().query_pairs().collect();
        assert_eq!(pairs.iter().filter(|(k, _)| k == "page_size").count(), 1);
        assert_eq!(pairs.iter().filter(|(k, _)| k == "age").count(), 1);
    }

    #[test]
    fn test_bad_body_is_a_decode_error() {
        let mut api = FakeApi::new(Vec::new());
        api.body_override = Some(r#"{"detail": "Not found."}"#.into());
        let mut c = client(&api);

        let err = c.get_page(&Filters::default(), 10).unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        // cursor did not move, so the same page is asked for again
        assert!(!c.is_exhausted());
    }

    #[test]
    fn test_empty_dataset_sweep() {
        let api = FakeApi::new(Vec::new());
        let mut c = client(&api);
        assert!(c.get_all_pages(&Filters::default(), 365).unwrap().is_empty());
        assert_eq!(api.calls(), 1);
    }
}
