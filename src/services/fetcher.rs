// src/services/fetcher.rs

//! Registry fetch service.
//!
//! Pages through the tabular-data API sequentially until the accumulated
//! record count reaches the server-reported total. Pagination is
//! failure-tolerant: a failed page is retried once after a fixed backoff,
//! and a second failure aborts the loop with whatever was accumulated.
//! The caller decides whether a partial set is usable.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::error::Result;
use crate::models::{ApiConfig, Record};
use crate::utils::http;

/// One page of the remote registry.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Pagination metadata reported by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub total: u64,
}

/// Source of registry pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page (1-based).
    async fn fetch_page(&self, page: u64) -> Result<Page>;
}

/// Page source backed by the tabular-data HTTP API.
///
/// Request shape: `GET {base}/resources/{id}/data/?page={n}&page_size={s}`.
pub struct HttpPageSource {
    client: reqwest::Client,
    data_url: Url,
    page_size: u64,
}

impl HttpPageSource {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = http::create_client(config)?;
        let data_url = Url::parse(&format!(
            "{}/resources/{}/data/",
            config.base_url.trim_end_matches('/'),
            config.resource_id
        ))?;
        Ok(Self {
            client,
            data_url,
            page_size: config.page_size,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self, page: u64) -> Result<Page> {
        let mut url = self.data_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &self.page_size.to_string());

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<Page>().await?)
    }
}

/// Sequential paginated fetcher over any [`PageSource`].
pub struct RegistryFetcher<S> {
    source: S,
    max_pages: u64,
    retry_delay: Duration,
    page_delay: Duration,
}

impl<S: PageSource> RegistryFetcher<S> {
    pub fn new(source: S, config: &ApiConfig) -> Self {
        Self {
            source,
            max_pages: config.max_pages,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }

    /// Fetch the full record set.
    ///
    /// Stops when the accumulated count reaches the reported total, a page
    /// comes back empty, or the page ceiling is hit (logged, not fatal).
    pub async fn fetch_all(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut page = 1u64;

        loop {
            if page > self.max_pages {
                log::warn!(
                    "Pagination ceiling of {} pages reached with {} records; stopping",
                    self.max_pages,
                    records.len()
                );
                break;
            }

            let fetched = match self.fetch_page_with_retry(page).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    log::error!(
                        "Page {} failed after retry: {}. Keeping {} records fetched so far",
                        page,
                        e,
                        records.len()
                    );
                    break;
                }
            };

            if fetched.data.is_empty() {
                break;
            }

            let total = fetched.meta.total;
            records.extend(fetched.data);

            if page % 100 == 0 {
                log::info!("Fetched {} pages ({} records so far)", page, records.len());
            }

            if total > 0 && records.len() as u64 >= total {
                break;
            }

            page += 1;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(records)
    }

    /// Fetch one page, retrying exactly once after a fixed backoff.
    async fn fetch_page_with_retry(&self, page: u64) -> Result<Page> {
        match self.source.fetch_page(page).await {
            Ok(fetched) => Ok(fetched),
            Err(first) => {
                log::warn!(
                    "Page {} fetch failed: {}. Retrying in {:?}",
                    page,
                    first,
                    self.retry_delay
                );
                if !self.retry_delay.is_zero() {
                    tokio::time::sleep(self.retry_delay).await;
                }
                self.source.fetch_page(page).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Page source replaying a scripted sequence of responses.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Page>>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Page>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }
    }

    #[async_trait]
    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, page: u64) -> Result<Page> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::fetch(format!("page {page}"), "script exhausted")))
        }
    }

    fn page_of(ids: &[u64], total: u64) -> Page {
        let data = ids
            .iter()
            .map(|id| serde_json::from_value(json!({"id": id, "name": format!("C{id}")})).unwrap())
            .collect();
        Page {
            data,
            meta: PageMeta { total },
        }
    }

    fn test_config(max_pages: u64) -> ApiConfig {
        ApiConfig {
            max_pages,
            retry_delay_ms: 0,
            page_delay_ms: 0,
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_stops_when_total_reached() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(&[1, 2], 4)),
            Ok(page_of(&[3, 4], 4)),
            // A third page would be a script-exhausted error
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(1500));

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_page_terminates_despite_inflated_total() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(&[1, 2], 1000)),
            Ok(page_of(&[], 1000)),
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(1500));

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_retry_recovers_single_failure() {
        let source = ScriptedSource::new(vec![
            Err(AppError::fetch("page 1", "503")),
            Ok(page_of(&[1], 1)),
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(1500));

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_double_failure_returns_partial() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(&[1, 2], 10)),
            Err(AppError::fetch("page 2", "timeout")),
            Err(AppError::fetch("page 2", "timeout")),
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(1500));

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_double_failure_on_first_page_yields_empty() {
        let source = ScriptedSource::new(vec![
            Err(AppError::fetch("page 1", "down")),
            Err(AppError::fetch("page 1", "down")),
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(1500));

        let records = fetcher.fetch_all().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_page_ceiling_terminates() {
        let source = ScriptedSource::new(vec![
            Ok(page_of(&[1], 1_000_000)),
            Ok(page_of(&[2], 1_000_000)),
            Ok(page_of(&[3], 1_000_000)),
        ]);
        let fetcher = RegistryFetcher::new(source, &test_config(3));

        let records = fetcher.fetch_all().await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_http_source_url_shape() {
        let config = ApiConfig {
            resource_id: "registre".to_string(),
            ..ApiConfig::default()
        };
        let source = HttpPageSource::new(&config).unwrap();
        assert!(source.data_url.as_str().ends_with("/resources/registre/data/"));
    }
}
