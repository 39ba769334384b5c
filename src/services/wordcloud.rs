use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::company_homepage::{
    CompanyHomepage, FAILED_WORDCLOUD_PATH, PRODUCTION_WORDCLOUD_PATH,
};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Invalid homepage url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Failed to fetch homepage: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Homepage has no usable text")]
    NoText,
    #[error("Failed to write word cloud: {0}")]
    Io(#[from] std::io::Error),
    #[error("Word cloud generation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Records of company homepages keyed by their url.
#[async_trait]
pub trait HomepageStore: Send + Sync {
    async fn find_by_url(&self, homepage_url: &str)
        -> Result<Option<CompanyHomepage>, StoreError>;

    /// Creates the record for `homepage_url`. When another writer created it
    /// first and it already holds a usable path, that path is kept.
    /// Returns the path now stored.
    async fn create(
        &self,
        company: &str,
        homepage_url: &str,
        word_cloud_path: &str,
    ) -> Result<String, StoreError>;

    async fn update_path(&self, id: i64, word_cloud_path: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait WordcloudGenerator: Send + Sync {
    /// Renders a word cloud for the page at `homepage_url` and returns its public path.
    async fn generate(&self, homepage_url: &str) -> Result<String, GenerateError>;
}

/// Resolves a homepage url to a word cloud image path, generating it at most
/// once per url and caching the result in the [`HomepageStore`].
pub struct WordcloudResolver {
    store: Arc<dyn HomepageStore>,
    generator: Arc<dyn WordcloudGenerator>,
    debug: bool,
    timeout: Duration,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl WordcloudResolver {
    pub fn new(
        store: Arc<dyn HomepageStore>,
        generator: Arc<dyn WordcloudGenerator>,
        debug: bool,
        timeout: Duration,
    ) -> Self {
        WordcloudResolver {
            store,
            generator,
            debug,
            timeout,
            in_flight: DashMap::new(),
        }
    }

    /// Never fails: every problem degrades to a placeholder image path.
    pub async fn resolve(&self, company: &str, homepage_url: &str) -> String {
        if !self.debug {
            return PRODUCTION_WORDCLOUD_PATH.to_string();
        }

        let in_flight = InFlight::enter(&self.in_flight, homepage_url);
        let resolved = {
            let _guard = in_flight.lock().await;
            self.resolve_locked(company, homepage_url).await
        };
        drop(in_flight);

        match resolved {
            Ok(path) => path,
            Err(e) => {
                log::error!("Word cloud store failed for {}: {:?}", homepage_url, e);
                FAILED_WORDCLOUD_PATH.to_string()
            }
        }
    }

    async fn resolve_locked(
        &self,
        company: &str,
        homepage_url: &str,
    ) -> Result<String, StoreError> {
        let record = self.store.find_by_url(homepage_url).await?;

        if let Some(path) = record.as_ref().and_then(|r| r.fresh_word_cloud_path()) {
            log::info!("Word cloud cache hit for {}", homepage_url);
            return Ok(path.to_string());
        }

        let path = match self.generate(homepage_url).await {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Word cloud generation failed for {}: {}", homepage_url, e);
                return Ok(FAILED_WORDCLOUD_PATH.to_string());
            }
        };

        let stored = match record {
            Some(record) => {
                log::info!("Refreshed stale word cloud for {}", homepage_url);
                self.store
                    .update_path(record.id, &path)
                    .await
                    .map(|_| path.clone())
            }
            None => {
                log::info!("Created word cloud for {}", homepage_url);
                self.store.create(company, homepage_url, &path).await
            }
        };

        // The image exists on disk even when it could not be recorded
        Ok(stored.unwrap_or_else(|e| {
            log::error!("Failed to save word cloud for {}: {:?}", homepage_url, e);
            path
        }))
    }

    async fn generate(&self, homepage_url: &str) -> Result<String, GenerateError> {
        tokio::time::timeout(self.timeout, self.generator.generate(homepage_url))
            .await
            .unwrap_or(Err(GenerateError::Timeout(self.timeout)))
    }
}

/// A caller's claim on the lock of one url. The map entry is removed when
/// the last claim drops, including when the resolving future is cancelled.
struct InFlight<'a> {
    map: &'a DashMap<String, Arc<Mutex<()>>>,
    homepage_url: &'a str,
    lock: Arc<Mutex<()>>,
}

impl<'a> InFlight<'a> {
    fn enter(map: &'a DashMap<String, Arc<Mutex<()>>>, homepage_url: &'a str) -> Self {
        let lock = map
            .entry(homepage_url.to_string())
            .or_default()
            .value()
            .clone();

        InFlight {
            map,
            homepage_url,
            lock,
        }
    }

    async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        // Release our handle first so the count only sees other claims
        drop(std::mem::take(&mut self.lock));
        self.map
            .remove_if(self.homepage_url, |_, lock| Arc::strong_count(lock) == 1);
    }
}
