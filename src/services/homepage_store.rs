use async_trait::async_trait;
use sqlx::PgPool;

use crate::{dal::homepage_db, domain::company_homepage::CompanyHomepage};

use super::{HomepageStore, StoreError};

pub struct PgHomepageStore {
    pool: PgPool,
}

impl PgHomepageStore {
    pub fn new(pool: PgPool) -> Self {
        PgHomepageStore { pool }
    }
}

#[async_trait]
impl HomepageStore for PgHomepageStore {
    async fn find_by_url(
        &self,
        homepage_url: &str,
    ) -> Result<Option<CompanyHomepage>, StoreError> {
        Ok(homepage_db::get_homepage_by_url(&self.pool, homepage_url).await?)
    }

    async fn create(
        &self,
        company: &str,
        homepage_url: &str,
        word_cloud_path: &str,
    ) -> Result<String, StoreError> {
        Ok(homepage_db::insert_homepage(&self.pool, company, homepage_url, word_cloud_path).await?)
    }

    async fn update_path(&self, id: i64, word_cloud_path: &str) -> Result<(), StoreError> {
        homepage_db::update_word_cloud_path(&self.pool, id, word_cloud_path).await?;
        Ok(())
    }
}
