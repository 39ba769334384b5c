use sqlx::{postgres::PgQueryResult, PgPool};

use crate::domain::company_homepage::{CompanyHomepage, SENTINEL_WORDCLOUD_PATH};

pub async fn get_homepage_by_url(
    pool: &PgPool,
    homepage_url: &str,
) -> Result<Option<CompanyHomepage>, sqlx::Error> {
    sqlx::query_as::<_, CompanyHomepage>(
        r"
        select
            id,
            company,
            homepage_url,
            word_cloud_path
        from
            company_homepage
        where
            homepage_url = $1
        ",
    )
    .bind(homepage_url)
    .fetch_optional(pool)
    .await
}

/// Inserts the record, or fills in the path of a racing insert that has none yet.
/// A usable path already stored wins. Returns the stored path.
pub async fn insert_homepage(
    pool: &PgPool,
    company: &str,
    homepage_url: &str,
    word_cloud_path: &str,
) -> Result<String, sqlx::Error> {
    let stored_path: Option<String> = sqlx::query_scalar(
        r"
        insert into company_homepage
            (company, homepage_url, word_cloud_path)
        values
            ($1, $2, $3)
        on conflict(homepage_url) do update set
            word_cloud_path = coalesce(
                nullif(company_homepage.word_cloud_path, $4),
                excluded.word_cloud_path
            )
        returning word_cloud_path
        ",
    )
    .bind(company)
    .bind(homepage_url)
    .bind(word_cloud_path)
    .bind(SENTINEL_WORDCLOUD_PATH)
    .fetch_one(pool)
    .await?;

    Ok(stored_path.unwrap_or_else(|| word_cloud_path.to_string()))
}

pub async fn update_word_cloud_path(
    pool: &PgPool,
    id: i64,
    word_cloud_path: &str,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r"
        update company_homepage set
            word_cloud_path = $1
        where
            id = $2
        ",
    )
    .bind(word_cloud_path)
    .bind(id)
    .execute(pool)
    .await
}
