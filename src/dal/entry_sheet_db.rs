use sqlx::PgPool;

use crate::domain::entry_sheet::EntrySheet;

pub async fn get_entry_sheet(pool: &PgPool, id: i64) -> Result<Option<EntrySheet>, sqlx::Error> {
    sqlx::query_as::<_, EntrySheet>(
        r"
        select
            id,
            author_id,
            company,
            homepage_url
        from
            entry_sheet
        where
            id = $1
        ",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
