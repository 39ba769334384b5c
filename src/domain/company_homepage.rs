/// Stored in place of a real path when a record was created before its word cloud.
pub const SENTINEL_WORDCLOUD_PATH: &str = "dummy_path";

/// Served instead of a generated word cloud when generation is disabled.
pub const PRODUCTION_WORDCLOUD_PATH: &str = "/static/esuits/images/kanban_jyunbi.png";

pub const FAILED_WORDCLOUD_PATH: &str = "/static/esuits/images/wordcloud_failed.png";

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CompanyHomepage {
    pub id: i64,
    pub company: String,
    pub homepage_url: String,
    pub word_cloud_path: Option<String>,
}

impl CompanyHomepage {
    /// The cached word cloud path, or `None` when it still has to be generated.
    pub fn fresh_word_cloud_path(&self) -> Option<&str> {
        match self.word_cloud_path.as_deref() {
            None | Some(SENTINEL_WORDCLOUD_PATH) => None,
            Some(path) => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CompanyHomepage;

    fn homepage(path: Option<&str>) -> CompanyHomepage {
        CompanyHomepage {
            id: 1,
            company: "Acme".to_string(),
            homepage_url: "https://acme.example".to_string(),
            word_cloud_path: path.map(|p| p.to_string()),
        }
    }

    #[test]
    fn null_and_sentinel_paths_are_stale() {
        assert_eq!(homepage(None).fresh_word_cloud_path(), None);
        assert_eq!(homepage(Some("dummy_path")).fresh_word_cloud_path(), None);
    }

    #[test]
    fn stored_path_is_fresh() {
        assert_eq!(
            homepage(Some("/media/wordcloud/acme.svg")).fresh_word_cloud_path(),
            Some("/media/wordcloud/acme.svg")
        );
    }
}
