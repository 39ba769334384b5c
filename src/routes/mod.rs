pub mod current_user;
pub mod es_edit_route;
pub mod health_route;
pub mod related_post_route;
pub mod wordcloud_route;

pub use current_user::*;

/// Ids arrive as free text in query strings.
fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|id| id.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::parse_id;

    #[test]
    fn parse_id_trims_and_rejects_garbage() {
        assert_eq!(parse_id(Some(" 12 ")), Some(12));
        assert_eq!(parse_id(Some("")), None);
        assert_eq!(parse_id(Some("12a")), None);
        assert_eq!(parse_id(None), None);
    }
}
