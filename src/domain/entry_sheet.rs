#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EntrySheet {
    pub id: i64,
    pub author_id: i64,
    pub company: String,
    pub homepage_url: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub entry_sheet_id: i64,
    pub question: String,
    pub answer: String,
    pub char_num: i32,
}

/// What the requesting user is allowed to see of an entry sheet.
#[derive(Debug, PartialEq)]
pub enum EntrySheetAccess {
    Missing,
    Foreign,
    Owned(EntrySheet),
}

impl EntrySheetAccess {
    pub fn check(entry_sheet: Option<EntrySheet>, user_id: i64) -> Self {
        match entry_sheet {
            None => EntrySheetAccess::Missing,
            Some(es) if es.author_id != user_id => EntrySheetAccess::Foreign,
            Some(es) => EntrySheetAccess::Owned(es),
        }
    }
}

/// Counts characters the way users see them, not bytes.
pub fn count_chars(answer: &str) -> i32 {
    i32::try_from(answer.chars().count()).unwrap_or(i32::MAX)
}
