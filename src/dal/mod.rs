pub mod entry_sheet_db;
pub mod homepage_db;
pub mod question_db;
