pub mod answer_form;
pub mod company_homepage;
pub mod entry_sheet;
pub mod news;
