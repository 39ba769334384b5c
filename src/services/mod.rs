pub mod homepage_store;
pub mod news_client;
pub mod wordcloud;
pub mod wordcloud_generator;

pub use homepage_store::*;
pub use news_client::*;
pub use wordcloud::*;
pub use wordcloud_generator::*;
