use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{configuration::NewsSettings, domain::news::NewsItem};

pub struct NewsClient {
    client: Client,
    url: String,
    api_key: String,
    page_size: u8,
}

#[derive(Serialize)]
struct EverythingQuery<'a> {
    q: &'a str,
    #[serde(rename = "pageSize")]
    page_size: u8,
    #[serde(rename = "apiKey")]
    api_key: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct Article {
    title: Option<String>,
    url: Option<String>,
}

impl NewsClient {
    pub fn new(settings: &NewsSettings) -> Self {
        NewsClient {
            client: Client::new(),
            url: format!("{}/v2/everything", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
            page_size: settings.page_size,
        }
    }

    /// Headlines mentioning `company`. Empty when the news api is unavailable.
    pub async fn get_news(&self, company: &str) -> Vec<NewsItem> {
        if self.api_key.is_empty() || company.trim().is_empty() {
            return vec![];
        }

        match self
            .client
            .get(&self.url)
            .query(&EverythingQuery {
                q: company.trim(),
                page_size: self.page_size,
                api_key: &self.api_key,
            })
            .send()
            .await
            .and_then(|res| res.error_for_status())
        {
            Ok(res) => match res.json::<ApiResponse>().await {
                Ok(json) => into_news_items(json),
                Err(e) => {
                    log::error!("Error when deserializing news to json: {:?}", e);
                    vec![]
                }
            },
            Err(e) => {
                log::error!("Got error from news api for {}: {:?}", company, e);
                vec![]
            }
        }
    }
}

fn into_news_items(response: ApiResponse) -> Vec<NewsItem> {
    response
        .articles
        .into_iter()
        .filter_map(|a| match (a.title, a.url) {
            (Some(title), Some(url)) if !title.is_empty() => Some(NewsItem { title, url }),
            _ => None,
        })
        .collect()
}
