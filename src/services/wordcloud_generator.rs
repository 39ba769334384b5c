use std::path::PathBuf;

use async_trait::async_trait;
use itertools::Itertools;
use reqwest::Client;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use url::Url;

use crate::configuration::WordcloudSettings;

use super::{GenerateError, WordcloudGenerator};

const WORDCLOUD_DIR: &str = "wordcloud";
const MIN_FONT_SIZE: f64 = 12.0;
const MAX_FONT_SIZE: f64 = 64.0;
const MAX_WORD_CHARS: usize = 30;
const URL_DIGEST_LEN: usize = 12;
const PADDING: f64 = 10.0;
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];
const PALETTE: [&str; 6] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b",
];
const STOP_WORDS: [&str; 40] = [
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "our", "out", "was",
    "with", "this", "that", "from", "your", "have", "has", "will", "more", "about", "here",
    "their", "they", "them", "its", "into", "also", "than", "then", "which", "what", "when",
    "where", "who", "how", "www", "com",
];

/// Builds word clouds from the text of a company homepage and writes them as
/// svg files under `<media_dir>/wordcloud`.
pub struct HomepageWordcloudGenerator {
    client: Client,
    media_dir: PathBuf,
    max_words: usize,
    width: u32,
    height: u32,
}

impl HomepageWordcloudGenerator {
    pub fn new(media_dir: impl Into<PathBuf>, settings: &WordcloudSettings) -> Self {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .unwrap_or_else(|e| {
                log::error!("Falling back to default http client: {:?}", e);
                Client::new()
            });

        HomepageWordcloudGenerator {
            client,
            media_dir: media_dir.into(),
            max_words: settings.max_words,
            width: settings.width,
            height: settings.height,
        }
    }
}

#[async_trait]
impl WordcloudGenerator for HomepageWordcloudGenerator {
    async fn generate(&self, homepage_url: &str) -> Result<String, GenerateError> {
        let url = Url::parse(homepage_url)?;

        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let terms = rank_terms(&extract_visible_text(&html), self.max_words);
        if terms.is_empty() {
            return Err(GenerateError::NoText);
        }
        log::info!("Found {} terms on {}", terms.len(), homepage_url);

        let svg = render_svg(&terms, self.width, self.height);
        let file_name = format!("{}.svg", file_stem_for_url(&url));
        let dir = self.media_dir.join(WORDCLOUD_DIR);

        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&file_name), svg).await?;

        Ok(format!("/media/{}/{}", WORDCLOUD_DIR, file_name))
    }
}

fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body_selector = Selector::parse("body").unwrap();
    let root = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    root.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
            });
            match hidden {
                true => None,
                false => Some(&**text),
            }
        })
        .join(" ")
}

/// Most frequent words first, ties in alphabetical order.
fn rank_terms(text: &str, max_words: usize) -> Vec<(String, usize)> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(|word| word.to_lowercase())
        .filter(|word| {
            let len = word.chars().count();
            (2..=MAX_WORD_CHARS).contains(&len)
                && !word.chars().all(|c| c.is_numeric())
                && !STOP_WORDS.contains(&word.as_str())
        })
        .counts()
        .into_iter()
        .sorted_by(|(a_word, a_count), (b_word, b_count)| {
            b_count.cmp(a_count).then_with(|| a_word.cmp(b_word))
        })
        .take(max_words)
        .collect()
}

fn font_size(count: usize, min_count: usize, max_count: usize) -> f64 {
    if max_count == min_count {
        return MAX_FONT_SIZE;
    }
    let ratio = (count - min_count) as f64 / (max_count - min_count) as f64;
    MIN_FONT_SIZE + ratio * (MAX_FONT_SIZE - MIN_FONT_SIZE)
}

fn estimate_width(word: &str, size: f64) -> f64 {
    word.chars()
        .map(|c| if c.is_ascii() { 0.6 } else { 1.0 })
        .sum::<f64>()
        * size
}

fn escape_xml(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&apos;".to_string(),
            c => c.to_string(),
        })
        .collect()
}

/// Lays the terms out in rows, largest first. Terms that no longer fit
/// on the canvas are dropped.
fn render_svg(terms: &[(String, usize)], width: u32, height: u32) -> String {
    let max_count = terms.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let min_count = terms.iter().map(|(_, c)| *c).min().unwrap_or(0);
    let (width_f, height_f) = (f64::from(width), f64::from(height));

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    );
    svg.push_str(r#"<rect width="100%" height="100%" fill="white"/>"#);

    let mut x = PADDING;
    let mut row_top = PADDING;
    let mut row_height: f64 = 0.0;

    for (i, (word, count)) in terms.iter().enumerate() {
        let size = font_size(*count, min_count, max_count);
        let word_width = estimate_width(word, size);
        if word_width + 2.0 * PADDING > width_f {
            continue;
        }

        if x + word_width + PADDING > width_f {
            x = PADDING;
            row_top += row_height + PADDING;
            row_height = 0.0;
        }
        if row_top + size + PADDING > height_f {
            break;
        }

        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="{:.1}" font-family="sans-serif" fill="{}">{}</text>"#,
            x,
            row_top + size,
            size,
            PALETTE[i % PALETTE.len()],
            escape_xml(word)
        ));

        x += word_width + PADDING;
        row_height = row_height.max(size);
    }

    svg.push_str("</svg>");
    svg
}

fn file_stem_for_url(url: &Url) -> String {
    let raw = format!("{}{}", url.host_str().unwrap_or(""), url.path()).to_lowercase();
    let stem = raw
        .chars()
        .map(|c| match c.is_ascii_alphanumeric() || c == '-' {
            true => c,
            false => '_',
        })
        .dedup_by(|a, b| *a == '_' && *b == '_')
        .collect::<String>();
    let stem = match stem.trim_matches('_') {
        "" => "homepage",
        stem => stem,
    };

    // Digest of the full url keeps urls that sanitize alike apart
    let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
    format!("{}_{}", stem, &digest[..URL_DIGEST_LEN])
}
