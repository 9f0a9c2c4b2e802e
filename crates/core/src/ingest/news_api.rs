use crate::config::Settings;
use crate::domain::pulse::Headline;
use crate::ingest::NewsProvider;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://newsapi.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

// How many articles to request, and the hard cap on what we keep.
const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url =
            std::env::var("NEWS_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("NEWS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build News API http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.news_api_key.clone(),
        })
    }

    async fn fetch_once(&self, ticker: &str) -> Result<Vec<Headline>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("NEWS_API_KEY is not configured")?;

        tracing::debug!(ticker, "fetching news headlines");

        let url = format!("{}/v2/everything", self.base_url.trim_end_matches('/'));
        let page_size = PAGE_SIZE.to_string();
        let res = self
            .http
            .get(url)
            .query(&[
                ("q", ticker),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key),
            ])
            .send()
            .await
            .context("news provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read news provider response")?;
        if !status.is_success() {
            anyhow::bail!("news provider HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<NewsSearchResponse>(&text)
            .with_context(|| format!("news provider response is not valid JSON: {text}"))?;

        if parsed.status != "ok" {
            anyhow::bail!(
                "news provider returned status {:?}: {}",
                parsed.status,
                parsed.message.as_deref().unwrap_or("no message provided")
            );
        }

        tracing::debug!(
            ticker,
            total_results = parsed.total_results,
            returned = parsed.articles.len(),
            "news search complete"
        );

        Ok(headlines_from_articles(parsed.articles))
    }
}

#[async_trait::async_trait]
impl NewsProvider for NewsApiClient {
    async fn fetch_headlines(&self, ticker: &str) -> Vec<Headline> {
        match self.fetch_once(ticker).await {
            Ok(headlines) => headlines,
            Err(err) => {
                tracing::warn!(ticker, error = %err, "news fetch failed; continuing without headlines");
                Vec::new()
            }
        }
    }
}

/// Keeps only articles with a non-whitespace title, preserving provider order.
fn headlines_from_articles(articles: Vec<RawArticle>) -> Vec<Headline> {
    articles
        .into_iter()
        .filter_map(|article| {
            let title = article.title.filter(|t| !t.trim().is_empty())?;
            Some(Headline {
                title,
                description: article.description,
                url: article.url,
            })
        })
        .take(PAGE_SIZE)
        .collect()
}

#[derive(Debug, Deserialize)]
struct NewsSearchResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default, rename = "totalResults")]
    total_results: u64,
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
}
