use crate::config::Settings;
use crate::domain::pulse::MomentumResult;
use crate::ingest::MomentumProvider;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const TIME_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";

// Window of most-recent calendar days used for the momentum calculation.
const MOMENTUM_WINDOW_DAYS: usize = 5;

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = std::env::var("ALPHA_VANTAGE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("ALPHA_VANTAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Alpha Vantage http client")?;

        Ok(Self {
            http,
            base_url,
            api_key: settings.alpha_vantage_api_key.clone(),
        })
    }

    async fn fetch_once(&self, ticker: &str) -> Result<MomentumResult> {
        let api_key = self
            .api_key
            .as_deref()
            .context("ALPHA_VANTAGE_API_KEY is not configured")?;

        tracing::debug!(ticker, "fetching daily price series");

        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", ticker),
                ("apikey", api_key),
            ])
            .send()
            .await
            .context("price provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read price provider response")?;
        if !status.is_success() {
            anyhow::bail!("price provider HTTP {status}: {text}");
        }

        let data = serde_json::from_str::<Value>(&text)
            .with_context(|| format!("price provider response is not valid JSON: {text}"))?;

        momentum_from_daily(&data)
    }
}

#[async_trait::async_trait]
impl MomentumProvider for AlphaVantageClient {
    async fn fetch_momentum(&self, ticker: &str) -> MomentumResult {
        match self.fetch_once(ticker).await {
            Ok(momentum) => momentum,
            Err(err) => {
                tracing::warn!(ticker, error = %err, "momentum fetch failed; using zero-value momentum");
                MomentumResult::default()
            }
        }
    }
}

/// Extracts the momentum figures from a raw daily time-series response.
/// Provider-level failures ("Error Message", "Note") are errors; a series
/// shorter than two days is the zero-value, not an error.
fn momentum_from_daily(data: &Value) -> Result<MomentumResult> {
    let Some(series) = data.get(TIME_SERIES_KEY).and_then(Value::as_object) else {
        if let Some(msg) = data.get("Error Message").and_then(Value::as_str) {
            anyhow::bail!("price provider error: {msg}");
        }
        if let Some(note) = data.get("Note").and_then(Value::as_str) {
            anyhow::bail!("price provider rate limit: {note}");
        }
        anyhow::bail!("price provider response is missing the daily time series");
    };

    let mut dates: Vec<&str> = series.keys().map(String::as_str).collect();
    // ISO dates sort lexicographically; newest first.
    dates.sort_unstable_by(|a, b| b.cmp(a));

    if dates.len() < 2 {
        tracing::debug!("insufficient data points for momentum calculation");
        return Ok(MomentumResult::default());
    }

    let mut prices = Vec::with_capacity(MOMENTUM_WINDOW_DAYS);
    for date in dates.iter().take(MOMENTUM_WINDOW_DAYS) {
        let close = series
            .get(*date)
            .and_then(|bar| bar.get(CLOSE_KEY))
            .and_then(Value::as_str)
            .with_context(|| format!("missing closing price for {date}"))?;
        let close = close
            .parse::<f64>()
            .with_context(|| format!("unparseable closing price for {date}: {close}"))?;
        prices.push(close);
    }

    Ok(momentum_from_prices(&prices))
}

/// Day-over-day percentage returns over adjacent pairs of a most-recent-first
/// price series, skipping pairs with a zero denominator.
fn momentum_from_prices(prices: &[f64]) -> MomentumResult {
    let mut returns = Vec::new();
    for pair in prices.windows(2) {
        let (curr, prev) = (pair[0], pair[1]);
        if prev == 0.0 {
            continue;
        }
        returns.push(round2((curr - prev) / prev * 100.0));
    }

    let score = if returns.is_empty() {
        0.0
    } else {
        round2(returns.iter().sum::<f64>() / returns.len() as f64)
    };

    MomentumResult { returns, score }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
