use crate::cache::{InMemoryPulseCache, PulseCache};
use crate::config::Settings;
use crate::domain::pulse::{PulseResult, PulseVerdict};
use crate::ingest::alpha_vantage::AlphaVantageClient;
use crate::ingest::news_api::NewsApiClient;
use crate::ingest::{MomentumProvider, NewsProvider};
use crate::llm::gemini::GeminiClient;
use crate::llm::{json, prompt, TextModel};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;

/// Caller- or operator-actionable failures. Everything upstream of these
/// degrades inside the pipeline instead of surfacing as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PulseError {
    EmptyTicker,
    MissingPriceApiKey,
    MissingNewsApiKey,
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseError::EmptyTicker => write!(f, "Ticker is required."),
            PulseError::MissingPriceApiKey => {
                write!(f, "Alpha Vantage API key not configured.")
            }
            PulseError::MissingNewsApiKey => write!(f, "News API key not configured."),
        }
    }
}

impl std::error::Error for PulseError {}

/// Runs the whole per-ticker pipeline: cache, the two upstream fetches, the
/// prompt, the model call, interpretation, and the cache write-back.
pub struct MarketPulseService {
    momentum: Arc<dyn MomentumProvider>,
    news: Arc<dyn NewsProvider>,
    model: Arc<dyn TextModel>,
    cache: Arc<dyn PulseCache>,
    settings: Settings,
}

impl MarketPulseService {
    pub fn new(
        momentum: Arc<dyn MomentumProvider>,
        news: Arc<dyn NewsProvider>,
        model: Arc<dyn TextModel>,
        cache: Arc<dyn PulseCache>,
        settings: Settings,
    ) -> Self {
        Self {
            momentum,
            news,
            model,
            cache,
            settings,
        }
    }

    /// Wires the real clients and an in-memory cache.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            Arc::new(AlphaVantageClient::from_settings(settings)?),
            Arc::new(NewsApiClient::from_settings(settings)?),
            Arc::new(GeminiClient::from_settings(settings)?),
            Arc::new(InMemoryPulseCache::new()),
            settings.clone(),
        ))
    }

    pub async fn market_pulse(&self, ticker: &str) -> Result<PulseResult, PulseError> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(PulseError::EmptyTicker);
        }

        if let Some(hit) = self.cache.lookup(&ticker).await {
            tracing::debug!(%ticker, "serving cached market pulse");
            return Ok(hit);
        }

        if self.settings.alpha_vantage_api_key.is_none() {
            return Err(PulseError::MissingPriceApiKey);
        }
        if self.settings.news_api_key.is_none() {
            return Err(PulseError::MissingNewsApiKey);
        }

        tracing::info!(%ticker, "computing market pulse");

        // Independent upstreams; both degrade to their zero values on failure.
        let (momentum, news) = tokio::join!(
            self.momentum.fetch_momentum(&ticker),
            self.news.fetch_headlines(&ticker)
        );

        let prompt = prompt::build_prompt(&ticker, &momentum, &news);
        let verdict = match self.model.generate(&prompt).await {
            Ok(raw) => json::parse_verdict(&raw),
            Err(err) => {
                tracing::warn!(%ticker, error = %err, "model call failed; returning neutral pulse");
                PulseVerdict::model_failure()
            }
        };

        let result = PulseResult {
            ticker: ticker.clone(),
            as_of: chrono::Utc::now().date_naive(),
            momentum,
            news,
            pulse: verdict.pulse,
            llm_explanation: verdict.llm_explanation,
        };

        self.cache.store(&ticker, result.clone()).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryPulseCache;
    use crate::domain::pulse::{Headline, MomentumResult, Pulse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedMomentum {
        calls: AtomicUsize,
        result: MomentumResult,
    }

    #[async_trait::async_trait]
    impl MomentumProvider for FixedMomentum {
        async fn fetch_momentum(&self, _ticker: &str) -> MomentumResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    struct FixedNews {
        calls: AtomicUsize,
        headlines: Vec<Headline>,
    }

    #[async_trait::async_trait]
    impl NewsProvider for FixedNews {
        async fn fetch_headlines(&self, _ticker: &str) -> Vec<Headline> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.headlines.clone()
        }
    }

    struct FixedModel {
        reply: anyhow::Result<String>,
    }

    #[async_trait::async_trait]
    impl TextModel for FixedModel {
        async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn settings() -> Settings {
        Settings {
            alpha_vantage_api_key: Some("av-key".to_string()),
            news_api_key: Some("news-key".to_string()),
            gemini_api_key: Some("gemini-key".to_string()),
            sentry_dsn: None,
            frontend_origin: None,
        }
    }

    fn service(
        settings: Settings,
        reply: anyhow::Result<String>,
        cache: Arc<dyn PulseCache>,
    ) -> (MarketPulseService, Arc<FixedMomentum>, Arc<FixedNews>) {
        let momentum = Arc::new(FixedMomentum {
            calls: AtomicUsize::new(0),
            result: MomentumResult {
                returns: vec![0.97, 1.98],
                score: 1.48,
            },
        });
        let news = Arc::new(FixedNews {
            calls: AtomicUsize::new(0),
            headlines: vec![Headline {
                title: "Earnings beat".to_string(),
                description: Some("Up 5%".to_string()),
                url: None,
            }],
        });
        let svc = MarketPulseService::new(
            momentum.clone(),
            news.clone(),
            Arc::new(FixedModel { reply }),
            cache,
            settings,
        );
        (svc, momentum, news)
    }

    #[tokio::test]
    async fn happy_path_assembles_result() {
        let (svc, _, _) = service(
            settings(),
            Ok("{\"pulse\":\"bullish\",\"llm_explanation\":\"Momentum and news agree.\"}"
                .to_string()),
            Arc::new(InMemoryPulseCache::new()),
        );

        let result = svc.market_pulse("aapl").await.unwrap();
        assert_eq!(result.ticker, "AAPL");
        assert_eq!(result.pulse, Pulse::Bullish);
        assert_eq!(result.llm_explanation, "Momentum and news agree.");
        assert_eq!(result.momentum.score, 1.48);
        assert_eq!(result.news.len(), 1);
    }

    #[tokio::test]
    async fn empty_ticker_is_rejected() {
        let (svc, _, _) = service(
            settings(),
            Ok("{}".to_string()),
            Arc::new(InMemoryPulseCache::new()),
        );
        assert_eq!(
            svc.market_pulse("   ").await.unwrap_err(),
            PulseError::EmptyTicker
        );
    }

    #[tokio::test]
    async fn missing_credentials_are_distinct_errors() {
        let mut no_price = settings();
        no_price.alpha_vantage_api_key = None;
        let (svc, _, _) = service(
            no_price,
            Ok("{}".to_string()),
            Arc::new(InMemoryPulseCache::new()),
        );
        assert_eq!(
            svc.market_pulse("AAPL").await.unwrap_err(),
            PulseError::MissingPriceApiKey
        );

        let mut no_news = settings();
        no_news.news_api_key = None;
        let (svc, _, _) = service(
            no_news,
            Ok("{}".to_string()),
            Arc::new(InMemoryPulseCache::new()),
        );
        assert_eq!(
            svc.market_pulse("AAPL").await.unwrap_err(),
            PulseError::MissingNewsApiKey
        );
    }

    #[tokio::test]
    async fn model_failure_degrades_to_neutral() {
        let (svc, _, _) = service(
            settings(),
            Err(anyhow::anyhow!("model unavailable")),
            Arc::new(InMemoryPulseCache::new()),
        );

        let result = svc.market_pulse("AAPL").await.unwrap();
        assert_eq!(result.pulse, Pulse::Neutral);
        assert_eq!(
            result.llm_explanation,
            "Error generating a market pulse due to an issue with the AI service."
        );
    }

    #[tokio::test]
    async fn cache_hit_skips_fetchers() {
        let (svc, momentum, news) = service(
            settings(),
            Ok("{\"pulse\":\"bullish\",\"llm_explanation\":\"x\"}".to_string()),
            Arc::new(InMemoryPulseCache::new()),
        );

        let first = svc.market_pulse("AAPL").await.unwrap();
        // Case-insensitive key: same entry.
        let second = svc.market_pulse("aapl ").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(momentum.calls.load(Ordering::SeqCst), 1);
        assert_eq!(news.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_cache_triggers_recomputation() {
        let (svc, momentum, _) = service(
            settings(),
            Ok("{\"pulse\":\"bullish\",\"llm_explanation\":\"x\"}".to_string()),
            Arc::new(InMemoryPulseCache::with_ttl(Duration::ZERO)),
        );

        svc.market_pulse("AAPL").await.unwrap();
        svc.market_pulse("AAPL").await.unwrap();
        assert_eq!(momentum.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_payloads() {
        let reply = "{\"pulse\":\"bearish\",\"llm_explanation\":\"Weak tape.\"}".to_string();
        let (first_svc, _, _) = service(
            settings(),
            Ok(reply.clone()),
            Arc::new(InMemoryPulseCache::new()),
        );
        let (second_svc, _, _) =
            service(settings(), Ok(reply), Arc::new(InMemoryPulseCache::new()));

        let a = first_svc.market_pulse("AAPL").await.unwrap();
        let b = second_svc.market_pulse("AAPL").await.unwrap();

        assert_eq!(a.ticker, b.ticker);
        assert_eq!(a.momentum, b.momentum);
        assert_eq!(a.news, b.news);
        assert_eq!(a.pulse, b.pulse);
        assert_eq!(a.llm_explanation, b.llm_explanation);
    }
}
