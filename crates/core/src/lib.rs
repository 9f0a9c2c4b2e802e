pub mod cache;
pub mod domain;
pub mod ingest;
pub mod llm;
pub mod service;

pub mod config {
    /// Process-wide configuration, read once at startup. Credentials stay
    /// optional here; each consumer decides whether a missing key is fatal.
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub alpha_vantage_api_key: Option<String>,
        pub news_api_key: Option<String>,
        pub gemini_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub frontend_origin: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").ok(),
                news_api_key: std::env::var("NEWS_API_KEY").ok(),
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                frontend_origin: std::env::var("FRONTEND_ORIGIN").ok(),
            })
        }
    }
}
