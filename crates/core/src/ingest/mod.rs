pub mod alpha_vantage;
pub mod news_api;

use crate::domain::pulse::{Headline, MomentumResult};

/// Daily price-history source. Implementations must not fail: any upstream
/// problem degrades to the zero-value `MomentumResult`.
#[async_trait::async_trait]
pub trait MomentumProvider: Send + Sync {
    async fn fetch_momentum(&self, ticker: &str) -> MomentumResult;
}

/// News-search source. Implementations must not fail: any upstream problem
/// degrades to an empty headline list.
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_headlines(&self, ticker: &str) -> Vec<Headline>;
}
