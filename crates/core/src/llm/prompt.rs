use crate::domain::pulse::{Headline, MomentumResult};

const NO_NEWS_PLACEHOLDER: &str = "No recent news headlines available.";

/// Renders the sentiment-classification prompt. Pure; the ticker is expected
/// to be normalized (uppercase) already.
pub fn build_prompt(ticker: &str, momentum: &MomentumResult, news: &[Headline]) -> String {
    let news_text = if news.is_empty() {
        NO_NEWS_PLACEHOLDER.to_string()
    } else {
        news.iter()
            .map(|headline| {
                format!(
                    "- Title: {}\n  Description: {}",
                    headline.title,
                    headline.description.as_deref().unwrap_or("N/A")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let returns = momentum
        .returns
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    [
        "You are a financial analyst micro-service. Analyze the provided stock data to determine if the stock is \"bullish\", \"bearish\", or \"neutral\" for tomorrow. Provide a brief explanation.".to_string(),
        String::new(),
        "**Context:**".to_string(),
        format!("- Stock Ticker: {ticker}"),
        format!("- Momentum Score: {}", momentum.score),
        format!("- Last 5 Trading Day Returns: [{returns}]"),
        "- Latest News Headlines:".to_string(),
        news_text,
        String::new(),
        "**Instructions:**".to_string(),
        "- Provide your response as a single JSON object.".to_string(),
        "- The JSON object must have two fields:".to_string(),
        "- `pulse`: A string with the value \"bullish\", \"bearish\", or \"neutral\".".to_string(),
        "- `llm_explanation`: A brief, concise explanation (1-2 sentences) of your decision, referencing both the momentum score and the news headlines. Do not use any other fields or text.".to_string(),
    ]
    .join("\n")
}
