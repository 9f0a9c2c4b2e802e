use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coarse next-day sentiment classification.
///
/// The model is instructed to answer with one of the three literals, but a
/// value outside that set is carried through verbatim in `Other` rather than
/// coerced, so callers see exactly what the model said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Pulse {
    Bullish,
    Bearish,
    Neutral,
    Other(String),
}

impl Default for Pulse {
    fn default() -> Self {
        Pulse::Neutral
    }
}

impl Pulse {
    pub fn as_str(&self) -> &str {
        match self {
            Pulse::Bullish => "bullish",
            Pulse::Bearish => "bearish",
            Pulse::Neutral => "neutral",
            Pulse::Other(s) => s,
        }
    }
}

impl From<String> for Pulse {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bullish" => Pulse::Bullish,
            "bearish" => Pulse::Bearish,
            "neutral" => Pulse::Neutral,
            _ => Pulse::Other(s),
        }
    }
}

impl From<Pulse> for String {
    fn from(p: Pulse) -> Self {
        p.as_str().to_string()
    }
}

/// Short-horizon price momentum: day-over-day percentage returns,
/// most-recent-first, each rounded to 2 decimals, plus their mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentumResult {
    pub returns: Vec<f64>,
    pub score: f64,
}

/// One news article kept for the prompt and the response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// The interpreted model answer: just the two fields the prompt asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseVerdict {
    pub pulse: Pulse,
    pub llm_explanation: String,
}

impl PulseVerdict {
    /// The model replied, but the reply contained no parseable JSON object.
    pub fn invalid_json() -> Self {
        Self {
            pulse: Pulse::Neutral,
            llm_explanation: "Error parsing AI response - invalid JSON format.".to_string(),
        }
    }

    /// The model call itself failed (transport, auth, safety rejection).
    pub fn model_failure() -> Self {
        Self {
            pulse: Pulse::Neutral,
            llm_explanation: "Error generating a market pulse due to an issue with the AI service."
                .to_string(),
        }
    }
}

/// The externally visible result for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseResult {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub momentum: MomentumResult,
    pub news: Vec<Headline>,
    pub pulse: Pulse,
    pub llm_explanation: String,
}
