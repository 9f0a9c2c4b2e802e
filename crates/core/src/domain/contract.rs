use crate::domain::pulse::{Pulse, PulseVerdict};
use serde::Deserialize;

/// The loose wire shape the model is asked to emit. Both fields are optional
/// and unknown fields are ignored; conversion into [`PulseVerdict`] applies
/// the documented defaults instead of failing.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmVerdict {
    #[serde(default)]
    pub pulse: Option<Pulse>,
    #[serde(default)]
    pub llm_explanation: Option<String>,
}

impl LlmVerdict {
    pub fn into_verdict(self) -> PulseVerdict {
        PulseVerdict {
            pulse: self.pulse.unwrap_or_default(),
            llm_explanation: self
                .llm_explanation
                .unwrap_or_else(|| "Could not generate an explanation.".to_string()),
        }
    }
}
