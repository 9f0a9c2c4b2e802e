use crate::domain::contract::LlmVerdict;
use crate::domain::pulse::PulseVerdict;

/// Pulls the JSON object out of a raw model reply: trims whitespace, removes
/// one surrounding Markdown fence (```json ... ``` or ``` ... ```), then
/// slices from the first '{' to the last '}' to shed any surrounding prose.
pub fn extract_json(text: &str) -> Option<&str> {
    let mut t = text.trim();
    if let Some(rest) = t.strip_prefix("```json") {
        t = rest;
    } else if let Some(rest) = t.strip_prefix("```") {
        t = rest;
    }
    if let Some(rest) = t.strip_suffix("```") {
        t = rest;
    }
    let t = t.trim();

    let start = t.find('{')?;
    let end = t.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&t[start..=end])
}

/// Interprets a raw model reply. Never fails: an unusable reply degrades to a
/// neutral verdict with a fixed explanation, and the raw text is logged for
/// diagnosis.
pub fn parse_verdict(raw: &str) -> PulseVerdict {
    let Some(json_str) = extract_json(raw) else {
        tracing::warn!(raw, "no JSON object found in model output");
        return PulseVerdict::invalid_json();
    };

    match serde_json::from_str::<LlmVerdict>(json_str) {
        Ok(verdict) => verdict.into_verdict(),
        Err(err) => {
            tracing::warn!(error = %err, raw, "model output is not valid JSON");
            PulseVerdict::invalid_json()
        }
    }
}
