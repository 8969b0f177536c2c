//! Brief enhancement.
//!
//! The contact form lets a visitor type rough notes and have the generation
//! API rewrite them as a production brief. The request goes through the
//! proxy, so this side never holds the credential.

use serde_json::Value;

#[cfg(feature = "proxy")]
use crate::proxy::Upstream;

/// Notes shorter than this are left alone
pub const MIN_NOTES_LEN: usize = 5;

pub const SYSTEM_PROMPT: &str = "Rewrite the user's notes into a clean, professional video production brief. Output STRICTLY plain text only. Keep it concise.";

/// Shown when the upstream answered without any text
pub const NO_DATA_MESSAGE: &str = "No creative data received.";

/// Shown when the request itself failed
pub const FAILURE_MESSAGE: &str = "Transmission failed. Neural link unstable. Please try again.";

/// Prompt sent for `notes`, or `None` when the notes are too short to bother
pub fn build_prompt(notes: &str) -> Option<String> {
    if notes.chars().count() < MIN_NOTES_LEN {
        return None;
    }
    Some(format!("{}\n\nUser Notes: {}", SYSTEM_PROMPT, notes))
}

/// First text part of the first candidate in a generation response
pub fn extract_text(response: &Value) -> Option<&str> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
}

/// Rewrite `notes` through `upstream`.
///
/// Returns `None` when the notes are too short. Failures come back as the
/// user-facing fallback text rather than an error, matching what the form
/// shows in place of the brief.
#[cfg(feature = "proxy")]
pub fn enhance(upstream: &dyn Upstream, notes: &str) -> Option<String> {
    let prompt = build_prompt(notes)?;
    let raw = match upstream.generate(&prompt) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("brief: generation failed: {}", e);
            return Some(FAILURE_MESSAGE.to_string());
        }
    };
    let text = serde_json::from_slice::<Value>(&raw)
        .ok()
        .and_then(|v| extract_text(&v).map(str::to_string));
    Some(text.unwrap_or_else(|| NO_DATA_MESSAGE.to_string()))
}
