//! Score extraction from free-text model responses.
//!
//! The evolution stage asks for a 0–10 rating and gets prose back. The
//! grammar accepted here is deliberately narrow: a leading float token,
//! with an optional `/10` suffix and trailing punctuation tolerated.
//! Anything else falls back to the midpoint; scoring must be total.

pub const FALLBACK_SCORE: f64 = 5.0;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

/// Parse the leading numeric token of a response, clamped to [0, 10].
///
/// Never fails; unparseable input yields [`FALLBACK_SCORE`].
pub fn parse_score(response: &str) -> f64 {
    parse_leading_float(response)
        .map(|v| v.clamp(MIN_SCORE, MAX_SCORE))
        .unwrap_or(FALLBACK_SCORE)
}

fn parse_leading_float(response: &str) -> Option<f64> {
    let s = response.trim_start();
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(s.len());
    let token = s[..end].trim_end_matches('.');
    if token.is_empty() {
        return None;
    }
    token.parse::<f64>().ok()
}
