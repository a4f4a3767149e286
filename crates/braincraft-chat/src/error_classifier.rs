//! Maps raw failure messages to safe, user-facing text.
//!
//! All substring matching on error text lives here.

/// Marker present in every credential/configuration failure message.
pub const API_KEY_MARKER: &str = "MISTRAL_API_KEY";

pub const API_KEY_MESSAGE: &str = "API key configuration error. Please contact support.";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again in a moment.";

/// Classify an error message. First match wins; unmatched input is returned
/// unchanged.
pub fn classify_error(message: &str) -> String {
    if message.contains(API_KEY_MARKER) {
        return API_KEY_MESSAGE.to_string();
    }
    if message.to_lowercase().contains("rate limit") {
        return RATE_LIMIT_MESSAGE.to_string();
    }
    message.to_string()
}
