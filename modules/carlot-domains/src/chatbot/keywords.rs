/// Default cap on keywords taken from one message.
pub const MAX_KEYWORDS: usize = 10;

/// Turn a chat message into search keywords: lowercase, punctuation
/// removed, tokens of two characters or fewer dropped, at most `limit`
/// tokens kept in message order.
pub fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .take(limit)
        .map(str::to_string)
        .collect()
}
