use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn stable_hash(key: &str, salt: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    salt.hash(&mut hasher);
    hasher.finish()
}

/// Deterministic value in `[0, 1)` derived from `key` and `salt`.
pub fn stable_unit(key: &str, salt: &str) -> f64 {
    (stable_hash(key, salt) >> 11) as f64 / (1u64 << 53) as f64
}

/// Deterministic index in `0..len`; `len` must be non-zero.
pub fn stable_index(key: &str, salt: &str, len: usize) -> usize {
    ((stable_unit(key, salt) * len as f64) as usize).min(len.saturating_sub(1))
}

/// Shortens `text` to at most `max_chars` characters, ending in an ellipsis.
pub fn truncate_label(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let kept = text
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    Cow::Owned(format!("{kept}…"))
}
