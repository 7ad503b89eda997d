use std::sync::LazyLock;

use regex::Regex;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}_]+").expect("valid regex"));

/// Split text on runs of non-word characters and lower-case each token.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    NON_WORD_RE
        .split(text)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}
