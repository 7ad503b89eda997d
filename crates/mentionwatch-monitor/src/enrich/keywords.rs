use std::collections::HashSet;

/// Most keywords kept per mention.
pub const MAX_KEYWORDS: usize = 10;

/// Tokens at or below this many characters are never keywords.
const MIN_KEYWORD_EXCLUSIVE_LEN: usize = 3;

const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "is", "are", "was",
    "were", "be", "been", "being",
];

/// Words excluded from keyword extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect())
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::new(DEFAULT_STOP_WORDS)
    }
}

/// First [`MAX_KEYWORDS`] tokens longer than three characters that are not
/// stop words, in original order. Repeats are kept.
#[must_use]
pub fn extract_keywords(tokens: &[String], stop_words: &StopWords) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| t.chars().count() > MIN_KEYWORD_EXCLUSIVE_LEN && !stop_words.contains(t))
        .take(MAX_KEYWORDS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::tokenize::tokenize;

    fn keywords(text: &str) -> Vec<String> {
        extract_keywords(&tokenize(text), &StopWords::default())
    }

    #[test]
    fn drops_short_tokens_and_stop_words() {
        assert_eq!(
            keywords("Brand X has amazing support!"),
            vec!["brand", "amazing", "support"]
        );
        assert!(keywords("they were being there").iter().all(|k| k != "being"));
    }

    #[test]
    fn keeps_first_ten_in_order_with_repeats() {
        let text = "alpha bravo alpha charlie delta echo foxtrot golf hotel india juliet kilo";
        let kw = keywords(text);
        assert_eq!(kw.len(), MAX_KEYWORDS);
        assert_eq!(kw[0], "alpha");
        assert_eq!(kw[2], "alpha");
        assert_eq!(kw[9], "india");
    }

    #[test]
    fn empty_text_has_no_keywords() {
        assert!(keywords("").is_empty());
    }

    #[test]
    fn custom_stop_words_apply() {
        let stop = StopWords::new(["Tesla"]);
        let kw = extract_keywords(&tokenize("Tesla model review"), &stop);
        assert_eq!(kw, vec!["model", "review"]);
    }
}
