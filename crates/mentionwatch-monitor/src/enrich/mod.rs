//! Text enrichment: sentiment, topic and keywords. Pure and CPU-only.

mod keywords;
mod scorer;
mod tokenize;
mod topics;

use std::sync::Arc;

use mentionwatch_core::{
    EnrichedMention, RawItem, Sentiment, SentimentThresholds, Topic, TrackedBrand,
};
use serde::Serialize;

pub use keywords::{extract_keywords, StopWords, MAX_KEYWORDS};
pub use scorer::{inflections, LexiconScorer, Scorer};
pub use tokenize::tokenize;
pub use topics::TopicMarkers;

/// Immutable inputs to enrichment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentConfig {
    pub topics: TopicMarkers,
    pub stop_words: StopWords,
    pub thresholds: SentimentThresholds,
}

/// Enrichment output for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub sentiment: Sentiment,
    pub topic: Topic,
    pub keywords: Vec<String>,
}

pub struct Enricher {
    config: EnrichmentConfig,
    scorer: Arc<dyn Scorer>,
}

impl Enricher {
    #[must_use]
    pub fn new(config: EnrichmentConfig, scorer: Arc<dyn Scorer>) -> Self {
        Self { config, scorer }
    }

    /// Enricher with the bundled lexicon scorer.
    #[must_use]
    pub fn with_lexicon(config: EnrichmentConfig) -> Self {
        Self::new(config, Arc::new(LexiconScorer::default()))
    }

    /// Score, classify and extract keywords from `text`. Total: empty text
    /// yields a neutral score of zero, `General`, and no keywords.
    #[must_use]
    pub fn analyze(&self, text: &str) -> TextAnalysis {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return TextAnalysis {
                sentiment: Sentiment::neutral(),
                topic: Topic::General,
                keywords: Vec::new(),
            };
        }

        let score = self.scorer.score(&tokens);
        TextAnalysis {
            sentiment: Sentiment::from_score(score, &self.config.thresholds),
            topic: self.config.topics.classify(text),
            keywords: extract_keywords(&tokens, &self.config.stop_words),
        }
    }

    #[must_use]
    pub fn enrich(&self, brand: &TrackedBrand, item: RawItem) -> EnrichedMention {
        let analysis = self.analyze(&item.text);
        EnrichedMention {
            brand: brand.clone(),
            item,
            sentiment: analysis.sentiment,
            topic: analysis.topic,
            keywords: analysis.keywords,
        }
    }
}

impl Default for Enricher {
    fn default() -> Self {
        Self::with_lexicon(EnrichmentConfig::default())
    }
}
