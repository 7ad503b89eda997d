//! Lexicon sentiment scorer.

use std::collections::HashMap;

/// Maps a token sequence to a polarity score.
pub trait Scorer: Send + Sync {
    /// Score already-tokenized, lower-cased text. Empty input scores `0.0`.
    fn score(&self, tokens: &[String]) -> f64;
}

/// AFINN-style English word valences in `-5..=5`.
///
/// Each entry also covers the regular inflections [`inflections`] derives
/// from it. Inflected forms listed here explicitly (`fined`) take their own
/// weight instead.
pub(crate) const LEXICON: &[(&str, i32)] = &[
    // Positive
    ("accomplish", 2),
    ("admire", 3),
    ("adore", 3),
    ("advantage", 2),
    ("amazing", 4),
    ("appreciate", 2),
    ("approval", 2),
    ("attractive", 2),
    ("awesome", 4),
    ("beautiful", 3),
    ("best", 3),
    ("better", 2),
    ("brilliant", 4),
    ("calm", 2),
    ("celebrate", 3),
    ("charming", 3),
    ("cheer", 2),
    ("clean", 2),
    ("clever", 2),
    ("comfortable", 2),
    ("confident", 2),
    ("cool", 1),
    ("delight", 3),
    ("easy", 1),
    ("effective", 2),
    ("efficient", 2),
    ("enjoy", 2),
    ("excellent", 3),
    ("excited", 3),
    ("fabulous", 4),
    ("fair", 2),
    ("fantastic", 4),
    ("favorite", 2),
    ("fine", 2),
    ("fined", -2),
    ("fines", -2),
    ("free", 1),
    ("friendly", 2),
    ("fun", 4),
    ("glad", 3),
    ("good", 3),
    ("gorgeous", 3),
    ("grateful", 3),
    ("great", 3),
    ("happy", 3),
    ("help", 2),
    ("helpful", 2),
    ("honest", 2),
    ("hope", 2),
    ("impressed", 3),
    ("impressive", 3),
    ("improve", 2),
    ("interesting", 2),
    ("kind", 2),
    ("like", 2),
    ("love", 3),
    ("lovely", 3),
    ("lucky", 3),
    ("nice", 3),
    ("outstanding", 5),
    ("perfect", 3),
    ("pleasant", 3),
    ("pleased", 3),
    ("popular", 3),
    ("positive", 2),
    ("powerful", 2),
    ("praise", 3),
    ("recommend", 2),
    ("reliable", 2),
    ("satisfied", 2),
    ("smart", 1),
    ("solid", 2),
    ("stunning", 4),
    ("success", 2),
    ("successful", 3),
    ("super", 3),
    ("superb", 5),
    ("support", 2),
    ("thank", 2),
    ("thrilled", 5),
    ("top", 2),
    ("trust", 1),
    ("useful", 2),
    ("valuable", 2),
    ("win", 4),
    ("winner", 4),
    ("wonderful", 4),
    ("worth", 2),
    ("wow", 4),
    ("yay", 2),
    // Negative
    ("abuse", -3),
    ("angry", -3),
    ("annoy", -2),
    ("anxious", -2),
    ("awful", -3),
    ("bad", -3),
    ("ban", -2),
    ("boring", -3),
    ("broken", -1),
    ("bug", -2),
    ("buggy", -2),
    ("cheat", -3),
    ("complain", -2),
    ("complaint", -2),
    ("confused", -2),
    ("crap", -3),
    ("crash", -2),
    ("damage", -3),
    ("dead", -3),
    ("defect", -3),
    ("delay", -1),
    ("disappoint", -2),
    ("disaster", -2),
    ("disgusting", -3),
    ("dislike", -2),
    ("dumb", -3),
    ("fail", -2),
    ("failure", -2),
    ("fake", -3),
    ("fault", -2),
    ("fear", -2),
    ("fraud", -4),
    ("frustrated", -2),
    ("garbage", -1),
    ("hate", -3),
    ("horrible", -3),
    ("hurt", -2),
    ("ignore", -1),
    ("issue", -1),
    ("lame", -2),
    ("lawsuit", -2),
    ("lie", -2),
    ("lose", -3),
    ("lost", -3),
    ("mess", -2),
    ("miss", -2),
    ("outage", -2),
    ("overpriced", -3),
    ("pain", -2),
    ("pathetic", -2),
    ("poor", -2),
    ("problem", -2),
    ("regret", -2),
    ("rude", -2),
    ("sad", -2),
    ("scam", -2),
    ("scandal", -3),
    ("shame", -2),
    ("slow", -2),
    ("stupid", -2),
    ("suck", -3),
    ("terrible", -3),
    ("ugly", -3),
    ("unacceptable", -2),
    ("unhappy", -2),
    ("useless", -2),
    ("waste", -1),
    ("worse", -3),
    ("worst", -3),
    ("wrong", -2),
];

/// Regular English inflections of `word`: plural or third person, past
/// tense and present participle.
///
/// Short consonant-vowel-consonant words double their final consonant
/// (`ban` gives `banned`, `win` gives `winning`). Forms are generated from
/// lexicon entries only, so a token never has to be reduced to a guessed
/// stem before lookup.
#[must_use]
pub fn inflections(word: &str) -> Vec<String> {
    let Some(last) = word.chars().last() else {
        return Vec::new();
    };

    if let Some(head) = word
        .strip_suffix('y')
        .filter(|head| head.chars().last().is_some_and(is_consonant))
    {
        return vec![
            format!("{head}ies"),
            format!("{head}ied"),
            format!("{word}ing"),
        ];
    }

    let plural = if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(*s)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    };

    if let Some(head) = word.strip_suffix("ie") {
        return vec![plural, format!("{word}d"), format!("{head}ying")];
    }
    if word.ends_with("ee") {
        return vec![plural, format!("{word}d"), format!("{word}ing")];
    }
    if let Some(head) = word.strip_suffix('e') {
        return vec![plural, format!("{word}d"), format!("{head}ing")];
    }
    if doubles_final_consonant(word) {
        return vec![plural, format!("{word}{last}ed"), format!("{word}{last}ing")];
    }
    vec![plural, format!("{word}ed"), format!("{word}ing")]
}

fn is_consonant(c: char) -> bool {
    c.is_ascii_alphabetic() && !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn doubles_final_consonant(word: &str) -> bool {
    let chars: Vec<char> = word.chars().collect();
    let [.., a, b, c] = chars[..] else {
        return false;
    };
    chars.len() <= 4
        && is_consonant(a)
        && !is_consonant(b)
        && is_consonant(c)
        && !matches!(c, 'w' | 'x' | 'y')
}

/// Sum of per-token valences divided by the token count.
///
/// Tokens match lexicon words exactly, either as listed or as one of their
/// generated inflections.
pub struct LexiconScorer {
    weights: HashMap<String, i32>,
}

impl LexiconScorer {
    /// Build a scorer from `(word, weight)` pairs, extending each word with
    /// the forms `inflect` derives from it. Listed words always keep their
    /// own weight; between generated forms the earlier entry wins.
    #[must_use]
    pub fn new(entries: &[(&str, i32)], inflect: fn(&str) -> Vec<String>) -> Self {
        let mut weights: HashMap<String, i32> = entries
            .iter()
            .rev()
            .map(|&(word, weight)| (word.to_string(), weight))
            .collect();
        for &(word, weight) in entries {
            for form in inflect(word) {
                weights.entry(form).or_insert(weight);
            }
        }
        Self { weights }
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new(LEXICON, inflections)
    }
}

impl Scorer for LexiconScorer {
    fn score(&self, tokens: &[String]) -> f64 {
        if tokens.is_empty() {
            return 0.0;
        }
        let sum: i32 = tokens.iter().filter_map(|t| self.weights.get(t)).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = tokens.len() as f64;
        f64::from(sum) / count
    }
}
