//! Local text metrics for document analysis.
//!
//! Computes everything about a document that does not need an LLM:
//! token and sentence counts, stopword-filtered content words, a Flesch
//! reading-ease score, lexicon-based sentiment, and the writing-style
//! label derived from average sentence length.

use serde::{Deserialize, Serialize};

/// Common English stopwords filtered out before content-word analysis.
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have",
    "he", "her", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "like",
    "me", "more", "most", "my", "no", "not", "of", "on", "one", "only", "or", "other", "our",
    "out", "over", "she", "so", "some", "such", "than", "that", "the", "their", "them", "then",
    "there", "these", "they", "this", "to", "up", "was", "we", "were", "what", "when", "which",
    "while", "who", "will", "with", "would", "you", "your",
];

/// Words that push sentiment positive.
const POSITIVE_WORDS: &[&str] = &[
    "amazing", "beautiful", "best", "better", "brilliant", "delight", "delightful", "effective",
    "elegant", "enjoy", "excellent", "exciting", "fantastic", "favorite", "glad", "good", "great",
    "happy", "helpful", "hope", "hopeful", "impressive", "inspiring", "interesting", "love",
    "loved", "optimistic", "perfect", "pleasant", "positive", "powerful", "remarkable", "rich",
    "strong", "succeed", "success", "successful", "useful", "valuable", "wonderful", "worth",
];

/// Words that push sentiment negative.
const NEGATIVE_WORDS: &[&str] = &[
    "afraid", "angry", "annoying", "awful", "bad", "broken", "confusing", "danger", "dangerous",
    "difficult", "disappointing", "dreadful", "fail", "failed", "failure", "fear", "frustrating",
    "hard", "hate", "horrible", "hurt", "impossible", "lose", "loss", "lost", "mistake", "never",
    "painful", "poor", "problem", "sad", "terrible", "ugly", "unfortunate", "useless", "weak",
    "worse", "worst", "wrong",
];

/// Overall sentiment of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

/// Metrics computed locally from a document's text.
#[derive(Debug, Clone)]
pub struct TextMetrics {
    /// Stopword-filtered lowercase content words, space joined.
    pub processed_text: String,
    /// Number of sentences.
    pub sentence_count: usize,
    /// Number of words before stopword filtering.
    pub word_count: usize,
    /// Flesch reading-ease score.
    pub readability_score: f64,
    /// Lexicon-based sentiment.
    pub sentiment: Sentiment,
}

/// Computes the full metric set for a text.
pub fn process_text(text: &str) -> TextMetrics {
    let words = tokenize(text);
    let word_count = words.len();
    let sentence_count = count_sentences(text);

    let filtered: Vec<&str> = words
        .iter()
        .map(|w| w.as_str())
        .filter(|w| !STOPWORDS.contains(w))
        .collect();

    TextMetrics {
        processed_text: filtered.join(" "),
        sentence_count,
        word_count,
        readability_score: flesch_reading_ease(text),
        sentiment: analyze_sentiment(&words),
    }
}

/// Lowercase alphabetic tokens of a text. Digits and punctuation are dropped,
/// matching the cleaning applied before word-level analysis.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.chars()
                .filter(|c| c.is_ascii_alphabetic() || *c == '\'')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// Counts sentences by terminal punctuation. A text with no terminator
/// still counts as one sentence.
pub fn count_sentences(text: &str) -> usize {
    let count = text
        .split(['.', '!', '?'])
        .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
        .count();
    count.max(if text.trim().is_empty() { 0 } else { 1 })
}

/// Flesch reading-ease score.
///
/// 206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words).
/// Higher is easier; typical prose lands between 30 and 70. Empty text
/// scores 0.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let words = tokenize(text);
    if words.is_empty() {
        return 0.0;
    }
    let sentences = count_sentences(text).max(1);
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;

    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

/// Approximates syllable count by counting vowel groups, with the common
/// silent-e adjustment. Every word counts as at least one syllable.
fn count_syllables(word: &str) -> usize {
    let chars: Vec<char> = word.chars().collect();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_was_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = vowel;
    }

    // Silent trailing 'e' as in "make", but not when it is the only vowel.
    if chars.len() > 2 && chars.last() == Some(&'e') && count > 1 {
        let before_last = chars[chars.len() - 2];
        if !is_vowel(before_last) {
            count -= 1;
        }
    }

    count.max(1)
}

/// Lexicon sentiment over a token stream: positive when positive hits
/// outnumber negative ones, negative for the reverse, neutral on a tie.
pub fn analyze_sentiment(words: &[String]) -> Sentiment {
    let mut score: i64 = 0;
    for word in words {
        let w = word.as_str();
        if POSITIVE_WORDS.contains(&w) {
            score += 1;
        } else if NEGATIVE_WORDS.contains(&w) {
            score -= 1;
        }
    }

    match score.cmp(&0) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Writing-style label from average sentence length.
pub fn writing_style(word_count: usize, sentence_count: usize) -> &'static str {
    if sentence_count == 0 {
        return "Unknown";
    }
    let avg = word_count as f64 / sentence_count as f64;
    if avg > 20.0 {
        "Complex and detailed"
    } else if avg < 10.0 {
        "Concise and to-the-point"
    } else {
        "Balanced and clear"
    }
}
