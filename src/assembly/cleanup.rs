//! Deterministic surface cleanup applied to every accepted sentence.
//!
//! Text-level rewrites run first (asides, fillers, trailing clauses, ages), then the sentence is
//! tokenized and token-level rules run (adverbs, weekdays, leading conjunction, casing and
//! terminal punctuation). The cleaned token list is what counts against the word budget.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

use super::tokenize::tokenize;
use crate::config::SummarizerConfig;
use crate::corpus::SentenceRecord;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(\[].*?[)\]]").expect("valid bracket regex"));
static DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"--.*?--").expect("valid dash aside regex"));
static TRAILING_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",(?P<clause>[^,]*?)(?P<end>[.!?])\s*$").expect("valid trailing clause regex")
});
static AGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<head>[A-Za-z]), (?:aged )?\d{1,3},").expect("valid age regex")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const FILLERS: &[(&str, &str)] = &[
    ("As a matter of fact, ", ""),
    ("At this point, ", ""),
    (", however,", ""),
    (", also, ", " "),
];
const ATTRIBUTION_VERBS: &[&str] = &[
    "said", "say", "says", "report", "reports", "reported", "state", "states", "stated",
    "according",
];
const KEPT_ADVERBS: &[&str] = &["when", "not", "n't", "about", "again", "so"];
const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];
const PREPOSITIONS: &[&str] = &[
    "on", "in", "at", "by", "since", "until", "from", "before", "after", "during", "for", "of",
    "with", "to", "into", "over", "under", "through", "near", "about", "against", "between",
];
const COMMON_ADVERBS: &[&str] = &[
    "also", "very", "really", "just", "still", "already", "recently", "currently", "nearly",
    "almost", "quickly", "finally", "even", "significantly", "reportedly", "largely",
    "apparently", "initially", "eventually", "immediately",
];
const QUOTE_STARTS: &[char] = &['"', '\'', '`', '“', '‘'];
const TERMINALS: &[&str] = &[".", "!", "?"];

/// Part-of-speech lookup for cleaned tokens.
///
/// Tags come from the preprocessing stage's aligned token/tag pairs. Tokens the annotator
/// never saw (or records shipped without tags) fall back to a small closed-class lexicon.
#[derive(Debug, Default)]
pub struct PosLookup<'a> {
    tags: FxHashMap<&'a str, &'a str>,
}

impl<'a> PosLookup<'a> {
    /// Index the record's token/tag pairs; the first tag seen for a token wins.
    pub fn from_record(record: &'a SentenceRecord) -> Self {
        let mut tags = FxHashMap::default();
        for (token, tag) in record.tokens.iter().zip(&record.pos_tags) {
            tags.entry(token.as_str()).or_insert(tag.as_str());
        }
        Self { tags }
    }

    /// Tag for `token`.
    pub fn tag(&self, token: &str) -> &'a str {
        self.tags
            .get(token)
            .copied()
            .unwrap_or_else(|| fallback_tag(token))
    }

    fn is_adverb(&self, token: &str) -> bool {
        self.tag(token).starts_with("RB")
    }

    fn is_preposition(&self, token: &str) -> bool {
        self.tag(token) == "IN"
    }
}

fn fallback_tag(token: &str) -> &'static str {
    let lower = token.to_lowercase();
    if WEEKDAYS.contains(&lower.as_str()) {
        "NNP"
    } else if PREPOSITIONS.contains(&lower.as_str()) {
        "IN"
    } else if COMMON_ADVERBS.contains(&lower.as_str()) {
        "RB"
    } else if lower == "'s" {
        "POS"
    } else if token.chars().all(|c| c.is_ascii_punctuation()) {
        "."
    } else {
        "NN"
    }
}

/// Applies the cleanup rules with a configured clause-length limit.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceCleaner {
    attribution_max_words: usize,
}

impl SurfaceCleaner {
    /// Cleaner stripping trailing clauses of at most `attribution_max_words` words.
    pub fn new(attribution_max_words: usize) -> Self {
        Self {
            attribution_max_words,
        }
    }

    /// Cleaner configured for a run.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self::new(config.attribution_max_words)
    }

    /// Clean a sentence, returning the tokens that will appear in the summary.
    pub fn clean(&self, record: &SentenceRecord) -> Vec<String> {
        let text = self.clean_text(&record.text);
        clean_tokens(tokenize(&text), &PosLookup::from_record(record))
    }

    /// Text-level rewrites: asides, filler connectives, trailing clauses and ages.
    pub fn clean_text(&self, sentence: &str) -> String {
        let mut text = BRACKETED.replace_all(sentence, " ").into_owned();
        text = DASHED.replace_all(&text, " ").into_owned();
        for (filler, replacement) in FILLERS {
            text = text.replace(filler, replacement);
        }
        text = self.strip_trailing_clause(&text);
        text = AGE.replace_all(&text, "$head").into_owned();
        WHITESPACE.replace_all(&text, " ").trim().to_string()
    }

    fn strip_trailing_clause(&self, text: &str) -> String {
        let Some(captures) = TRAILING_CLAUSE.captures(text) else {
            return text.to_string();
        };
        let clause = captures.name("clause").map_or("", |m| m.as_str());
        let words: Vec<String> = clause.split_whitespace().map(str::to_lowercase).collect();

        let is_which = words.first().is_some_and(|word| word == "which");
        let is_attribution = words
            .iter()
            .any(|word| ATTRIBUTION_VERBS.contains(&word.as_str()));
        let strippable = (is_which || is_attribution)
            && words.len() <= self.attribution_max_words
            && !words.iter().any(|word| word == "and");
        if !strippable {
            return text.to_string();
        }
        TRAILING_CLAUSE.replace(text, "$end").into_owned()
    }
}

/// Token-level rules: adverbs, weekdays, leading "but", casing and terminal punctuation.
pub fn clean_tokens(tokens: Vec<String>, pos: &PosLookup<'_>) -> Vec<String> {
    let tokens = drop_adverbs(tokens, pos);
    let mut tokens = normalize_weekdays(tokens, pos);

    if tokens.first().is_some_and(|token| token.eq_ignore_ascii_case("but")) {
        tokens.remove(0);
    }
    finish_sentence(tokens)
}

fn drop_adverbs(tokens: Vec<String>, pos: &PosLookup<'_>) -> Vec<String> {
    let sentence_final = tokens.len().checked_sub(2);
    let keep: Vec<bool> = (0..tokens.len())
        .map(|i| {
            let token = &tokens[i];
            !pos.is_adverb(token)
                || KEPT_ADVERBS.contains(&token.to_lowercase().as_str())
                || tokens.get(i + 1).is_some_and(|next| pos.is_preposition(next))
                || Some(i) == sentence_final
        })
        .collect();
    tokens
        .into_iter()
        .zip(keep)
        .filter_map(|(token, keep)| keep.then_some(token))
        .collect()
}

fn normalize_weekdays(tokens: Vec<String>, pos: &PosLookup<'_>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if !WEEKDAYS.contains(&token.to_lowercase().as_str()) {
            normalized.push(token);
            continue;
        }
        let next = iter.peek().map(|next| next.to_lowercase());
        match next.as_deref() {
            Some("morning" | "night") => normalized.push("one".to_string()),
            Some("'s") => {
                iter.next();
                normalized.push("the".to_string());
            }
            _ => {
                if normalized.last().is_some_and(|prev| pos.is_preposition(prev)) {
                    normalized.pop();
                }
            }
        }
    }
    normalized
}

fn finish_sentence(tokens: Vec<String>) -> Vec<String> {
    let mut tokens: Vec<String> = tokens
        .into_iter()
        .skip_while(|token| {
            token
                .chars()
                .next()
                .is_none_or(|c| !c.is_alphanumeric() && !QUOTE_STARTS.contains(&c))
        })
        .collect();
    if tokens.is_empty() {
        return tokens;
    }

    tokens[0] = capitalize(&tokens[0]);
    match tokens.last().map(String::as_str) {
        Some(last) if TERMINALS.contains(&last) => {}
        Some("," | ";" | ":") => {
            if let Some(last) = tokens.last_mut() {
                *last = ".".to_string();
            }
        }
        _ => tokens.push(".".to_string()),
    }
    tokens
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
