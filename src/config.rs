use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {key}: {value:?}")]
    InvalidValue {
        /// Name of the offending variable.
        key: String,
        /// Raw value that failed to parse.
        value: String,
    },
}

/// Signal used to order the candidate pool before assembly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    /// Fused term-weight × concreteness × topic-alignment score, grouped by topic.
    #[default]
    Fused,
    /// Topic-alignment score only.
    Lda,
}

impl FromStr for RankingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fused" | "total" => Ok(Self::Fused),
            "lda" | "ldascore" => Ok(Self::Lda),
            _ => Err(()),
        }
    }
}

/// Tunables for one summarization run.
///
/// The struct is passed explicitly to every stage; nothing here is cached process-wide.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Sentences with `length <= min_length` are never eligible.
    pub min_length: usize,
    /// Sentences with `length > max_length` are never eligible.
    pub max_length: usize,
    /// Cosine similarity above which a candidate counts as redundant.
    pub sim_threshold: f32,
    /// Size of the candidate pool handed to the assembler.
    pub num_sentences: usize,
    /// Maximum number of cleaned tokens in one summary.
    pub word_budget: usize,
    /// Number of latent topics fitted per cluster.
    pub num_topics: usize,
    /// Number of ranked terms kept per topic.
    pub topic_terms: usize,
    /// Seed for the topic model sampler.
    pub topic_seed: u64,
    /// Gibbs sweeps performed while fitting the topic model.
    pub topic_iterations: usize,
    /// Sentences splitting into fewer whitespace pieces are never topic-scored.
    pub min_scoring_pieces: usize,
    /// Longest trailing attribution or `which` clause that cleanup strips.
    pub attribution_max_words: usize,
    /// Candidate ranking signal.
    pub ranking: RankingMode,
    /// Replace a shorter accepted near-duplicate with a longer candidate.
    pub replace_shorter_duplicates: bool,
    /// Largest summary ordered by exhaustive permutation search.
    pub max_exhaustive_ordering: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 50,
            sim_threshold: 0.95,
            num_sentences: 20,
            word_budget: 100,
            num_topics: 3,
            topic_terms: 50,
            topic_seed: 1,
            topic_iterations: 200,
            min_scoring_pieces: 8,
            attribution_max_words: 8,
            ranking: RankingMode::Fused,
            replace_shorter_duplicates: false,
            max_exhaustive_ordering: 8,
        }
    }
}

impl SummarizerConfig {
    /// Load configuration from `RUSTYSUMM_*` environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(load_env_optional)
    }

    /// Load `.env` (when present) and then the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        tracing::debug!(
            min_length = config.min_length,
            max_length = config.max_length,
            sim_threshold = config.sim_threshold,
            num_sentences = config.num_sentences,
            word_budget = config.word_budget,
            ranking = ?config.ranking,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            min_length: parse_or(&lookup, "RUSTYSUMM_MIN_LENGTH", defaults.min_length)?,
            max_length: parse_or(&lookup, "RUSTYSUMM_MAX_LENGTH", defaults.max_length)?,
            sim_threshold: parse_or(&lookup, "RUSTYSUMM_SIM_THRESHOLD", defaults.sim_threshold)?,
            num_sentences: parse_or(&lookup, "RUSTYSUMM_NUM_SENTENCES", defaults.num_sentences)?,
            word_budget: parse_or(&lookup, "RUSTYSUMM_WORD_BUDGET", defaults.word_budget)?,
            num_topics: parse_or(&lookup, "RUSTYSUMM_NUM_TOPICS", defaults.num_topics)?,
            topic_terms: parse_or(&lookup, "RUSTYSUMM_TOPIC_TERMS", defaults.topic_terms)?,
            topic_seed: parse_or(&lookup, "RUSTYSUMM_TOPIC_SEED", defaults.topic_seed)?,
            topic_iterations: parse_or(
                &lookup,
                "RUSTYSUMM_TOPIC_ITERATIONS",
                defaults.topic_iterations,
            )?,
            min_scoring_pieces: parse_or(
                &lookup,
                "RUSTYSUMM_MIN_SCORING_PIECES",
                defaults.min_scoring_pieces,
            )?,
            attribution_max_words: parse_or(
                &lookup,
                "RUSTYSUMM_ATTRIBUTION_MAX_WORDS",
                defaults.attribution_max_words,
            )?,
            ranking: match lookup("RUSTYSUMM_RANKING") {
                Some(value) => value.parse().map_err(|()| ConfigError::InvalidValue {
                    key: "RUSTYSUMM_RANKING".into(),
                    value,
                })?,
                None => defaults.ranking,
            },
            replace_shorter_duplicates: parse_or(
                &lookup,
                "RUSTYSUMM_REPLACE_SHORTER_DUPLICATES",
                defaults.replace_shorter_duplicates,
            )?,
            max_exhaustive_ordering: parse_or(
                &lookup,
                "RUSTYSUMM_MAX_EXHAUSTIVE_ORDERING",
                defaults.max_exhaustive_ordering,
            )?,
        };

        if config.num_topics == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RUSTYSUMM_NUM_TOPICS".into(),
                value: "0".into(),
            });
        }
        Ok(config)
    }

    /// Whether a sentence of `length` tokens may enter a summary.
    pub fn is_eligible_length(&self, length: usize) -> bool {
        length > self.min_length && length <= self.max_length
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        None => Ok(default),
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
