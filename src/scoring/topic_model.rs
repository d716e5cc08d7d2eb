//! Latent Dirichlet allocation over the sentences of one topic cluster.
//!
//! Each sentence's bag of lemmas is one LDA document. The model is fitted with collapsed Gibbs
//! sampling driven by a seeded ChaCha RNG, so the same corpus and seed always produce the same
//! topic-term distribution. Fitting is a typestate transition: only a [`TopicModel<Fit>`] can
//! be queried.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::term_weight::TermWeights;
use crate::config::SummarizerConfig;
use crate::corpus::TopicCluster;

const DEFAULT_BETA: f64 = 0.01;
const MIN_TOKEN_CHARS: usize = 2;
const MAX_TOKEN_CHARS: usize = 15;

/// Hyperparameters for fitting.
#[derive(Debug, Clone)]
pub struct TopicModelParams {
    /// Number of latent topics.
    pub num_topics: usize,
    /// Ranked terms kept per topic.
    pub top_terms: usize,
    /// RNG seed.
    pub seed: u64,
    /// Gibbs sweeps over the corpus.
    pub iterations: usize,
    /// Document-topic Dirichlet prior.
    pub alpha: f64,
    /// Topic-term Dirichlet prior.
    pub beta: f64,
}

impl TopicModelParams {
    /// Derive parameters from the run configuration.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        let num_topics = config.num_topics.max(1);
        Self {
            num_topics,
            top_terms: config.topic_terms,
            seed: config.topic_seed,
            iterations: config.topic_iterations,
            alpha: 1.0 / num_topics as f64,
            beta: DEFAULT_BETA,
        }
    }
}

/// Model state before [`TopicModel::fit`].
#[derive(Debug, Clone, Copy)]
pub struct Unfit;

/// Model state after fitting.
#[derive(Debug, Clone)]
pub struct Fit {
    distribution: TopicTermDistribution,
}

/// Topic model parameterized by its fitting state.
#[derive(Debug, Clone)]
pub struct TopicModel<State = Unfit> {
    params: TopicModelParams,
    state: State,
}

/// Best-fitting topic for a sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicScore {
    /// Topic id in `0..num_topics`.
    pub topic: usize,
    /// Length-normalized alignment score.
    pub score: f64,
}

/// Ranked term weights for each fitted topic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicTermDistribution {
    topics: Vec<BTreeMap<String, f64>>,
}

impl TopicTermDistribution {
    /// Build a distribution from explicit per-topic term weights.
    pub fn from_topics(topics: Vec<BTreeMap<String, f64>>) -> Self {
        Self { topics }
    }

    /// Number of topics.
    pub fn num_topics(&self) -> usize {
        self.topics.len()
    }

    /// Weight of `term` within `topic`, if the term is among the topic's ranked terms.
    pub fn weight(&self, topic: usize, term: &str) -> Option<f64> {
        self.topics.get(topic).and_then(|terms| terms.get(term)).copied()
    }

    /// Terms of `topic` ordered by descending weight.
    pub fn ranked_terms(&self, topic: usize) -> Vec<(&str, f64)> {
        let mut terms: Vec<(&str, f64)> = self
            .topics
            .get(topic)
            .map(|terms| terms.iter().map(|(t, w)| (t.as_str(), *w)).collect())
            .unwrap_or_default();
        terms.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        terms
    }

    /// Score a sentence against every topic and return the best one.
    ///
    /// `score_k = Σ term_weight(l) × topic_weight(k, l) / length` over the distinct lemmas `l`
    /// shared by the sentence and topic `k`. Ties resolve to the lowest topic id.
    pub fn score_sentence(
        &self,
        lemmas: &[String],
        length: usize,
        weights: &TermWeights,
    ) -> Option<TopicScore> {
        if length == 0 || self.topics.is_empty() {
            return None;
        }
        let distinct: FxHashSet<&str> = lemmas.iter().map(String::as_str).collect();

        let mut best: Option<TopicScore> = None;
        for (topic, terms) in self.topics.iter().enumerate() {
            let mut score = 0.0;
            for lemma in &distinct {
                if let Some(topic_weight) = terms.get(&lemma.to_lowercase()) {
                    score += weights.weight(lemma) * topic_weight;
                }
            }
            let score = score / length as f64;
            if best.is_none_or(|current| score > current.score) {
                best = Some(TopicScore { topic, score });
            }
        }
        best
    }
}

impl TopicModel<Unfit> {
    /// Create an unfitted model.
    pub fn new(params: TopicModelParams) -> Self {
        Self {
            params,
            state: Unfit,
        }
    }

    /// Fit the model over one lemma list per sentence.
    pub fn fit<D: AsRef<[String]>>(self, documents: &[D]) -> TopicModel<Fit> {
        let corpus = Corpus::build(documents);
        let distribution = if corpus.vocabulary.is_empty() {
            TopicTermDistribution::from_topics(vec![BTreeMap::new(); self.params.num_topics])
        } else {
            GibbsSampler::new(&self.params, &corpus).run()
        };
        tracing::debug!(
            topics = self.params.num_topics,
            vocabulary = corpus.vocabulary.len(),
            documents = corpus.documents.len(),
            "Fitted topic model"
        );
        TopicModel {
            params: self.params,
            state: Fit { distribution },
        }
    }
}

impl TopicModel<Fit> {
    /// Fitted topic-term weights.
    pub fn distribution(&self) -> &TopicTermDistribution {
        &self.state.distribution
    }

    /// Consume the model, keeping only its distribution.
    pub fn into_distribution(self) -> TopicTermDistribution {
        self.state.distribution
    }

    /// Best topic for a sentence; see [`TopicTermDistribution::score_sentence`].
    pub fn score_sentence(
        &self,
        lemmas: &[String],
        length: usize,
        weights: &TermWeights,
    ) -> Option<TopicScore> {
        self.state.distribution.score_sentence(lemmas, length, weights)
    }
}

/// Assign `LDAscore` and topic id to every sentence long enough to be scored.
///
/// Returns the number of sentences scored; shorter sentences keep no topic at all.
pub fn annotate_topics(
    cluster: &mut TopicCluster,
    model: &TopicModel<Fit>,
    weights: &TermWeights,
    min_scoring_pieces: usize,
) -> usize {
    let mut scored = 0;
    for record in cluster.records_mut() {
        if record.scoring_pieces() < min_scoring_pieces {
            continue;
        }
        if let Some(TopicScore { topic, score }) =
            model.score_sentence(&record.lemmas, record.length, weights)
        {
            record.scores.lda_topic = Some(topic);
            record.scores.lda_score = Some(score);
            scored += 1;
        }
    }
    scored
}

/// Integer-coded corpus with a first-seen vocabulary.
struct Corpus {
    vocabulary: Vec<String>,
    documents: Vec<Vec<usize>>,
}

impl Corpus {
    fn build<D: AsRef<[String]>>(documents: &[D]) -> Self {
        let mut vocabulary = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        let documents = documents
            .iter()
            .map(|document| {
                document
                    .as_ref()
                    .iter()
                    .filter_map(|lemma| normalize_token(lemma))
                    .map(|token| {
                        *index.entry(token.clone()).or_insert_with(|| {
                            vocabulary.push(token);
                            vocabulary.len() - 1
                        })
                    })
                    .collect::<Vec<usize>>()
            })
            .collect();
        Self {
            vocabulary,
            documents,
        }
    }
}

/// Lowercase alphabetic tokens of 2 to 15 characters; everything else is dropped.
fn normalize_token(lemma: &str) -> Option<String> {
    let token = lemma.trim().to_lowercase();
    let chars = token.chars().count();
    let valid = (MIN_TOKEN_CHARS..=MAX_TOKEN_CHARS).contains(&chars)
        && token.chars().all(char::is_alphabetic);
    valid.then_some(token)
}

struct GibbsSampler<'a> {
    params: &'a TopicModelParams,
    corpus: &'a Corpus,
    rng: ChaCha8Rng,
    assignments: Vec<Vec<usize>>,
    doc_topic: Vec<Vec<u32>>,
    topic_word: Vec<Vec<u32>>,
    topic_total: Vec<u32>,
}

impl<'a> GibbsSampler<'a> {
    fn new(params: &'a TopicModelParams, corpus: &'a Corpus) -> Self {
        let k = params.num_topics;
        let v = corpus.vocabulary.len();
        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let mut doc_topic = vec![vec![0_u32; k]; corpus.documents.len()];
        let mut topic_word = vec![vec![0_u32; v]; k];
        let mut topic_total = vec![0_u32; k];

        let assignments = corpus
            .documents
            .iter()
            .enumerate()
            .map(|(d, words)| {
                words
                    .iter()
                    .map(|&w| {
                        let z = rng.gen_range(0..k);
                        doc_topic[d][z] += 1;
                        topic_word[z][w] += 1;
                        topic_total[z] += 1;
                        z
                    })
                    .collect::<Vec<usize>>()
            })
            .collect();

        Self {
            params,
            corpus,
            rng,
            assignments,
            doc_topic,
            topic_word,
            topic_total,
        }
    }

    fn run(mut self) -> TopicTermDistribution {
        let k = self.params.num_topics;
        let v_beta = self.corpus.vocabulary.len() as f64 * self.params.beta;
        let mut weights = vec![0.0_f64; k];

        for _ in 0..self.params.iterations {
            for (d, words) in self.corpus.documents.iter().enumerate() {
                for (i, &w) in words.iter().enumerate() {
                    let old = self.assignments[d][i];
                    self.doc_topic[d][old] -= 1;
                    self.topic_word[old][w] -= 1;
                    self.topic_total[old] -= 1;

                    for (t, weight) in weights.iter_mut().enumerate() {
                        *weight = (f64::from(self.doc_topic[d][t]) + self.params.alpha)
                            * (f64::from(self.topic_word[t][w]) + self.params.beta)
                            / (f64::from(self.topic_total[t]) + v_beta);
                    }
                    let new = sample_index(&mut self.rng, &weights);

                    self.assignments[d][i] = new;
                    self.doc_topic[d][new] += 1;
                    self.topic_word[new][w] += 1;
                    self.topic_total[new] += 1;
                }
            }
        }

        self.distribution(v_beta)
    }

    fn distribution(&self, v_beta: f64) -> TopicTermDistribution {
        let topics: Vec<BTreeMap<String, f64>> = (0..self.params.num_topics)
            .map(|t| {
                let denominator = f64::from(self.topic_total[t]) + v_beta;
                let mut ranked: Vec<(usize, f64)> = self.topic_word[t]
                    .iter()
                    .enumerate()
                    .map(|(w, &count)| (w, (f64::from(count) + self.params.beta) / denominator))
                    .collect();
                ranked.sort_by(|a, b| {
                    b.1.total_cmp(&a.1)
                        .then_with(|| self.corpus.vocabulary[a.0].cmp(&self.corpus.vocabulary[b.0]))
                });
                ranked
                    .into_iter()
                    .take(self.params.top_terms)
                    .map(|(w, weight)| (self.corpus.vocabulary[w].clone(), weight))
                    .collect::<BTreeMap<_, _>>()
            })
            .collect();
        TopicTermDistribution::from_topics(topics)
    }
}

fn sample_index(rng: &mut ChaCha8Rng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    let mut target = rng.r#gen::<f64>() * total;
    for (index, weight) in weights.iter().enumerate() {
        if target < *weight {
            return index;
        }
        target -= weight;
    }
    weights.len() - 1
}
