//! Budgeted, redundancy-aware summary assembly.
//!
//! The assembler scans a ranked candidate pool once. Each candidate is checked against the word
//! budget, the length bounds, the surface filters and every sentence already accepted; survivors
//! are cleaned and accepted if their cleaned tokens still fit. The accepted set is then ordered
//! for coherence.

pub mod cleanup;
pub mod filters;
pub mod ordering;
pub mod tokenize;

use thiserror::Error;

use crate::config::SummarizerConfig;
use crate::corpus::SentenceRecord;
use crate::embedding::{EmbeddingTable, cosine_similarity};
use cleanup::SurfaceCleaner;
use filters::{SurfacePattern, disallowed_surface};
use ordering::best_order;
use tokenize::detokenize;

/// Errors that abort assembly of one cluster.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The embedding table does not cover a sentence the assembler had to compare.
    #[error("no embedding for sentence {sentence:?}")]
    MissingEmbedding {
        /// Sentence text that was looked up.
        sentence: String,
    },
}

/// Why a candidate was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Token length outside `(min_length, max_length]`.
    Length,
    /// Disallowed surface pattern.
    Surface(SurfacePattern),
    /// Too similar to an accepted sentence.
    Redundant,
    /// Nothing left after cleanup.
    EmptyAfterCleanup,
    /// Cleaned tokens would overflow the word budget.
    OverBudget,
}

/// Finished summary for one cluster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    /// Cleaned sentences in presentation order.
    pub sentences: Vec<String>,
    /// Original text of each sentence, aligned with `sentences`.
    pub sources: Vec<String>,
    /// Total cleaned tokens across all sentences.
    pub word_count: usize,
    /// Average adjacent cosine similarity of the chosen order.
    pub coherence: f32,
    /// Rejection reason for every candidate that was scanned and not accepted.
    pub rejections: Vec<Rejection>,
    /// Accepted sentences later replaced by a longer near-duplicate.
    pub replacements: usize,
}

impl Summary {
    /// Whether no sentence survived.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// Assembly state for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// Still scanning candidates.
    Collecting,
    /// Budget reached or pool exhausted.
    Done,
}

#[derive(Debug)]
struct Accepted<'a> {
    record: &'a SentenceRecord,
    embedding: &'a [f32],
    tokens: Vec<String>,
}

/// Per-cluster working set, discarded once the summary is built.
#[derive(Debug)]
struct AssemblyContext<'a> {
    state: AssemblyState,
    accepted: Vec<Accepted<'a>>,
    word_count: usize,
    rejections: Vec<Rejection>,
    replacements: usize,
}

impl AssemblyContext<'_> {
    fn new() -> Self {
        Self {
            state: AssemblyState::Collecting,
            accepted: Vec::new(),
            word_count: 0,
            rejections: Vec::new(),
            replacements: 0,
        }
    }
}

/// Greedy summary builder over a ranked candidate pool.
#[derive(Debug, Clone)]
pub struct SummaryAssembler {
    config: SummarizerConfig,
    cleaner: SurfaceCleaner,
}

impl SummaryAssembler {
    /// Create an assembler for a run configuration.
    pub fn new(config: SummarizerConfig) -> Self {
        let cleaner = SurfaceCleaner::from_config(&config);
        Self { config, cleaner }
    }

    /// Build the summary for `cluster` from candidates sorted best first.
    pub fn assemble(
        &self,
        cluster: &str,
        candidates: &[&SentenceRecord],
        embeddings: &EmbeddingTable,
    ) -> Result<Summary, AssemblyError> {
        let mut context = AssemblyContext::new();
        for &record in candidates {
            self.consider(&mut context, record, embeddings)?;
            if context.state == AssemblyState::Done {
                break;
            }
        }
        context.state = AssemblyState::Done;

        let vectors: Vec<&[f32]> = context.accepted.iter().map(|a| a.embedding).collect();
        let order = best_order(&vectors, self.config.max_exhaustive_ordering);
        let (sentences, sources): (Vec<String>, Vec<String>) = order
            .order
            .iter()
            .map(|&i| {
                let accepted = &context.accepted[i];
                (detokenize(&accepted.tokens), accepted.record.text.clone())
            })
            .unzip();

        if sentences.is_empty() {
            tracing::warn!(
                cluster = %cluster,
                candidates = candidates.len(),
                "No eligible sentences; summary is empty"
            );
        } else {
            tracing::debug!(
                cluster = %cluster,
                sentences = sentences.len(),
                words = context.word_count,
                rejected = context.rejections.len(),
                coherence = order.coherence,
                "Assembled summary"
            );
        }

        Ok(Summary {
            sentences,
            sources,
            word_count: context.word_count,
            coherence: order.coherence,
            rejections: context.rejections,
            replacements: context.replacements,
        })
    }

    fn consider<'a>(
        &self,
        context: &mut AssemblyContext<'a>,
        record: &'a SentenceRecord,
        embeddings: &'a EmbeddingTable,
    ) -> Result<(), AssemblyError> {
        let budget = self.config.word_budget;
        if context.word_count >= budget {
            context.state = AssemblyState::Done;
            return Ok(());
        }

        if !self.config.is_eligible_length(record.length) {
            context.rejections.push(Rejection::Length);
            return Ok(());
        }

        if let Some(pattern) = disallowed_surface(&record.text) {
            context.rejections.push(Rejection::Surface(pattern));
            return Ok(());
        }

        let embedding =
            embeddings
                .get(&record.text)
                .ok_or_else(|| AssemblyError::MissingEmbedding {
                    sentence: record.text.clone(),
                })?;

        let redundant_with: Vec<usize> = context
            .accepted
            .iter()
            .enumerate()
            .filter(|(_, accepted)| {
                cosine_similarity(embedding, accepted.embedding) > self.config.sim_threshold
            })
            .map(|(i, _)| i)
            .collect();
        if !redundant_with.is_empty() {
            if !self.try_replace(context, record, embedding, &redundant_with) {
                context.rejections.push(Rejection::Redundant);
            }
            return Ok(());
        }

        let tokens = self.cleaner.clean(record);
        if tokens.is_empty() {
            context.rejections.push(Rejection::EmptyAfterCleanup);
            return Ok(());
        }
        if context.word_count + tokens.len() > budget {
            context.rejections.push(Rejection::OverBudget);
            return Ok(());
        }

        context.word_count += tokens.len();
        context.accepted.push(Accepted {
            record,
            embedding,
            tokens,
        });
        Ok(())
    }

    /// Swap a single shorter near-duplicate for a strictly longer candidate that still fits.
    fn try_replace<'a>(
        &self,
        context: &mut AssemblyContext<'a>,
        record: &'a SentenceRecord,
        embedding: &'a [f32],
        redundant_with: &[usize],
    ) -> bool {
        if !self.config.replace_shorter_duplicates {
            return false;
        }
        let &[index] = redundant_with else {
            return false;
        };
        if record.length <= context.accepted[index].record.length {
            return false;
        }

        let tokens = self.cleaner.clean(record);
        let freed = context.accepted[index].tokens.len();
        if tokens.is_empty() || context.word_count - freed + tokens.len() > self.config.word_budget
        {
            return false;
        }

        tracing::trace!(
            replaced = %context.accepted[index].record.text,
            by = %record.text,
            "Replaced shorter near-duplicate"
        );
        context.word_count = context.word_count - freed + tokens.len();
        context.accepted[index] = Accepted {
            record,
            embedding,
            tokens,
        };
        context.replacements += 1;
        true
    }
}
