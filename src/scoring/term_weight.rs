//! Document-level inverse document frequency within one topic cluster.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::corpus::TopicCluster;

/// Per-term weight table: `log10(num_documents / document_frequency)`.
#[derive(Debug, Clone, Default)]
pub struct TermWeights {
    weights: FxHashMap<String, f64>,
    num_documents: usize,
}

impl TermWeights {
    /// Build the table from the lemmas of every sentence in the cluster.
    ///
    /// Document frequency counts documents, not sentences, so a term repeated across many
    /// sentences of one article is counted once.
    pub fn from_cluster(cluster: &TopicCluster) -> Self {
        let mut terms_by_document: FxHashMap<usize, FxHashSet<&str>> = FxHashMap::default();
        for record in cluster.records() {
            terms_by_document
                .entry(record.doc_index)
                .or_default()
                .extend(record.lemmas.iter().map(String::as_str));
        }

        let num_documents = terms_by_document.len();
        let mut document_frequency: FxHashMap<&str, usize> = FxHashMap::default();
        for terms in terms_by_document.values() {
            for &term in terms {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let weights = document_frequency
            .into_iter()
            .map(|(term, df)| {
                // df >= 1 because every term was observed in some document
                let weight = (num_documents as f64 / df as f64).log10();
                (term.to_string(), weight)
            })
            .collect();

        Self {
            weights,
            num_documents,
        }
    }

    /// Weight of a term; unseen terms weigh nothing.
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Sum of term weights over every lemma occurrence.
    pub fn sentence_weight(&self, lemmas: &[String]) -> f64 {
        lemmas.iter().map(|lemma| self.weight(lemma)).sum()
    }

    /// Number of documents the table was built from.
    pub fn num_documents(&self) -> usize {
        self.num_documents
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Whether no terms were observed.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Store each sentence's summed term weight as its `tf_idf` signal.
pub fn annotate_term_weights(cluster: &mut TopicCluster, weights: &TermWeights) {
    for record in cluster.records_mut() {
        record.scores.tf_idf = Some(weights.sentence_weight(&record.lemmas));
    }
}
