//! Typed sentence records and topic clusters.
//!
//! Annotated sentences arrive from the preprocessing stage as loosely shaped JSON objects.
//! [`RawSentenceRecord`] mirrors that shape with every required field optional so that
//! [`SentenceRecord::from_raw`] can report exactly which field is missing instead of a generic
//! deserialization failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Identifier of a topic cluster (e.g. `D0901A`).
pub type ClusterId = String;

/// Errors raised while validating annotated sentence records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// A field the core depends on was absent.
    #[error("sentence {sentence:?} is missing required field `{field}`")]
    MissingField {
        /// Surface text of the offending sentence.
        sentence: String,
        /// Name of the absent field.
        field: &'static str,
    },
    /// Surface tokens and POS tags were both present but misaligned.
    #[error("sentence {sentence:?} has {tokens} tokens but {tags} POS tags")]
    LengthMismatch {
        /// Surface text of the offending sentence.
        sentence: String,
        /// Number of surface tokens.
        tokens: usize,
        /// Number of POS tags.
        tags: usize,
    },
    /// The sentence key was empty or whitespace.
    #[error("sentence text must not be empty")]
    EmptyText,
}

/// Sentence annotation exactly as written by the preprocessing stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSentenceRecord {
    /// Lemmas of content words.
    #[serde(default)]
    pub lemmas: Option<Vec<String>>,
    /// Token count used for budget arithmetic.
    #[serde(default)]
    pub length: Option<usize>,
    /// Index of the source document within the cluster.
    #[serde(default)]
    pub doc_index: Option<usize>,
    /// Index of the sentence within its document.
    #[serde(default)]
    pub index: Option<usize>,
    /// Number of sentences in the source document.
    #[serde(default)]
    pub total_sent: usize,
    /// Corpus identifier of the source document.
    #[serde(default)]
    pub doc_id: Option<String>,
    /// Surface tokens, aligned with `pos_tags`.
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Penn Treebank POS tags.
    #[serde(default)]
    pub pos_tags: Vec<String>,
    /// Dependency labels.
    #[serde(default)]
    pub dep_tags: Vec<String>,
    /// Named entity strings.
    #[serde(default)]
    pub named_entities: Vec<String>,
    /// Noun chunk strings.
    #[serde(default)]
    pub noun_chunks: Vec<String>,
    /// Summed concreteness rating.
    #[serde(default)]
    pub concreteness: f64,
}

/// Scores attached to a sentence as the pipeline progresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentenceScores {
    /// Summed document-level IDF of the sentence lemmas.
    pub tf_idf: Option<f64>,
    /// Alignment with the best-fitting latent topic.
    pub lda_score: Option<f64>,
    /// Best-fitting latent topic.
    pub lda_topic: Option<usize>,
    /// Fused ranking score.
    pub total: Option<f64>,
}

/// A validated sentence annotation, keyed by its exact surface text.
#[derive(Debug, Clone, Serialize)]
pub struct SentenceRecord {
    /// Exact surface text.
    pub text: String,
    /// Content-word lemmas.
    pub lemmas: Vec<String>,
    /// Token count used for all budget arithmetic.
    pub length: usize,
    /// Index of the source document within the cluster.
    pub doc_index: usize,
    /// Index of the sentence within its document.
    pub index: usize,
    /// Number of sentences in the source document.
    pub total_sent: usize,
    /// Corpus identifier of the source document.
    pub doc_id: Option<String>,
    /// Surface tokens, aligned with `pos_tags` when both are present.
    pub tokens: Vec<String>,
    /// Penn Treebank POS tags.
    pub pos_tags: Vec<String>,
    /// Dependency labels.
    pub dep_tags: Vec<String>,
    /// Named entity strings.
    pub named_entities: Vec<String>,
    /// Noun chunk strings.
    pub noun_chunks: Vec<String>,
    /// Summed concreteness rating.
    pub concreteness: f64,
    /// Pipeline-assigned scores.
    pub scores: SentenceScores,
}

impl SentenceRecord {
    /// Create a record with the required fields; optional annotations start empty.
    pub fn new(
        text: impl Into<String>,
        lemmas: Vec<String>,
        length: usize,
        doc_index: usize,
        index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            lemmas,
            length,
            doc_index,
            index,
            total_sent: 0,
            doc_id: None,
            tokens: Vec::new(),
            pos_tags: Vec::new(),
            dep_tags: Vec::new(),
            named_entities: Vec::new(),
            noun_chunks: Vec::new(),
            concreteness: 0.0,
            scores: SentenceScores::default(),
        }
    }

    /// Attach surface tokens and their POS tags.
    pub fn with_tagged_tokens(mut self, tokens: Vec<String>, pos_tags: Vec<String>) -> Self {
        self.tokens = tokens;
        self.pos_tags = pos_tags;
        self
    }

    /// Attach a concreteness rating.
    pub fn with_concreteness(mut self, concreteness: f64) -> Self {
        self.concreteness = concreteness;
        self
    }

    /// Validate a raw annotation keyed by `text`.
    pub fn from_raw(text: String, raw: RawSentenceRecord) -> Result<Self, RecordError> {
        if text.trim().is_empty() {
            return Err(RecordError::EmptyText);
        }
        let missing = |field| RecordError::MissingField {
            sentence: text.clone(),
            field,
        };
        let lemmas = raw.lemmas.ok_or_else(|| missing("lemmas"))?;
        let length = raw.length.ok_or_else(|| missing("length"))?;
        let doc_index = raw.doc_index.ok_or_else(|| missing("doc_index"))?;
        let index = raw.index.ok_or_else(|| missing("index"))?;

        if !raw.tokens.is_empty() && !raw.pos_tags.is_empty() && raw.tokens.len() != raw.pos_tags.len()
        {
            return Err(RecordError::LengthMismatch {
                sentence: text,
                tokens: raw.tokens.len(),
                tags: raw.pos_tags.len(),
            });
        }

        Ok(Self {
            text,
            lemmas,
            length,
            doc_index,
            index,
            total_sent: raw.total_sent,
            doc_id: raw.doc_id,
            tokens: raw.tokens,
            pos_tags: raw.pos_tags,
            dep_tags: raw.dep_tags,
            named_entities: raw.named_entities,
            noun_chunks: raw.noun_chunks,
            concreteness: raw.concreteness,
            scores: SentenceScores::default(),
        })
    }

    /// Number of whitespace-separated pieces in the surface text.
    pub fn scoring_pieces(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// All sentences of one topic cluster, deduplicated by literal text.
#[derive(Debug, Clone)]
pub struct TopicCluster {
    id: ClusterId,
    sentences: BTreeMap<String, SentenceRecord>,
}

impl TopicCluster {
    /// Create an empty cluster.
    pub fn new(id: impl Into<ClusterId>) -> Self {
        Self {
            id: id.into(),
            sentences: BTreeMap::new(),
        }
    }

    /// Validate every raw record of a cluster, failing on the first malformed one.
    pub fn from_raw(
        id: impl Into<ClusterId>,
        raw: BTreeMap<String, RawSentenceRecord>,
    ) -> Result<Self, RecordError> {
        let mut cluster = Self::new(id);
        for (text, record) in raw {
            cluster.insert(SentenceRecord::from_raw(text, record)?);
        }
        Ok(cluster)
    }

    /// Insert a record; returns `false` and keeps the existing one when the text is a duplicate.
    pub fn insert(&mut self, record: SentenceRecord) -> bool {
        if self.sentences.contains_key(&record.text) {
            return false;
        }
        self.sentences.insert(record.text.clone(), record);
        true
    }

    /// Cluster identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Look up a sentence by its text.
    pub fn get(&self, text: &str) -> Option<&SentenceRecord> {
        self.sentences.get(text)
    }

    /// Iterate over records in text order.
    pub fn records(&self) -> impl Iterator<Item = &SentenceRecord> {
        self.sentences.values()
    }

    /// Iterate mutably over records in text order, for score annotation.
    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut SentenceRecord> {
        self.sentences.values_mut()
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Whether the cluster holds no sentences.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(lemmas: &[&str], length: usize) -> RawSentenceRecord {
        RawSentenceRecord {
            lemmas: Some(lemmas.iter().map(|s| s.to_string()).collect()),
            length: Some(length),
            doc_index: Some(0),
            index: Some(0),
            ..RawSentenceRecord::default()
        }
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let mut record = raw(&["fire"], 4);
        record.doc_index = None;
        let error = SentenceRecord::from_raw("The fire spread.".into(), record).expect_err("missing");
        assert!(matches!(
            error,
            RecordError::MissingField { field: "doc_index", .. }
        ));
    }

    #[test]
    fn misaligned_tokens_and_tags_are_rejected() {
        let mut record = raw(&["fire"], 2);
        record.tokens = vec!["Fire".into(), "!".into()];
        record.pos_tags = vec!["NN".into()];
        let error = SentenceRecord::from_raw("Fire!".into(), record).expect_err("mismatch");
        assert!(matches!(
            error,
            RecordError::LengthMismatch { tokens: 2, tags: 1, .. }
        ));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(
            SentenceRecord::from_raw("  ".into(), raw(&[], 0)),
            Err(RecordError::EmptyText)
        ));
    }

    #[test]
    fn deserializes_preprocessing_json() {
        let json = r#"{
            "lemmas": ["storm", "hit", "coast"],
            "length": 6,
            "doc_index": 2,
            "index": 4,
            "total_sent": 20,
            "doc_id": "APW19990101.0001",
            "concreteness": 7.5
        }"#;
        let raw: RawSentenceRecord = serde_json::from_str(json).expect("json");
        let record =
            SentenceRecord::from_raw("The storm hit the coast.".into(), raw).expect("record");
        assert_eq!(record.length, 6);
        assert_eq!(record.doc_index, 2);
        assert_eq!(record.total_sent, 20);
        assert_eq!(record.doc_id.as_deref(), Some("APW19990101.0001"));
        assert!(record.scores.total.is_none());
    }

    #[test]
    fn cluster_deduplicates_by_literal_text() {
        let mut cluster = TopicCluster::new("D0901A");
        assert!(cluster.insert(SentenceRecord::new("Same text.", vec![], 2, 0, 0)));
        assert!(!cluster.insert(SentenceRecord::new("Same text.", vec![], 2, 1, 3)));
        assert_eq!(cluster.len(), 1);
        assert_eq!(cluster.get("Same text.").map(|r| r.doc_index), Some(0));
    }
}
