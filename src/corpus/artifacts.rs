//! JSON artifacts shared with the preprocessing and embedding stages.
//!
//! The core never decides whether an artifact is stale; it only reads what is on disk and
//! writes back what it produced.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::types::{ClusterId, RawSentenceRecord, RecordError, TopicCluster};
use crate::embedding::EmbeddingTable;
use crate::scoring::TopicTermDistribution;

/// Errors raised while reading or writing artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file was not valid JSON of the expected shape.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        /// Path being parsed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// A sentence record failed validation.
    #[error("invalid sentence record in cluster {cluster}: {source}")]
    Record {
        /// Cluster containing the record.
        cluster: ClusterId,
        /// Validation failure.
        #[source]
        source: RecordError,
    },
}

impl ArtifactError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

type RawSentenceTables = BTreeMap<ClusterId, BTreeMap<String, RawSentenceRecord>>;

/// Load `{cluster: {sentence: info}}` sentence tables and validate every record.
pub fn load_sentence_tables(path: &Path) -> Result<Vec<TopicCluster>, ArtifactError> {
    let raw: RawSentenceTables = read_json(path)?;
    let clusters = raw
        .into_iter()
        .map(|(cluster, sentences)| {
            TopicCluster::from_raw(cluster.clone(), sentences)
                .map_err(|source| ArtifactError::Record { cluster, source })
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        path = %path.display(),
        clusters = clusters.len(),
        sentences = clusters.iter().map(TopicCluster::len).sum::<usize>(),
        "Loaded sentence tables"
    );
    Ok(clusters)
}

/// Load a cached sentence → vector table; a missing file yields an empty table.
pub fn load_embedding_table(path: &Path) -> Result<EmbeddingTable, ArtifactError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No embedding cache found; starting empty");
        return Ok(EmbeddingTable::new());
    }
    let table: EmbeddingTable = read_json(path)?;
    tracing::info!(path = %path.display(), vectors = table.len(), "Loaded embedding cache");
    Ok(table)
}

/// Persist the embedding cache.
pub fn save_embedding_table(path: &Path, table: &EmbeddingTable) -> Result<(), ArtifactError> {
    write_json(path, table)
}

/// Persist the fitted topic-term distributions of every cluster.
pub fn save_topic_distributions(
    path: &Path,
    distributions: &BTreeMap<ClusterId, TopicTermDistribution>,
) -> Result<(), ArtifactError> {
    write_json(path, distributions)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::io(path, source))?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ArtifactError::io(parent, source))?;
    }
    let content = serde_json::to_string_pretty(value).map_err(|source| ArtifactError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| ArtifactError::io(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_validates_sentence_tables() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sentences.json");
        fs::write(
            &path,
            r#"{
                "D0901A": {
                    "The storm hit the coast on a quiet evening.": {
                        "lemmas": ["storm", "hit", "coast", "quiet", "evening"],
                        "length": 10, "doc_index": 0, "index": 1
                    }
                }
            }"#,
        )
        .expect("write");

        let clusters = load_sentence_tables(&path).expect("load");
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].id(), "D0901A");
        assert_eq!(clusters[0].len(), 1);
    }

    #[test]
    fn reports_cluster_of_invalid_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sentences.json");
        fs::write(&path, r#"{"D0902B": {"No length here.": {"lemmas": [], "doc_index": 0, "index": 0}}}"#)
            .expect("write");

        match load_sentence_tables(&path) {
            Err(ArtifactError::Record { cluster, source }) => {
                assert_eq!(cluster, "D0902B");
                assert!(source.to_string().contains("length"));
            }
            other => panic!("expected record error, got {other:?}"),
        }
    }

    #[test]
    fn missing_embedding_cache_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let table = load_embedding_table(&dir.path().join("absent.json")).expect("load");
        assert!(table.is_empty());
    }

    #[test]
    fn embedding_cache_survives_a_save_and_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cache").join("embeddings.json");
        let mut table = EmbeddingTable::new();
        table.insert("A sentence.", vec![0.25, 0.5]);
        save_embedding_table(&path, &table).expect("save");

        let loaded = load_embedding_table(&path).expect("load");
        assert_eq!(loaded.get("A sentence."), Some(&[0.25_f32, 0.5][..]));
    }
}
