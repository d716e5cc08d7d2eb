//! Annotated corpus records and the artifacts they are loaded from.

pub mod artifacts;
pub mod types;

pub use artifacts::{
    ArtifactError, load_embedding_table, load_sentence_tables, save_embedding_table,
    save_topic_distributions,
};
pub use types::{
    ClusterId, RawSentenceRecord, RecordError, SentenceRecord, SentenceScores, TopicCluster,
};
