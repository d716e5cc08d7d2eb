//! Sentence salience signals: term weights, topic alignment and their fusion.

pub mod scorer;
pub mod term_weight;
pub mod topic_model;

pub use scorer::{fuse_scores, select_candidates};
pub use term_weight::{TermWeights, annotate_term_weights};
pub use topic_model::{
    Fit, TopicModel, TopicModelParams, TopicScore, TopicTermDistribution, Unfit, annotate_topics,
};
