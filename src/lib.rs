#![deny(missing_docs)]

//! Core library for the Rusty Summ extractive summarizer.

/// Budgeted summary assembly, surface cleanup and coherence ordering.
pub mod assembly;
/// Environment-driven configuration management.
pub mod config;
/// Sentence records, topic clusters and their JSON artifacts.
pub mod corpus;
/// Embedding table, encoder abstraction and similarity helpers.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Summary file writer.
pub mod output;
/// Per-cluster orchestration of scoring and assembly.
pub mod pipeline;
/// Term weights, topic modeling and score fusion.
pub mod scoring;
