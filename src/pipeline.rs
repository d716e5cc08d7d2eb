use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::assembly::{AssemblyError, Summary, SummaryAssembler};
use crate::config::SummarizerConfig;
use crate::corpus::{ClusterId, TopicCluster};
use crate::embedding::EmbeddingTable;
use crate::metrics::{MetricsSnapshot, RunMetrics};
use crate::scoring::{
    TermWeights, TopicModel, TopicModelParams, TopicTermDistribution, annotate_term_weights,
    annotate_topics, fuse_scores, select_candidates,
};

/// Errors that abort summarization of one cluster.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// Assembly hit a precondition violation.
    #[error("failed to assemble summary for cluster {cluster}: {source}")]
    Assembly {
        /// Cluster being summarized.
        cluster: ClusterId,
        /// Underlying assembly failure.
        #[source]
        source: AssemblyError,
    },
}

/// Summary and fitted topics for one cluster.
#[derive(Debug, Clone)]
pub struct ClusterSummary {
    /// Cluster identifier.
    pub cluster: ClusterId,
    /// Finished summary.
    pub summary: Summary,
    /// Topic-term distribution fitted for this cluster.
    pub topics: TopicTermDistribution,
}

/// Outcome of a run over many clusters.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Finished summaries keyed by cluster.
    pub summaries: BTreeMap<ClusterId, Summary>,
    /// Fitted topic-term distributions keyed by cluster.
    pub topics: BTreeMap<ClusterId, TopicTermDistribution>,
    /// Clusters whose summarization aborted.
    pub failures: BTreeMap<ClusterId, SummarizeError>,
}

/// Runs scoring and assembly for topic clusters.
///
/// Each cluster gets its own term weights, topic model and assembly context, so clusters are
/// processed in parallel with nothing shared except the read-only embedding table and the
/// metrics counters.
#[derive(Debug, Clone)]
pub struct Summarizer {
    config: SummarizerConfig,
    assembler: SummaryAssembler,
    metrics: Arc<RunMetrics>,
}

impl Summarizer {
    /// Create a summarizer for a run configuration.
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            assembler: SummaryAssembler::new(config.clone()),
            config,
            metrics: Arc::new(RunMetrics::new()),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Snapshot of the counters recorded so far.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Score every sentence of `cluster` and assemble its summary.
    pub fn summarize_cluster(
        &self,
        mut cluster: TopicCluster,
        embeddings: &EmbeddingTable,
    ) -> Result<ClusterSummary, SummarizeError> {
        let weights = TermWeights::from_cluster(&cluster);
        annotate_term_weights(&mut cluster, &weights);

        let documents: Vec<Vec<String>> = cluster.records().map(|r| r.lemmas.clone()).collect();
        let model = TopicModel::new(TopicModelParams::from_config(&self.config)).fit(&documents);
        let topic_scored =
            annotate_topics(&mut cluster, &model, &weights, self.config.min_scoring_pieces);
        let fused = fuse_scores(&mut cluster);
        tracing::debug!(
            cluster = %cluster.id(),
            sentences = cluster.len(),
            documents = weights.num_documents(),
            topic_scored,
            fused,
            "Scored cluster"
        );

        let candidates = select_candidates(&cluster, &self.config);
        let summary = self
            .assembler
            .assemble(cluster.id(), &candidates, embeddings)
            .map_err(|source| {
                self.metrics.record_failure();
                SummarizeError::Assembly {
                    cluster: cluster.id().to_string(),
                    source,
                }
            })?;
        self.metrics.record_summary(&summary);

        Ok(ClusterSummary {
            cluster: cluster.id().to_string(),
            summary,
            topics: model.into_distribution(),
        })
    }

    /// Summarize every cluster in parallel; a failing cluster never aborts the others.
    pub fn run(&self, clusters: Vec<TopicCluster>, embeddings: &EmbeddingTable) -> RunReport {
        let total = clusters.len();
        let results: Vec<(ClusterId, Result<ClusterSummary, SummarizeError>)> = clusters
            .into_par_iter()
            .map(|cluster| {
                let id = cluster.id().to_string();
                (id, self.summarize_cluster(cluster, embeddings))
            })
            .collect();

        let mut report = RunReport::default();
        for (id, result) in results {
            match result {
                Ok(done) => {
                    report.topics.insert(id.clone(), done.topics);
                    report.summaries.insert(id, done.summary);
                }
                Err(error) => {
                    tracing::error!(cluster = %id, error = %error, "Cluster summarization failed");
                    report.failures.insert(id, error);
                }
            }
        }
        tracing::info!(
            clusters = total,
            summarized = report.summaries.len(),
            failed = report.failures.len(),
            "Summarization run finished"
        );
        report
    }
}
