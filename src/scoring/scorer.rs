//! Fusion of the per-sentence signals and candidate pool selection.

use std::cmp::Ordering;

use crate::config::{RankingMode, SummarizerConfig};
use crate::corpus::{SentenceRecord, TopicCluster};

/// Number of topic groups the fused pool is drawn from.
const TOPIC_GROUPS: usize = 3;

/// Store `total = tf_idf_norm × concreteness_norm × LDAscore / length` on every scorable sentence.
///
/// Both signals are divided by their cluster maximum; a maximum of zero leaves that signal
/// untouched. Sentences without a topic, without a term weight, or whose total is not finite
/// keep `total = None` and never reach selection. Returns the number of sentences scored.
pub fn fuse_scores(cluster: &mut TopicCluster) -> usize {
    let max_tf_idf = cluster
        .records()
        .filter_map(|record| record.scores.tf_idf)
        .fold(0.0_f64, f64::max);
    let max_concreteness = cluster
        .records()
        .map(|record| record.concreteness)
        .fold(0.0_f64, f64::max);

    let mut scored = 0;
    for record in cluster.records_mut() {
        record.scores.total = fused_total(record, max_tf_idf, max_concreteness);
        match record.scores.total {
            Some(_) => scored += 1,
            None => tracing::trace!(sentence = %record.text, "Sentence excluded from ranking"),
        }
    }
    scored
}

fn fused_total(record: &SentenceRecord, max_tf_idf: f64, max_concreteness: f64) -> Option<f64> {
    record.scores.lda_topic?;
    let lda_score = record.scores.lda_score?;
    let tf_idf = normalize(record.scores.tf_idf?, max_tf_idf);
    let concreteness = normalize(record.concreteness, max_concreteness);
    let total = tf_idf * concreteness * lda_score / record.length as f64;
    total.is_finite().then_some(total)
}

fn normalize(value: f64, max: f64) -> f64 {
    if max > 0.0 { value / max } else { value }
}

/// Build the ranked candidate pool handed to the assembler.
///
/// In [`RankingMode::Fused`] the pool is the top `num_sentences / 3` of each topic group
/// (topic 0, topic 1, everything else), merged into one descending order. In
/// [`RankingMode::Lda`] it is the top `num_sentences` by `LDAscore`.
pub fn select_candidates<'a>(
    cluster: &'a TopicCluster,
    config: &SummarizerConfig,
) -> Vec<&'a SentenceRecord> {
    let mut pool = match config.ranking {
        RankingMode::Fused => {
            let per_group = config.num_sentences / TOPIC_GROUPS;
            let mut groups: [Vec<(&SentenceRecord, f64)>; TOPIC_GROUPS] = Default::default();
            for record in cluster.records() {
                let (Some(topic), Some(total)) = (record.scores.lda_topic, record.scores.total)
                else {
                    continue;
                };
                groups[topic.min(TOPIC_GROUPS - 1)].push((record, total));
            }
            groups
                .into_iter()
                .flat_map(|mut group| {
                    group.sort_by(rank_order);
                    group.truncate(per_group);
                    group
                })
                .collect::<Vec<_>>()
        }
        RankingMode::Lda => {
            let mut scored: Vec<(&SentenceRecord, f64)> = cluster
                .records()
                .filter_map(|record| record.scores.lda_score.map(|score| (record, score)))
                .collect();
            scored.sort_by(rank_order);
            scored.truncate(config.num_sentences);
            scored
        }
    };
    pool.sort_by(rank_order);
    tracing::debug!(
        cluster = %cluster.id(),
        ranking = ?config.ranking,
        candidates = pool.len(),
        "Selected candidate pool"
    );
    pool.into_iter().map(|(record, _)| record).collect()
}

/// Descending score, then document index, sentence index and text ascending.
fn rank_order(a: &(&SentenceRecord, f64), b: &(&SentenceRecord, f64)) -> Ordering {
    b.1.total_cmp(&a.1)
        .then_with(|| a.0.doc_index.cmp(&b.0.doc_index))
        .then_with(|| a.0.index.cmp(&b.0.index))
        .then_with(|| a.0.text.cmp(&b.0.text))
}
