//! Coherence ordering of accepted sentences by adjacent embedding similarity.

use itertools::Itertools;

use crate::embedding::cosine_similarity;

/// Chosen permutation and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceOrder {
    /// Indices into the input, in presentation order.
    pub order: Vec<usize>,
    /// Average cosine similarity of adjacent sentences; `0.0` below two sentences.
    pub coherence: f32,
}

/// Order sentences to maximize average adjacent cosine similarity.
///
/// Up to `max_exhaustive` sentences every permutation is scored and the first best one (in
/// lexicographic order of indices) wins. Larger inputs use a greedy nearest-neighbour chain
/// from every possible starting sentence.
pub fn best_order(vectors: &[&[f32]], max_exhaustive: usize) -> SentenceOrder {
    let n = vectors.len();
    if n < 2 {
        return SentenceOrder {
            order: (0..n).collect(),
            coherence: 0.0,
        };
    }

    let similarity: Vec<Vec<f32>> = vectors
        .iter()
        .map(|a| vectors.iter().map(|b| cosine_similarity(a, b)).collect())
        .collect();

    let candidates: Box<dyn Iterator<Item = Vec<usize>> + '_> = if n <= max_exhaustive {
        Box::new((0..n).permutations(n))
    } else {
        tracing::debug!(sentences = n, max_exhaustive, "Ordering with greedy chains");
        Box::new((0..n).map(|start| greedy_chain(&similarity, start)))
    };

    let mut best: Option<SentenceOrder> = None;
    for order in candidates {
        let coherence = chain_coherence(&similarity, &order);
        if best.as_ref().is_none_or(|current| coherence > current.coherence) {
            best = Some(SentenceOrder { order, coherence });
        }
    }
    best.unwrap_or_else(|| SentenceOrder {
        order: (0..n).collect(),
        coherence: 0.0,
    })
}

fn chain_coherence(similarity: &[Vec<f32>], order: &[usize]) -> f32 {
    let total: f32 = order
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| similarity[a][b])
        .sum();
    total / (order.len() - 1) as f32
}

fn greedy_chain(similarity: &[Vec<f32>], start: usize) -> Vec<usize> {
    let n = similarity.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = start;
    visited[current] = true;
    order.push(current);

    while order.len() < n {
        let next = (0..n)
            .filter(|&candidate| !visited[candidate])
            .fold(None, |best: Option<usize>, candidate| match best {
                Some(b) if similarity[current][b] >= similarity[current][candidate] => Some(b),
                _ => Some(candidate),
            });
        let Some(next) = next else { break };
        visited[next] = true;
        order.push(next);
        current = next;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivial_inputs_short_circuit() {
        assert_eq!(best_order(&[], 8).order, Vec::<usize>::new());
        let single: [&[f32]; 1] = [&[1.0, 0.0]];
        let order = best_order(&single, 8);
        assert_eq!(order.order, [0]);
        assert_eq!(order.coherence, 0.0);
    }

    #[test]
    fn places_the_bridge_sentence_in_the_middle() {
        let a: &[f32] = &[1.0, 0.0];
        let b: &[f32] = &[0.0, 1.0];
        let bridge: &[f32] = &[1.0, 1.0];
        let order = best_order(&[a, b, bridge], 8);
        assert_eq!(order.order[1], 2);
        assert!((order.coherence - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn greedy_fallback_visits_every_sentence_once() {
        let vectors: Vec<Vec<f32>> = (0..10).map(|i| vec![1.0, i as f32]).collect();
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let order = best_order(&refs, 4);
        let mut sorted = order.order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
        let expected: f32 = order
            .order
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| cosine_similarity(refs[a], refs[b]))
            .sum::<f32>()
            / 9.0;
        assert!((order.coherence - expected).abs() < 1e-6);
    }
}
