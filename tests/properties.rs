use proptest::prelude::*;
use rustysumm::assembly::SummaryAssembler;
use rustysumm::assembly::ordering::best_order;
use rustysumm::config::SummarizerConfig;
use rustysumm::corpus::SentenceRecord;
use rustysumm::embedding::{EmbeddingTable, cosine_similarity};

const VOCABULARY: &[&str] = &[
    "crews", "river", "storm", "homes", "levee", "water", "bridge", "power", "roads", "town",
    "residents", "shelter", "damage", "rain", "wind", "coast", "boats", "rescue", "volunteers",
    "supplies",
];

fn candidate() -> impl Strategy<Value = (Vec<usize>, Vec<f32>)> {
    (
        prop::collection::vec(0..VOCABULARY.len(), 8..30),
        prop::collection::vec(-1.0_f32..1.0, 4),
    )
}

fn build(candidates: &[(Vec<usize>, Vec<f32>)]) -> (Vec<SentenceRecord>, EmbeddingTable) {
    let mut table = EmbeddingTable::new();
    let records = candidates
        .iter()
        .enumerate()
        .map(|(i, (words, vector))| {
            let body: Vec<&str> = words.iter().map(|&w| VOCABULARY[w]).collect();
            let text = format!("Item{i} {}.", body.join(" "));
            table.insert(text.clone(), vector.clone());
            SentenceRecord::new(text, vec![], words.len() + 2, 0, i)
        })
        .collect();
    (records, table)
}

/// Independent exhaustive search over every ordering.
fn brute_force_best(vectors: &[Vec<f32>]) -> f32 {
    fn visit(vectors: &[Vec<f32>], order: &mut Vec<usize>, used: &mut [bool], best: &mut f32) {
        if order.len() == vectors.len() {
            let total: f32 = order
                .windows(2)
                .map(|pair| cosine_similarity(&vectors[pair[0]], &vectors[pair[1]]))
                .sum();
            *best = best.max(total / (order.len() - 1) as f32);
            return;
        }
        for i in 0..vectors.len() {
            if !used[i] {
                used[i] = true;
                order.push(i);
                visit(vectors, order, used, best);
                order.pop();
                used[i] = false;
            }
        }
    }
    let mut best = f32::NEG_INFINITY;
    visit(vectors, &mut Vec::new(), &mut vec![false; vectors.len()], &mut best);
    best
}

proptest! {
    #[test]
    fn summaries_stay_within_budget_and_non_redundant(
        candidates in prop::collection::vec(candidate(), 1..25),
        replace in any::<bool>(),
    ) {
        let config = SummarizerConfig {
            replace_shorter_duplicates: replace,
            ..SummarizerConfig::default()
        };
        let (records, table) = build(&candidates);
        let pool: Vec<&SentenceRecord> = records.iter().collect();

        let summary = SummaryAssembler::new(config.clone())
            .assemble("D0911K", &pool, &table)
            .expect("every candidate is embedded");

        prop_assert!(summary.word_count <= config.word_budget);
        prop_assert_eq!(summary.sentences.len(), summary.sources.len());
        for (i, a) in summary.sources.iter().enumerate() {
            for b in &summary.sources[i + 1..] {
                let similarity = cosine_similarity(
                    table.get(a).expect("embedded"),
                    table.get(b).expect("embedded"),
                );
                prop_assert!(similarity <= config.sim_threshold);
            }
        }
    }

    #[test]
    fn assembly_is_deterministic(candidates in prop::collection::vec(candidate(), 1..15)) {
        let (records, table) = build(&candidates);
        let pool: Vec<&SentenceRecord> = records.iter().collect();
        let assembler = SummaryAssembler::new(SummarizerConfig::default());

        let first = assembler.assemble("D0912L", &pool, &table).expect("assemble");
        let second = assembler.assemble("D0912L", &pool, &table).expect("assemble");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ordering_is_optimal_for_small_summaries(
        vectors in prop::collection::vec(prop::collection::vec(-1.0_f32..1.0, 3), 2..=4),
    ) {
        let refs: Vec<&[f32]> = vectors.iter().map(Vec::as_slice).collect();
        let order = best_order(&refs, 8);
        prop_assert!((order.coherence - brute_force_best(&vectors)).abs() < 1e-5);
    }
}
