use rustysumm::assembly::tokenize::tokenize;
use rustysumm::assembly::{Rejection, SummaryAssembler};
use rustysumm::config::SummarizerConfig;
use rustysumm::corpus::{SentenceRecord, TopicCluster};
use rustysumm::embedding::{EmbeddingTable, cosine_similarity};
use rustysumm::output::write_summary;
use rustysumm::pipeline::{SummarizeError, Summarizer};

const WILDFIRE: [(usize, &str); 8] = [
    (0, "The wildfire spread across the dry hills east of the town overnight."),
    (0, "Firefighters worked through the night to protect homes near the ridge."),
    (1, "Strong winds pushed the flames toward the valley and forced evacuations."),
    (1, "More than two thousand residents left their homes before the fire arrived."),
    (2, "Officials said the blaze had burned nearly ten thousand acres of brush."),
    (2, "Crews expected cooler weather to help contain the fire within days."),
    (3, "The cause of the fire remains under investigation by state officials."),
    (3, "Several families returned to find their houses reduced to ash and rubble."),
];

fn record(text: &str, doc: usize, index: usize) -> SentenceRecord {
    let lemmas = text
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.len() > 2)
        .collect();
    SentenceRecord::new(text, lemmas, tokenize(text).len(), doc, index)
        .with_concreteness(2.0 + index as f64)
}

fn cluster(id: &str, sentences: &[(usize, &str)]) -> TopicCluster {
    let mut cluster = TopicCluster::new(id);
    for (index, (doc, text)) in sentences.iter().enumerate() {
        cluster.insert(record(text, *doc, index));
    }
    cluster
}

/// Nearly orthogonal vectors so no pair is redundant.
fn spread_embeddings(sentences: &[(usize, &str)], table: &mut EmbeddingTable) {
    let dimension = sentences.len();
    for (i, (_, text)) in sentences.iter().enumerate() {
        let mut vector = vec![0.1_f32; dimension];
        vector[i] = 1.0;
        table.insert(*text, vector);
    }
}

fn assemble_one(record: &SentenceRecord, config: SummarizerConfig) -> Vec<String> {
    let mut table = EmbeddingTable::new();
    table.insert(record.text.clone(), vec![1.0, 0.5]);
    SummaryAssembler::new(config)
        .assemble("D0901A", &[record], &table)
        .expect("assemble")
        .sentences
}

#[test]
fn single_eligible_sentence_yields_trivial_summary() {
    let sentence = SentenceRecord::new(
        "The economy grew significantly last quarter, according to officials.",
        vec!["economy".into(), "grow".into(), "quarter".into()],
        10,
        0,
        0,
    );
    let mut table = EmbeddingTable::new();
    table.insert(sentence.text.clone(), vec![0.2, 0.9]);

    let summary = SummaryAssembler::new(SummarizerConfig::default())
        .assemble("D0901A", &[&sentence], &table)
        .expect("assemble");

    assert_eq!(summary.sentences.len(), 1);
    assert!(!summary.sentences[0].contains("according"));
    assert!(summary.sentences[0].starts_with("The economy grew"));
    assert!(summary.sentences[0].ends_with("quarter."));
    assert_eq!(summary.coherence, 0.0);
}

#[test]
fn nine_piece_sentence_is_summarized_by_the_full_pipeline() {
    let text = "The economy grew significantly last quarter, according to officials.";
    assert_eq!(text.split_whitespace().count(), 9);
    let mut table = EmbeddingTable::new();
    table.insert(text, vec![0.2, 0.9]);

    let report = Summarizer::new(SummarizerConfig::default())
        .run(vec![cluster("D0909J", &[(0, text)])], &table);

    assert!(report.failures.is_empty());
    let summary = &report.summaries["D0909J"];
    assert_eq!(summary.sources, [text]);
    assert_eq!(summary.sentences.len(), 1);
    assert!(!summary.sentences[0].contains("according"));
    assert!(summary.sentences[0].starts_with("The economy grew"));
    assert!(summary.sentences[0].ends_with("quarter."));
    assert_eq!(summary.coherence, 0.0);
}

#[test]
fn near_duplicate_keeps_first_scanned_sentence() {
    let config = SummarizerConfig {
        min_length: 3,
        ..SummarizerConfig::default()
    };
    let first = SentenceRecord::new("The fire started Monday.", vec![], 5, 0, 0);
    let second = SentenceRecord::new("The fire began on Monday.", vec![], 6, 1, 0);
    let mut table = EmbeddingTable::new();
    table.insert(first.text.clone(), vec![1.0, 0.0]);
    table.insert(second.text.clone(), vec![0.97, (1.0_f32 - 0.97 * 0.97).sqrt()]);
    let similarity = cosine_similarity(
        table.get(&first.text).expect("first"),
        table.get(&second.text).expect("second"),
    );
    assert!((similarity - 0.97).abs() < 1e-4);

    let summary = SummaryAssembler::new(config)
        .assemble("D0902B", &[&first, &second], &table)
        .expect("assemble");

    assert_eq!(summary.sources, ["The fire started Monday."]);
    assert_eq!(summary.rejections, [Rejection::Redundant]);
}

#[test]
fn length_bounds_are_exclusive_below_and_inclusive_above() {
    let config = SummarizerConfig::default();
    let text = "Crews cleared debris from the flooded highway near the river.";
    let at = |length| SentenceRecord::new(text, vec![], length, 0, 0);

    assert!(assemble_one(&at(config.min_length), config.clone()).is_empty());
    assert_eq!(assemble_one(&at(config.min_length + 1), config.clone()).len(), 1);
    assert_eq!(assemble_one(&at(config.max_length), config.clone()).len(), 1);
    assert!(assemble_one(&at(config.max_length + 1), config).is_empty());
}

#[test]
fn cluster_of_short_sentences_summarizes_to_nothing() {
    let short = [
        (0, "Rain fell."),
        (1, "The river rose fast."),
        (2, "Schools closed early today."),
    ];
    let mut table = EmbeddingTable::new();
    spread_embeddings(&short, &mut table);
    let summarizer = Summarizer::new(SummarizerConfig::default());

    let report = summarizer.run(vec![cluster("D0903C", &short)], &table);

    assert!(report.failures.is_empty());
    assert!(report.summaries["D0903C"].is_empty());
    assert_eq!(summarizer.metrics_snapshot().clusters_empty, 1);
}

#[test]
fn full_run_respects_budget_and_redundancy() {
    let mut table = EmbeddingTable::new();
    spread_embeddings(&WILDFIRE, &mut table);
    let config = SummarizerConfig::default();
    let report = Summarizer::new(config.clone()).run(vec![cluster("D0904D", &WILDFIRE)], &table);

    let summary = &report.summaries["D0904D"];
    assert!(!summary.is_empty());
    assert!(summary.word_count <= config.word_budget);
    for (i, a) in summary.sources.iter().enumerate() {
        for b in &summary.sources[i + 1..] {
            let similarity = cosine_similarity(
                table.get(a).expect("embedded"),
                table.get(b).expect("embedded"),
            );
            assert!(similarity <= config.sim_threshold);
        }
    }
    assert_eq!(report.topics["D0904D"].num_topics(), config.num_topics);
}

#[test]
fn repeated_runs_are_identical() {
    let mut table = EmbeddingTable::new();
    spread_embeddings(&WILDFIRE, &mut table);

    let first = Summarizer::new(SummarizerConfig::default())
        .run(vec![cluster("D0905E", &WILDFIRE)], &table);
    let second = Summarizer::new(SummarizerConfig::default())
        .run(vec![cluster("D0905E", &WILDFIRE)], &table);

    assert_eq!(first.summaries, second.summaries);
    assert_eq!(first.topics, second.topics);
}

#[test]
fn failing_cluster_does_not_abort_the_run() {
    let mut table = EmbeddingTable::new();
    spread_embeddings(&WILDFIRE, &mut table);
    let summarizer = Summarizer::new(SummarizerConfig::default());
    let uncovered = [
        (0, "Heavy snow closed every mountain pass in the region for three days."),
        (1, "Plows worked around the clock to reopen the main highway to traffic."),
    ];

    let report = summarizer.run(
        vec![cluster("D0906F", &WILDFIRE), cluster("D0907G", &uncovered)],
        &table,
    );

    assert!(report.summaries.contains_key("D0906F"));
    assert!(matches!(
        report.failures.get("D0907G"),
        Some(SummarizeError::Assembly { cluster, .. }) if cluster == "D0907G"
    ));
    let snapshot = summarizer.metrics_snapshot();
    assert_eq!(snapshot.clusters_summarized, 1);
    assert_eq!(snapshot.clusters_failed, 1);
}

#[test]
fn summaries_are_written_one_sentence_per_line() {
    let mut table = EmbeddingTable::new();
    spread_embeddings(&WILDFIRE, &mut table);
    let report =
        Summarizer::new(SummarizerConfig::default()).run(vec![cluster("D0908H", &WILDFIRE)], &table);
    let summary = &report.summaries["D0908H"];

    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_summary(dir.path(), "D0908H", "D4run0", &summary.sentences).expect("write");

    assert!(path.ends_with("D0908-A.M.100.H.D4run0"));
    let content = std::fs::read_to_string(&path).expect("read");
    assert_eq!(content.lines().count(), summary.sentences.len());
}
