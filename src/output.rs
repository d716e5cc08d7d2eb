//! Summary files in the evaluation layout: one sentence per line, named per cluster and run.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::assembly::tokenize::tokenize;
use crate::corpus::ArtifactError;

static SPACE_AFTER_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"" ([A-Za-z0-9])"#).expect("valid quote spacing regex"));
static TRAILING_ATTRIBUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#",([^,'"]*?)\.$"#).expect("valid attribution regex"));

const ATTRIBUTION_WORDS: &[&str] = &["said", "stated", "according"];

/// Longest trailing attribution removed when writing a line.
pub const LINE_ATTRIBUTION_MAX_WORDS: usize = 4;

/// `D0901A` + `run0` → `D0901-A.M.100.A.run0`.
pub fn summary_file_name(cluster: &str, run_id: &str) -> String {
    let split = cluster.char_indices().last().map_or(0, |(i, _)| i);
    let (prefix, suffix) = cluster.split_at(split);
    format!("{prefix}-A.M.100.{suffix}.{run_id}")
}

/// Repair detokenization spacing around punctuation, underscores and quotes.
pub fn normalize_line(line: &str) -> String {
    let line = line
        .replace('\\', "")
        .replace("``", " \"")
        .replace(" ,", ", ")
        .replace(" .", ". ")
        .replace('_', " ")
        .replace("  ", " ");
    let line = SPACE_AFTER_QUOTE.replace_all(&line, "\"$1");
    line.replace(", \"", ",\" ").trim().to_string()
}

/// Drop a final `, <attribution>.` clause of at most `max_words` tokens.
pub fn strip_attribution(line: &str, max_words: usize) -> String {
    let Some(clause) = TRAILING_ATTRIBUTION
        .captures(line)
        .and_then(|captures| captures.get(1))
    else {
        return line.to_string();
    };
    let clause = clause.as_str();
    let attributed = ATTRIBUTION_WORDS.iter().any(|word| clause.contains(word));
    if attributed && tokenize(clause).len() <= max_words {
        TRAILING_ATTRIBUTION.replace(line, ".").into_owned()
    } else {
        line.to_string()
    }
}

/// Write `sentences` for `cluster` into `out_dir`, returning the file path.
pub fn write_summary(
    out_dir: &Path,
    cluster: &str,
    run_id: &str,
    sentences: &[String],
) -> Result<PathBuf, ArtifactError> {
    fs::create_dir_all(out_dir).map_err(|source| ArtifactError::io(out_dir, source))?;
    let path = out_dir.join(summary_file_name(cluster, run_id));

    let mut content = String::new();
    for sentence in sentences {
        let line = strip_attribution(&normalize_line(sentence), LINE_ATTRIBUTION_MAX_WORDS);
        content.push_str(&line);
        content.push('\n');
    }
    fs::write(&path, content).map_err(|source| ArtifactError::io(&path, source))?;
    tracing::debug!(cluster = %cluster, path = %path.display(), lines = sentences.len(), "Wrote summary");
    Ok(path)
}
