//! Treebank-style word tokenization and its inverse.
//!
//! Cleaned token counts drive the word budget, so the splitting rules here decide what a
//! "word" is for every accepted sentence: punctuation and clitics are separate tokens.

const OPENING: &[char] = &['(', '[', '{', '"', '\'', '`', '“', '‘'];
const CLOSING: &[char] = &[',', ';', ':', '!', '?', ')', ']', '}', '"', '”', '’'];
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Split a sentence into words, punctuation marks and clitics.
pub fn tokenize(text: &str) -> Vec<String> {
    let pieces: Vec<&str> = text.split_whitespace().collect();
    let last = pieces.len().saturating_sub(1);
    let mut tokens = Vec::with_capacity(pieces.len() + 4);
    for (position, piece) in pieces.iter().enumerate() {
        split_piece(piece, position == last, &mut tokens);
    }
    tokens
}

fn split_piece(piece: &str, sentence_final: bool, tokens: &mut Vec<String>) {
    if is_clitic(piece) {
        tokens.push(piece.to_string());
        return;
    }

    let mut core = piece;
    while let Some(c) = core.chars().next().filter(|c| OPENING.contains(c)) {
        if core.chars().count() == 1 {
            break;
        }
        tokens.push(c.to_string());
        core = &core[c.len_utf8()..];
    }

    let mut trailing = Vec::new();
    while let Some(c) = core.chars().next_back() {
        let splits = CLOSING.contains(&c) || (c == '.' && sentence_final);
        if !splits || core.chars().count() == 1 {
            break;
        }
        trailing.push(c.to_string());
        core = &core[..core.len() - c.len_utf8()];
    }

    match split_clitic(core) {
        Some((stem, clitic)) => {
            tokens.push(stem.to_string());
            tokens.push(clitic.to_string());
        }
        None => tokens.push(core.to_string()),
    }
    tokens.extend(trailing.into_iter().rev());
}

fn split_clitic(word: &str) -> Option<(&str, &str)> {
    let lower = word.to_lowercase();
    CLITICS.iter().find_map(|clitic| {
        let stem_len = word.len().checked_sub(clitic.len())?;
        (stem_len > 0 && lower.len() == word.len() && lower.ends_with(clitic))
            .then(|| word.split_at(stem_len))
    })
}

fn is_clitic(token: &str) -> bool {
    CLITICS.iter().any(|clitic| token.eq_ignore_ascii_case(clitic))
}

/// Rejoin tokens into surface text.
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut text = String::new();
    let mut glue_next = false;
    for token in tokens {
        let token = token.as_ref();
        if !text.is_empty() && !glue_next && !attaches_left(token) {
            text.push(' ');
        }
        text.push_str(token);
        glue_next = matches!(token, "(" | "[" | "{" | "$" | "“");
    }
    text
}

fn attaches_left(token: &str) -> bool {
    matches!(
        token,
        "," | "." | ";" | ":" | "!" | "?" | ")" | "]" | "}" | "%" | "”"
    ) || is_clitic(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_punctuation_and_clitics() {
        assert_eq!(
            tokenize("The fire didn't spread, officials said."),
            ["The", "fire", "did", "n't", "spread", ",", "officials", "said", "."]
        );
    }

    #[test]
    fn keeps_inner_periods_and_splits_brackets() {
        assert_eq!(
            tokenize("(AP) U.S. crews arrived."),
            ["(", "AP", ")", "U.S.", "crews", "arrived", "."]
        );
    }

    #[test]
    fn possessives_become_their_own_token() {
        assert_eq!(tokenize("Monday's storm"), ["Monday", "'s", "storm"]);
    }

    #[test]
    fn detokenize_restores_surface_spacing() {
        let text = "Crews (from three towns) didn't stop; the fire's edge held at 40%.";
        assert_eq!(detokenize(&tokenize(text)), text);
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("   ").is_empty());
        assert_eq!(detokenize::<&str>(&[]), "");
    }
}
