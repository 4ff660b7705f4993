// ABOUTME: Tokenization and overlap scoring for fuzzy executor matching
// ABOUTME: Splits descriptions and executor identities into comparable token sets

use std::collections::HashSet;

use crate::registry::ExecutorRecord;

/// Tokenize free text: lower-cased, whitespace-split, punctuation trimmed.
pub fn description_tokens(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Tokenize an executor identity: its name split on case boundaries and
/// separators, union the tokens of its description.
pub fn executor_tokens(record: &ExecutorRecord) -> HashSet<String> {
    let mut tokens = name_tokens(&record.name);
    tokens.extend(description_tokens(&record.description));
    tokens
}

/// Fraction of the work item's tokens that also appear in the candidate's
/// token set. The item token count is the denominator, so a short query
/// fully covered by a verbose candidate still scores 1.0.
pub fn overlap_score(item_tokens: &HashSet<String>, candidate_tokens: &HashSet<String>) -> f64 {
    if item_tokens.is_empty() {
        return 0.0;
    }

    let intersection = item_tokens.intersection(candidate_tokens).count();
    intersection as f64 / item_tokens.len() as f64
}

/// Split a name like `StructureWriter`, `copy_writer`, or `logo-sketcher`
/// into lower-cased tokens on case boundaries and separator characters.
fn name_tokens(name: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    let mut current = String::new();

    for c in name.chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            push_token(&mut tokens, &mut current);
        } else if c.is_uppercase() && !current.is_empty() {
            push_token(&mut tokens, &mut current);
            current.push(c.to_ascii_lowercase());
        } else {
            current.push(c.to_ascii_lowercase());
        }
    }
    push_token(&mut tokens, &mut current);

    tokens
}

fn push_token(tokens: &mut HashSet<String>, current: &mut String) {
    if !current.is_empty() {
        tokens.insert(std::mem::take(current));
    }
}
