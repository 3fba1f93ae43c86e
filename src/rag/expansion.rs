//! Query expansion.
//!
//! Produces lexical variants of a query to widen recall: inline synonym
//! alternatives ("error" -> "error OR exception") and an imperative rewrite of
//! questions ("how ..." -> "steps to ...").

use std::collections::HashMap;
use std::sync::LazyLock;

/// Word -> related terms. Only the first entry is used for substitution.
static SYNONYMS: LazyLock<HashMap<&'static str, &'static [&'static str]>> = LazyLock::new(|| {
    let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    m.insert("error", &["exception", "failure"]);
    m.insert("bug", &["defect", "issue"]);
    m.insert("issue", &["problem", "ticket"]);
    m.insert("fix", &["repair", "resolve"]);
    m.insert("create", &["make", "build"]);
    m.insert("delete", &["remove", "erase"]);
    m.insert("find", &["search", "locate"]);
    m.insert("fast", &["quick", "rapid"]);
    m.insert("slow", &["sluggish", "laggy"]);
    m.insert("start", &["begin", "launch"]);
    m.insert("stop", &["halt", "terminate"]);
    m.insert("install", &["setup", "deploy"]);
    m.insert("configure", &["setup", "customize"]);
    m.insert("document", &["file", "record"]);
    m.insert("price", &["cost", "fee"]);
    m.insert("buy", &["purchase", "order"]);
    m.insert("help", &["support", "assistance"]);
    m.insert("car", &["automobile", "vehicle"]);
    m.insert("big", &["large", "huge"]);
    m.insert("small", &["little", "tiny"]);
    m
});

/// Leading interrogatives that mark a question
const QUESTION_WORDS: [&str; 6] = ["what", "how", "why", "when", "where", "who"];

/// Leading phrase -> imperative replacement, tried in order
const REFORMULATIONS: [(&str, &str); 3] = [
    ("what is", "explain"),
    ("how", "steps to"),
    ("why", "reason for"),
];

/// Strip `prefix` (ASCII case-insensitive) when followed by a word boundary
fn strip_prefix_word<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if !head.eq_ignore_ascii_case(prefix) {
        return None;
    }
    let rest = &text[prefix.len()..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if !c.is_alphanumeric() => Some(rest),
        Some(_) => None,
    }
}

/// True for queries that open with an interrogative or end with `?`
pub fn is_question(query: &str) -> bool {
    let query = query.trim();
    query.ends_with('?') || QUESTION_WORDS.iter().any(|w| strip_prefix_word(query, w).is_some())
}

/// Query expander
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExpander;

impl QueryExpander {
    pub fn new() -> Self {
        Self
    }

    /// Up to `variations - 1` reformulations of `query`, never including the
    /// query itself, deduplicated in generation order.
    pub fn expand(&self, query: &str, variations: usize) -> Vec<String> {
        let limit = variations.saturating_sub(1);
        let mut expansions: Vec<String> = Vec::new();
        let mut push = |candidate: String| {
            if candidate != query && !expansions.contains(&candidate) {
                expansions.push(candidate);
            }
        };

        let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let synonyms = self.with_synonyms(query);
        if synonyms != normalized {
            push(synonyms);
        }

        if variations > 1 && is_question(query) {
            if let Some(reformulated) = self.reformulate(query) {
                push(reformulated);
            }
        }

        expansions.truncate(limit);
        expansions
    }

    /// Replace each known word with "word OR synonym"
    pub fn with_synonyms(&self, query: &str) -> String {
        query
            .split_whitespace()
            .map(|word| match SYNONYMS.get(word.to_lowercase().as_str()) {
                Some(synonyms) => format!("{} OR {}", word, synonyms[0]),
                None => word.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rewrite the leading interrogative; first matching rule only
    pub fn reformulate(&self, query: &str) -> Option<String> {
        let trimmed = query.trim_start();
        REFORMULATIONS.iter().find_map(|(prefix, replacement)| {
            strip_prefix_word(trimmed, prefix).map(|rest| format!("{}{}", replacement, rest))
        })
    }
}
