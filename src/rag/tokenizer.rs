//! Lexical tokenizer for BM25 and re-ranking.
//!
//! Lowercases, turns every character outside `[a-z0-9]` and whitespace into
//! a separator, and drops tokens of two characters or fewer.

use std::collections::HashSet;

/// Tokens of length <= this are discarded
const MIN_TOKEN_EXCLUSIVE: usize = 2;

/// Lazy token stream over a normalized copy of the input.
pub struct Tokens {
    buffer: String,
    offset: usize,
}

impl Iterator for Tokens {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let rest = &self.buffer[self.offset..];
            let start = rest.find(|c: char| !c.is_whitespace())?;
            let len = rest[start..]
                .find(char::is_whitespace)
                .unwrap_or(rest.len() - start);
            let token = &rest[start..start + len];
            self.offset += start + len;

            if token.len() > MIN_TOKEN_EXCLUSIVE {
                return Some(token.to_string());
            }
        }
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Tokenize text. Empty input yields nothing.
pub fn tokenize(text: &str) -> Tokens {
    Tokens {
        buffer: normalize(text),
        offset: 0,
    }
}

/// Unique tokens of a text
pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).collect()
}
