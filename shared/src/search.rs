//! Lexical scanner for free-text search queries.
//!
//! Turns a query like `project:"my-app" level:error "db error" timeout`
//! into an ordered sequence of tokens suitable for rendering as
//! removable filter chips. This is a lexical scan, not a grammar:
//! first match wins at each position, there is no operator precedence,
//! and the only escaping is the literal quote character.

use nom::bytes::complete::{take_while, take_while1};
use nom::character::complete::char;
use nom::sequence::delimited;
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};

/// One parsed unit of a search query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchToken {
    /// The key of a `key:value` pair; `None` for standalone terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// The value, with surrounding quotes stripped.
    pub value: String,

    /// The exact substring consumed, kept for removal-by-reference.
    pub raw: String,
}

/// Scans a query string into tokens, left to right.
///
/// Recognized forms, first match wins per position:
/// `word:"quoted value"`, `word:bareword`, `"quoted phrase"`, `bareword`.
/// Unquoted multi-word values are not supported; each space-separated
/// word becomes its own token unless quoted. Never fails: characters
/// that match no form are skipped.
///
/// # Example
///
/// ```
/// use shared::search::parse_tokens;
///
/// let tokens = parse_tokens(r#"level:error "db error""#);
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].key.as_deref(), Some("level"));
/// assert_eq!(tokens[1].value, "db error");
/// ```
#[must_use]
pub fn parse_tokens(query: &str) -> Vec<SearchToken> {
    let mut tokens = Vec::new();
    let mut rest = query.trim_start();

    while !rest.is_empty() {
        match token(rest) {
            Ok((remaining, tok)) => {
                tokens.push(tok);
                rest = remaining.trim_start();
            }
            Err(_) => {
                // Skip one char and rescan so a stray character can
                // never wedge the scanner.
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str().trim_start();
            }
        }
    }

    tokens
}

/// Removes the first literal occurrence of `raw` from the query and
/// collapses any resulting whitespace run to a single space.
///
/// # Example
///
/// ```
/// use shared::search::remove_token_from_query;
///
/// assert_eq!(remove_token_from_query("a b c", "b"), "a c");
/// ```
#[must_use]
pub fn remove_token_from_query(query: &str, raw: &str) -> String {
    let without = match query.find(raw) {
        Some(start) => {
            let mut s = String::with_capacity(query.len() - raw.len());
            s.push_str(&query[..start]);
            s.push_str(&query[start + raw.len()..]);
            s
        }
        None => query.to_string(),
    };

    without.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Token parsers
// ============================================================================

fn token(input: &str) -> IResult<&str, SearchToken> {
    let (rest, (key, value)) = token_body(input)?;
    let raw = &input[..input.len() - rest.len()];

    Ok((
        rest,
        SearchToken {
            key: key.map(str::to_string),
            value: value.to_string(),
            raw: raw.to_string(),
        },
    ))
}

fn token_body(input: &str) -> IResult<&str, (Option<&str>, &str)> {
    if let Ok((rest, (key, value))) = keyed_quoted(input) {
        return Ok((rest, (Some(key), value)));
    }
    if let Ok((rest, (key, value))) = keyed_bare(input) {
        return Ok((rest, (Some(key), value)));
    }
    if let Ok((rest, value)) = quoted(input) {
        return Ok((rest, (None, value)));
    }
    let (rest, value) = bareword(input)?;
    Ok((rest, (None, value)))
}

fn keyed_quoted(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = word(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, value) = quoted(input)?;
    Ok((input, (key, value)))
}

fn keyed_bare(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = word(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, value) = bareword(input)?;
    Ok((input, (key, value)))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while(|c| c != '"'), char('"')).parse(input)
}

/// A key: word characters up to the `:` separator.
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace() && c != ':' && c != '"').parse(input)
}

/// A standalone or value word: any run of non-whitespace.
fn bareword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace()).parse(input)
}

// ============================================================================
// Tests
// ============================================================================
