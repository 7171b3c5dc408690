//! Route rule matching logic.
//!
//! # Responsibilities
//! - Compile a configured pattern into an anchored regex
//! - Decide whether a destination is a substitution template
//! - Produce the rewritten path for a matching rule
//!
//! # Design Decisions
//! - Patterns match the whole path, case-insensitive, Unicode-aware
//! - Patterns are compiled once at startup; an invalid pattern is a
//!   configuration error, never a per-request one
//! - `$N`, `${N}` and `\N` backreferences are accepted in templates

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Marker that turns a destination into a substitution template.
pub const BACKREFERENCE_MARKER: char = '$';

/// Errors raised while compiling route rules.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The pattern is not a valid regular expression.
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The pattern is empty.
    #[error("route pattern must not be empty")]
    EmptyPattern,
}

/// A single compiled pattern-to-destination rule.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pattern: String,
    destination: String,
    regex: Regex,
    template: Option<String>,
}

impl RouteRule {
    /// Compile a rule.
    pub fn new(pattern: impl Into<String>, destination: impl Into<String>) -> Result<Self, RouteError> {
        let pattern = pattern.into();
        let destination = destination.into();
        if pattern.is_empty() {
            return Err(RouteError::EmptyPattern);
        }

        let regex = RegexBuilder::new(&format!("^(?:{})$", pattern))
            .case_insensitive(true)
            .unicode(true)
            .build()
            .map_err(|source| RouteError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;

        let template = destination
            .contains(BACKREFERENCE_MARKER)
            .then(|| expand_template(&destination));

        Ok(Self {
            pattern,
            destination,
            regex,
            template,
        })
    }

    /// The raw pattern key, also used for exact matching.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Whether the destination substitutes capture groups.
    pub fn is_template(&self) -> bool {
        self.template.is_some()
    }

    /// Returns true if the whole path matches this rule's pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Rewrite a path this rule matches.
    ///
    /// Callers check [`RouteRule::matches`] first; a non-matching path is
    /// returned unchanged by the substitution.
    pub fn apply(&self, path: &str) -> String {
        match &self.template {
            Some(template) => self.regex.replace(path, template.as_str()).into_owned(),
            None => self.destination.clone(),
        }
    }
}

/// Rewrite a destination into the `regex` replacement syntax.
///
/// `$1a` means group 1 followed by `a`, and `\1` is group 1. Any other `$`
/// is kept literal.
fn expand_template(destination: &str) -> String {
    let chars: Vec<char> = destination.chars().collect();
    let mut out = String::with_capacity(destination.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match (c, next) {
            ('$', Some('{')) => {
                // Already explicit, copy through the closing brace
                match chars[i..].iter().position(|&ch| ch == '}') {
                    Some(end) => {
                        out.extend(&chars[i..=i + end]);
                        i += end + 1;
                    }
                    None => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            ('$' | '\\', Some(d)) if d.is_ascii_digit() => {
                let digits: String = chars[i + 1..]
                    .iter()
                    .take_while(|ch| ch.is_ascii_digit())
                    .collect();
                i += 1 + digits.len();
                out.push_str("${");
                out.push_str(&digits);
                out.push('}');
            }
            ('$', _) => {
                out.push_str("$$");
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}
