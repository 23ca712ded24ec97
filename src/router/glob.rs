//! Glob pattern compilation and matching.
//!
//! Patterns are compiled once at registration time into anchored regexes,
//! so per-request matching is a single regex test.

use regex::Regex;

/// A compiled glob pattern matched against a request path.
///
/// # Grammar
///
/// - `**` matches any possibly-empty run of characters, including `/`
/// - `*` matches any possibly-empty run of characters, excluding `/`
/// - every other character matches itself literally
///
/// There is no escape syntax. Matching is anchored: the pattern must cover
/// the entire path, so `/users/*` matches `/users/42` but not
/// `/users/42/posts`.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    source: String,
    regex: Regex,
}

impl GlobPattern {
    /// Compile a glob source string into a matchable pattern.
    #[must_use]
    pub fn new(source: &str) -> Self {
        let regex = Self::compile(source);
        Self {
            source: source.to_string(),
            regex,
        }
    }

    /// The original glob source string.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test the pattern against a request path (query string already removed).
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Translate a glob into an anchored regex.
    ///
    /// Literal runs are passed through `regex::escape` so every non-wildcard
    /// character matches itself.
    // The pattern is built from escaped literals and the two wildcard forms,
    // so compilation cannot fail on user input.
    #[allow(clippy::expect_used)]
    fn compile(source: &str) -> Regex {
        let mut pattern = String::with_capacity(source.len() + 8);
        pattern.push('^');

        let mut literal = String::new();
        let mut chars = source.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '*' {
                if !literal.is_empty() {
                    pattern.push_str(&regex::escape(&literal));
                    literal.clear();
                }
                if chars.peek() == Some(&'*') {
                    chars.next();
                    pattern.push_str(".*");
                } else {
                    pattern.push_str("[^/]*");
                }
            } else {
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            pattern.push_str(&regex::escape(&literal));
        }
        pattern.push('$');

        Regex::new(&pattern).expect("failed to compile glob pattern")
    }
}
