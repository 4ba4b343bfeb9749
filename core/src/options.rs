//! # Options
//!
//! Per-run configuration shared by extraction and planning.

/// Field-name prefix protoc-gen-go uses for its internal bookkeeping fields.
pub const DEFAULT_SKIP_PREFIX: &str = "XXX";

/// Configuration for one rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Fields whose name starts with this prefix get the skip tokens excluded.
    pub skip_prefix: String,
    /// Tag keys forced to `"-"` on prefixed fields (e.g. `json`, `xml`).
    pub skip_tokens: Vec<String>,
    /// Delete directive comments once they have been applied.
    pub remove_comments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            skip_prefix: DEFAULT_SKIP_PREFIX.to_string(),
            skip_tokens: Vec::new(),
            remove_comments: false,
        }
    }
}

impl Options {
    /// Sets the skip tokens, dropping blanks and duplicates but keeping order.
    pub fn with_skip_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.skip_tokens.clear();
        for token in tokens {
            let token = token.as_ref().trim();
            if !token.is_empty() && !self.skip_tokens.iter().any(|t| t == token) {
                self.skip_tokens.push(token.to_string());
            }
        }
        self
    }

    /// Sets the annotation removal mode.
    pub fn with_remove_comments(mut self, remove: bool) -> Self {
        self.remove_comments = remove;
        self
    }

    /// Whether `field` is a bookkeeping field that should receive the skip tokens.
    pub fn is_skipped_field(&self, field: &str) -> bool {
        !self.skip_prefix.is_empty()
            && !self.skip_tokens.is_empty()
            && field.starts_with(&self.skip_prefix)
    }
}
