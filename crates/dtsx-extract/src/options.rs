//! Extraction options.

/// Configuration options for a single extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Emit the doc comment preceding each declaration.
    pub keep_comments: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            keep_comments: true,
        }
    }
}

impl ExtractOptions {
    /// Enable or disable doc comment emission.
    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}
