//! Pending doc-comment aggregation.

/// The block comment most recently seen and not yet attached to a declaration.
#[derive(Debug, Default, Clone)]
pub struct CommentBlock {
    text: String,
}

impl CommentBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new block, dropping whatever was pending.
    pub fn open(&mut self) {
        self.text.clear();
    }

    /// Append a raw comment line, indentation included.
    pub fn push_line(&mut self, raw: &str) {
        self.text.push_str(raw);
        self.text.push('\n');
    }

    fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take the pending block for attachment, leaving nothing pending.
    pub fn take(&mut self) -> Option<String> {
        if self.is_empty() {
            self.text.clear();
            return None;
        }
        let text = std::mem::take(&mut self.text);
        Some(text.trim_end().to_string())
    }
}
