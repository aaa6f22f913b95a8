//! Error types for extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting declarations from a file.
///
/// Malformed source never produces an error; only reading the file can fail.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source file could not be read.
    #[error("failed to extract and generate .d.ts file from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
