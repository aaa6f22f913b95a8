//! Ambient declaration (`.d.ts`) extraction for TypeScript sources.
//!
//! The extractor is a line-oriented structural scanner, not a parser. It
//! keeps the exported surface of a file (constants, interfaces, type aliases,
//! functions, re-exports and the default export), strips implementation
//! bodies, and emits whatever it does not understand verbatim.
//!
//! # Example
//!
//! ```
//! use dtsx_extract::{generate_dts, ExtractOptions};
//!
//! let dts = generate_dts("export const conf = {\n  key: 'value',\n}", &ExtractOptions::default());
//! assert_eq!(
//!     dts,
//!     "export declare const conf: { [key: string]: string } {\n  key: 'value';\n};"
//! );
//! ```

use std::path::Path;

use tracing::{error, instrument};

mod classify;
mod comments;
mod emit;
mod error;
mod infer;
mod lexer;
mod options;
mod scanner;
mod transform;

pub use classify::{classify, DeclKind, LineClass};
pub use emit::{assemble, clean};
pub use error::ExtractError;
pub use infer::{classify_value, infer_index_signature, Inferred};
pub use lexer::{Lexer, Token, TokenKind};
pub use options::ExtractOptions;
pub use scanner::{Extraction, Scanner};
pub use transform::{Declaration, DeclarationKind};

/// Generate declaration text for one in-memory source file.
pub fn generate_dts(source: &str, options: &ExtractOptions) -> String {
    let extraction = Scanner::scan(options, source);
    assemble(&extraction)
}

/// Read a source file and generate its declaration text.
///
/// Only the read can fail; the cause is logged and a single generic error is
/// returned.
#[instrument(skip(path, options), fields(path = %path.display()))]
pub fn extract(path: &Path, options: &ExtractOptions) -> Result<String, ExtractError> {
    let source = std::fs::read_to_string(path).map_err(|source| {
        error!(error = %source, "failed to read source file");
        ExtractError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(generate_dts(&source, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.ts");
        std::fs::write(&path, "export function hello(name: string): string {\n  return name\n}\n")
            .unwrap();
        let out = extract(&path, &ExtractOptions::default()).unwrap();
        assert_eq!(out, "export declare function hello(name: string): string;");
    }

    #[test]
    fn test_extract_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract(&dir.path().join("missing.ts"), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, ExtractError::Read { .. }));
        assert!(err.to_string().starts_with("failed to extract and generate .d.ts file"));
    }
}
