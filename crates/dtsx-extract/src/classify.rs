//! Per-line classification.

use crate::lexer::{tokenize, TokenKind};

/// The declaration kinds the extractor knows how to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Interface,
    TypeAlias,
    Function,
    /// Classes, enums, `let`/`var` and anything else exported. Emitted verbatim.
    Other,
}

impl DeclKind {
    /// Whether a line of this kind may open a body that spans several lines.
    pub fn accumulates(self) -> bool {
        !matches!(self, DeclKind::Other)
    }
}

/// What a single trimmed source line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Part of a block comment. `opens_block` is set for `/*` and `/**` lines.
    Comment { opens_block: bool },
    Import,
    DefaultExport,
    /// `export { .. }`, `export type { .. }` or `export * ..`.
    ReExport,
    Export(DeclKind),
    Other,
}

/// Classify a line. The input is expected to be trimmed already.
pub fn classify(line: &str) -> LineClass {
    if line.starts_with("/*") {
        return LineClass::Comment { opens_block: true };
    }
    if line.starts_with('*') {
        return LineClass::Comment { opens_block: false };
    }

    let tokens = tokenize(line);
    let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();

    match kinds.as_slice() {
        // `import(` and `import.meta` are expressions, `import:` and
        // `import?:` are members named `import`.
        [TokenKind::Import, TokenKind::LParen | TokenKind::Dot, ..]
        | [TokenKind::Import, TokenKind::Colon | TokenKind::Question, ..] => LineClass::Other,
        [TokenKind::Import, ..] => LineClass::Import,
        [TokenKind::Export, TokenKind::Default, ..] => LineClass::DefaultExport,
        [TokenKind::Export, rest @ ..] => classify_export(rest),
        _ => LineClass::Other,
    }
}

fn classify_export(rest: &[&TokenKind]) -> LineClass {
    let rest = match rest {
        [TokenKind::Declare, tail @ ..] => tail,
        _ => rest,
    };
    match rest {
        [TokenKind::LBrace | TokenKind::Star, ..] => LineClass::ReExport,
        [TokenKind::Type, TokenKind::LBrace | TokenKind::Star, ..] => LineClass::ReExport,
        [TokenKind::Const, ..] => LineClass::Export(DeclKind::Const),
        [TokenKind::Interface, ..] => LineClass::Export(DeclKind::Interface),
        [TokenKind::Type, ..] => LineClass::Export(DeclKind::TypeAlias),
        [TokenKind::Function, ..] | [TokenKind::Async, TokenKind::Function, ..] => {
            LineClass::Export(DeclKind::Function)
        }
        _ => LineClass::Export(DeclKind::Other),
    }
}
