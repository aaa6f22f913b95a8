//! The line-by-line scan that drives extraction.
//!
//! A [`Scanner`] owns all state for one pass over one file: the pending
//! comment block, the declaration accumulator and the output buffers.

use tracing::{debug, trace};

use crate::classify::{classify, DeclKind, LineClass};
use crate::comments::CommentBlock;
use crate::lexer::{nesting_balance, tokenize, Token, TokenKind};
use crate::options::ExtractOptions;
use crate::transform::{
    default_export, import_statement, re_export, transform, Declaration,
};

/// Everything collected from one source file, in source order per group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub imports: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub exports: Vec<Declaration>,
    pub default_export: Option<Declaration>,
}

/// What an accumulated statement becomes once it is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Import,
    ReExport,
    Declaration(DeclKind),
}

/// Where an accumulated statement stands after its latest line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    /// Brackets are open or the text ends in an operator.
    Open,
    /// Balanced, but a type may still continue with a line starting with
    /// `|`, `&`, `?`, `:` or `=>`.
    Trailing,
    Complete,
}

/// A statement spanning several lines, collected until it is complete.
#[derive(Debug)]
struct Accumulator {
    target: Target,
    text: String,
    balance: i32,
    /// Whether a `{` has been seen; interfaces need one before they end.
    opened: bool,
}

impl Accumulator {
    fn new(target: Target, line: &str) -> Self {
        let mut acc = Self {
            target,
            text: String::new(),
            balance: 0,
            opened: false,
        };
        acc.measure(line);
        acc.text.push_str(line);
        acc
    }

    /// `<`/`>` are only brackets in type position.
    fn counts_angles(&self) -> bool {
        self.target == Target::Declaration(DeclKind::TypeAlias)
    }

    fn measure(&mut self, line: &str) {
        self.balance += nesting_balance(line, self.counts_angles());
        self.opened |= tokenize(line).iter().any(|t| t.kind == TokenKind::LBrace);
    }

    fn push(&mut self, raw: &str, counts_brackets: bool) {
        self.text.push('\n');
        self.text.push_str(raw.trim_end());
        if counts_brackets {
            self.measure(raw);
        }
    }

    fn progress(&self) -> Progress {
        if self.balance > 0 {
            return Progress::Open;
        }
        match self.target {
            Target::Declaration(DeclKind::Interface) if !self.opened => Progress::Open,
            Target::Declaration(DeclKind::Const) if ends_with_operator(&self.text) => {
                Progress::Open
            }
            Target::Declaration(DeclKind::TypeAlias) if ends_with_operator(&self.text) => {
                Progress::Open
            }
            Target::Declaration(DeclKind::TypeAlias) => Progress::Trailing,
            _ => Progress::Complete,
        }
    }
}

/// The last token of `text` leaves an expression or type unfinished.
fn ends_with_operator(text: &str) -> bool {
    let tokens = tokenize(text);
    let last = tokens.iter().rev().find(|t| t.kind != TokenKind::Eof);
    matches!(
        last.map(|t| &t.kind),
        Some(
            TokenKind::Eq
                | TokenKind::Pipe
                | TokenKind::Amp
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Comma
                | TokenKind::Arrow
        )
    ) || matches!(last, Some(Token { kind: TokenKind::Ident(word), .. }) if word == "extends")
}

/// `line` carries on a type from the previous line.
fn continues_type(line: &str) -> bool {
    match tokenize(line).first().map(|t| &t.kind) {
        Some(
            TokenKind::Pipe
            | TokenKind::Amp
            | TokenKind::Question
            | TokenKind::Colon
            | TokenKind::Arrow,
        ) => true,
        Some(TokenKind::Ident(word)) => word == "extends",
        _ => false,
    }
}

/// Scan state for a single extraction pass.
pub struct Scanner<'a> {
    options: &'a ExtractOptions,
    comments: CommentBlock,
    accumulator: Option<Accumulator>,
    out: Extraction,
}

impl<'a> Scanner<'a> {
    pub fn new(options: &'a ExtractOptions) -> Self {
        Self {
            options,
            comments: CommentBlock::new(),
            accumulator: None,
            out: Extraction::default(),
        }
    }

    /// Scan a whole source text.
    pub fn scan(options: &'a ExtractOptions, source: &str) -> Extraction {
        let mut scanner = Self::new(options);
        for (index, raw) in source.lines().enumerate() {
            scanner.feed(index, raw);
        }
        scanner.finish()
    }

    /// Process one physical line.
    pub fn feed(&mut self, index: usize, raw: &str) {
        let line = raw.trim();
        let class = classify(line);
        trace!(line = index + 1, ?class, text = line, "classified line");

        if let Some(acc) = &mut self.accumulator {
            match acc.progress() {
                // Every line inside an open statement is body text. Comments
                // stay with it so member docs survive, but are not measured.
                Progress::Open => {
                    let is_comment = matches!(class, LineClass::Comment { .. });
                    acc.push(raw, !is_comment);
                    self.settle();
                    return;
                }
                Progress::Trailing if continues_type(line) => {
                    acc.push(raw, true);
                    self.settle();
                    return;
                }
                Progress::Trailing | Progress::Complete => self.flush(),
            }
        }

        match class {
            LineClass::Comment { opens_block } => {
                if opens_block {
                    self.comments.open();
                }
                self.comments.push_line(raw.trim_end());
            }
            LineClass::Import => self.start(Target::Import, line),
            LineClass::DefaultExport => {
                let decl = default_export(line).with_comment(self.take_comment());
                if let Some(previous) = &self.out.default_export {
                    debug!(previous = %previous.text, "replacing earlier default export");
                }
                self.out.default_export = Some(decl);
            }
            LineClass::ReExport => self.start(Target::ReExport, line),
            LineClass::Export(kind) if kind.accumulates() => {
                self.start(Target::Declaration(kind), line)
            }
            LineClass::Export(kind) => self.emit(transform(kind, line)),
            LineClass::Other => {}
        }
    }

    /// Flush any unterminated statement and hand back the collected output.
    /// A comment block still pending at this point is dropped.
    pub fn finish(mut self) -> Extraction {
        if let Some(acc) = &self.accumulator {
            if acc.progress() == Progress::Open {
                debug!("input ended inside a declaration, flushing it as-is");
            }
            self.flush();
        }
        self.out
    }

    fn start(&mut self, target: Target, line: &str) {
        let acc = Accumulator::new(target, line);
        trace!(?target, balance = acc.balance, "accumulating");
        self.accumulator = Some(acc);
        self.settle();
    }

    /// Flush the accumulator once nothing more can belong to it.
    fn settle(&mut self) {
        if let Some(acc) = &self.accumulator {
            if acc.progress() == Progress::Complete {
                self.flush();
            }
        }
    }

    fn flush(&mut self) {
        if let Some(acc) = self.accumulator.take() {
            self.complete(acc);
        }
    }

    fn complete(&mut self, acc: Accumulator) {
        match acc.target {
            Target::Import => self.out.imports.push(import_statement(&acc.text)),
            Target::ReExport => {
                let decl = re_export(&acc.text).with_comment(self.take_comment());
                self.out.exports.push(decl);
            }
            Target::Declaration(kind) => self.emit(transform(kind, &acc.text)),
        }
    }

    fn emit(&mut self, decl: Declaration) {
        let comment = self.take_comment();
        debug!(kind = ?decl.kind, commented = comment.is_some(), "emitting declaration");
        self.out.declarations.push(decl.with_comment(comment));
    }

    /// The pending doc comment, consumed even when comments are not kept.
    fn take_comment(&mut self) -> Option<String> {
        self.comments.take().filter(|_| self.options.keep_comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::DeclarationKind;

    fn scan(source: &str) -> Extraction {
        Scanner::scan(&ExtractOptions::default(), source)
    }

    #[test]
    fn test_accumulator_flushes_when_balanced() {
        let out = scan("export const a = {\n  b: {\n    c: 1,\n  },\n}\nexport const d = 2");
        assert_eq!(out.declarations.len(), 2);
        assert_eq!(out.declarations[0].kind, DeclarationKind::Const);
        assert!(out.declarations[0].text.contains("c: 1;"));
        assert_eq!(out.declarations[1].text, "export declare const d: number;");
    }

    #[test]
    fn test_unterminated_declaration_is_flushed_at_end() {
        let out = scan("export const a = {\n  b: 'x',");
        assert_eq!(out.declarations.len(), 1);
        assert!(out.declarations[0].text.contains("b: 'x';"));
    }

    #[test]
    fn test_comment_attaches_to_next_declaration() {
        let out = scan("/**\n * Docs\n */\nexport type A = string");
        assert_eq!(
            out.declarations[0].comment.as_deref(),
            Some("/**\n * Docs\n */")
        );
    }

    #[test]
    fn test_new_block_drops_unattached_comment() {
        let out = scan("/** one */\nconst x = 1\n/** two */\nexport type A = string");
        assert_eq!(out.declarations[0].comment.as_deref(), Some("/** two */"));
    }

    #[test]
    fn test_trailing_comment_is_dropped() {
        let out = scan("export type A = string\n/** orphan */");
        assert_eq!(out.declarations.len(), 1);
        assert!(out.declarations[0].comment.is_none());
    }

    #[test]
    fn test_comments_disabled() {
        let options = ExtractOptions::default().with_comments(false);
        let out = Scanner::scan(&options, "/** doc */\nexport type A = string");
        assert!(out.declarations[0].comment.is_none());
    }

    #[test]
    fn test_last_default_export_wins() {
        let out = scan("export default one\nexport default two");
        assert_eq!(
            out.default_export.map(|d| d.text).as_deref(),
            Some("export default two;")
        );
    }

    #[test]
    fn test_multi_line_import_is_joined() {
        let out = scan("import {\n  type A,\n  type B,\n} from './types'");
        assert_eq!(
            out.imports,
            vec!["import type {\n  A,\n  B,\n} from './types'".to_string()]
        );
    }

    #[test]
    fn test_re_exports_are_grouped() {
        let out = scan("export { a, b }\nexport type A = string\nexport * from './x'");
        let exports: Vec<&str> = out.exports.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(exports, vec!["export { a, b }", "export * from './x'"]);
        assert_eq!(out.declarations.len(), 1);
    }

    #[test]
    fn test_function_body_is_skipped() {
        let out = scan(
            "export function run(): void {\n  if (x) {\n    export_it()\n  }\n}\nexport type B = 1",
        );
        assert_eq!(out.declarations.len(), 2);
        assert_eq!(out.declarations[0].text, "export declare function run(): void;");
    }

    #[test]
    fn test_member_comments_stay_in_interface() {
        let out = scan("/** User */\nexport interface User {\n  /** id */\n  id: number\n}");
        assert_eq!(out.declarations[0].comment.as_deref(), Some("/** User */"));
        assert_eq!(
            out.declarations[0].text,
            "export declare interface User {\n  /** id */\n  id: number\n}"
        );
    }

    #[test]
    fn test_members_named_import_stay_in_body() {
        let out = scan(
            "export const entry = {\n  import: './index.mjs',\n  require: './index.cjs',\n}\nexport interface Cond {\n  import: string\n}",
        );
        assert!(out.imports.is_empty());
        assert_eq!(
            out.declarations[0].text,
            "export declare const entry: { [key: string]: string } {\n  import: './index.mjs';\n  require: './index.cjs';\n};"
        );
        assert_eq!(
            out.declarations[1].text,
            "export declare interface Cond {\n  import: string\n}"
        );
    }

    #[test]
    fn test_every_line_inside_a_body_is_body_text() {
        let out = scan("export function run(): void {\n  import('./lazy')\n  export default x\n}");
        assert!(out.imports.is_empty());
        assert!(out.default_export.is_none());
        assert_eq!(out.declarations[0].text, "export declare function run(): void;");
    }

    #[test]
    fn test_multi_line_union() {
        let out = scan("export type Status =\n  | 'a'\n  | 'b'\nexport type Next = 1");
        assert_eq!(out.declarations.len(), 2);
        assert_eq!(
            out.declarations[0].text,
            "export declare type Status =\n  | 'a'\n  | 'b'"
        );
        assert_eq!(out.declarations[1].text, "export declare type Next = 1");
    }

    #[test]
    fn test_multi_line_conditional_type() {
        let out = scan("export type R<T> = T extends string\n  ? 'a'\n  : 'b'");
        assert_eq!(
            out.declarations[0].text,
            "export declare type R<T> = T extends string\n  ? 'a'\n  : 'b'"
        );
    }

    #[test]
    fn test_type_alias_ends_before_comment() {
        let out = scan("export type A = string\n/** B */\nexport type B = number");
        assert!(out.declarations[0].comment.is_none());
        assert_eq!(out.declarations[1].comment.as_deref(), Some("/** B */"));
    }

    #[test]
    fn test_multi_line_function_parameters() {
        let out = scan("export function f(\n  a: string,\n  b: number,\n): void {\n  return\n}");
        assert_eq!(out.declarations.len(), 1);
        assert_eq!(
            out.declarations[0].text,
            "export declare function f(\n  a: string,\n  b: number,\n): void;"
        );
    }

    #[test]
    fn test_interface_waits_for_its_body() {
        let out = scan("export interface Props\n  extends Base {\n  id: number\n}");
        assert_eq!(
            out.declarations[0].text,
            "export declare interface Props extends Base {\n  id: number\n}"
        );
    }

    #[test]
    fn test_comment_travels_with_re_export_and_default() {
        let out = scan(
            "/** re-exported */\nexport { a }\n/** entry */\nexport default main\nexport type B = 1",
        );
        assert_eq!(out.exports[0].comment.as_deref(), Some("/** re-exported */"));
        assert_eq!(
            out.default_export.and_then(|d| d.comment).as_deref(),
            Some("/** entry */")
        );
        assert!(out.declarations[0].comment.is_none());
    }

    #[test]
    fn test_regex_braces_do_not_open_a_body() {
        let out = scan("export const re = /\\{/g\nexport type A = 1");
        assert_eq!(out.declarations.len(), 2);
        assert_eq!(out.declarations[1].text, "export declare type A = 1");
    }
}
