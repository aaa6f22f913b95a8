//! Rewriting of complete declarations into their declaration-only form.
//!
//! Every rewriter takes the full text of one declaration (all of its lines)
//! and returns `None` when the text does not have the expected shape, in
//! which case the caller passes the text through unchanged.

use tracing::trace;

use crate::classify::DeclKind;
use crate::infer::{classify_value, infer_index_signature, is_comment_line, Property};
use crate::lexer::{
    find_top_level, matching_close, nesting_balance, strip_trailing_comment, tokenize, Token,
    TokenKind,
};

/// The kind of a transformed declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Const,
    Interface,
    Type,
    Function,
    Default,
    ReExport,
    Passthrough,
}

/// A declaration ready to be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// Doc comment emitted immediately before the declaration.
    pub comment: Option<String>,
    pub text: String,
}

impl Declaration {
    pub fn new(kind: DeclarationKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            comment: None,
            text: text.into(),
        }
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }
}

/// Dispatch a declaration to the rewriter for its kind.
pub fn transform(kind: DeclKind, text: &str) -> Declaration {
    let rewritten = match kind {
        DeclKind::Const => const_declaration(text).map(|t| (DeclarationKind::Const, t)),
        DeclKind::Interface => {
            interface_declaration(text).map(|t| (DeclarationKind::Interface, t))
        }
        DeclKind::TypeAlias => type_declaration(text).map(|t| (DeclarationKind::Type, t)),
        DeclKind::Function => function_declaration(text).map(|t| (DeclarationKind::Function, t)),
        DeclKind::Other => None,
    };

    let (kind, text) =
        rewritten.unwrap_or_else(|| (DeclarationKind::Passthrough, text.trim().to_string()));
    trace!(?kind, %text, "transformed declaration");
    Declaration::new(kind, text)
}

/// `export const name = { ... }` into `export declare const name: <type> { ... };`
///
/// Object literals keep their body next to the type, one `key: value;` per
/// line. Any other initializer becomes `export declare const name: <type>;`.
pub fn const_declaration(text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.first()?.trim();
    let tokens = tokenize(first);

    let keyword = tokens.iter().position(|t| t.kind == TokenKind::Const)?;
    let name = match tokens.get(keyword + 1).map(|t| &t.kind) {
        Some(TokenKind::Ident(name)) => name.as_str(),
        _ => return None,
    };

    let after_name = keyword + 2;
    let stop = find_top_level(&tokens, after_name, |k| {
        matches!(k, TokenKind::Eq | TokenKind::Semicolon | TokenKind::Eof)
    })
    .unwrap_or(tokens.len() - 1);

    let annotation = match tokens.get(after_name) {
        Some(colon) if colon.kind == TokenKind::Colon && after_name < stop => {
            Some(first[colon.end..tokens[stop].start].trim())
        }
        _ => None,
    };

    if tokens[stop].kind != TokenKind::Eq {
        // Already in declaration form; nothing to strip.
        return Some(ensure_declare(text));
    }

    let init = &tokens[stop + 1];
    if init.kind != TokenKind::LBrace {
        // `export const x =` with the value on the following lines.
        let value = if init.kind == TokenKind::Eof {
            lines[1..].iter().map(|l| l.trim()).collect::<Vec<_>>().join(" ")
        } else {
            first[init.start..].trim().to_string()
        };
        let value = value.trim_end_matches(';');
        let ty = match annotation {
            Some(ty) => ty.to_string(),
            None => arrow_signature(value)
                .unwrap_or_else(|| classify_value(value).keyword().to_string()),
        };
        return Some(format!("export declare const {name}: {ty};"));
    }

    // Object literal, either inline or spread over the following lines.
    let inline: Vec<&str>;
    let body: &[&str] = match matching_close(&tokens, stop + 1) {
        Some(close) => {
            inline = split_top_level(&first[init.end..tokens[close].start]);
            &inline
        }
        None => interior(&lines),
    };

    let ty = match annotation {
        Some(ty) => ty.to_string(),
        None => infer_index_signature(body.iter().copied()),
    };
    let properties = object_members(body);

    Some(format!(
        "export declare const {name}: {ty} {{\n{properties}\n}};"
    ))
}

/// `export interface Name { ... }` into `export declare interface Name { ... }`.
///
/// The header may span several lines; it is joined onto one.
pub fn interface_declaration(text: &str) -> Option<String> {
    let text = text.trim();
    let tokens = tokenize(text);

    let keyword = tokens.iter().position(|t| t.kind == TokenKind::Interface)?;
    let open = find_top_level(&tokens, keyword + 1, |k| *k == TokenKind::LBrace)?;
    let header = text[tokens[keyword].end..tokens[open].start]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if header.is_empty() {
        return None;
    }

    if let Some(close) = matching_close(&tokens, open) {
        let members = &text[tokens[open].end..tokens[close].start];
        if !members.contains('\n') {
            let members = members.trim();
            return Some(if members.is_empty() {
                format!("export declare interface {header} {{}}")
            } else {
                format!("export declare interface {header} {{ {members} }}")
            });
        }
    }

    // The first of these lines is whatever follows `{` on its own line.
    let lines: Vec<&str> = text[tokens[open].end..].lines().collect();
    let body = rebase(interior(&lines))
        .into_iter()
        .map(|(indent, line)| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("export declare interface {header} {{\n{body}\n}}"))
}

/// `export type X = ...` into `export declare type X = ...`; the right-hand
/// side is never inspected.
pub fn type_declaration(text: &str) -> Option<String> {
    let text = text.trim();
    let tokens = tokenize(text);
    match tokens.as_slice() {
        [export, declare, ty, ..]
            if export.kind == TokenKind::Export
                && declare.kind == TokenKind::Declare
                && ty.kind == TokenKind::Type =>
        {
            Some(text.to_string())
        }
        [export, ty, ..] if export.kind == TokenKind::Export && ty.kind == TokenKind::Type => {
            Some(format!("export declare {}", &text[ty.start..]))
        }
        _ => None,
    }
}

/// Keep the signature of a function and drop its body.
///
/// `async` is dropped as well: it is not allowed in an ambient context and
/// the return type already says `Promise<..>`.
pub fn function_declaration(text: &str) -> Option<String> {
    let text = text.trim();
    let tokens = tokenize(text);
    let keyword = tokens.iter().position(|t| t.kind == TokenKind::Function)?;

    let end = find_body_brace(&tokens, keyword + 1)
        .map(|idx| tokens[idx].start)
        .unwrap_or(text.len());
    let signature = text[tokens[keyword].start..end]
        .trim()
        .trim_end_matches(';')
        .trim_end();
    Some(format!("export declare {signature};"))
}

/// An `export { .. }`, `export type { .. }` or `export * ..` statement, kept as written.
pub fn re_export(text: &str) -> Declaration {
    Declaration::new(DeclarationKind::ReExport, text.trim())
}

/// The captured `export default ...` line, terminated.
pub fn default_export(line: &str) -> Declaration {
    let line = line.trim();
    let text = if line.ends_with(';') {
        line.to_string()
    } else {
        format!("{line};")
    };
    Declaration::new(DeclarationKind::Default, text)
}

/// Hoist an import whose named specifiers are all `type`-tagged into an
/// `import type` statement. Anything else is returned as written.
pub fn import_statement(text: &str) -> String {
    let text = text.trim();
    let tokens = tokenize(text);
    if tokens.get(1).map(|t| &t.kind) != Some(&TokenKind::LBrace) {
        return text.to_string();
    }
    let Some(close) = matching_close(&tokens, 1) else {
        return text.to_string();
    };

    let mut specifiers = 0;
    let mut type_keywords = Vec::new();
    let mut idx = 2;
    while idx < close {
        let end = (idx..close)
            .find(|&i| tokens[i].kind == TokenKind::Comma)
            .unwrap_or(close);
        if end > idx {
            specifiers += 1;
            if tokens[idx].kind == TokenKind::Type && idx + 1 < end {
                type_keywords.push(idx);
            }
        }
        idx = end + 1;
    }

    if specifiers == 0 || type_keywords.len() != specifiers {
        return text.to_string();
    }

    let mut out = String::from("import type");
    let mut cursor = tokens[0].end;
    for idx in type_keywords {
        out.push_str(&text[cursor..tokens[idx].start]);
        cursor = tokens[idx + 1].start;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Find the `{` that opens a function body, skipping object type literals
/// in parameter and return type positions.
fn find_body_brace(tokens: &[Token], from: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut expect_type = false;
    let mut idx = from;
    while idx < tokens.len() {
        let kind = &tokens[idx].kind;
        if depth == 0 {
            match kind {
                TokenKind::LBrace if expect_type => {
                    idx = matching_close(tokens, idx)? + 1;
                    expect_type = false;
                    continue;
                }
                TokenKind::LBrace => return Some(idx),
                TokenKind::Semicolon | TokenKind::Eof => return None,
                TokenKind::Colon
                | TokenKind::Pipe
                | TokenKind::Amp
                | TokenKind::Arrow
                | TokenKind::Question => expect_type = true,
                _ => expect_type = false,
            }
        }
        depth += kind.depth_delta();
        idx += 1;
    }
    None
}

/// The lines strictly inside a multi-line body: everything after the
/// opening line, minus the closing line when it starts with `}`.
fn interior<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
    let body = lines.get(1..).unwrap_or(&[]);
    match body.last() {
        Some(last) if last.trim_start().starts_with('}') => &body[..body.len() - 1],
        _ => body,
    }
}

/// Re-indent non-blank lines to two spaces, keeping relative nesting.
fn rebase<'a>(lines: &[&'a str]) -> Vec<(String, &'a str)> {
    let indent_of = |line: &str| line.len() - line.trim_start().len();
    let base = lines
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .map(indent_of)
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .copied()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let extra = indent_of(l).saturating_sub(base);
            (format!("  {}", " ".repeat(extra)), l.trim())
        })
        .collect()
}

/// Rewrite the lines of an object literal body, one member per line.
///
/// Methods and arrow-valued properties collapse to their signature and the
/// lines of their bodies are dropped.
fn object_members(body: &[&str]) -> String {
    let mut out = Vec::new();
    let mut lines = rebase(body).into_iter();
    while let Some((indent, line)) = lines.next() {
        let Some(signature) = callable_member(line) else {
            out.push(format!("{indent}{}", property_line(line)));
            continue;
        };
        out.push(format!("{indent}{signature}"));

        let mut depth = nesting_balance(line, false);
        while depth > 0 {
            match lines.next() {
                Some((_, inner)) if is_comment_line(inner) => {}
                Some((_, inner)) => depth += nesting_balance(inner, false),
                None => break,
            }
        }
    }
    out.join("\n")
}

/// `run(x: number): void {` as `run(x: number): void;`, and
/// `key: (x: number) => {` as `key: (x: number) => unknown;`.
fn callable_member(line: &str) -> Option<String> {
    if is_comment_line(line) {
        return None;
    }
    let line = strip_trailing_comment(line);
    let tokens = tokenize(line);

    let start = match tokens.as_slice() {
        [first, second, ..]
            if first.kind == TokenKind::Async
                && !matches!(second.kind, TokenKind::LParen | TokenKind::Colon) =>
        {
            1
        }
        _ => 0,
    };
    if let [name, next, ..] = &tokens[start..] {
        if matches!(name.kind, TokenKind::Ident(_))
            && matches!(next.kind, TokenKind::LParen | TokenKind::LAngle)
        {
            let body = find_body_brace(&tokens, start + 1)?;
            return Some(format!("{};", line[name.start..tokens[body].start].trim_end()));
        }
    }

    let prop = Property::split(line)?;
    let signature = arrow_signature(prop.value.trim_end_matches(','))?;
    Some(format!("{}: {signature};", prop.key))
}

/// The function type of an arrow function expression, with `unknown` as the
/// return type unless one is annotated.
fn arrow_signature(value: &str) -> Option<String> {
    let tokens = tokenize(value);
    let arrow = find_top_level(&tokens, 0, |k| *k == TokenKind::Arrow)?;
    let first = match tokens.first()?.kind {
        TokenKind::Async => 1,
        _ => 0,
    };

    match &tokens[first].kind {
        TokenKind::LParen => {
            let close = matching_close(&tokens, first)?;
            let params = &value[tokens[first].start..tokens[close].end];
            let ret = match tokens.get(close + 1) {
                Some(colon) if colon.kind == TokenKind::Colon && close + 1 < arrow => {
                    value[colon.end..tokens[arrow].start].trim()
                }
                _ => "unknown",
            };
            Some(format!("{params} => {ret}"))
        }
        TokenKind::Ident(param) if first + 1 == arrow => Some(format!("({param}) => unknown")),
        _ => None,
    }
}

/// Rewrite one object-literal line as `key: value;`.
fn property_line(line: &str) -> String {
    if is_comment_line(line) {
        return line.to_string();
    }
    let line = strip_trailing_comment(line);
    match Property::split(line) {
        Some(prop) => format!("{}: {}", prop.key, terminate(prop.value)),
        None => terminate(line),
    }
}

/// Normalize a trailing comma to `;`, and terminate lines that are not
/// opening a nested block.
fn terminate(value: &str) -> String {
    let value = value.trim_end();
    if let Some(stripped) = value.strip_suffix(',') {
        format!("{};", stripped.trim_end())
    } else if value.is_empty() || value.ends_with([';', '{', '[', '(']) {
        value.to_string()
    } else {
        format!("{value};")
    }
}

/// Split `a: 1, b: { c: 2 }` at its top-level commas.
fn split_top_level(src: &str) -> Vec<&str> {
    let tokens = tokenize(src);
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for token in &tokens {
        if depth == 0 && token.kind == TokenKind::Comma {
            parts.push(src[start..token.start].trim());
            start = token.end;
        }
        depth += token.kind.depth_delta();
    }
    parts.push(src[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn ensure_declare(text: &str) -> String {
    let text = text.trim();
    let tokens = tokenize(text);
    match tokens.as_slice() {
        [export, declare, ..]
            if export.kind == TokenKind::Export && declare.kind == TokenKind::Declare =>
        {
            text.to_string()
        }
        [export, rest, ..] if export.kind == TokenKind::Export => {
            format!("export declare {}", &text[rest.start..])
        }
        _ => text.to_string(),
    }
}
