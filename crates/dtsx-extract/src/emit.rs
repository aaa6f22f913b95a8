//! Output assembly and textual cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scanner::Extraction;
use crate::transform::Declaration;

static EMPTY_BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\s*\}").unwrap());
static SPACE_BEFORE_TERMINATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]+;(\s*(?:\}|$))").unwrap());
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());
static TERMINATOR_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r";\}").unwrap());
static OPEN_TERMINATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{;").unwrap());

/// Concatenate the collected groups and normalize the result.
///
/// Groups are separated by one blank line; empty groups leave no trace.
pub fn assemble(extraction: &Extraction) -> String {
    let mut groups = Vec::new();

    if !extraction.imports.is_empty() {
        groups.push(extraction.imports.join("\n"));
    }
    if !extraction.declarations.is_empty() {
        let declarations: Vec<String> = extraction.declarations.iter().map(render).collect();
        groups.push(declarations.join("\n"));
    }
    if !extraction.exports.is_empty() {
        let exports: Vec<String> = extraction.exports.iter().map(render).collect();
        groups.push(exports.join("\n"));
    }
    if let Some(default) = &extraction.default_export {
        groups.push(render(default));
    }

    clean(&groups.join("\n\n"))
}

fn render(decl: &Declaration) -> String {
    match &decl.comment {
        Some(comment) => format!("{comment}\n{}", decl.text),
        None => decl.text.clone(),
    }
}

/// Textual normalization, applied once. The order of the passes matters.
pub fn clean(output: &str) -> String {
    let out = EMPTY_BODY.replace_all(output, "{}");
    let out = SPACE_BEFORE_TERMINATOR.replace_all(&out, ";${1}");
    let out = BLANK_RUNS.replace_all(&out, "\n\n");
    let out = TERMINATOR_BRACE.replace_all(&out, ";\n}");
    let out = OPEN_TERMINATOR.replace_all(&out, "{");
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::DeclarationKind;

    #[test]
    fn test_empty_groups_leave_no_blank_lines() {
        let extraction = Extraction {
            declarations: vec![Declaration::new(
                DeclarationKind::Type,
                "export declare type A = string",
            )],
            ..Default::default()
        };
        assert_eq!(assemble(&extraction), "export declare type A = string");
    }

    #[test]
    fn test_group_order() {
        let extraction = Extraction {
            imports: vec!["import type { A } from './a'".into()],
            declarations: vec![Declaration::new(
                DeclarationKind::Function,
                "export declare function f(): A;",
            )
            .with_comment(Some("/** f */".into()))],
            exports: vec![Declaration::new(DeclarationKind::ReExport, "export * from './b'")],
            default_export: Some(
                Declaration::new(DeclarationKind::Default, "export default f;")
                    .with_comment(Some("/** entry */".into())),
            ),
        };
        assert_eq!(
            assemble(&extraction),
            "import type { A } from './a'\n\n/** f */\nexport declare function f(): A;\n\nexport * from './b'\n\n/** entry */\nexport default f;"
        );
    }

    #[test]
    fn test_clean_collapses_empty_bodies() {
        assert_eq!(
            clean("export declare interface A {\n\n}"),
            "export declare interface A {}"
        );
    }

    #[test]
    fn test_clean_whitespace_before_terminator() {
        assert_eq!(clean("  a: 1 ;\n}"), "a: 1;\n}");
        assert_eq!(clean("x = 1 ;"), "x = 1;");
        assert_eq!(clean("f(a ; b)"), "f(a ; b)");
    }

    #[test]
    fn test_clean_collapses_blank_runs() {
        assert_eq!(clean("a\n\n\n\nb\n \n\t\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_clean_splits_terminator_brace() {
        assert_eq!(clean("{ a: 1;}"), "{ a: 1;\n}");
        assert_eq!(clean("export default function main() {;"), "export default function main() {");
    }
}
