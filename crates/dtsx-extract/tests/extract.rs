use std::fs;
use std::path::Path;

use dtsx_extract::{extract, generate_dts, ExtractOptions};

fn generate(source: &str) -> String {
    generate_dts(source, &ExtractOptions::default())
}

fn fixture(name: &str) -> (String, String) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let input = fs::read_to_string(root.join("input").join(format!("{name}.ts"))).unwrap();
    let output = fs::read_to_string(root.join("output").join(format!("{name}.d.ts"))).unwrap();
    (input, output)
}

#[test]
fn test_fixture_example_0001() {
    let (input, expected) = fixture("example-0001");
    assert_eq!(generate(&input), expected.trim_end());
}

#[test]
fn test_fixture_multi_line_shapes() {
    let (input, expected) = fixture("example-0003");
    assert_eq!(generate(&input), expected.trim_end());
}

#[test]
fn test_fixture_declared_input_round_trips() {
    let (input, expected) = fixture("example-0002");
    assert_eq!(generate(&input), expected.trim_end());
    assert_eq!(generate(&expected), expected.trim_end());
}

#[test]
fn test_object_literal_const() {
    assert_eq!(
        generate("export const conf = {\n  key: 'value',\n}"),
        "export declare const conf: { [key: string]: string } {\n  key: 'value';\n};"
    );
}

#[test]
fn test_interface_with_comment() {
    assert_eq!(
        generate("/**\n * A user\n */\nexport interface User {\n  id: number\n}"),
        "/**\n * A user\n */\nexport declare interface User {\n  id: number\n}"
    );
}

#[test]
fn test_groups_and_default_export() {
    let source = "\
import { type Foo } from './foo'
export default main
export function main(): Foo {
  return {}
}
";
    assert_eq!(
        generate(source),
        "import type { Foo } from './foo'\n\nexport declare function main(): Foo;\n\nexport default main;"
    );
}

#[test]
fn test_declaration_order_is_preserved() {
    let source = "\
export type A = string
export const b = 1
export interface C {}
export function d(): void {}
";
    assert_eq!(
        generate(source),
        "export declare type A = string\n\
         export declare const b: number;\n\
         export declare interface C {}\n\
         export declare function d(): void;"
    );
}

#[test]
fn test_non_exported_code_is_dropped() {
    let source = "\
const secret = 'x'
function helper() {
  return secret
}
export type Visible = true
";
    assert_eq!(generate(source), "export declare type Visible = true");
}

#[test]
fn test_multi_line_type_alias_is_kept_whole() {
    let source = "\
export type Shape = {
  kind: 'circle'
  radius: number
}
";
    assert_eq!(
        generate(source),
        "export declare type Shape = {\n  kind: 'circle'\n  radius: number\n}"
    );
}

#[test]
fn test_nested_object_keeps_indentation() {
    let source = "\
export const config = {
  server: {
    port: 8080,
  },
  name: 'app',
}
";
    assert_eq!(
        generate(source),
        "export declare const config: { [key: string]: any } {\n  server: {\n    port: 8080;\n  };\n  name: 'app';\n};"
    );
}

#[test]
fn test_strings_with_braces_do_not_confuse_depth() {
    let source = "\
export const messages = {
  open: '{',
  close: `}`,
}
export type After = 1
";
    assert_eq!(
        generate(source),
        "export declare const messages: { [key: string]: string } {\n  open: '{';\n  close: `}`;\n};\nexport declare type After = 1"
    );
}

#[test]
fn test_comments_can_be_disabled() {
    let options = ExtractOptions::default().with_comments(false);
    assert_eq!(
        generate_dts("/** doc */\nexport type A = string", &options),
        "export declare type A = string"
    );
}

#[test]
fn test_empty_source() {
    assert_eq!(generate(""), "");
    assert_eq!(generate("// nothing exported\nconst x = 1\n"), "");
}

#[test]
fn test_extract_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.ts");
    fs::write(&path, "export const enabled = true\n").unwrap();
    assert_eq!(
        extract(&path, &ExtractOptions::default()).unwrap(),
        "export declare const enabled: boolean;"
    );
}

#[test]
fn test_overloads_stay_separate() {
    let source = "\
export function pick(a: string): string
export function pick(a: number): number
";
    assert_eq!(
        generate(source),
        "export declare function pick(a: string): string;\nexport declare function pick(a: number): number;"
    );
}

#[test]
fn test_trailing_comment_block_produces_nothing() {
    assert_eq!(generate("export type A = 1\n/**\n * dangling\n */\n"), "export declare type A = 1");
}
