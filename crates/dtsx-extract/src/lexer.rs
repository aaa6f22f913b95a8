//! Lexer for TypeScript source text.
//!
//! The extractor never builds a syntax tree. It only needs to find markers
//! (`export`, `const`, `interface`, `{`, `:`, `=` ...) by their structural
//! position, so string literals, template literals and comments are consumed
//! as opaque spans and never produce tokens from their contents.

use std::iter::Peekable;
use std::str::CharIndices;

/// Token kinds recognised by the extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers and literals
    Ident(String),
    StringLiteral,
    TemplateLiteral,
    RegexLiteral,
    NumberLiteral(String),

    // Keywords
    Export,
    Import,
    Default,
    Declare,
    Const,
    Let,
    Var,
    Interface,
    Type,
    Function,
    Async,
    Class,
    Enum,
    True_,
    False_,

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    LAngle,    // <
    RAngle,    // >
    Comma,     // ,
    Semicolon, // ;
    Colon,     // :
    Dot,       // .
    DotDotDot, // ...
    Question,  // ?
    Pipe,      // |
    Amp,       // &
    Arrow,     // =>
    Eq,        // =
    Star,      // *

    Eof,
}

impl TokenKind {
    /// Net change in nesting depth contributed by this token.
    pub fn depth_delta(&self) -> i32 {
        match self {
            TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket | TokenKind::LAngle => 1,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket | TokenKind::RAngle => -1,
            _ => 0,
        }
    }

    /// Whether a `/` right after this token starts a regex literal rather
    /// than a division.
    fn precedes_expression(&self) -> bool {
        match self {
            TokenKind::Ident(name) => matches!(
                name.as_str(),
                "return" | "typeof" | "in" | "of" | "case" | "throw" | "yield" | "await"
            ),
            TokenKind::StringLiteral
            | TokenKind::TemplateLiteral
            | TokenKind::RegexLiteral
            | TokenKind::NumberLiteral(_)
            | TokenKind::True_
            | TokenKind::False_
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::RAngle => false,
            _ => true,
        }
    }
}

/// A token with its kind and byte range in the lexed text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }
}

/// Lexer over a line or a whole declaration.
pub struct Lexer<'src> {
    chars: Peekable<CharIndices<'src>>,
    pos: usize,
    regex_allowed: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(src: &'src str) -> Self {
        Self {
            chars: src.char_indices().peekable(),
            pos: 0,
            regex_allowed: true,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.pos = pos + ch.len_utf8();
            Some(ch)
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) {
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
                None => break,
                _ => {}
            }
        }
    }

    /// Consume a quoted string. An unterminated string runs to the end of the line.
    fn skip_string(&mut self, quote: char) {
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('\n') | None => break,
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
    }

    /// Consume a template literal, including any `${ ... }` substitutions.
    fn skip_template(&mut self) {
        let mut substitution_depth = 0usize;
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('$') if substitution_depth == 0 && self.peek() == Some('{') => {
                    self.advance();
                    substitution_depth = 1;
                }
                Some('{') if substitution_depth > 0 => substitution_depth += 1,
                Some('}') if substitution_depth > 0 => substitution_depth -= 1,
                Some('`') if substitution_depth == 0 => break,
                Some(_) => {}
                None => break,
            }
        }
    }

    /// Consume a regex literal body and its flags. Slashes inside a
    /// character class do not end it; neither does anything past the line.
    fn skip_regex(&mut self) {
        let mut in_class = false;
        loop {
            match self.advance() {
                Some('\\') => {
                    self.advance();
                }
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('/') if !in_class => break,
                Some('\n') | None => return,
                Some(_) => {}
            }
        }
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self, first: char) -> String {
        let mut s = String::new();
        s.push(first);
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' {
                s.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::new();
        s.push(first);
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                s.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn keyword_or_ident(&self, s: &str) -> TokenKind {
        match s {
            "export" => TokenKind::Export,
            "import" => TokenKind::Import,
            "default" => TokenKind::Default,
            "declare" => TokenKind::Declare,
            "const" => TokenKind::Const,
            "let" => TokenKind::Let,
            "var" => TokenKind::Var,
            "interface" => TokenKind::Interface,
            "type" => TokenKind::Type,
            "function" => TokenKind::Function,
            "async" => TokenKind::Async,
            "class" => TokenKind::Class,
            "enum" => TokenKind::Enum,
            "true" => TokenKind::True_,
            "false" => TokenKind::False_,
            _ => TokenKind::Ident(s.to_string()),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let start = self.pos;

            let ch = match self.advance() {
                Some(c) => c,
                None => return Token::new(TokenKind::Eof, start, start),
            };

            let kind = match ch {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '<' => TokenKind::LAngle,
                '>' => TokenKind::RAngle,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                ':' => TokenKind::Colon,
                '?' => TokenKind::Question,
                '|' => TokenKind::Pipe,
                '&' => TokenKind::Amp,
                '*' => TokenKind::Star,
                '.' => {
                    if self.peek() == Some('.') {
                        self.advance();
                        if self.peek() == Some('.') {
                            self.advance();
                            TokenKind::DotDotDot
                        } else {
                            TokenKind::Dot
                        }
                    } else {
                        TokenKind::Dot
                    }
                }
                '=' => {
                    if self.peek() == Some('>') {
                        self.advance();
                        TokenKind::Arrow
                    } else {
                        TokenKind::Eq
                    }
                }
                '/' => {
                    if self.peek() == Some('/') {
                        self.skip_line_comment();
                        continue;
                    } else if self.peek() == Some('*') {
                        self.advance();
                        self.skip_block_comment();
                        continue;
                    } else if self.regex_allowed {
                        self.skip_regex();
                        TokenKind::RegexLiteral
                    } else {
                        continue;
                    }
                }
                '"' | '\'' => {
                    self.skip_string(ch);
                    TokenKind::StringLiteral
                }
                '`' => {
                    self.skip_template();
                    TokenKind::TemplateLiteral
                }
                c if c.is_ascii_digit() => {
                    let n = self.read_number(c);
                    TokenKind::NumberLiteral(n)
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    let ident = self.read_ident(c);
                    self.keyword_or_ident(&ident)
                }
                _ => {
                    // Skip unknown characters
                    continue;
                }
            };

            self.regex_allowed = kind.precedes_expression();
            return Token::new(kind, start, self.pos);
        }
    }

    /// Collect all tokens into a vector.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Tokenize `src`, including the trailing `Eof` token.
pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize()
}

/// Net nesting of `{`, `[` and `(` outside literals and comments, counting
/// `<`/`>` as well when `angles` is set.
pub fn nesting_balance(src: &str, angles: bool) -> i32 {
    tokenize(src)
        .iter()
        .map(|t| match t.kind {
            TokenKind::LAngle | TokenKind::RAngle if !angles => 0,
            ref kind => kind.depth_delta(),
        })
        .sum()
}

/// `src` up to the end of its last token, dropping a trailing comment.
pub fn strip_trailing_comment(src: &str) -> &str {
    tokenize(src)
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Eof)
        .map(|t| &src[..t.end])
        .unwrap_or(src)
}

/// Index of the first depth-0 token at or after `from` matching `pred`.
///
/// Depth counts every bracket pair, including `<`/`>`, so this is only
/// meaningful over type positions and declaration headers.
pub fn find_top_level(
    tokens: &[Token],
    from: usize,
    pred: impl Fn(&TokenKind) -> bool,
) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, token) in tokens.iter().enumerate().skip(from) {
        if depth == 0 && pred(&token.kind) {
            return Some(idx);
        }
        depth += token.kind.depth_delta();
    }
    None
}

/// Index of the token closing the bracket opened at `open`.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        depth += token.kind.depth_delta();
        if depth == 0 {
            return Some(idx);
        }
    }
    None
}
