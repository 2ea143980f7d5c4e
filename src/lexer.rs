//! Tokenizer for the pbxproj plist dialect.
//!
//! Built on a logos token enum. Comments and whitespace are produced as
//! trivia tokens so diagnostics can see them; the parser skips them. Every
//! token carries its byte offset, and [`LineIndex`] converts offsets into
//! 1-based line/column pairs for error reports.

use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Diagnostic, Error, Result};

/// Strings the writer may emit unquoted. Narrower than the `Word` token
/// class: Xcode reads unquoted colons and hyphens but always quotes them on
/// output (`"com.apple.product-type.application"`).
static WRITE_UNQUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_$./]+$").unwrap());

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[regex(r"[ \t\r\n]+", priority = 10)]
    Whitespace,

    #[regex(r"//[^\n]*", priority = 10)]
    LineComment,

    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", priority = 10)]
    BlockComment,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Quoted,

    #[regex(r"[A-Za-z0-9_$/:.\-]+", priority = 2)]
    Word,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Equals,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl TokenKind {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// Human-readable name used in expected-token sets.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LineComment | TokenKind::BlockComment => "comment",
            TokenKind::Quoted | TokenKind::Word => "string",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Equals => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
        }
    }
}

/// A token with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub offset: usize,
}

/// Tokenize the whole input, trivia included. Fails with [`Error::Lex`] on
/// the first illegal character or unterminated quoted string.
pub fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    let index = LineIndex::new(input);
    let mut lexer = TokenKind::lexer(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                text: lexer.slice(),
                offset: span.start,
            }),
            Err(()) => {
                let (line, column) = index.line_col(span.start);
                let rest = &input[span.start..];
                let (found, message) = if rest.starts_with('"') {
                    (
                        "unterminated quoted string".to_string(),
                        "unterminated quoted string".to_string(),
                    )
                } else {
                    let c = rest.chars().next().unwrap_or('\0');
                    (
                        format!("character {c:?}"),
                        format!("illegal character {c:?}"),
                    )
                };
                return Err(Error::Lex(Diagnostic {
                    line,
                    column,
                    width: 1,
                    found,
                    expected: Vec::new(),
                    message,
                }));
            }
        }
    }

    Ok(tokens)
}

/// True if `s` must be quoted when written out: empty strings and anything
/// outside the unquoted character class.
pub fn needs_quoting(s: &str) -> bool {
    s.is_empty() || !WRITE_UNQUOTED.is_match(s)
}

/// Render a string in its canonical written form, quoting and escaping only
/// when required.
pub fn quote(s: &str) -> String {
    if !needs_quoting(s) {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Undo the dialect's escapes in the body of a quoted string (without the
/// surrounding quotes).
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(d @ '0'..='7') => {
                let mut value = d as u32 - '0' as u32;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&o @ '0'..='7') => {
                            value = value * 8 + (o as u32 - '0' as u32);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or('\u{fffd}'));
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// The text content of a token: quoted strings are unescaped, words pass
/// through.
pub fn token_string(token: &Token<'_>) -> String {
    match token.kind {
        TokenKind::Quoted => unescape(&token.text[1..token.text.len() - 1]),
        _ => token.text.to_string(),
    }
}

/// Maps byte offsets to 1-based line/column pairs and exposes line text for
/// caret reports.
pub struct LineIndex<'a> {
    input: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut starts = vec![0];
        for (i, b) in input.bytes().enumerate() {
            if b == b'\n' {
                starts.push(i + 1);
            }
        }
        Self { input, starts }
    }

    /// 1-based (line, column) of a byte offset; columns count characters.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = self.input[self.starts[line]..offset].chars().count() + 1;
        (line + 1, column)
    }

    /// The text of a 1-based line, without its newline. Lines outside the
    /// input (a diagnostic can outlive the bytes it was produced from) are
    /// empty rather than a panic.
    pub fn line_text(&self, line: usize) -> &'a str {
        if line == 0 || line > self.starts.len() {
            return "";
        }
        let start = self.starts[line - 1];
        let end = self
            .starts
            .get(line)
            .map(|&s| s - 1)
            .unwrap_or(self.input.len());
        self.input[start..end].trim_end_matches('\r')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| !k.is_trivia())
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("{ key = (1, 2); }"),
            vec![
                TokenKind::LBrace,
                TokenKind::Word,
                TokenKind::Equals,
                TokenKind::LParen,
                TokenKind::Word,
                TokenKind::Comma,
                TokenKind::Word,
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_comments_are_trivia() {
        let tokens = tokenize("// !$*UTF8*$!\n{ /* hi */ }").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[0].text, "// !$*UTF8*$!");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::BlockComment));
        assert_eq!(kinds("// x\n{ /* y */ }"), vec![TokenKind::LBrace, TokenKind::RBrace]);
    }

    #[test]
    fn test_write_quoting_class() {
        assert!(!needs_quoting("sourcecode.c.objc"));
        assert!(!needs_quoting("System/Library/Frameworks/Cocoa.framework"));
        assert!(!needs_quoting("$_/."));
        assert!(needs_quoting(""));
        assert!(needs_quoting("two words"));
        assert!(needs_quoting("<group>"));
        assert!(needs_quoting("$(TARGET_NAME)"));
        // Hyphens lex unquoted but are always quoted on output.
        assert!(needs_quoting("com.apple.product-type.application"));
        assert!(needs_quoting("emoji🍏"));
    }

    #[test]
    fn test_hyphen_words_lex_unquoted() {
        let tokens = tokenize("{ productType = com.apple.product-type.application; }").unwrap();
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Word
                && t.text == "com.apple.product-type.application"));
    }

    #[test]
    fn test_quote_roundtrip() {
        for s in ["", "a b", "say \"hi\"", "tab\there", "line\nbreak", "back\\slash"] {
            let quoted = quote(s);
            assert!(quoted.starts_with('"') && quoted.ends_with('"'));
            assert_eq!(unescape(&quoted[1..quoted.len() - 1]), s);
        }
        assert_eq!(quote("plain"), "plain");
        assert_eq!(quote("\u{1}"), "\"\\001\"");
    }

    #[test]
    fn test_octal_unescape() {
        assert_eq!(unescape("a\\011b"), "a\tb");
        assert_eq!(unescape("\\0601"), "01"); // stops after three digits
    }

    #[test]
    fn test_illegal_character() {
        let err = tokenize("{ name = 🍏; }").unwrap_err();
        let diag = err.diagnostic().unwrap().clone();
        assert_eq!(diag.line, 1);
        assert_eq!(diag.column, 10);
        assert!(diag.message.contains("illegal character"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("{ name = \"oops; }").unwrap_err();
        assert!(err
            .diagnostic()
            .unwrap()
            .message
            .contains("unterminated"));
    }

    #[test]
    fn test_line_index() {
        let index = LineIndex::new("ab\ncdef\ng");
        assert_eq!(index.line_col(0), (1, 1));
        assert_eq!(index.line_col(4), (2, 2));
        assert_eq!(index.line_col(8), (3, 1));
        assert_eq!(index.line_text(2), "cdef");
    }

    #[test]
    fn test_line_text_out_of_range() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.line_text(0), "");
        assert_eq!(index.line_text(3), "");
        assert_eq!(LineIndex::new("").line_text(4), "");
    }
}
