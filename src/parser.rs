//! Recursive-descent parser for the pbxproj plist dialect, plus the
//! auto-detecting `parse` entry point shared by all input formats.
//!
//! The grammar is small:
//!
//! ```text
//! dict  := '{' (key '=' value ';')* '}'
//! array := '(' (value ',')* ')'          // trailing comma optional
//! value := dict | array | string
//! ```
//!
//! Top-level input must be a single dict. Failures are structured
//! [`Diagnostic`] values naming the unexpected token, its position and the
//! tokens that would have been accepted; the parser never panics on input.

use tracing::debug;

use crate::bridge;
use crate::error::{Diagnostic, Error, Result};
use crate::format::{detect_format, Format};
use crate::lexer::{self, LineIndex, Token, TokenKind};
use crate::plist::{Dict, Value};

/// Nesting depth cap; honest project files stay in single digits.
const MAX_DEPTH: usize = 100;

/// Per-attempt metadata returned next to the (possibly absent) tree.
#[derive(Debug)]
pub struct ParseInfo {
    /// The format the input was read as (or assumed to be when parsing failed).
    pub format: Format,
    /// The failure, when no tree was produced.
    pub error: Option<Error>,
}

impl ParseInfo {
    fn ok(format: Format) -> Self {
        ParseInfo {
            format,
            error: None,
        }
    }

    fn failed(format: Format, error: Error) -> Self {
        ParseInfo {
            format,
            error: Some(error),
        }
    }
}

/// Parse project bytes in any supported format, auto-detected from content:
/// leading `<` means XML, a `//` comment line means the native dialect, and a
/// bare `{` is tried as native first, then as JSON.
pub fn parse(bytes: &[u8]) -> (Option<Dict>, ParseInfo) {
    match detect_format(bytes) {
        Some(Format::Xml) => finish(Format::Xml, bridge::parse_xml(bytes)),
        Some(Format::Xcode) => finish(Format::Xcode, parse_native_bytes(bytes)),
        // Ambiguous: a bare `{` opens both dialects. Native wins; JSON is
        // the fallback, and the native diagnostic is the one worth keeping.
        _ => match parse_native_bytes(bytes) {
            Ok(root) => {
                debug!(objects = root.len(), "parsed native plist");
                (Some(root), ParseInfo::ok(Format::Xcode))
            }
            Err(native_err) => match bridge::parse_json(bytes) {
                Ok(root) => (Some(root), ParseInfo::ok(Format::Json)),
                Err(_) => (None, ParseInfo::failed(Format::Xcode, native_err)),
            },
        },
    }
}

/// Parse bytes in an explicitly chosen format.
pub fn parse_as(bytes: &[u8], format: Format) -> Result<Dict> {
    match format {
        Format::Xcode => parse_native_bytes(bytes),
        Format::Json => bridge::parse_json(bytes),
        Format::Xml => bridge::parse_xml(bytes),
    }
}

fn finish(format: Format, result: Result<Dict>) -> (Option<Dict>, ParseInfo) {
    match result {
        Ok(root) => (Some(root), ParseInfo::ok(format)),
        Err(e) => (None, ParseInfo::failed(format, e)),
    }
}

fn parse_native_bytes(bytes: &[u8]) -> Result<Dict> {
    let input = std::str::from_utf8(bytes)?;
    parse_native(input)
}

/// Parse the native dialect from text.
pub fn parse_native(input: &str) -> Result<Dict> {
    let tokens = lexer::tokenize(input)?;
    let mut parser = Parser::new(input, tokens);
    parser.parse_root()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    index: LineIndex<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: Vec<Token<'a>>) -> Self {
        let tokens = tokens
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Parser {
            input,
            tokens,
            pos: 0,
            index: LineIndex::new(input),
        }
    }

    fn parse_root(&mut self) -> Result<Dict> {
        let root = match self.peek() {
            Some(t) if t.kind == TokenKind::LBrace => self.parse_dict(0)?,
            _ => return Err(self.unexpected(&["'{'"])),
        };
        if self.peek().is_some() {
            return Err(self.unexpected(&["end of input"]));
        }
        Ok(root)
    }

    fn parse_dict(&mut self, depth: usize) -> Result<Dict> {
        self.check_depth(depth)?;
        self.bump(); // '{'
        let mut dict = Dict::new();
        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::RBrace) => {
                    self.bump();
                    return Ok(dict);
                }
                Some(TokenKind::Word) | Some(TokenKind::Quoted) => {
                    let key = lexer::token_string(&self.tokens[self.pos]);
                    self.bump();
                    self.expect(TokenKind::Equals, &["'='"])?;
                    let value = self.parse_value(depth + 1)?;
                    self.expect(TokenKind::Semicolon, &["';'"])?;
                    dict.insert(key, value);
                }
                _ => return Err(self.unexpected(&["string", "'}'"])),
            }
        }
    }

    fn parse_array(&mut self, depth: usize) -> Result<Vec<Value>> {
        self.check_depth(depth)?;
        self.bump(); // '('
        let mut items = Vec::new();
        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::RParen) => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => {
                    items.push(self.parse_value(depth + 1)?);
                    match self.peek().map(|t| t.kind) {
                        Some(TokenKind::Comma) => {
                            self.bump();
                        }
                        Some(TokenKind::RParen) => {
                            self.bump();
                            return Ok(items);
                        }
                        _ => return Err(self.unexpected(&["','", "')'"])),
                    }
                }
                None => return Err(self.unexpected(&["value", "')'"])),
            }
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<Value> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::LBrace) => Ok(Value::Dict(self.parse_dict(depth)?)),
            Some(TokenKind::LParen) => Ok(Value::Array(self.parse_array(depth)?)),
            Some(TokenKind::Word) | Some(TokenKind::Quoted) => {
                let s = lexer::token_string(&self.tokens[self.pos]);
                self.bump();
                Ok(Value::String(s))
            }
            _ => Err(self.unexpected(&["string", "'{'", "'('"])),
        }
    }

    fn check_depth(&mut self, depth: usize) -> Result<()> {
        if depth >= MAX_DEPTH {
            Err(self.error_at_current("maximum nesting depth exceeded", &[]))
        } else {
            Ok(())
        }
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, kind: TokenKind, expected: &[&'static str]) -> Result<()> {
        match self.peek() {
            Some(t) if t.kind == kind => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn unexpected(&self, expected: &[&'static str]) -> Error {
        self.error_at_current("parsing Xcode plist failed", expected)
    }

    fn error_at_current(&self, message: &str, expected: &[&'static str]) -> Error {
        let (line, column, width, found) = match self.peek() {
            Some(t) => {
                let (line, column) = self.index.line_col(t.offset);
                let found = if t.text.chars().count() > 40 {
                    format!("'{}...'", t.text.chars().take(40).collect::<String>())
                } else {
                    format!("'{}'", t.text)
                };
                (line, column, t.text.chars().count().max(1), found)
            }
            None => {
                let (line, column) = self.index.line_col(self.input.len());
                (line, column, 1, "end of input".to_string())
            }
        };
        Error::Parse(Diagnostic {
            line,
            column,
            width,
            found,
            expected: expected.to_vec(),
            message: message.to_string(),
        })
    }
}
