//! PBRT tokenizer and directive splitter.
//!
//! The scene text is a flat sequence of directives. Each directive is a bare
//! identifier followed by its arguments (strings, numbers, bracketed lists)
//! up to the next identifier.

use std::fmt;
use std::iter::Peekable;

use kiln_core::{KilnError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Bare word: a directive name, or `true`/`false`.
    Identifier(&'a str),
    /// Contents of a double-quoted string, without the quotes.
    String(&'a str),
    /// Numeric literal, parsed on demand.
    Number(&'a str),
    OpenBracket,
    CloseBracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub line: usize,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier(s) | TokenKind::Number(s) => write!(f, "{s}"),
            TokenKind::String(s) => write!(f, "\"{s}\""),
            TokenKind::OpenBracket => write!(f, "["),
            TokenKind::CloseBracket => write!(f, "]"),
        }
    }
}

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0, line: 1 }
    }

    fn skip_whitespace_and_comments(&mut self) {
        let src = self.src;
        let bytes = src.as_bytes();
        while self.pos < bytes.len() {
            match bytes[self.pos] {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b'#' => {
                    while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                c if c.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && pred(bytes[self.pos]) {
            self.pos += 1;
        }
        &src[start..self.pos]
    }

    fn syntax(&self, message: impl Into<String>) -> KilnError {
        KilnError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace_and_comments();
        let src = self.src;
        let bytes = src.as_bytes();
        let &c = bytes.get(self.pos)?;
        let line = self.line;

        let kind = match c {
            b'[' => {
                self.pos += 1;
                TokenKind::OpenBracket
            }
            b']' => {
                self.pos += 1;
                TokenKind::CloseBracket
            }
            b'"' => {
                self.pos += 1;
                let text = self.take_while(|b| b != b'"' && b != b'\n');
                if bytes.get(self.pos) != Some(&b'"') {
                    return Some(Err(self.syntax("unterminated string")));
                }
                self.pos += 1;
                TokenKind::String(text)
            }
            c if c.is_ascii_digit() || matches!(c, b'-' | b'+' | b'.') => {
                TokenKind::Number(self.take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'+' | b'.')))
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                TokenKind::Identifier(self.take_while(|b| b.is_ascii_alphanumeric() || b == b'_'))
            }
            _ => {
                let ch = src[self.pos..].chars().next().unwrap_or('?');
                // Skip past it so the iterator does not stall if the caller keeps going.
                self.pos += ch.len_utf8();
                return Some(Err(self.syntax(format!("unexpected character '{ch}'"))));
            }
        };

        Some(Ok(Token { kind, line }))
    }
}

/// One directive and its raw argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive<'a> {
    pub name: &'a str,
    pub line: usize,
    pub args: Vec<Token<'a>>,
}

fn starts_directive(token: &Token<'_>) -> bool {
    matches!(token.kind, TokenKind::Identifier(word) if word != "true" && word != "false")
}

/// Groups lexer output into [`Directive`]s.
pub struct Directives<'a> {
    tokens: Peekable<Lexer<'a>>,
}

impl<'a> Directives<'a> {
    #[must_use]
    pub fn new(src: &'a str) -> Self {
        Self {
            tokens: Lexer::new(src).peekable(),
        }
    }
}

impl<'a> Iterator for Directives<'a> {
    type Item = Result<Directive<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let head = match self.tokens.next()? {
            Ok(token) => token,
            Err(e) => return Some(Err(e)),
        };
        let TokenKind::Identifier(name) = head.kind else {
            return Some(Err(KilnError::Syntax {
                line: head.line,
                message: format!("expected a directive, found {head}"),
            }));
        };

        let mut args = Vec::new();
        while let Some(peeked) = self.tokens.peek() {
            match peeked {
                Ok(token) if starts_directive(token) => break,
                Ok(_) => {
                    if let Some(Ok(token)) = self.tokens.next() {
                        args.push(token);
                    }
                }
                Err(_) => {
                    if let Some(Err(e)) = self.tokens.next() {
                        return Some(Err(e));
                    }
                }
            }
        }

        Some(Ok(Directive {
            name,
            line: head.line,
            args,
        }))
    }
}

/// Tokenizes a standalone argument string, e.g. `"1 2 3"`.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(src).collect()
}
