use crate::token::{Tok, TokKind};
use rill_ast::span::Span;
use thiserror::Error;

/// Lexical failures are the one recoverable error class: a REPL reports
/// them and prompts again instead of aborting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("invalid token '{ch}' at byte {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid number '{text}': multiple decimal points")]
    MalformedNumber { pos: usize, text: String },
}

pub struct Lexer<'a> {
    text: &'a str,
    src: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            text: src,
            src: src.as_bytes(),
            pos: 0,
        }
    }

    fn bump(&mut self) -> Option<u8> {
        if self.pos >= self.src.len() {
            None
        } else {
            let b = self.src[self.pos];
            self.pos += 1;
            Some(b)
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn span(&self, start: usize) -> Span {
        Span {
            start: start as u32,
            end: self.pos as u32,
        }
    }

    fn tok(&self, kind: TokKind, text: impl Into<String>, start: usize) -> Tok {
        Tok {
            kind,
            text: text.into(),
            span: self.span(start),
        }
    }

    pub fn next_tok(&mut self) -> Result<Tok, LexError> {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.bump();
        }
        let start = self.pos;
        let Some(b) = self.bump() else {
            return Ok(self.tok(TokKind::Eof, "", start));
        };
        let c = b as char;

        // 2-char operators first
        if c == '>' && self.peek() == Some(b'=') {
            self.bump();
            return Ok(self.tok(TokKind::Ge, ">=", start));
        }
        if c == '<' && self.peek() == Some(b'=') {
            self.bump();
            return Ok(self.tok(TokKind::Le, "<=", start));
        }
        if c == '=' && self.peek() == Some(b'=') {
            self.bump();
            return Ok(self.tok(TokKind::EqEq, "==", start));
        }

        // 1-char punctuation/operators
        let single = match c {
            '(' => Some(TokKind::LParen),
            ')' => Some(TokKind::RParen),
            '{' => Some(TokKind::LBrace),
            '}' => Some(TokKind::RBrace),
            '[' => Some(TokKind::LBracket),
            ']' => Some(TokKind::RBracket),
            ',' => Some(TokKind::Comma),
            ';' => Some(TokKind::Semicolon),
            '+' => Some(TokKind::Plus),
            '-' => Some(TokKind::Minus),
            '*' => Some(TokKind::Star),
            '/' => Some(TokKind::Slash),
            '=' => Some(TokKind::Eq),
            '>' => Some(TokKind::Gt),
            '<' => Some(TokKind::Lt),
            _ => None,
        };
        if let Some(kind) = single {
            return Ok(self.tok(kind, c.to_string(), start));
        }

        // string literal: no escapes; an unterminated literal consumes to
        // the end of input without failing. The contents are sliced from
        // the source, so multi-byte characters survive intact.
        if c == '"' {
            let content = self.pos;
            let mut end = self.src.len();
            while let Some(b) = self.bump() {
                if b == b'"' {
                    end = self.pos - 1;
                    break;
                }
            }
            return Ok(self.tok(TokKind::Str, &self.text[content..end], start));
        }

        // number: digits plus at most one '.'; '_' separators are dropped
        if c.is_ascii_digit() {
            let mut s = String::from(c);
            let mut dot = false;
            while let Some(p) = self.peek() {
                let ch = p as char;
                if ch.is_ascii_digit() {
                    s.push(ch);
                    self.bump();
                } else if ch == '.' {
                    if dot {
                        return Err(LexError::MalformedNumber {
                            pos: self.pos,
                            text: s,
                        });
                    }
                    dot = true;
                    s.push('.');
                    self.bump();
                } else if ch == '_' {
                    self.bump();
                } else {
                    break;
                }
            }
            return Ok(self.tok(TokKind::Number, s, start));
        }

        // ident / keywords
        if c.is_ascii_alphabetic() || c == '_' {
            let mut s = String::from(c);
            while let Some(p) = self.peek() {
                let ch = p as char;
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    s.push(ch);
                    self.bump();
                } else {
                    break;
                }
            }
            let kind = keyword(&s).unwrap_or(TokKind::Ident);
            return Ok(self.tok(kind, s, start));
        }

        // re-decode from the source so a multi-byte character is reported
        // whole instead of as its first byte
        let ch = self.text[start..].chars().next().unwrap_or(c);
        self.pos = start + ch.len_utf8();
        Err(LexError::UnexpectedChar { pos: start, ch })
    }
}

fn keyword(text: &str) -> Option<TokKind> {
    match text {
        "let" => Some(TokKind::KwLet),
        "if" => Some(TokKind::KwIf),
        "else" => Some(TokKind::KwElse),
        "for" => Some(TokKind::KwFor),
        "while" => Some(TokKind::KwWhile),
        "print" => Some(TokKind::KwPrint),
        "return" => Some(TokKind::KwReturn),
        _ => None,
    }
}

/// Scan a whole source string. The output always ends with exactly one
/// `Eof` token.
pub fn scan(src: &str) -> Result<Vec<Tok>, LexError> {
    let mut lex = Lexer::new(src);
    let mut toks = Vec::new();
    loop {
        let tok = lex.next_tok()?;
        let done = tok.kind == TokKind::Eof;
        toks.push(tok);
        if done {
            return Ok(toks);
        }
    }
}
