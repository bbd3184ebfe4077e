use rill_ast::span::Span;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    Eof,
    // punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    // assignment
    Eq,
    // relational
    EqEq,
    Gt,
    Ge,
    Lt,
    Le,
    // arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    // literals / idents
    Number,
    Str,
    Ident,
    // keywords (`for` is reserved but has no construct yet)
    KwLet,
    KwIf,
    KwElse,
    KwFor,
    KwWhile,
    KwPrint,
    KwReturn,
}

#[derive(Debug, Clone)]
pub struct Tok {
    pub kind: TokKind,
    pub text: String,
    pub span: Span,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>12}: {}", format!("{:?}", self.kind), self.text)
    }
}
