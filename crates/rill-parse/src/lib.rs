#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(clippy::dbg_macro, clippy::todo, clippy::unimplemented)]

mod lexer;
mod parser;
mod token;

pub use lexer::{scan, LexError, Lexer};
pub use parser::{parse, parse_str, parse_with_functions};
pub use token::{Tok, TokKind};
