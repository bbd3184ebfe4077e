use crate::lexer;
use crate::token::{Tok, TokKind};
use anyhow::{bail, Result};
use rill_ast::ast::{BinOp, Block, Expr, Ident, UnOp};
use rill_ast::span::Span;
use std::collections::HashMap;

/// Right binding power of prefix `+`/`-`: tighter than any infix operator.
const PREFIX_RBP: u8 = 10;
/// Left binding power of the postfix call `(`.
const CALL_LBP: u8 = 9;

/// Scan and parse a whole source string into its root block.
pub fn parse_str(src: &str) -> Result<Block> {
    parse(lexer::scan(src)?)
}

pub fn parse(tokens: Vec<Tok>) -> Result<Block> {
    parse_with_functions(tokens, &[])
}

/// Like [`parse`], but with the function symbol table pre-seeded from
/// `(name, parameter count)` pairs. A REPL uses this to keep functions
/// declared in earlier input batches callable.
pub fn parse_with_functions(tokens: Vec<Tok>, seed: &[(String, usize)]) -> Result<Block> {
    let mut p = Parser::new(tokens);
    for (name, arity) in seed {
        p.declare_fn(name.clone(), *arity);
    }
    p.parse_program()
}

struct Parser {
    toks: Vec<Tok>,
    cursor: usize,
    eof: Tok,
    /// Parse-time symbol table: declared name -> parameter count, one map
    /// per lexical scope. Purely local to parsing; the runtime
    /// environment chain is built by the evaluator.
    fn_scopes: Vec<HashMap<String, usize>>,
}

impl Parser {
    fn new(toks: Vec<Tok>) -> Self {
        let end = toks.last().map_or(0, |t| t.span.end);
        Self {
            toks,
            cursor: 0,
            eof: Tok {
                kind: TokKind::Eof,
                text: String::new(),
                span: Span { start: end, end },
            },
            fn_scopes: vec![HashMap::new()],
        }
    }

    fn peek(&self) -> &Tok {
        self.toks.get(self.cursor).unwrap_or(&self.eof)
    }

    fn next(&mut self) -> Tok {
        match self.toks.get(self.cursor) {
            Some(t) => {
                let t = t.clone();
                self.cursor += 1;
                t
            }
            None => self.eof.clone(),
        }
    }

    fn expect(&mut self, kind: TokKind) -> Result<Tok> {
        let tok = self.next();
        if tok.kind == kind {
            Ok(tok)
        } else {
            bail!("expected {:?}, found {:?}", kind, tok.kind)
        }
    }

    fn declare_fn(&mut self, name: String, arity: usize) {
        if let Some(scope) = self.fn_scopes.last_mut() {
            scope.insert(name, arity);
        }
    }

    fn resolve_fn(&self, name: &str) -> Option<usize> {
        self.fn_scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }

    // ======= program / blocks =======

    fn parse_program(&mut self) -> Result<Block> {
        let start = self.peek().span.start;
        let mut exprs = Vec::new();
        while self.peek().kind != TokKind::Eof {
            match self.expr_bp(0)? {
                Some(e) => exprs.push(e),
                None => break,
            }
        }
        Ok(Block {
            exprs,
            span: Span {
                start,
                end: self.peek().span.end,
            },
        })
    }

    /// Parse a block body up to the closing `}` (or end of input), in a
    /// fresh symbol-table scope. The opening `{` is already consumed.
    fn parse_block(&mut self, start: u32) -> Result<Block> {
        self.fn_scopes.push(HashMap::new());
        let block = self.parse_block_exprs(start);
        self.fn_scopes.pop();
        block
    }

    /// Block body without a scope of its own: a while body registers its
    /// declarations straight into the enclosing scope, mirroring its
    /// shared-variable semantics at run time.
    fn parse_block_exprs(&mut self, start: u32) -> Result<Block> {
        let mut exprs = Vec::new();
        while !matches!(self.peek().kind, TokKind::RBrace | TokKind::Eof) {
            match self.expr_bp(0)? {
                Some(e) => exprs.push(e),
                None => break,
            }
        }
        Ok(Block {
            exprs,
            span: Span {
                start,
                end: self.peek().span.end,
            },
        })
    }

    // ======= expressions (Pratt parser) =======
    //
    // Binding powers (higher binds tighter):
    //   1,2:  =
    //   3,4:  > >= < <= ==
    //   5,6:  + -
    //   7,8:  * /
    //   9:    postfix call '('
    //   10:   prefix + -

    /// Returns `None` on a bare `;` or an unrecognized leading token
    /// (both are consumed); the caller stops its statement loop there.
    fn expr_bp(&mut self, min_bp: u8) -> Result<Option<Expr>> {
        let tok = self.next();
        let mut lhs = match tok.kind {
            TokKind::Number => {
                let n: f64 = match tok.text.parse() {
                    Ok(n) => n,
                    Err(e) => bail!("invalid number '{}': {e}", tok.text),
                };
                Expr::Number(n, tok.span)
            }
            TokKind::Str => Expr::Str(tok.text, tok.span),
            TokKind::Ident => Expr::Var(Ident {
                text: tok.text,
                span: tok.span,
            }),
            TokKind::LParen => {
                let Some(inner) = self.expr_bp(0)? else {
                    bail!("expected expression after '('");
                };
                self.expect(TokKind::RParen)?;
                inner
            }
            TokKind::LBrace => {
                let block = self.parse_block(tok.span.start)?;
                self.expect(TokKind::RBrace)?;
                Expr::Block(block)
            }
            TokKind::Plus | TokKind::Minus => {
                let op = if tok.kind == TokKind::Plus {
                    UnOp::Pos
                } else {
                    UnOp::Neg
                };
                let Some(inner) = self.expr_bp(PREFIX_RBP)? else {
                    bail!("expected operand after unary '{}'", op.symbol());
                };
                let span = Span {
                    start: tok.span.start,
                    end: inner.span().end,
                };
                Expr::Unary {
                    op,
                    expr: Box::new(inner),
                    span,
                }
            }
            TokKind::KwIf => self.parse_if(tok.span.start)?,
            TokKind::KwWhile => self.parse_while(tok.span.start)?,
            TokKind::KwPrint => {
                let Some(inner) = self.expr_bp(0)? else {
                    bail!("expected expression after 'print'");
                };
                let span = Span {
                    start: tok.span.start,
                    end: inner.span().end,
                };
                Expr::Print {
                    expr: Box::new(inner),
                    span,
                }
            }
            TokKind::KwReturn => {
                let Some(inner) = self.expr_bp(0)? else {
                    bail!("expected expression after 'return'");
                };
                let span = Span {
                    start: tok.span.start,
                    end: inner.span().end,
                };
                Expr::Return {
                    expr: Box::new(inner),
                    span,
                }
            }
            TokKind::KwLet => self.parse_let(tok.span.start)?,
            _ => return Ok(None),
        };

        loop {
            let kind = self.peek().kind;

            // a statement terminator ends the expression and is consumed
            if kind == TokKind::Semicolon {
                self.next();
                return Ok(Some(lhs));
            }

            // postfix call binds tighter than every infix operator
            if kind == TokKind::LParen {
                if CALL_LBP <= min_bp {
                    break;
                }
                lhs = self.parse_call(lhs)?;
                continue;
            }

            let Some((op, lbp, rbp)) = infix_binding_power(kind) else {
                break;
            };
            if lbp <= min_bp {
                break;
            }
            self.next();
            let Some(rhs) = self.expr_bp(rbp)? else {
                bail!("expected operand after '{}'", op.symbol());
            };
            let span = Span {
                start: lhs.span().start,
                end: rhs.span().end,
            };
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            };
        }

        Ok(Some(lhs))
    }

    // ======= constructs =======

    fn parse_if(&mut self, start: u32) -> Result<Expr> {
        let Some(cond) = self.expr_bp(0)? else {
            bail!("expected condition after 'if'");
        };
        let lb = self.expect(TokKind::LBrace)?;
        let then_ = self.parse_block(lb.span.start)?;
        self.expect(TokKind::RBrace)?;

        let else_ = if self.peek().kind == TokKind::KwElse {
            self.next();
            let lb = self.expect(TokKind::LBrace)?;
            let block = self.parse_block(lb.span.start)?;
            self.expect(TokKind::RBrace)?;
            Some(block)
        } else {
            None
        };

        let end = else_.as_ref().map_or(then_.span.end, |b| b.span.end);
        Ok(Expr::If {
            cond: Box::new(cond),
            then_,
            else_,
            span: Span { start, end },
        })
    }

    fn parse_while(&mut self, start: u32) -> Result<Expr> {
        let Some(cond) = self.expr_bp(0)? else {
            bail!("expected condition after 'while'");
        };
        let lb = self.expect(TokKind::LBrace)?;
        let body = self.parse_block_exprs(lb.span.start)?;
        self.expect(TokKind::RBrace)?;

        let end = body.span.end;
        Ok(Expr::While {
            cond: Box::new(cond),
            body,
            span: Span { start, end },
        })
    }

    /// `let name(a, b) { .. }` declares a function. `let name = expr` is
    /// plain assignment sugar: the identifier becomes the left operand
    /// and the infix loop folds the `=`.
    fn parse_let(&mut self, start: u32) -> Result<Expr> {
        let tok = self.expect(TokKind::Ident)?;
        let name = Ident {
            text: tok.text,
            span: tok.span,
        };
        if self.peek().kind == TokKind::LParen {
            self.parse_fn_decl(start, name)
        } else {
            Ok(Expr::Var(name))
        }
    }

    fn parse_fn_decl(&mut self, start: u32, name: Ident) -> Result<Expr> {
        self.expect(TokKind::LParen)?;
        let mut params = Vec::new();
        if self.peek().kind != TokKind::RParen {
            loop {
                let tok = self.expect(TokKind::Ident)?;
                params.push(Ident {
                    text: tok.text,
                    span: tok.span,
                });
                if self.peek().kind == TokKind::Comma {
                    self.next();
                    continue;
                }
                break;
            }
        }
        self.expect(TokKind::RParen)?;

        // registered before the body parses so direct recursion resolves
        self.declare_fn(name.text.clone(), params.len());

        let lb = self.expect(TokKind::LBrace)?;
        let body = self.parse_block(lb.span.start)?;
        let rb = self.expect(TokKind::RBrace)?;
        let mut end = rb.span.end;
        if self.peek().kind == TokKind::Semicolon {
            end = self.next().span.end;
        }

        Ok(Expr::FnDecl {
            name,
            params,
            body,
            span: Span { start, end },
        })
    }

    fn parse_call(&mut self, callee: Expr) -> Result<Expr> {
        let name = match callee {
            Expr::Var(id) => id,
            _ => bail!("can only call a named function"),
        };
        let Some(arity) = self.resolve_fn(&name.text) else {
            bail!("unknown function '{}'", name.text);
        };

        self.expect(TokKind::LParen)?;
        let mut args = Vec::new();
        if self.peek().kind != TokKind::RParen {
            loop {
                let Some(arg) = self.expr_bp(0)? else {
                    bail!("expected argument in call to '{}'", name.text);
                };
                args.push(arg);
                if self.peek().kind == TokKind::Comma {
                    self.next();
                    continue;
                }
                break;
            }
        }
        let rp = self.expect(TokKind::RParen)?;

        if args.len() > arity {
            bail!(
                "function '{}' expects at most {} argument(s), got {}",
                name.text,
                arity,
                args.len()
            );
        }

        let span = Span {
            start: name.span.start,
            end: rp.span.end,
        };
        Ok(Expr::Call { name, args, span })
    }
}

fn infix_binding_power(kind: TokKind) -> Option<(BinOp, u8, u8)> {
    let bp = match kind {
        TokKind::Eq => (BinOp::Assign, 1, 2),
        TokKind::Gt => (BinOp::Gt, 3, 4),
        TokKind::Ge => (BinOp::Ge, 3, 4),
        TokKind::Lt => (BinOp::Lt, 3, 4),
        TokKind::Le => (BinOp::Le, 3, 4),
        TokKind::EqEq => (BinOp::EqEq, 3, 4),
        TokKind::Plus => (BinOp::Add, 5, 6),
        TokKind::Minus => (BinOp::Sub, 5, 6),
        TokKind::Star => (BinOp::Mul, 7, 8),
        TokKind::Slash => (BinOp::Div, 7, 8),
        _ => return None,
    };
    Some(bp)
}
