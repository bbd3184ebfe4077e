pub mod span {
    use serde::Serialize;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
    pub struct Span {
        pub start: u32,
        pub end: u32,
    }
}

pub mod ast {
    use super::span::Span;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    pub struct Ident {
        pub text: String,
        pub span: Span,
    }

    /// A brace-delimited sequence of expressions. A whole program is one
    /// implicit block.
    #[derive(Debug, Clone, Serialize)]
    pub struct Block {
        pub exprs: Vec<Expr>,
        pub span: Span,
    }

    #[derive(Debug, Clone, Serialize)]
    pub enum Expr {
        Number(f64, Span),
        Str(String, Span),
        Var(Ident),
        Unary {
            op: UnOp,
            expr: Box<Expr>,
            span: Span,
        },
        Binary {
            lhs: Box<Expr>,
            op: BinOp,
            rhs: Box<Expr>,
            span: Span,
        },
        Block(Block),
        /// `if cond { .. }` with an optional `else { .. }`
        If {
            cond: Box<Expr>,
            then_: Block,
            else_: Option<Block>,
            span: Span,
        },
        While {
            cond: Box<Expr>,
            body: Block,
            span: Span,
        },
        Print {
            expr: Box<Expr>,
            span: Span,
        },
        Return {
            expr: Box<Expr>,
            span: Span,
        },
        /// Declares a named function; evaluated for its registration side
        /// effect, yields zero.
        FnDecl {
            name: Ident,
            params: Vec<Ident>,
            body: Block,
            span: Span,
        },
        /// Calls are always by name: functions live in their own namespace
        /// and are not values.
        Call {
            name: Ident,
            args: Vec<Expr>,
            span: Span,
        },
    }

    impl Expr {
        pub fn span(&self) -> Span {
            match self {
                Expr::Number(_, sp) | Expr::Str(_, sp) => *sp,
                Expr::Var(id) => id.span,
                Expr::Unary { span, .. }
                | Expr::Binary { span, .. }
                | Expr::If { span, .. }
                | Expr::While { span, .. }
                | Expr::Print { span, .. }
                | Expr::Return { span, .. }
                | Expr::FnDecl { span, .. }
                | Expr::Call { span, .. } => *span,
                Expr::Block(block) => block.span,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum UnOp {
        Pos,
        Neg,
    }

    impl UnOp {
        pub fn symbol(self) -> &'static str {
            match self {
                UnOp::Pos => "+",
                UnOp::Neg => "-",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub enum BinOp {
        Assign,
        // relational
        Gt,
        Ge,
        Lt,
        Le,
        EqEq,
        // arithmetic
        Add,
        Sub,
        Mul,
        Div,
    }

    impl BinOp {
        pub fn symbol(self) -> &'static str {
            match self {
                BinOp::Assign => "=",
                BinOp::Gt => ">",
                BinOp::Ge => ">=",
                BinOp::Lt => "<",
                BinOp::Le => "<=",
                BinOp::EqEq => "==",
                BinOp::Add => "+",
                BinOp::Sub => "-",
                BinOp::Mul => "*",
                BinOp::Div => "/",
            }
        }
    }
}
