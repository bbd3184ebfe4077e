//! Evaluator for Rill programs
//!
//! A tree-walking interpreter over a parent-linked chain of
//! environments. Environments are a runtime-only structure: the
//! evaluator allocates one per block as it enters it, and one fresh
//! activation record per function call.

use anyhow::{bail, Result};
use rill_ast::ast::{BinOp, Block, Expr, Ident, UnOp};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

/// Maximum call depth to prevent stack overflow from deep recursion
const MAX_CALL_DEPTH: u32 = 1000;

thread_local! {
    /// Current call depth (thread-local for safety)
    static CALL_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Runtime values: a closed sum of numbers and strings, copied, never
/// shared.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Str(String),
}

impl Value {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Str(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(n) => write!(f, "{n:.2}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Control flow for evaluation
///
/// A `Return` result carries its value upward until a block stops on
/// it; the flag lives in this wrapper, never inside the value itself.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Value(Value),
    Return(Value),
}

impl ControlFlow {
    /// Extract the value, treating Return as a normal value
    pub fn into_value(self) -> Value {
        match self {
            ControlFlow::Value(v) | ControlFlow::Return(v) => v,
        }
    }

    pub fn is_return(&self) -> bool {
        matches!(self, ControlFlow::Return(_))
    }
}

/// A user-declared function. `closure` is the environment the
/// declaration was evaluated in; every call parents its activation
/// record there.
#[derive(Clone)]
pub struct Function {
    pub params: Vec<String>,
    body: Rc<Block>,
    closure: EnvRef,
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the closure link is cyclic; printing it would never terminate
        f.debug_struct("Function")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub type EnvRef = Rc<RefCell<Env>>;

/// A lexical scope: variable bindings, function definitions (a disjoint
/// namespace), and a parent link. Lookups walk parents; assignment
/// always writes into the innermost scope, shadowing rather than
/// mutating an ancestor's binding.
#[derive(Debug, Default)]
pub struct Env {
    vars: HashMap<String, Value>,
    fns: HashMap<String, Function>,
    parent: Option<EnvRef>,
}

impl Env {
    pub fn root() -> EnvRef {
        Rc::new(RefCell::new(Env::default()))
    }

    fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Env {
            parent: Some(Rc::clone(parent)),
            ..Default::default()
        }))
    }

    /// Bind a variable in this scope (no parent walk).
    pub fn define(env: &EnvRef, name: &str, value: Value) {
        env.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// Look a variable up through the scope chain.
    pub fn get(env: &EnvRef, name: &str) -> Option<Value> {
        let mut cur = Some(Rc::clone(env));
        while let Some(rc) = cur {
            let e = rc.borrow();
            if let Some(v) = e.vars.get(name) {
                return Some(v.clone());
            }
            cur = e.parent.clone();
        }
        None
    }

    fn lookup_fn(env: &EnvRef, name: &str) -> Option<Function> {
        let mut cur = Some(Rc::clone(env));
        while let Some(rc) = cur {
            let e = rc.borrow();
            if let Some(f) = e.fns.get(name) {
                return Some(f.clone());
            }
            cur = e.parent.clone();
        }
        None
    }

    /// `(name, parameter count)` for every function reachable from this
    /// scope; used to seed the parser's symbol table across REPL batches.
    pub fn function_signatures(env: &EnvRef) -> Vec<(String, usize)> {
        let mut out = Vec::new();
        let mut cur = Some(Rc::clone(env));
        while let Some(rc) = cur {
            let e = rc.borrow();
            for (name, f) in &e.fns {
                // the innermost declaration wins, as in lookup_fn; a
                // shadowed ancestor's arity must not replace it downstream
                if out.iter().all(|(n, _)| n != name) {
                    out.push((name.clone(), f.params.len()));
                }
            }
            cur = e.parent.clone();
        }
        out
    }
}

/// Evaluate a root block against `env` (a fresh root environment when
/// `None`). The block's expressions run directly in that environment so
/// a REPL can thread one environment across input batches.
pub fn evaluate(block: &Block, env: Option<EnvRef>) -> Result<Value> {
    let env = env.unwrap_or_else(Env::root);
    Ok(eval_exprs(&env, &block.exprs)?.into_value())
}

/// Evaluate each expression in order against the given scope. A
/// `Return` result stops the sequence and is handed back still flagged;
/// an empty sequence yields zero.
fn eval_exprs(env: &EnvRef, exprs: &[Expr]) -> Result<ControlFlow> {
    let mut last = ControlFlow::Value(Value::Num(0.0));
    for expr in exprs {
        last = eval(env, expr)?;
        if last.is_return() {
            break;
        }
    }
    Ok(last)
}

pub fn eval(env: &EnvRef, expr: &Expr) -> Result<ControlFlow> {
    match expr {
        Expr::Number(n, _) => Ok(ControlFlow::Value(Value::Num(*n))),
        Expr::Str(s, _) => Ok(ControlFlow::Value(Value::Str(s.clone()))),

        Expr::Var(id) => match Env::get(env, &id.text) {
            Some(v) => Ok(ControlFlow::Value(v)),
            None => bail!("unknown variable '{}'", id.text),
        },

        Expr::Unary { op, expr, .. } => {
            let v = eval(env, expr)?.into_value();
            let Some(n) = v.as_num() else {
                bail!("invalid operand for unary '{}': expected a number", op.symbol());
            };
            let n = match op {
                UnOp::Pos => n,
                UnOp::Neg => -n,
            };
            Ok(ControlFlow::Value(Value::Num(n)))
        }

        Expr::Binary { lhs, op, rhs, .. } => eval_binary(env, *op, lhs, rhs),

        Expr::Block(block) => eval_block(env, block),

        Expr::If {
            cond, then_, else_, ..
        } => eval_if(env, cond, then_, else_.as_ref()),

        Expr::While { cond, body, .. } => eval_while(env, cond, body),

        Expr::Print { expr, .. } => {
            // result (and any Return flag) passes through unchanged
            let cf = eval(env, expr)?;
            print!("{}", cf.clone().into_value());
            let _ = std::io::stdout().flush();
            Ok(cf)
        }

        Expr::Return { expr, .. } => {
            let v = eval(env, expr)?.into_value();
            Ok(ControlFlow::Return(v))
        }

        Expr::FnDecl {
            name, params, body, ..
        } => {
            let function = Function {
                params: params.iter().map(|p| p.text.clone()).collect(),
                body: Rc::new(body.clone()),
                closure: Rc::clone(env),
            };
            env.borrow_mut().fns.insert(name.text.clone(), function);
            Ok(ControlFlow::Value(Value::Num(0.0)))
        }

        Expr::Call { name, args, .. } => eval_call(env, name, args),
    }
}

fn eval_binary(env: &EnvRef, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<ControlFlow> {
    // the right operand is evaluated first: assignment needs its value
    // before the left side is looked at
    let cf = eval(env, rhs)?;

    if op == BinOp::Assign {
        let Expr::Var(id) = lhs else {
            bail!("invalid assignment target: expected a variable");
        };
        let value = cf.clone().into_value();
        env.borrow_mut().vars.insert(id.text.clone(), value);
        // the assignment's result is the right-hand result, Return flag
        // and all
        return Ok(cf);
    }

    let right = cf.into_value();
    let left = eval(env, lhs)?.into_value();

    let (Some(l), Some(r)) = (left.as_num(), right.as_num()) else {
        bail!(
            "invalid operand for binary '{}': expected numbers",
            op.symbol()
        );
    };

    let n = match op {
        BinOp::Add => l + r,
        BinOp::Sub => l - r,
        BinOp::Mul => l * r,
        BinOp::Div => l / r,
        BinOp::Gt => bool_num(l > r),
        BinOp::Ge => bool_num(l >= r),
        BinOp::Lt => bool_num(l < r),
        BinOp::Le => bool_num(l <= r),
        BinOp::EqEq => bool_num(l == r),
        BinOp::Assign => unreachable!("handled above"),
    };
    Ok(ControlFlow::Value(Value::Num(n)))
}

/// Booleans are numbers: comparisons yield 1.0 or 0.0, and a condition
/// is truthy iff it is strictly greater than zero.
fn bool_num(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn eval_block(env: &EnvRef, block: &Block) -> Result<ControlFlow> {
    let scope = Env::child(env);
    eval_exprs(&scope, &block.exprs)
}

fn eval_if(env: &EnvRef, cond: &Expr, then_: &Block, else_: Option<&Block>) -> Result<ControlFlow> {
    let c = eval(env, cond)?.into_value();
    let Some(c) = c.as_num() else {
        bail!("invalid condition in if: expected a number");
    };
    if c > 0.0 {
        eval_block(env, then_)
    } else if let Some(else_block) = else_ {
        eval_block(env, else_block)
    } else {
        Ok(ControlFlow::Value(Value::Num(0.0)))
    }
}

fn eval_while(env: &EnvRef, cond: &Expr, body: &Block) -> Result<ControlFlow> {
    let mut last = ControlFlow::Value(Value::Num(0.0));
    loop {
        let c = eval(env, cond)?.into_value();
        let Some(c) = c.as_num() else {
            bail!("invalid condition in while: expected a number");
        };
        if c <= 0.0 {
            break;
        }
        // the body shares the enclosing scope: writes land directly in
        // the surrounding environment. A Return from the body does not
        // break the loop; only the condition does.
        last = eval_exprs(env, &body.exprs)?;
    }
    Ok(last)
}

fn eval_call(env: &EnvRef, name: &Ident, args: &[Expr]) -> Result<ControlFlow> {
    let depth = CALL_DEPTH.with(|d| {
        let next = d.get() + 1;
        d.set(next);
        next
    });
    if depth > MAX_CALL_DEPTH {
        CALL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
        bail!("maximum call depth exceeded (limit: {MAX_CALL_DEPTH} calls)");
    }

    let result = eval_call_inner(env, name, args);

    CALL_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));

    result
}

fn eval_call_inner(env: &EnvRef, name: &Ident, args: &[Expr]) -> Result<ControlFlow> {
    let Some(function) = Env::lookup_fn(env, &name.text) else {
        bail!("unknown function '{}'", name.text);
    };
    if args.len() > function.params.len() {
        bail!(
            "function '{}' expects at most {} argument(s), got {}",
            name.text,
            function.params.len(),
            args.len()
        );
    }

    // arguments are evaluated in the caller's environment, zipped
    // positionally; parameters without an argument stay unbound
    let mut bound = Vec::with_capacity(args.len());
    for (param, arg) in function.params.iter().zip(args) {
        bound.push((param.clone(), eval(env, arg)?.into_value()));
    }

    // a fresh activation record per call, parented to the declaring
    // environment; overlapping calls share nothing
    let activation = Env::child(&function.closure);
    {
        let mut frame = activation.borrow_mut();
        for (param, value) in bound {
            frame.vars.insert(param, value);
        }
    }

    // the body's result is handed back with its Return flag intact: a
    // return in the callee also ends the block the call appears in
    eval_exprs(&activation, &function.body.exprs)
}
