//! Compiled handler trees.
//!
//! A parser outside this crate lowers formula text to an [`Expr`]; cell
//! references are replaced by indices into the owning formula's reference
//! list so that the same tree works from any cell.

use std::rc::Rc;

use sheetcalc_common::CalcError;

use crate::context::Context;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Index into the formula's absolute references.
    Ref(usize),
    /// Literal array: rows of element expressions.
    Array(Vec<Vec<Expr>>),
    Call { name: String, args: Vec<Expr> },
    /// In argument position, handed to the callee unevaluated.
    Lazy(Rc<Expr>),
}

impl Expr {
    pub fn lit(v: impl Into<Value>) -> Self {
        Expr::Literal(v.into())
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.into(),
            args,
        }
    }

    pub fn lazy(inner: Expr) -> Self {
        Expr::Lazy(Rc::new(inner))
    }

    /// `left <op> right` through the `binary<op>` operator function.
    pub fn binary(op: &str, left: Expr, right: Expr) -> Self {
        Expr::call(format!("binary{op}"), vec![left, right])
    }

    pub fn unary(op: &str, operand: Expr) -> Self {
        Expr::call(format!("unary{op}"), vec![operand])
    }
}

/// Deferred argument expression, evaluated by the callee on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Thunk(Rc<Expr>);

impl Thunk {
    pub fn new(expr: Rc<Expr>) -> Self {
        Thunk(expr)
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    pub fn eval(&self, ctx: &mut Context) -> Result<Value, CalcError> {
        ctx.eval(&self.0)
    }
}

/// What a function receives for each argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Lazy(Thunk),
}

impl Arg {
    /// The evaluated value, `None` for an unevaluated thunk.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Arg::Value(v) => Some(v),
            Arg::Lazy(_) => None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Arg::Lazy(_))
    }

    /// Evaluate a thunk, or hand back an already evaluated value.
    pub fn eval(self, ctx: &mut Context) -> Result<Value, CalcError> {
        match self {
            Arg::Value(v) => Ok(v),
            Arg::Lazy(t) => t.eval(ctx),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}
