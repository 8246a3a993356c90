//! Conditionals and boolean functions.

use sheetcalc_common::{CalcError, CalcErrorKind};

use super::utils::{checked, err, raw};
use crate::args::{ArgSpec, ArgType};
use crate::broadcast::array_handler1;
use crate::context::Context;
use crate::expr::Arg;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::matrix::Matrix;
use crate::value::Value;

/* ─────────────────────────── IF ─────────────────────────── */

/// Only the chosen branch is evaluated, unless the condition is a matrix:
/// then both are, and the result picks element-wise.
fn if_fn(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let mut args = args.into_iter();
    let co = match args.next() {
        Some(a) => a.eval(ctx)?,
        None => return Err(CalcError::new(CalcErrorKind::Na)),
    };
    let then_arg = args.next();
    let else_arg = args.next();

    if let Some(comatrix) = ctx.as_matrix(&co) {
        let th = branch(ctx, then_arg)?;
        let el = branch(ctx, else_arg)?;
        let thm = ctx.as_matrix(&th);
        let elm = ctx.as_matrix(&el);
        let ctx = &*ctx;
        let pick = |m: &Option<Matrix>, v: &Value, row: usize, col: usize| match m {
            Some(m) => m.get(row, col),
            None => v.clone(),
        };
        return Ok(Value::Matrix(comatrix.map(false, |val, row, col| {
            if ctx.bool(&val) {
                pick(&thm, &th, row, col)
            } else {
                pick(&elm, &el, row, col)
            }
        })));
    }

    if let e @ Value::Error(_) = ctx.force(&co) {
        return Ok(e);
    }
    if ctx.bool(&co) {
        branch(ctx, then_arg)
    } else {
        branch(ctx, else_arg)
    }
}

/// A missing branch evaluates to FALSE.
fn branch(ctx: &mut Context, arg: Option<Arg>) -> Result<Value, CalcError> {
    match arg {
        Some(a) => a.eval(ctx),
        None => Ok(Value::Boolean(false)),
    }
}

/* ─────────────────────────── NOT ─────────────────────────── */

fn not_fn(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let v = match args.into_iter().next() {
        Some(a) => a.eval(ctx)?,
        None => return Err(CalcError::new(CalcErrorKind::Na)),
    };
    Ok(array_handler1(ctx, &v, &|ctx, x| match x {
        Value::Error(e) => Value::Error(e.clone()),
        x => Value::Boolean(!ctx.bool(x)),
    }))
}

/* ─────────────────────────── AND / OR ─────────────────────────── */

/// Fold the logical values among `args`. Text and blanks inside ranges
/// are ignored; direct text is `#VALUE!`; the first error wins.
fn logical_fold(args: &[Value], mut step: impl FnMut(bool)) -> Option<Value> {
    fn walk(v: &Value, nested: bool, seen: &mut bool, step: &mut dyn FnMut(bool)) -> Option<Value> {
        match v {
            Value::Error(e) => return Some(Value::Error(e.clone())),
            Value::Boolean(b) => {
                *seen = true;
                step(*b);
            }
            Value::Number(n) => {
                *seen = true;
                step(*n != 0.0);
            }
            Value::Text(_) if !nested => return Some(err(CalcErrorKind::Value)),
            Value::Array(items) => {
                for item in items {
                    if let Some(e) = walk(item, true, seen, step) {
                        return Some(e);
                    }
                }
            }
            Value::Matrix(m) => {
                for item in m.to_rows().iter().flatten() {
                    if let Some(e) = walk(item, true, seen, step) {
                        return Some(e);
                    }
                }
            }
            _ => {}
        }
        None
    }

    let mut seen = false;
    for v in args {
        if let Some(e) = walk(v, false, &mut seen, &mut step) {
            return Some(e);
        }
    }
    (!seen).then(|| err(CalcErrorKind::Value))
}

fn and_fn(_: &mut Context, args: &[Value]) -> Value {
    let mut all = true;
    logical_fold(args, |b| all &= b).unwrap_or(Value::Boolean(all))
}

fn or_fn(_: &mut Context, args: &[Value]) -> Value {
    let mut any = false;
    logical_fold(args, |b| any |= b).unwrap_or(Value::Boolean(any))
}

/* ─────────────────────────── IFERROR ─────────────────────────── */

fn iferror_fn(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let mut args = args.into_iter();
    let (Some(value), Some(fallback)) = (args.next(), args.next()) else {
        return Err(CalcError::new(CalcErrorKind::Na));
    };
    let v = value.eval(ctx).unwrap_or_else(Value::Error);
    if matches!(ctx.force(&v), Value::Error(_)) {
        fallback.eval(ctx)
    } else {
        Ok(v)
    }
}

pub(crate) fn install(reg: &Registry) {
    raw(reg, "if", if_fn);
    raw(reg, "not", not_fn);
    let many = || vec![ArgSpec::Repeat(vec![ArgSpec::arg("logical", ArgType::Any)])];
    checked(reg, FunctionDef::new("and").sync(many(), and_fn));
    checked(reg, FunctionDef::new("or").sync(many(), or_fn));
    checked(
        reg,
        FunctionDef::new("iferror").lazy(
            vec![
                ArgSpec::arg("value", ArgType::AnyLazy),
                ArgSpec::arg("value_if_error", ArgType::AnyLazy),
            ],
            iferror_fn,
        ),
    );
}
