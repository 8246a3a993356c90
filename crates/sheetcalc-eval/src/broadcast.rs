//! Element-wise application of scalar functions over matrices.
//!
//! Operands that convert to a matrix (ranges, literal arrays, matrices)
//! are mapped cell by cell; scalars and single-cell references are
//! dereferenced and passed straight through.

use sheetcalc_common::{CalcError, CalcErrorKind};

use crate::coercion::to_number;
use crate::context::Context;
use crate::value::Value;

/// Apply `f` to `val`, or to every non-blank element when `val` is a
/// matrix-like value.
pub fn array_handler1(ctx: &Context, val: &Value, f: &dyn Fn(&Context, &Value) -> Value) -> Value {
    if let Some(m) = ctx.as_matrix(val) {
        return Value::Matrix(m.map(false, |el, _, _| array_handler1(ctx, &el, f)));
    }
    let vals = ctx.cell_values(std::slice::from_ref(val));
    f(ctx, vals.first().unwrap_or(&Value::Null))
}

/// Apply `f` pairwise. Two matrices pair by position (the left one drives
/// the shape); a matrix and a scalar pair every element with the scalar.
pub fn array_handler2(
    ctx: &Context,
    left: &Value,
    right: &Value,
    f: &dyn Fn(&Context, &Value, &Value) -> Value,
) -> Value {
    match (ctx.as_matrix(left), ctx.as_matrix(right)) {
        (Some(ml), Some(mr)) => Value::Matrix(ml.map(false, |el, row, col| {
            array_handler2(ctx, &el, &mr.get(row, col), f)
        })),
        (Some(ml), None) => Value::Matrix(ml.map(false, |el, _, _| array_handler2(ctx, &el, right, f))),
        (None, Some(mr)) => Value::Matrix(mr.map(false, |el, _, _| array_handler2(ctx, left, &el, f))),
        (None, None) => {
            let vals = ctx.cell_values(&[left.clone(), right.clone()]);
            let l = vals.first().unwrap_or(&Value::Null);
            let r = vals.get(1).unwrap_or(&Value::Null);
            f(ctx, l, r)
        }
    }
}

/// First error among the operands, left to right.
pub fn first_error<'a>(operands: impl IntoIterator<Item = &'a Value>) -> Option<CalcError> {
    operands.into_iter().find_map(|v| v.as_error().cloned())
}

/// A number result, or `#NUM!` when it is not finite.
pub fn number(n: f64) -> Value {
    if n.is_finite() {
        Value::Number(n)
    } else {
        Value::error(CalcErrorKind::Num)
    }
}

/// Broadcast a numeric binary operation. Errors propagate, operands are
/// coerced with [`to_number`], anything else is `#VALUE!`.
pub fn binary_numeric(
    ctx: &Context,
    left: &Value,
    right: &Value,
    op: &dyn Fn(&Context, f64, f64) -> Value,
) -> Value {
    array_handler2(ctx, left, right, &|ctx, l, r| {
        if let Some(e) = first_error([l, r]) {
            return Value::Error(e);
        }
        match (to_number(l), to_number(r)) {
            (Some(a), Some(b)) => op(ctx, a, b),
            _ => Value::error(CalcErrorKind::Value),
        }
    })
}

/// Broadcast a numeric unary operation.
pub fn unary_numeric(ctx: &Context, val: &Value, op: fn(f64) -> f64) -> Value {
    array_handler1(ctx, val, &|_, v| {
        if let Value::Error(e) = v {
            return Value::Error(e.clone());
        }
        match to_number(v) {
            Some(n) => number(op(n)),
            None => Value::error(CalcErrorKind::Value),
        }
    })
}
