//! Operator functions. The compiler lowers `a+b` to a call of `binary+`,
//! `-a` to `unary-`, and so on.

use std::cmp::Ordering;

use sheetcalc_common::{CalcError, CalcErrorKind, RangeRef, Reference, UnionRef};

use super::utils::{operands, raw};
use crate::broadcast::{array_handler2, binary_numeric, first_error, number, unary_numeric};
use crate::coercion::{compare, strict_equal, to_text};
use crate::context::Context;
use crate::expr::Arg;
use crate::function_registry::Registry;
use crate::value::Value;

fn numeric(ctx: &mut Context, args: Vec<Arg>, op: fn(f64, f64) -> f64) -> Result<Value, CalcError> {
    let [l, r] = operands::<2>(ctx, args)?;
    Ok(binary_numeric(ctx, &l, &r, &|_, a, b| number(op(a, b))))
}

fn comparison(ctx: &mut Context, args: Vec<Arg>, test: fn(Ordering) -> bool) -> Result<Value, CalcError> {
    let [l, r] = operands::<2>(ctx, args)?;
    Ok(array_handler2(ctx, &l, &r, &|_, l, r| {
        if let Some(e) = first_error([l, r]) {
            return Value::Error(e);
        }
        match compare(l, r) {
            Some(ord) => Value::Boolean(test(ord)),
            None => Value::error(CalcErrorKind::Value),
        }
    }))
}

fn equality(ctx: &mut Context, args: Vec<Arg>, want: bool) -> Result<Value, CalcError> {
    let [l, r] = operands::<2>(ctx, args)?;
    Ok(array_handler2(ctx, &l, &r, &|_, l, r| match first_error([l, r]) {
        Some(e) => Value::Error(e),
        None => Value::Boolean(strict_equal(l, r) == want),
    }))
}

fn divide(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let [l, r] = operands::<2>(ctx, args)?;
    Ok(binary_numeric(ctx, &l, &r, &|ctx, a, b| match ctx.divide(a, b) {
        Ok(q) => number(q),
        Err(e) => Value::Error(e),
    }))
}

fn concat(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let [l, r] = operands::<2>(ctx, args)?;
    Ok(array_handler2(ctx, &l, &r, &|_, l, r| match first_error([l, r]) {
        Some(e) => Value::Error(e),
        None => Value::Text(to_text(l) + &to_text(r)),
    }))
}

/* ─────────────────────────── reference operators ─────────────────────────── */

fn range(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    match operands::<2>(ctx, args)? {
        [Value::Ref(Reference::Cell(l)), Value::Ref(Reference::Cell(r))] => {
            let sheet = l.sheet().unwrap_or(ctx.sheet()).to_string();
            let explicit = l.has_sheet();
            let range = RangeRef::new(l, r).set_sheet(Some(sheet), explicit);
            Ok(Value::Ref(Reference::Range(range)))
        }
        _ => Err(CalcError::new(CalcErrorKind::Ref)),
    }
}

fn union(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    match operands::<2>(ctx, args)? {
        [Value::Ref(l), Value::Ref(r)] => {
            let mut refs = match l {
                Reference::Union(u) => u.refs,
                other => vec![other],
            };
            refs.push(r);
            Ok(Value::Ref(Reference::Union(UnionRef { refs })))
        }
        _ => Err(CalcError::new(CalcErrorKind::Ref)),
    }
}

fn intersect(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    match operands::<2>(ctx, args)? {
        [Value::Ref(l), Value::Ref(r)] => match l.intersect(&r) {
            Reference::Null => Err(CalcError::new(CalcErrorKind::Null)),
            x => Ok(Value::Ref(x)),
        },
        _ => Err(CalcError::new(CalcErrorKind::Ref)),
    }
}

fn unary(ctx: &mut Context, args: Vec<Arg>, op: fn(f64) -> f64) -> Result<Value, CalcError> {
    let [v] = operands::<1>(ctx, args)?;
    Ok(unary_numeric(ctx, &v, op))
}

pub(crate) fn install(reg: &Registry) {
    raw(reg, "binary+", |ctx, args| numeric(ctx, args, |a, b| a + b));
    raw(reg, "binary-", |ctx, args| numeric(ctx, args, |a, b| a - b));
    raw(reg, "binary*", |ctx, args| numeric(ctx, args, |a, b| a * b));
    raw(reg, "binary/", divide);
    raw(reg, "binary^", |ctx, args| numeric(ctx, args, f64::powf));
    raw(reg, "binary&", concat);
    raw(reg, "binary=", |ctx, args| equality(ctx, args, true));
    raw(reg, "binary<>", |ctx, args| equality(ctx, args, false));
    raw(reg, "binary<", |ctx, args| comparison(ctx, args, Ordering::is_lt));
    raw(reg, "binary<=", |ctx, args| comparison(ctx, args, Ordering::is_le));
    raw(reg, "binary>", |ctx, args| comparison(ctx, args, Ordering::is_gt));
    raw(reg, "binary>=", |ctx, args| comparison(ctx, args, Ordering::is_ge));
    raw(reg, "binary:", range);
    raw(reg, "binary,", union);
    raw(reg, "binary ", intersect);
    raw(reg, "unary+", |ctx, args| unary(ctx, args, |x| x));
    raw(reg, "unary-", |ctx, args| unary(ctx, args, |x| -x));
    raw(reg, "unary%", |ctx, args| unary(ctx, args, |x| x / 100.0));
}
