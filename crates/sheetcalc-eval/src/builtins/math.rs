//! Arithmetic functions and numeric aggregates.
//!
//! Aggregates walk every number reachable from their arguments (through
//! ranges, matrices and literal arrays) and skip everything else.

use sheetcalc_common::CalcErrorKind;

use super::utils::{checked, err, num};
use crate::args::{ArgSpec, ArgType};
use crate::broadcast::number;
use crate::context::Context;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

fn numbers(ctx: &Context, args: &[Value]) -> Vec<f64> {
    let mut out = Vec::new();
    for a in args {
        ctx.for_numbers(a, &mut |n| out.push(n));
    }
    out
}

/* ─────────────────────────── aggregates ─────────────────────────── */

fn sum_fn(ctx: &mut Context, args: &[Value]) -> Value {
    number(numbers(ctx, args).iter().sum())
}

fn count_fn(ctx: &mut Context, args: &[Value]) -> Value {
    Value::Number(numbers(ctx, args).len() as f64)
}

fn average_fn(ctx: &mut Context, args: &[Value]) -> Value {
    let nums = numbers(ctx, args);
    if nums.is_empty() {
        return err(CalcErrorKind::Div);
    }
    number(nums.iter().sum::<f64>() / nums.len() as f64)
}

fn min_fn(ctx: &mut Context, args: &[Value]) -> Value {
    let nums = numbers(ctx, args);
    Value::Number(nums.into_iter().reduce(f64::min).unwrap_or(0.0))
}

fn max_fn(ctx: &mut Context, args: &[Value]) -> Value {
    let nums = numbers(ctx, args);
    Value::Number(nums.into_iter().reduce(f64::max).unwrap_or(0.0))
}

/* ─────────────────────────── scalar math ─────────────────────────── */

/// Digits past what an f64 can scale to leave `x` as is, or round it to
/// zero when negative.
fn round_half_away(x: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    if factor == 0.0 {
        return 0.0;
    }
    let scaled = x * factor;
    if !scaled.is_finite() {
        return x;
    }
    scaled.round() / factor
}

fn round_fn(_: &mut Context, args: &[Value]) -> Value {
    number(round_half_away(num(&args[0]), num(&args[1]).trunc() as i32))
}

/// Sign follows the divisor.
fn mod_fn(_: &mut Context, args: &[Value]) -> Value {
    let (n, d) = (num(&args[0]), num(&args[1]));
    number(n - d * (n / d).floor())
}

fn power_fn(_: &mut Context, args: &[Value]) -> Value {
    let (base, exp) = (num(&args[0]), num(&args[1]));
    if base == 0.0 && exp < 0.0 {
        return err(CalcErrorKind::Div);
    }
    number(base.powf(exp))
}

pub(crate) fn install(reg: &Registry) {
    let values = || vec![ArgSpec::Repeat(vec![ArgSpec::arg("value", ArgType::Any)])];
    checked(reg, FunctionDef::new("sum").sync(values(), sum_fn));
    checked(reg, FunctionDef::new("count").sync(values(), count_fn));
    checked(reg, FunctionDef::new("average").sync(values(), average_fn));
    checked(reg, FunctionDef::new("min").sync(values(), min_fn));
    checked(reg, FunctionDef::new("max").sync(values(), max_fn));

    checked(
        reg,
        FunctionDef::new("abs").sync(vec![ArgSpec::arg("number", ArgType::Number)], |_, a| {
            Value::Number(num(&a[0]).abs())
        }),
    );
    checked(
        reg,
        FunctionDef::new("sqrt").sync(
            vec![ArgSpec::arg("number", ArgType::Fails(Box::new(ArgType::NonNegative), CalcErrorKind::Num))],
            |_, a| Value::Number(num(&a[0]).sqrt()),
        ),
    );
    checked(
        reg,
        FunctionDef::new("mod").sync(
            vec![
                ArgSpec::arg("number", ArgType::Number),
                ArgSpec::arg("divisor", ArgType::Divisor),
            ],
            mod_fn,
        ),
    );
    checked(
        reg,
        FunctionDef::new("power").sync(
            vec![
                ArgSpec::arg("number", ArgType::Number),
                ArgSpec::arg("power", ArgType::Number),
            ],
            power_fn,
        ),
    );
    checked(
        reg,
        FunctionDef::new("round").sync(
            vec![
                ArgSpec::arg("number", ArgType::Number),
                ArgSpec::arg("digits", ArgType::optional_number(0.0)),
            ],
            round_fn,
        ),
    );
}
