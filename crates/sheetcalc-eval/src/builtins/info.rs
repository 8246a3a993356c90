//! The `IS*` predicates.
//!
//! The compiler lowers `ISERROR(x)` to `-catch("iserror", x)` with `x`
//! passed lazily, so that an error raised while evaluating `x` is caught
//! and inspected instead of failing the whole formula.

use sheetcalc_common::{CalcError, CalcErrorKind, Reference};

use super::utils::raw;
use crate::context::Context;
use crate::expr::Arg;
use crate::function_registry::Registry;
use crate::value::Value;

fn catch_fn(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let mut args = args.into_iter();
    let predicate = match args.next() {
        Some(Arg::Value(Value::Text(name))) => name.to_lowercase(),
        _ => return Err(CalcError::new(CalcErrorKind::Value).with_message("-catch needs a predicate name")),
    };
    let ret = match args.next() {
        Some(arg) => arg.eval(ctx).unwrap_or_else(Value::Error),
        None => Value::Null,
    };
    let val = ctx
        .cell_values(std::slice::from_ref(&ret))
        .into_iter()
        .next()
        .unwrap_or(Value::Null);

    let answer = match predicate.as_str() {
        "isblank" => {
            matches!(ret, Value::Ref(Reference::Cell(_)))
                && (val.is_null() || matches!(&val, Value::Text(s) if s.is_empty()))
        }
        "iserror" => matches!(val, Value::Error(_)),
        "iserr" => matches!(&val, Value::Error(e) if !e.is(CalcErrorKind::Na)),
        "isna" => matches!(&val, Value::Error(e) if e.is(CalcErrorKind::Na)),
        "islogical" => matches!(val, Value::Boolean(_)),
        "isnontext" => !matches!(&val, Value::Text(s) if !s.is_empty()),
        "istext" => matches!(&val, Value::Text(s) if !s.is_empty()),
        "isnumber" => matches!(val, Value::Number(_)),
        "isref" => matches!(ret, Value::Ref(Reference::Cell(_) | Reference::Range(_))),
        other => {
            #[cfg(feature = "tracing")]
            tracing::debug!(predicate = other, "unknown error predicate");
            return Err(CalcError::new(CalcErrorKind::Name).with_message(format!("no predicate {other}")));
        }
    };
    Ok(Value::Boolean(answer))
}

pub(crate) fn install(reg: &Registry) {
    raw(reg, "-catch", catch_fn);
}
