use std::sync::Arc;

use sheetcalc_common::{CalcError, CalcErrorKind};

use crate::args::SignatureError;
use crate::context::Context;
use crate::expr::Arg;
use crate::function::{CheckedFunction, Function, RawFunction, RawHandler};
use crate::function_registry::Registry;
use crate::value::Value;

pub(crate) fn add(reg: &Registry, f: Arc<dyn Function>) {
    reg.insert(f.name().to_lowercase(), f);
}

pub(crate) fn raw(reg: &Registry, name: &'static str, handler: RawHandler) {
    add(reg, Arc::new(RawFunction::new(name, handler)));
}

/// Built-in signatures are fixed at compile time; a rejected one is a bug.
pub(crate) fn checked(reg: &Registry, def: Result<CheckedFunction, SignatureError>) {
    match def {
        Ok(f) => add(reg, Arc::new(f)),
        Err(e) => panic!("invalid built-in signature: {e}"),
    }
}

/// Evaluate the first `N` arguments; missing ones are blank.
pub(crate) fn operands<const N: usize>(ctx: &mut Context, args: Vec<Arg>) -> Result<[Value; N], CalcError> {
    let mut out: [Value; N] = std::array::from_fn(|_| Value::Null);
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg.eval(ctx)?;
    }
    Ok(out)
}

/// Numeric argument after a signature check.
pub(crate) fn num(v: &Value) -> f64 {
    match v {
        Value::Number(n) => *n,
        Value::Boolean(true) => 1.0,
        _ => 0.0,
    }
}

pub(crate) fn err(kind: CalcErrorKind) -> Value {
    Value::error(kind)
}
