//! CHOOSE function - selects a value from a list based on an index
//!
//! - CHOOSE(index_num, value1, [value2], ...)
//! - only the selected value is evaluated
//! - Returns #VALUE! if index is past the last value

use sheetcalc_common::{CalcError, CalcErrorKind};

use super::super::utils::{checked, num};
use crate::args::{ArgSpec, ArgType};
use crate::context::Context;
use crate::expr::Arg;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

fn choose_fn(ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
    let mut args = args.into_iter();
    let index = args.next().and_then(|a| a.value().map(num)).unwrap_or(0.0).trunc() as usize;
    if index == 0 {
        return Err(CalcError::new(CalcErrorKind::Value));
    }
    match args.nth(index - 1) {
        Some(choice) => choice.eval(ctx),
        None => Err(CalcError::new(CalcErrorKind::Value).with_message(format!("no value #{index}"))),
    }
}

pub(super) fn install(reg: &Registry) {
    checked(
        reg,
        FunctionDef::new("choose").lazy(
            vec![
                ArgSpec::arg("index_num", ArgType::Positive),
                ArgSpec::Repeat(vec![ArgSpec::arg("value", ArgType::AnyLazy)]),
            ],
            choose_fn,
        ),
    );
}
