//! DATE and TIME constructors.

use sheetcalc_common::{CalcErrorKind, checked_pack_date, pack_time};

use super::super::utils::{checked, err, num};
use crate::args::{ArgSpec, ArgType};
use crate::context::Context;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

/// Two-digit style years below 1900 are offsets from 1900. Month and day
/// may overflow and roll into the next month or year, as long as the
/// result stays within years 0..=9999.
fn date_fn(_: &mut Context, args: &[Value]) -> Value {
    let mut year = num(&args[0]).trunc();
    if year < 1900.0 {
        year += 1900.0;
    }
    let month = num(&args[1]).trunc() - 1.0;
    checked_pack_date(year, month, num(&args[2])).map_or(err(CalcErrorKind::Num), Value::Number)
}

/// Fraction of a day; whole days wrap away.
fn time_fn(_: &mut Context, args: &[Value]) -> Value {
    let t = pack_time(
        num(&args[0]).trunc(),
        num(&args[1]).trunc(),
        num(&args[2]).trunc(),
        0.0,
    );
    if t < 0.0 {
        return err(CalcErrorKind::Num);
    }
    Value::Number(t - t.floor())
}

pub(super) fn install(reg: &Registry) {
    checked(
        reg,
        FunctionDef::new("date").sync(
            vec![
                ArgSpec::arg(
                    "year",
                    ArgType::Fails(Box::new(ArgType::Between(0.0, 9999.0)), CalcErrorKind::Num),
                ),
                ArgSpec::arg("month", ArgType::Number),
                ArgSpec::arg("day", ArgType::Number),
            ],
            date_fn,
        ),
    );
    checked(
        reg,
        FunctionDef::new("time").sync(
            vec![
                ArgSpec::arg("hour", ArgType::Number),
                ArgSpec::arg("minute", ArgType::Number),
                ArgSpec::arg("second", ArgType::Number),
            ],
            time_fn,
        ),
    );
}
