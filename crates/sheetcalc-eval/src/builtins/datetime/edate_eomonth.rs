//! Month arithmetic: EDATE and EOMONTH.

use sheetcalc_common::{CalcErrorKind, MAX_YEAR, MIN_YEAR, checked_pack_date, days_in_month, unpack_date};

use super::super::utils::{checked, err, num};
use super::serial_arg;
use crate::args::{ArgSpec, ArgType};
use crate::context::Context;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

fn spec() -> Vec<ArgSpec> {
    vec![serial_arg("start_date"), ArgSpec::arg("months", ArgType::Number)]
}

/// Year, zero-based month and day of month `months` after `start`, or
/// `None` when the target month leaves the calendar.
fn shift_months(start: f64, months: f64) -> Option<(i32, u32, u32)> {
    let d = unpack_date(start);
    let month = f64::from(d.month) + months.trunc();
    let year = f64::from(d.year) + (month / 12.0).floor();
    if !(f64::from(MIN_YEAR)..=f64::from(MAX_YEAR)).contains(&year) {
        return None;
    }
    Some((year as i32, month.rem_euclid(12.0) as u32, d.date))
}

/// Same day of month `months` later, clamped to the target month's length.
fn edate_fn(_: &mut Context, a: &[Value]) -> Value {
    shift_months(num(&a[0]), num(&a[1]))
        .and_then(|(year, month, date)| {
            let date = i64::from(date).min(days_in_month(year, month));
            checked_pack_date(f64::from(year), f64::from(month), date as f64)
        })
        .map_or(err(CalcErrorKind::Num), Value::Number)
}

/// Last day of the month `months` later.
fn eomonth_fn(_: &mut Context, a: &[Value]) -> Value {
    shift_months(num(&a[0]), num(&a[1]))
        .and_then(|(year, month, _)| checked_pack_date(f64::from(year), f64::from(month + 1), 0.0))
        .map_or(err(CalcErrorKind::Num), Value::Number)
}

pub(super) fn install(reg: &Registry) {
    checked(reg, FunctionDef::new("edate").sync(spec(), edate_fn));
    checked(reg, FunctionDef::new("eomonth").sync(spec(), eomonth_fn));
}
