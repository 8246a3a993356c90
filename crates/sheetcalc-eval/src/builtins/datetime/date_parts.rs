//! Component extraction: YEAR, MONTH, DAY, WEEKDAY, HOUR, MINUTE, SECOND.

use sheetcalc_common::{CalcErrorKind, UnpackedDate, UnpackedTime, unpack_date, unpack_time};

use super::super::utils::{checked, num};
use super::serial_arg;
use crate::args::{ArgLiteral, ArgSpec, ArgType};
use crate::context::Context;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

fn serial() -> Vec<ArgSpec> {
    vec![ArgSpec::arg("serial_number", ArgType::Number)]
}

fn date_part(reg: &Registry, name: &str, part: fn(UnpackedDate) -> u32) {
    checked(
        reg,
        FunctionDef::new(name).sync(vec![serial_arg("serial_number")], move |_, a| {
            Value::Number(part(unpack_date(num(&a[0]))) as f64)
        }),
    );
}

fn time_part(reg: &Registry, name: &str, part: fn(UnpackedTime) -> u32) {
    checked(
        reg,
        FunctionDef::new(name).sync(serial(), move |_, a| {
            Value::Number(part(unpack_time(num(&a[0]))) as f64)
        }),
    );
}

/// Return type 1: Sunday = 1 .. Saturday = 7. Type 2: Monday = 1 ..
/// Sunday = 7. Type 3: Monday = 0 .. Sunday = 6.
fn weekday_fn(_: &mut Context, a: &[Value]) -> Value {
    let day = unpack_date(num(&a[0])).day;
    let n = match num(&a[1]) as i32 {
        2 => (day + 6) % 7 + 1,
        3 => (day + 6) % 7,
        _ => day + 1,
    };
    Value::Number(n as f64)
}

pub(super) fn install(reg: &Registry) {
    date_part(reg, "year", |d| d.year.max(0) as u32);
    date_part(reg, "month", |d| d.month + 1);
    date_part(reg, "day", |d| d.date);
    time_part(reg, "hour", |t| t.hours);
    time_part(reg, "minute", |t| t.minutes);
    time_part(reg, "second", |t| t.seconds);

    let return_type = ArgType::or([
        ArgType::Values(vec![
            ArgLiteral::Number(1.0),
            ArgLiteral::Number(2.0),
            ArgLiteral::Number(3.0),
        ]),
        ArgType::Default(ArgLiteral::Number(1.0)),
    ]);
    checked(
        reg,
        FunctionDef::new("weekday").sync(
            vec![
                serial_arg("serial_number"),
                ArgSpec::arg("return_type", ArgType::Fails(Box::new(return_type), CalcErrorKind::Num)),
            ],
            weekday_fn,
        ),
    );
}
