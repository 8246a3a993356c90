//! Reference information functions: ROW, ROWS, COLUMN, COLUMNS
//!
//! - ROW([reference]) / COLUMN([reference]) - 1-based position of the
//!   reference's top-left cell, or of the formula's own cell when omitted
//! - ROWS(array) / COLUMNS(array) - size of a range, array or matrix

use sheetcalc_common::Reference;

use super::super::utils::checked;
use crate::args::{ArgSpec, ArgType};
use crate::context::Context;
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

fn optional_area() -> Vec<ArgSpec> {
    vec![ArgSpec::arg("reference", ArgType::or([ArgType::Area, ArgType::Null]))]
}

fn top_left(v: &Value) -> Option<(i32, i32)> {
    match v {
        Value::Ref(Reference::Cell(c)) => Some((c.row, c.col)),
        Value::Ref(Reference::Range(r)) => Some((r.top_left.row, r.top_left.col)),
        _ => None,
    }
}

fn row_fn(ctx: &mut Context, a: &[Value]) -> Value {
    let row = top_left(&a[0]).map_or(ctx.row() as i32, |(r, _)| r);
    Value::Number(row as f64 + 1.0)
}

fn column_fn(ctx: &mut Context, a: &[Value]) -> Value {
    let col = top_left(&a[0]).map_or(ctx.col() as i32, |(_, c)| c);
    Value::Number(col as f64 + 1.0)
}

pub(super) fn install(reg: &Registry) {
    checked(reg, FunctionDef::new("row").sync(optional_area(), row_fn));
    checked(reg, FunctionDef::new("column").sync(optional_area(), column_fn));
    let array = || vec![ArgSpec::arg("array", ArgType::or([ArgType::Matrix, ArgType::Any]))];
    checked(
        reg,
        FunctionDef::new("rows").sync(array(), |_, a| match &a[0] {
            Value::Matrix(m) => Value::Number(m.height() as f64),
            _ => Value::Number(1.0),
        }),
    );
    checked(
        reg,
        FunctionDef::new("columns").sync(array(), |_, a| match &a[0] {
            Value::Matrix(m) => Value::Number(m.width() as f64),
            _ => Value::Number(1.0),
        }),
    );
}
