mod adjust;
mod circular;
mod formula;

use std::rc::Rc;

use sheetcalc_common::{CellRef, Rel};

use crate::expr::Expr;
use crate::test_workbook::TestWorkbook;
use crate::value::Value;
use crate::{Formula, Reference};

pub(crate) fn n(x: f64) -> Value {
    Value::Number(x)
}

pub(crate) fn t(s: &str) -> Value {
    Value::Text(s.to_string())
}

pub(crate) fn lit(v: impl Into<Value>) -> Expr {
    Expr::lit(v)
}

pub(crate) fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(name, args)
}

/// Relative single-cell reference, offsets from the formula cell.
pub(crate) fn rel_cell(drow: i32, dcol: i32) -> Reference {
    Reference::Cell(CellRef::new(drow, dcol, Rel::ROW | Rel::COL))
}

/// Evaluate an expression with no references against an empty workbook.
pub(crate) fn eval_expr(handler: Expr) -> Value {
    TestWorkbook::new().into_store().eval(vec![], handler)
}

pub(crate) fn formula(refs: Vec<Reference>, handler: Expr) -> Formula {
    Formula::new(refs, handler, None)
}

pub(crate) fn rows(v: &Value) -> Vec<Vec<Value>> {
    match v {
        Value::Matrix(m) => m.to_rows(),
        other => panic!("expected a matrix, got {other:?}"),
    }
}

pub(crate) fn store(wb: TestWorkbook) -> Rc<TestWorkbook> {
    wb.into_store()
}
