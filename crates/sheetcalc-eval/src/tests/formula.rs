use std::cell::RefCell;
use std::rc::Rc;

use sheetcalc_common::CalcErrorKind;

use super::*;
use crate::test_workbook::Notification;
use crate::traits::Workbook;
use crate::{Callback, Printer};

fn recorder() -> (Rc<RefCell<Vec<Value>>>, Callback) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, Box::new(move |v: &Value| sink.borrow_mut().push(v.clone())))
}

#[test]
fn division_by_zero_reports_once_and_caches_nothing() {
    // A1 = 1, B1 = 0, C1 = A1/B1
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, 1.0).with_cell("Sheet1", 0, 1, 0.0));
    let f = wb.set_formula(
        "Sheet1",
        0,
        2,
        formula(
            vec![Reference::cell(0, 0), Reference::cell(0, 1)],
            Expr::binary("/", Expr::Ref(0), Expr::Ref(1)),
        ),
    );
    let (seen, cb) = recorder();
    let store: Rc<dyn Workbook> = wb.clone();
    let out = f.exec(&store, "Sheet1", 0, 2, Some(cb));

    assert_eq!(out, Value::error(CalcErrorKind::Div));
    assert_eq!(*seen.borrow(), vec![Value::error(CalcErrorKind::Div)]);
    assert_eq!(f.value(), None);
    assert_eq!(
        wb.notifications(),
        vec![Notification {
            sheet: "Sheet1".into(),
            row: 0,
            col: 2,
            value: Value::error(CalcErrorKind::Div),
        }]
    );
}

#[test]
fn successful_result_is_cached_until_reset() {
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, 2.0));
    let f = wb.set_formula(
        "Sheet1",
        0,
        1,
        formula(vec![Reference::cell(0, 0)], Expr::binary("*", Expr::Ref(0), lit(3.0))),
    );
    assert_eq!(wb.exec("Sheet1", 0, 1), n(6.0));
    assert_eq!(f.value(), Some(n(6.0)));

    wb.set_value("Sheet1", 0, 0, 5.0);
    assert_eq!(wb.exec("Sheet1", 0, 1), n(6.0));

    f.reset();
    assert_eq!(wb.exec("Sheet1", 0, 1), n(15.0));
    assert_eq!(wb.notifications().len(), 2);
}

#[test]
fn cached_result_still_reaches_the_callback() {
    let wb = store(TestWorkbook::new());
    let f = wb.set_formula("Sheet1", 0, 0, formula(vec![], lit(4.0)));
    assert_eq!(wb.exec("Sheet1", 0, 0), n(4.0));

    let (seen, cb) = recorder();
    let store: Rc<dyn Workbook> = wb.clone();
    assert_eq!(f.exec(&store, "Sheet1", 0, 0, Some(cb)), n(4.0));
    assert_eq!(*seen.borrow(), vec![n(4.0)]);
}

#[test]
fn dependencies_are_evaluated_first() {
    // A1 = 1, A2 = A1 + 1, A3 = A2 + 1 (relative)
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, 1.0));
    let next = || formula(vec![rel_cell(-1, 0)], Expr::binary("+", Expr::Ref(0), lit(1.0)));
    let a2 = wb.set_formula("Sheet1", 1, 0, next());
    wb.set_formula("Sheet1", 2, 0, next());

    assert_eq!(wb.exec("Sheet1", 2, 0), n(3.0));
    assert_eq!(a2.value(), Some(n(2.0)));
    let order: Vec<u32> = wb.notifications().iter().map(|n| n.row).collect();
    assert_eq!(order, vec![1, 2]);
}

#[test]
fn diamond_dependencies_are_not_circular() {
    // A1 = 1, B1 = A1 + 1, C1 = A1 + B1
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, 1.0));
    wb.set_formula(
        "Sheet1",
        0,
        1,
        formula(vec![Reference::cell(0, 0)], Expr::binary("+", Expr::Ref(0), lit(1.0))),
    );
    wb.set_formula(
        "Sheet1",
        0,
        2,
        formula(
            vec![Reference::cell(0, 0), Reference::cell(0, 1)],
            Expr::binary("+", Expr::Ref(0), Expr::Ref(1)),
        ),
    );
    assert_eq!(wb.exec("Sheet1", 0, 2), n(3.0));
}

#[test]
fn unscoped_references_use_the_formula_sheet() {
    let wb = store(
        TestWorkbook::new()
            .with_cell("Data", 0, 0, 7.0)
            .with_cell("Sheet1", 0, 0, 1.0),
    );
    wb.set_formula("Data", 0, 1, formula(vec![Reference::cell(0, 0)], Expr::Ref(0)));
    assert_eq!(wb.exec("Data", 0, 1), n(7.0));

    let explicit = Reference::cell(0, 0).set_sheet(Some("Sheet1".into()), true);
    wb.set_formula("Data", 0, 2, formula(vec![explicit], Expr::Ref(0)));
    assert_eq!(wb.exec("Data", 0, 2), n(1.0));
}

#[test]
fn range_result_becomes_a_matrix() {
    let wb = store(TestWorkbook::new().with_range(
        "Sheet1",
        0,
        0,
        vec![vec![n(1.0), n(2.0)], vec![n(3.0), Value::Null]],
    ));
    let out = wb.eval(vec![Reference::range(0, 0, 1, 1)], Expr::Ref(0));
    assert_eq!(rows(&out), vec![vec![n(1.0), n(2.0)], vec![n(3.0), Value::Null]]);
}

#[test]
fn literal_array_layout_expands_ranges_in_place() {
    // {1, 2; A1:B2} with A1:B2 = {3, 4; 5, 6}
    let wb = store(TestWorkbook::new().with_range(
        "Sheet1",
        0,
        0,
        vec![vec![n(3.0), n(4.0)], vec![n(5.0), n(6.0)]],
    ));
    let out = wb.eval(
        vec![Reference::range(0, 0, 1, 1)],
        Expr::Array(vec![vec![lit(1.0), lit(2.0)], vec![Expr::Ref(0)]]),
    );
    assert_eq!(
        rows(&out),
        vec![
            vec![n(1.0), n(2.0)],
            vec![n(3.0), n(4.0)],
            vec![n(5.0), n(6.0)],
        ]
    );

    // {A1:A2, 9}: the row grows to the block's height
    let out = wb.eval(
        vec![Reference::range(0, 0, 1, 0)],
        Expr::Array(vec![vec![Expr::Ref(0), lit(9.0)]]),
    );
    assert_eq!(rows(&out), vec![vec![n(3.0), n(9.0)], vec![n(5.0), Value::Null]]);
}

#[test]
fn null_reference_result_is_ref_error() {
    let out = TestWorkbook::new().into_store().eval(vec![Reference::Null], Expr::Ref(0));
    assert_eq!(out, Value::error(CalcErrorKind::Ref));
}

#[test]
fn unknown_function_is_name_error() {
    assert_eq!(
        eval_expr(call("no_such_function", vec![lit(1.0)])),
        Value::error(CalcErrorKind::Name)
    );
}

#[test]
fn function_names_are_case_insensitive() {
    assert_eq!(eval_expr(call("SUM", vec![lit(1.0), lit(2.0)])), n(3.0));
}

#[test]
fn clone_is_a_fresh_formula() {
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, 1.0));
    let f = wb.set_formula("Sheet1", 1, 0, formula(vec![rel_cell(-1, 0)], Expr::Ref(0)));
    assert_eq!(wb.exec("Sheet1", 1, 0), n(1.0));

    let copy = f.as_ref().clone();
    assert_ne!(copy.id(), f.id());
    assert_eq!(copy.value(), None);
    assert_eq!(copy.refs(), f.refs());

    // pasted one row down it reads the cell above it
    wb.set_formula("Sheet1", 2, 0, copy);
    assert_eq!(wb.exec("Sheet1", 2, 0), n(1.0));
}

#[test]
fn print_uses_the_printer() {
    let printer: Printer = Rc::new(|refs: &[Reference], row: u32, col: u32| format!("{} refs at {row},{col}", refs.len()));
    let f = Formula::new(vec![Reference::cell(0, 0)], Expr::Ref(0), Some(printer));
    assert_eq!(f.print(3, 4), "1 refs at 3,4");
    assert_eq!(formula(vec![], lit(1.0)).print(0, 0), "");
}

#[test]
fn error_value_in_referenced_cell_propagates() {
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 0, 0, Value::error(CalcErrorKind::Na)));
    let out = wb.eval(vec![Reference::cell(0, 0)], Expr::binary("+", Expr::Ref(0), lit(1.0)));
    assert_eq!(out, Value::error(CalcErrorKind::Na));
}
