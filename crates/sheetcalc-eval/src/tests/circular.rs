use sheetcalc_common::CalcErrorKind;

use super::*;
use crate::config::EvalConfig;

fn plus_one(r: Reference) -> Formula {
    formula(vec![r], Expr::binary("+", Expr::Ref(0), lit(1.0)))
}

#[test]
fn self_reference_is_circular() {
    let wb = store(TestWorkbook::new());
    let f = wb.set_formula("Sheet1", 0, 0, plus_one(Reference::cell(0, 0)));
    assert_eq!(wb.exec("Sheet1", 0, 0), Value::error(CalcErrorKind::Circular));
    assert_eq!(f.value(), None);
}

#[test]
fn two_cycle_terminates_with_circular_on_both_cells() {
    // A1 = B1 + 1, B1 = A1 + 1
    let wb = store(TestWorkbook::new());
    wb.set_formula("Sheet1", 0, 0, plus_one(Reference::cell(0, 1)));
    wb.set_formula("Sheet1", 0, 1, plus_one(Reference::cell(0, 0)));

    assert_eq!(wb.exec("Sheet1", 0, 0), Value::error(CalcErrorKind::Circular));
    let reported: Vec<(u32, Value)> = wb.notifications().into_iter().map(|n| (n.col, n.value)).collect();
    assert_eq!(
        reported,
        vec![
            (1, Value::error(CalcErrorKind::Circular)),
            (0, Value::error(CalcErrorKind::Circular)),
        ]
    );
}

#[test]
fn cycle_through_a_range_is_detected() {
    // A1 = SUM(A1:A3)
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 1, 0, 2.0));
    wb.set_formula(
        "Sheet1",
        0,
        0,
        formula(vec![Reference::range(0, 0, 2, 0)], call("sum", vec![Expr::Ref(0)])),
    );
    assert_eq!(wb.exec("Sheet1", 0, 0), Value::error(CalcErrorKind::Circular));
}

#[test]
fn a_cell_outside_the_cycle_sees_circular_too() {
    // A1 = B1 + 1, B1 = A1 + 1, C1 = A1 * 2
    let wb = store(TestWorkbook::new());
    wb.set_formula("Sheet1", 0, 0, plus_one(Reference::cell(0, 1)));
    wb.set_formula("Sheet1", 0, 1, plus_one(Reference::cell(0, 0)));
    wb.set_formula(
        "Sheet1",
        0,
        2,
        formula(vec![Reference::cell(0, 0)], Expr::binary("*", Expr::Ref(0), lit(2.0))),
    );
    assert_eq!(wb.exec("Sheet1", 0, 2), Value::error(CalcErrorKind::Circular));
}

#[test]
fn cycle_is_retried_after_it_is_broken() {
    let wb = store(TestWorkbook::new());
    wb.set_formula("Sheet1", 0, 0, plus_one(Reference::cell(0, 1)));
    wb.set_formula("Sheet1", 0, 1, plus_one(Reference::cell(0, 0)));
    assert_eq!(wb.exec("Sheet1", 0, 0), Value::error(CalcErrorKind::Circular));

    wb.set_value("Sheet1", 0, 1, 10.0);
    assert_eq!(wb.exec("Sheet1", 0, 0), n(11.0));
}

#[test]
fn overly_deep_chain_fails_with_calc() {
    // A1 = 0, A(k+1) = A(k) + 1 for ten rows, with room for five levels
    let wb = store(
        TestWorkbook::new()
            .with_config(EvalConfig { max_depth: 5 })
            .with_cell("Sheet1", 0, 0, 0.0),
    );
    for row in 1..=10 {
        wb.set_formula("Sheet1", row, 0, plus_one(rel_cell(-1, 0)));
    }
    assert_eq!(wb.exec("Sheet1", 10, 0), Value::error(CalcErrorKind::Calc));

    // evaluating bottom-up keeps every chain short
    wb.reset_formulas();
    for row in 1..=10 {
        assert_eq!(wb.exec("Sheet1", row, 0), n(row as f64));
    }
}

#[test]
fn formulas_that_depend_on_a_cycle_can_inspect_it() {
    // C1 = C1 + 1, B1 = ISERROR(C1), D1 = IFERROR(C1, 0)
    let wb = store(TestWorkbook::new());
    let c1 = wb.set_formula("Sheet1", 0, 2, plus_one(Reference::cell(0, 2)));
    wb.set_formula(
        "Sheet1",
        0,
        1,
        formula(
            vec![Reference::cell(0, 2)],
            call("-catch", vec![lit("iserror"), Expr::lazy(Expr::Ref(0))]),
        ),
    );
    wb.set_formula(
        "Sheet1",
        0,
        3,
        formula(
            vec![Reference::cell(0, 2)],
            call("iferror", vec![Expr::lazy(Expr::Ref(0)), Expr::lazy(lit(0.0))]),
        ),
    );

    assert_eq!(wb.exec("Sheet1", 0, 1), Value::Boolean(true));
    assert_eq!(wb.exec("Sheet1", 0, 3), n(0.0));
    assert_eq!(wb.value("Sheet1", 0, 2), Value::error(CalcErrorKind::Circular));
    assert_eq!(c1.value(), None);
}

#[test]
fn only_cycle_members_skip_their_handlers() {
    // A1 = B1 + 1, B1 = A1 + 1, C1 = ISERROR(A1)
    let wb = store(TestWorkbook::new());
    wb.set_formula("Sheet1", 0, 0, plus_one(Reference::cell(0, 1)));
    wb.set_formula("Sheet1", 0, 1, plus_one(Reference::cell(0, 0)));
    wb.set_formula(
        "Sheet1",
        0,
        2,
        formula(
            vec![Reference::cell(0, 0)],
            call("-catch", vec![lit("iserror"), Expr::lazy(Expr::Ref(0))]),
        ),
    );

    assert_eq!(wb.exec("Sheet1", 0, 2), Value::Boolean(true));
    let reported: Vec<(u32, Value)> = wb.notifications().into_iter().map(|n| (n.col, n.value)).collect();
    assert_eq!(
        reported,
        vec![
            (1, Value::error(CalcErrorKind::Circular)),
            (0, Value::error(CalcErrorKind::Circular)),
            (2, Value::Boolean(true)),
        ]
    );
}
