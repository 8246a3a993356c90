use sheetcalc_common::{CalcErrorKind, CellRef, RangeRef, Rel, UnionRef};

use super::*;
use crate::formula::{AdjustError, Axis};
use crate::traits::Workbook;

fn both() -> Rel {
    Rel::ROW | Rel::COL
}

fn rel_range(r1: i32, c1: i32, r2: i32, c2: i32) -> Reference {
    Reference::Range(RangeRef::new(CellRef::new(r1, c1, both()), CellRef::new(r2, c2, both())))
}

fn refs_after(refs: Vec<Reference>, axis: Axis, start: i32, delta: i32, row: u32, col: u32) -> Vec<Reference> {
    let f = formula(refs, lit(0.0));
    f.adjust(axis, start, delta, row, col).unwrap();
    f.refs()
}

#[test]
fn inserted_rows_push_absolute_refs_down() {
    let out = refs_after(vec![Reference::cell(4, 0), Reference::cell(1, 0)], Axis::Row, 2, 2, 0, 0);
    assert_eq!(out, vec![Reference::cell(6, 0), Reference::cell(1, 0)]);
}

#[test]
fn refs_above_the_insertion_stay_put() {
    // formula at row 5; one row inserted at row 2
    let out = refs_after(vec![Reference::cell(1, 0), Reference::cell(3, 0)], Axis::Row, 2, 1, 5, 0);
    assert_eq!(out, vec![Reference::cell(1, 0), Reference::cell(4, 0)]);
}

#[test]
fn relative_ref_moves_with_its_formula() {
    // formula at row 10 pointing two rows down; rows inserted above both
    let out = refs_after(vec![rel_cell(2, 0)], Axis::Row, 5, 3, 10, 0);
    assert_eq!(out, vec![rel_cell(2, 0)]);
}

#[test]
fn relative_ref_stretches_across_an_insertion() {
    // formula at row 0 pointing at row 5; two rows inserted at row 3
    let out = refs_after(vec![rel_cell(5, 0)], Axis::Row, 3, 2, 0, 0);
    assert_eq!(out, vec![rel_cell(7, 0)]);

    // formula at row 8 pointing at row 1; two rows inserted at row 3
    let out = refs_after(vec![rel_cell(-7, 0)], Axis::Row, 3, 2, 8, 0);
    assert_eq!(out, vec![rel_cell(-9, 0)]);
}

#[test]
fn deleted_rows_pull_refs_up() {
    let out = refs_after(vec![Reference::cell(9, 0), rel_cell(9, 0)], Axis::Row, 3, -2, 0, 0);
    assert_eq!(out, vec![Reference::cell(7, 0), rel_cell(7, 0)]);
}

#[test]
fn columns_adjust_independently_of_rows() {
    let out = refs_after(vec![Reference::cell(5, 3), Reference::cell(5, 1)], Axis::Col, 2, 1, 0, 0);
    assert_eq!(out, vec![Reference::cell(5, 4), Reference::cell(5, 1)]);
}

#[test]
fn deleted_cell_becomes_ref_error() {
    let wb = store(TestWorkbook::new().with_cell("Sheet1", 4, 0, 1.0));
    let f = wb.set_formula(
        "Sheet1",
        0,
        0,
        formula(vec![Reference::cell(4, 0)], Expr::binary("+", Expr::Ref(0), lit(1.0))),
    );
    assert_eq!(wb.exec("Sheet1", 0, 0), n(2.0));

    f.adjust(Axis::Row, 3, -2, 0, 0).unwrap();
    assert_eq!(f.refs(), vec![Reference::Null]);
    f.reset();
    assert_eq!(wb.exec("Sheet1", 0, 0), Value::error(CalcErrorKind::Ref));
}

#[test]
fn fully_deleted_range_becomes_null() {
    let out = refs_after(vec![Reference::range(3, 0, 4, 2)], Axis::Row, 3, -2, 0, 0);
    assert_eq!(out, vec![Reference::Null]);

    let f = formula(vec![Reference::Null], Expr::Ref(0));
    let wb = store(TestWorkbook::new());
    let store: Rc<dyn Workbook> = wb.clone();
    assert_eq!(Rc::new(f).exec(&store, "Sheet1", 0, 0, None), Value::error(CalcErrorKind::Ref));
}

#[test]
fn range_shrinks_when_its_tail_is_deleted() {
    // A2:A9 from A1, rows 5..=9 deleted
    let out = refs_after(vec![Reference::range(1, 0, 8, 0)], Axis::Row, 5, -5, 0, 0);
    assert_eq!(out, vec![Reference::range(1, 0, 3, 0)]);
}

#[test]
fn range_losing_its_top_left_keeps_the_corner_in_place() {
    // formula at A11 over A3:A7 (relative); rows 2..=4 deleted
    let f = Rc::new(formula(vec![rel_range(-8, 0, -4, 0)], call("sum", vec![Expr::Ref(0)])));
    f.adjust(Axis::Row, 1, -3, 10, 0).unwrap();
    assert_eq!(f.refs(), vec![rel_range(-5, 0, -4, 0)]);

    // the formula now sits on A8 and sums A3:A4
    let wb = store(TestWorkbook::new().with_range(
        "Sheet1",
        2,
        0,
        vec![vec![n(10.0)], vec![n(20.0)], vec![n(40.0)]],
    ));
    let store: Rc<dyn Workbook> = wb.clone();
    assert_eq!(f.exec(&store, "Sheet1", 7, 0, None), n(30.0));
}

#[test]
fn union_refs_cannot_be_adjusted() {
    let union = Reference::Union(UnionRef {
        refs: vec![Reference::cell(0, 0), Reference::cell(5, 5)],
    });
    let f = formula(vec![Reference::cell(9, 0), union.clone()], lit(0.0));
    assert_eq!(f.adjust(Axis::Row, 1, 1, 0, 0), Err(AdjustError::Union));
    assert_eq!(f.refs(), vec![Reference::cell(9, 0), union]);
}

#[test]
fn names_and_null_refs_are_left_alone() {
    let out = refs_after(vec![Reference::name("rate"), Reference::Null], Axis::Row, 0, 4, 2, 2);
    assert_eq!(out, vec![Reference::name("rate"), Reference::Null]);
}

#[test]
fn adjusted_formula_resolves_fresh_references() {
    // A1 = A5, then two rows inserted at row 2: A1 = A7
    let wb = store(
        TestWorkbook::new()
            .with_cell("Sheet1", 4, 0, "old")
            .with_cell("Sheet1", 6, 0, "new"),
    );
    let f = wb.set_formula("Sheet1", 0, 0, formula(vec![Reference::cell(4, 0)], Expr::Ref(0)));
    assert_eq!(wb.exec("Sheet1", 0, 0), t("old"));

    f.adjust(Axis::Row, 2, 2, 0, 0).unwrap();
    f.reset();
    assert_eq!(wb.exec("Sheet1", 0, 0), t("new"));
}
