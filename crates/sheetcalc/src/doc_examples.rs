use sheetcalc_eval::test_workbook::TestWorkbook;

use crate::{Expr, Reference, Value};

/// Evaluate an expression tree in an empty in-memory workbook and return
/// the result.
///
/// This helper is intended for documentation examples to avoid repetitive
/// setup.
///
/// # Example
///
/// ```rust
/// # use sheetcalc::doc_examples::eval_expr;
/// use sheetcalc::{Expr, Value};
///
/// let sum = Expr::call("sum", vec![Expr::lit(1.0), Expr::lit(2.0), Expr::lit(3.0)]);
/// assert_eq!(eval_expr(sum), Value::Number(6.0));
/// ```
pub fn eval_expr(handler: Expr) -> Value {
    TestWorkbook::new().into_store().eval(Vec::new(), handler)
}

/// Like [`eval_expr`], over a single column of values starting at `A1`
/// that the expression reaches through `Expr::Ref(0)`.
///
/// ```rust
/// # use sheetcalc::doc_examples::eval_over_column;
/// use sheetcalc::{Expr, Value};
///
/// let avg = Expr::call("average", vec![Expr::Ref(0)]);
/// assert_eq!(eval_over_column(&[2.0, 4.0, 9.0], avg), Value::Number(5.0));
/// ```
pub fn eval_over_column(values: &[f64], handler: Expr) -> Value {
    let column = values.iter().map(|v| vec![Value::Number(*v)]).collect();
    let wb = TestWorkbook::new().with_range("Sheet1", 0, 0, column).into_store();
    let last = values.len().max(1) as i32 - 1;
    wb.eval(vec![Reference::range(0, 0, last, 0)], handler)
}
