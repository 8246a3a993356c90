use std::rc::Rc;

use sheetcalc_common::Reference;

use crate::config::EvalConfig;
use crate::formula::Formula;
use crate::value::Value;

/// One cell of a reference's footprint, as the host store sees it.
#[derive(Clone)]
pub struct CellEntry {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
    pub value: Value,
    pub formula: Option<Rc<Formula>>,
}

/// The host store formulas read from and report to.
///
/// Implementations own cell contents; the engine never mutates them except
/// through [`Workbook::on_formula`]. All methods take `&self`, so stores
/// that record results use interior mutability.
pub trait Workbook {
    /// Every cell covered by `reference`, with its stored value and formula.
    fn ref_cells(&self, reference: &Reference) -> Vec<CellEntry>;

    /// Dereference: a scalar for a cell, an [`Value::Array`] of rows for a
    /// range, an array of per-member results for a union.
    fn data(&self, reference: &Reference) -> Value;

    /// A formula at `(sheet, row, col)` finished with `value`.
    fn on_formula(&self, sheet: &str, row: u32, col: u32, value: &Value);

    fn eval_config(&self) -> EvalConfig {
        EvalConfig::default()
    }
}
