//! Lightweight in-memory workbook for unit and integration tests.
//!
//! Cells live in one map keyed by `(sheet, row, col)`; references without
//! a sheet resolve against `Sheet1`. Every formula result reported through
//! [`Workbook::on_formula`] is written back to the cell and logged.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sheetcalc_common::{CalcErrorKind, Reference};

use crate::config::EvalConfig;
use crate::expr::Expr;
use crate::formula::Formula;
use crate::traits::{CellEntry, Workbook};
use crate::value::Value;

pub const DEFAULT_SHEET: &str = "Sheet1";

type CellKey = (String, u32, u32);

#[derive(Default, Clone)]
struct TestCell {
    value: Value,
    formula: Option<Rc<Formula>>,
}

/// One `on_formula` report.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
    pub value: Value,
}

#[derive(Default)]
pub struct TestWorkbook {
    cells: RefCell<FxHashMap<CellKey, TestCell>>,
    notifications: RefCell<Vec<Notification>>,
    config: EvalConfig,
}

impl TestWorkbook {
    /* ─────────────── constructors ─────────────── */
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish building and share the store.
    pub fn into_store(self) -> Rc<Self> {
        Rc::new(self)
    }

    /* ─────────────── cell helpers ─────────────── */
    pub fn with_cell<V: Into<Value>>(self, sheet: &str, row: u32, col: u32, v: V) -> Self {
        self.set_value(sheet, row, col, v);
        self
    }

    pub fn with_range(self, sheet: &str, row: u32, col: u32, data: Vec<Vec<Value>>) -> Self {
        for (r_off, r) in data.into_iter().enumerate() {
            for (c_off, v) in r.into_iter().enumerate() {
                self.set_value(sheet, row + r_off as u32, col + c_off as u32, v);
            }
        }
        self
    }

    pub fn with_formula(self, sheet: &str, row: u32, col: u32, formula: Formula) -> Self {
        self.set_formula(sheet, row, col, formula);
        self
    }

    pub fn set_value<V: Into<Value>>(&self, sheet: &str, row: u32, col: u32, v: V) {
        let mut cells = self.cells.borrow_mut();
        let cell = cells.entry((sheet.to_string(), row, col)).or_default();
        cell.value = v.into();
        cell.formula = None;
    }

    pub fn set_formula(&self, sheet: &str, row: u32, col: u32, formula: Formula) -> Rc<Formula> {
        let formula = Rc::new(formula);
        let mut cells = self.cells.borrow_mut();
        let cell = cells.entry((sheet.to_string(), row, col)).or_default();
        cell.value = Value::Null;
        cell.formula = Some(Rc::clone(&formula));
        formula
    }

    pub fn formula(&self, sheet: &str, row: u32, col: u32) -> Option<Rc<Formula>> {
        self.cells
            .borrow()
            .get(&(sheet.to_string(), row, col))
            .and_then(|c| c.formula.clone())
    }

    /// Stored value (for formula cells, the last reported result).
    pub fn value(&self, sheet: &str, row: u32, col: u32) -> Value {
        self.cells
            .borrow()
            .get(&(sheet.to_string(), row, col))
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }

    /// Reset every formula's cache and clear formula cells' values.
    pub fn reset_formulas(&self) {
        for cell in self.cells.borrow_mut().values_mut() {
            if let Some(f) = &cell.formula {
                f.reset();
                cell.value = Value::Null;
            }
        }
    }

    /* ─────────────── evaluation shortcuts ─────────────── */

    /// Execute the formula stored at `(sheet, row, col)`.
    pub fn exec(self: &Rc<Self>, sheet: &str, row: u32, col: u32) -> Value {
        match self.formula(sheet, row, col) {
            Some(f) => {
                let store: Rc<dyn Workbook> = self.clone();
                f.exec(&store, sheet, row, col, None)
            }
            None => Value::error(CalcErrorKind::Ref),
        }
    }

    /// Evaluate a throwaway formula as if it sat at `(row, col)` on
    /// [`DEFAULT_SHEET`]. Nothing is stored in the grid.
    pub fn eval_at(self: &Rc<Self>, row: u32, col: u32, refs: Vec<Reference>, handler: Expr) -> Value {
        let store: Rc<dyn Workbook> = self.clone();
        Rc::new(Formula::new(refs, handler, None)).exec(&store, DEFAULT_SHEET, row, col, None)
    }

    /// [`Self::eval_at`] from a cell far away from any test data.
    pub fn eval(self: &Rc<Self>, refs: Vec<Reference>, handler: Expr) -> Value {
        self.eval_at(999, 999, refs, handler)
    }

    fn entry(&self, sheet: &str, row: i32, col: i32) -> Option<CellEntry> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as u32, col as u32);
        let cell = self
            .cells
            .borrow()
            .get(&(sheet.to_string(), row, col))
            .cloned()
            .unwrap_or_default();
        Some(CellEntry {
            sheet: sheet.to_string(),
            row,
            col,
            value: cell.value,
            formula: cell.formula,
        })
    }
}

fn sheet_of(r: &Reference) -> &str {
    r.sheet().unwrap_or(DEFAULT_SHEET)
}

/* ─────────────────────── trait impls ─────────────────────── */
impl Workbook for TestWorkbook {
    fn ref_cells(&self, reference: &Reference) -> Vec<CellEntry> {
        match reference {
            Reference::Cell(c) => self.entry(sheet_of(reference), c.row, c.col).into_iter().collect(),
            Reference::Range(r) => {
                let sheet = sheet_of(reference);
                let mut out = Vec::with_capacity(r.height() * r.width());
                for row in r.top_left.row..=r.bottom_right.row {
                    for col in r.top_left.col..=r.bottom_right.col {
                        out.extend(self.entry(sheet, row, col));
                    }
                }
                out
            }
            Reference::Union(u) => u.refs.iter().flat_map(|m| self.ref_cells(m)).collect(),
            Reference::Name(_) | Reference::Null => Vec::new(),
        }
    }

    fn data(&self, reference: &Reference) -> Value {
        match reference {
            Reference::Cell(c) => self
                .entry(sheet_of(reference), c.row, c.col)
                .map_or(Value::error(CalcErrorKind::Ref), |e| e.value),
            Reference::Range(r) => {
                let sheet = sheet_of(reference);
                let rows = (r.top_left.row..=r.bottom_right.row)
                    .map(|row| {
                        Value::Array(
                            (r.top_left.col..=r.bottom_right.col)
                                .map(|col| self.entry(sheet, row, col).map_or(Value::Null, |e| e.value))
                                .collect(),
                        )
                    })
                    .collect();
                Value::Array(rows)
            }
            Reference::Union(u) => Value::Array(u.refs.iter().map(|m| self.data(m)).collect()),
            Reference::Null => Value::error(CalcErrorKind::Ref),
            Reference::Name(_) => Value::error(CalcErrorKind::Name),
        }
    }

    fn on_formula(&self, sheet: &str, row: u32, col: u32, value: &Value) {
        {
            let mut cells = self.cells.borrow_mut();
            if let Some(cell) = cells.get_mut(&(sheet.to_string(), row, col)) {
                cell.value = value.clone();
            }
        }
        self.notifications.borrow_mut().push(Notification {
            sheet: sheet.to_string(),
            row,
            col,
            value: value.clone(),
        });
    }

    fn eval_config(&self) -> EvalConfig {
        self.config.clone()
    }
}
