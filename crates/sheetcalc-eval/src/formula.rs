//! Compiled formulas.
//!
//! A [`Formula`] is position-independent: its references are stored
//! relative where the source text was relative, and [`Formula::exec`]
//! resolves them against the cell it runs at. The last successful result
//! is cached until [`Formula::reset`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use sheetcalc_common::{CellRef, RangeRef, Reference, Rel, UnionRef};

use crate::context::{Callback, Context, EvalChain};
use crate::expr::Expr;
use crate::traits::Workbook;
use crate::value::Value;

/// Identity used by the cycle guard. Every formula, clones included, gets
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormulaId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl FormulaId {
    fn next() -> Self {
        FormulaId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Renders the formula text from its references and the formula's cell.
pub type Printer = Rc<dyn Fn(&[Reference], u32, u32) -> String>;

/// Axis a row/column insertion or deletion happens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjustError {
    #[error("union references cannot be adjusted")]
    Union,
}

pub struct Formula {
    id: FormulaId,
    refs: RefCell<Vec<Reference>>,
    handler: Rc<Expr>,
    printer: Option<Printer>,
    absrefs: RefCell<Option<Vec<Reference>>>,
    value: RefCell<Option<Value>>,
}

impl Formula {
    pub fn new(refs: Vec<Reference>, handler: Expr, printer: Option<Printer>) -> Self {
        Self {
            id: FormulaId::next(),
            refs: RefCell::new(refs),
            handler: Rc::new(handler),
            printer,
            absrefs: RefCell::new(None),
            value: RefCell::new(None),
        }
    }

    pub fn id(&self) -> FormulaId {
        self.id
    }

    pub fn handler(&self) -> &Expr {
        &self.handler
    }

    /// References as stored (relative where written relative).
    pub fn refs(&self) -> Vec<Reference> {
        self.refs.borrow().clone()
    }

    /// Cached result of the last successful execution.
    pub fn value(&self) -> Option<Value> {
        self.value.borrow().clone()
    }

    pub(crate) fn store_value(&self, v: Value) {
        *self.value.borrow_mut() = Some(v);
    }

    /// Drop the cached result and the resolved references.
    pub fn reset(&self) {
        *self.value.borrow_mut() = None;
        *self.absrefs.borrow_mut() = None;
    }

    pub fn print(&self, row: u32, col: u32) -> String {
        match &self.printer {
            Some(p) => p(&self.refs.borrow(), row, col),
            None => String::new(),
        }
    }

    /// Evaluate at `(sheet, row, col)`.
    ///
    /// A cached result is returned (and passed to `callback`) immediately.
    /// Otherwise the formulas this one references are evaluated first,
    /// then the handler runs and the outcome is reported to the store and
    /// the callback exactly once. Errors are returned as [`Value::Error`]
    /// and never cached.
    pub fn exec(
        self: &Rc<Self>,
        store: &Rc<dyn Workbook>,
        sheet: &str,
        row: u32,
        col: u32,
        callback: Option<Callback>,
    ) -> Value {
        let chain = EvalChain::new(store.eval_config());
        self.exec_in(store, sheet, row, col, callback, &chain)
    }

    pub(crate) fn exec_in(
        self: &Rc<Self>,
        store: &Rc<dyn Workbook>,
        sheet: &str,
        row: u32,
        col: u32,
        callback: Option<Callback>,
        chain: &Rc<EvalChain>,
    ) -> Value {
        if let Some(v) = self.value() {
            if let Some(cb) = callback {
                cb(&v);
            }
            return v;
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("formula_exec", sheet, row, col).entered();

        let refs = self.absolute_refs(sheet, row, col);
        let mut ctx = Context::new(
            callback,
            Rc::clone(self),
            Rc::clone(store),
            sheet,
            row,
            col,
            refs,
            Rc::clone(chain),
        );
        if let Err(e) = chain.enter(self.id) {
            return Value::Error(ctx.error(e));
        }
        let out = ctx.run(&self.handler);
        chain.leave(self.id);
        out
    }

    fn absolute_refs(&self, sheet: &str, row: u32, col: u32) -> Vec<Reference> {
        if let Some(abs) = self.absrefs.borrow().as_ref() {
            return abs.clone();
        }
        let abs: Vec<Reference> = self
            .refs
            .borrow()
            .iter()
            .map(|r| scope_to_sheet(r.absolute(row, col), sheet))
            .collect();
        *self.absrefs.borrow_mut() = Some(abs.clone());
        abs
    }

    /// Rewrite the references for `delta` rows or columns inserted
    /// (positive) or deleted (negative) at `start`, for a formula that sits
    /// at `(formula_row, formula_col)` before the shift.
    ///
    /// Cells inside a deleted span, and ranges with both corners inside
    /// it, become [`Reference::Null`]. A range that loses only its top-left
    /// corner keeps that corner at the same grid position relative to where
    /// the formula ends up. Unions are rejected.
    pub fn adjust(
        &self,
        axis: Axis,
        start: i32,
        delta: i32,
        formula_row: u32,
        formula_col: u32,
    ) -> Result<(), AdjustError> {
        let shift = Shift {
            axis,
            start,
            delta,
            row: formula_row,
            col: formula_col,
        };
        let adjusted = self
            .refs
            .borrow()
            .iter()
            .map(|r| shift.reference(r))
            .collect::<Result<Vec<_>, _>>()?;

        #[cfg(feature = "tracing")]
        tracing::trace!(?axis, start, delta, "adjusted formula references");

        *self.refs.borrow_mut() = adjusted;
        *self.absrefs.borrow_mut() = None;
        Ok(())
    }
}

/// A fresh, uncached formula over the same references and handler, with a
/// new identity.
impl Clone for Formula {
    fn clone(&self) -> Self {
        Self {
            id: FormulaId::next(),
            refs: RefCell::new(self.refs()),
            handler: Rc::clone(&self.handler),
            printer: self.printer.clone(),
            absrefs: RefCell::new(None),
            value: RefCell::new(None),
        }
    }
}

impl fmt::Debug for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("id", &self.id)
            .field("refs", &self.refs.borrow())
            .field("value", &self.value.borrow())
            .finish_non_exhaustive()
    }
}

/// Give unscoped references (and unscoped union members) the formula's sheet.
fn scope_to_sheet(r: Reference, sheet: &str) -> Reference {
    match r {
        Reference::Null => Reference::Null,
        Reference::Union(u) => Reference::Union(UnionRef {
            refs: u.refs.into_iter().map(|m| scope_to_sheet(m, sheet)).collect(),
        }),
        r if r.sheet().is_none() => r.set_sheet(Some(sheet.to_string()), false),
        r => r,
    }
}

struct Shift {
    axis: Axis,
    start: i32,
    delta: i32,
    row: u32,
    col: u32,
}

impl Shift {
    fn deletes_cell(&self, cell: &CellRef) -> bool {
        if self.delta >= 0 {
            return false;
        }
        let abs = cell.absolute(self.row, self.col);
        let pos = match self.axis {
            Axis::Row => abs.row,
            Axis::Col => abs.col,
        };
        pos >= self.start && pos < self.start - self.delta
    }

    /// New stored coordinate. Relative coordinates are offsets from `base`
    /// and only move when the shift happens between the formula and the
    /// target.
    fn fix_number(&self, num: i32, relative: bool, base: i32) -> i32 {
        if relative {
            let abs = base + num;
            if abs < self.start && self.start <= base {
                num - self.delta
            } else if base < self.start && self.start <= abs {
                num + self.delta
            } else {
                num
            }
        } else if num >= self.start {
            num + self.delta
        } else {
            num
        }
    }

    fn fix_cell(&self, cell: &CellRef) -> CellRef {
        let mut out = cell.clone();
        match self.axis {
            Axis::Row => {
                out.row = self.fix_number(cell.row, cell.rel.contains(Rel::ROW), self.row as i32);
            }
            Axis::Col => {
                out.col = self.fix_number(cell.col, cell.rel.contains(Rel::COL), self.col as i32);
            }
        }
        out
    }

    fn reference(&self, r: &Reference) -> Result<Reference, AdjustError> {
        Ok(match r {
            Reference::Null | Reference::Name(_) => r.clone(),
            Reference::Union(_) => return Err(AdjustError::Union),
            Reference::Cell(cell) => {
                if self.deletes_cell(cell) {
                    Reference::Null
                } else {
                    Reference::Cell(self.fix_cell(cell))
                }
            }
            Reference::Range(range) => {
                let del_start = self.deletes_cell(&range.top_left);
                if del_start && self.deletes_cell(&range.bottom_right) {
                    return Ok(Reference::Null);
                }
                let top_left = if del_start {
                    let anchor = |pos: u32, on_axis: bool| {
                        if on_axis {
                            self.fix_number(pos as i32, false, 0).max(0) as u32
                        } else {
                            pos
                        }
                    };
                    range.top_left.absolute(self.row, self.col).relative(
                        anchor(self.row, self.axis == Axis::Row),
                        anchor(self.col, self.axis == Axis::Col),
                        range.top_left.rel,
                    )
                } else {
                    self.fix_cell(&range.top_left)
                };
                let fixed = RangeRef::new(top_left, self.fix_cell(&range.bottom_right));
                Reference::Range(fixed.set_sheet(range.sheet().map(str::to_string), range.has_sheet()))
            }
        })
    }
}
