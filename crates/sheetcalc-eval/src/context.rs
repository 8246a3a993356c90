//! Per-evaluation state handed to every function.
//!
//! A [`Context`] lives for one execution of one formula at one cell. It
//! owns the completion callback, knows where to report the result, and
//! offers the helpers builtins are written against: dereferencing,
//! matrix conversion, number walking and on-demand evaluation of the
//! formulas a reference depends on.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashSet;
use sheetcalc_common::{CalcError, CalcErrorKind, Reference};
use smallvec::SmallVec;

use crate::config::EvalConfig;
use crate::expr::{Arg, Expr, Thunk};
use crate::formula::{Formula, FormulaId};
use crate::function_registry;
use crate::matrix::Matrix;
use crate::traits::{CellEntry, Workbook};
use crate::value::Value;

/// Receives the final value of a top-level execution.
pub type Callback = Box<dyn FnOnce(&Value)>;

/// Formulas currently being evaluated by one top-level execution, in call
/// order, and the members of any cycle closed so far.
pub(crate) struct EvalChain {
    active: RefCell<FxHashSet<FormulaId>>,
    stack: RefCell<Vec<FormulaId>>,
    cyclic: RefCell<FxHashSet<FormulaId>>,
    depth: Cell<usize>,
    config: EvalConfig,
}

impl EvalChain {
    pub(crate) fn new(config: EvalConfig) -> Rc<Self> {
        Rc::new(Self {
            active: RefCell::new(FxHashSet::default()),
            stack: RefCell::new(Vec::new()),
            cyclic: RefCell::new(FxHashSet::default()),
            depth: Cell::new(0),
            config,
        })
    }

    /// Everything from `closing` to the top of the stack is on the cycle.
    fn close_cycle(&self, closing: FormulaId) {
        let stack = self.stack.borrow();
        if let Some(pos) = stack.iter().rposition(|id| *id == closing) {
            self.cyclic.borrow_mut().extend(stack[pos..].iter().copied());
        }
    }

    fn is_cyclic(&self, id: FormulaId) -> bool {
        self.cyclic.borrow().contains(&id)
    }

    pub(crate) fn is_active(&self, id: FormulaId) -> bool {
        self.active.borrow().contains(&id)
    }

    pub(crate) fn enter(&self, id: FormulaId) -> Result<(), CalcError> {
        if self.is_active(id) {
            return Err(CalcError::new(CalcErrorKind::Circular));
        }
        if self.depth.get() >= self.config.max_depth {
            return Err(CalcError::new(CalcErrorKind::Calc).with_message(format!(
                "formula chain deeper than {}",
                self.config.max_depth
            )));
        }
        self.active.borrow_mut().insert(id);
        self.stack.borrow_mut().push(id);
        self.depth.set(self.depth.get() + 1);
        Ok(())
    }

    pub(crate) fn leave(&self, id: FormulaId) {
        self.active.borrow_mut().remove(&id);
        self.cyclic.borrow_mut().remove(&id);
        let mut stack = self.stack.borrow_mut();
        if let Some(pos) = stack.iter().rposition(|x| *x == id) {
            stack.truncate(pos);
        }
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

pub struct Context {
    callback: Option<Callback>,
    formula: Rc<Formula>,
    store: Rc<dyn Workbook>,
    sheet: String,
    row: u32,
    col: u32,
    refs: Vec<Reference>,
    chain: Rc<EvalChain>,
}

impl Context {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        callback: Option<Callback>,
        formula: Rc<Formula>,
        store: Rc<dyn Workbook>,
        sheet: &str,
        row: u32,
        col: u32,
        refs: Vec<Reference>,
        chain: Rc<EvalChain>,
    ) -> Self {
        Self {
            callback,
            formula,
            store,
            sheet: sheet.to_string(),
            row,
            col,
            refs,
            chain,
        }
    }

    pub fn formula(&self) -> &Rc<Formula> {
        &self.formula
    }

    pub fn store(&self) -> &Rc<dyn Workbook> {
        &self.store
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    /* ─────────────────────── completion ─────────────────────── */

    /// Successful completion: cache on the formula, report to the store,
    /// then run the callback.
    pub fn resolve(&mut self, val: Value) {
        self.formula.store_value(val.clone());
        self.store.on_formula(&self.sheet, self.row, self.col, &val);
        if let Some(cb) = self.callback.take() {
            cb(&val);
        }
    }

    /// Failed completion: report the error without caching it.
    pub fn error(&mut self, err: CalcError) -> CalcError {
        let val = Value::Error(err.clone());
        self.store.on_formula(&self.sheet, self.row, self.col, &val);
        if let Some(cb) = self.callback.take() {
            cb(&val);
        }
        err
    }

    /// Evaluate the handler and complete exactly once.
    pub(crate) fn run(&mut self, handler: &Expr) -> Value {
        let refs: Vec<Value> = self.refs.iter().cloned().map(Value::Ref).collect();
        let outcome = self.resolve_cells(&refs, |ctx| {
            let v = ctx.eval(handler)?;
            ctx.settle(v)
        });
        match outcome {
            Ok(Value::Error(e)) | Err(e) => Value::Error(self.error(e)),
            Ok(v) => {
                self.resolve(v.clone());
                v
            }
        }
    }

    /// Final shape of a formula result: references become the values they
    /// point at, ranges and literal arrays become matrices.
    fn settle(&self, val: Value) -> Result<Value, CalcError> {
        match val {
            Value::Ref(Reference::Null) => Err(CalcError::new(CalcErrorKind::Ref)),
            Value::Ref(Reference::Range(_)) | Value::Array(_) => {
                Ok(self.as_matrix(&val).map_or(Value::Null, Value::Matrix))
            }
            Value::Ref(r) => match self.store.data(&r) {
                arr @ Value::Array(_) => Ok(self.as_matrix(&arr).map_or(Value::Null, Value::Matrix)),
                v => Ok(v),
            },
            v => Ok(v),
        }
    }

    /* ─────────────────────── dependencies ─────────────────────── */

    /// Make sure every formula cell under the references in `items`
    /// (recursing into arrays) has a value, then run `f`.
    ///
    /// Reaching a formula that is already being evaluated in this chain
    /// closes a cycle: every formula on it fails with `#CIRCULAR!` without
    /// running its handler. Formulas that merely depend on a cycle run
    /// normally and see `#CIRCULAR!` as the value of the cells on it.
    pub fn resolve_cells<R>(
        &mut self,
        items: &[Value],
        f: impl FnOnce(&mut Self) -> Result<R, CalcError>,
    ) -> Result<R, CalcError> {
        let mut pending = Vec::new();
        self.collect_formulas(items, &mut pending)?;
        if pending.is_empty() {
            return f(self);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("resolve_cells", pending = pending.len()).entered();

        for cell in pending {
            let Some(formula) = cell.formula else {
                continue;
            };
            formula.exec_in(&self.store, &cell.sheet, cell.row, cell.col, None, &self.chain);
        }
        if self.chain.is_cyclic(self.formula.id()) {
            return Err(CalcError::new(CalcErrorKind::Circular));
        }
        f(self)
    }

    fn collect_formulas(&self, items: &[Value], out: &mut Vec<CellEntry>) -> Result<(), CalcError> {
        for item in items {
            match item {
                Value::Ref(r) => {
                    for cell in self.store.ref_cells(r) {
                        let Some(formula) = &cell.formula else {
                            continue;
                        };
                        if self.chain.is_active(formula.id()) {
                            #[cfg(feature = "tracing")]
                            tracing::debug!(
                                sheet = %cell.sheet,
                                row = cell.row,
                                col = cell.col,
                                "circular reference"
                            );
                            self.chain.close_cycle(formula.id());
                            return Err(CalcError::new(CalcErrorKind::Circular));
                        }
                        out.push(cell);
                    }
                }
                Value::Array(inner) => self.collect_formulas(inner, out)?,
                _ => {}
            }
        }
        Ok(())
    }

    /* ─────────────────────── values ─────────────────────── */

    /// Dereference references (flattening what they yield); other items
    /// pass through.
    pub fn cell_values(&self, items: &[Value]) -> SmallVec<[Value; 4]> {
        let mut out = SmallVec::new();
        for item in items {
            match item {
                Value::Ref(r) => flatten_into(self.store.data(r), &mut out),
                other => out.push(other.clone()),
            }
        }
        out
    }

    pub fn with_cell_values<R>(&self, items: &[Value], f: impl FnOnce(&[Value]) -> R) -> R {
        f(&self.cell_values(items))
    }

    /// Dereference a reference; anything else as-is.
    pub fn force(&self, val: &Value) -> Value {
        match val {
            Value::Ref(r) => self.store.data(r),
            v => v.clone(),
        }
    }

    /// Call `f` for every number reachable from `val` through references,
    /// matrices and arrays. Everything non-numeric is skipped.
    pub fn for_numbers(&self, val: &Value, f: &mut dyn FnMut(f64)) {
        match val {
            Value::Number(n) => f(*n),
            Value::Ref(_) => {
                for v in self.cell_values(std::slice::from_ref(val)) {
                    if !matches!(v, Value::Ref(_)) {
                        self.for_numbers(&v, f);
                    }
                }
            }
            Value::Matrix(m) => {
                for v in m.raw_values() {
                    self.for_numbers(v, f);
                }
            }
            Value::Array(items) => {
                for v in items {
                    self.for_numbers(v, f);
                }
            }
            _ => {}
        }
    }

    /// Truthiness of a scalar; references are dereferenced first and only
    /// the text `true` counts as true.
    pub fn bool(&self, val: &Value) -> bool {
        match self.force(val) {
            Value::Boolean(b) => b,
            Value::Number(n) => n != 0.0,
            Value::Text(s) => s.eq_ignore_ascii_case("true"),
            Value::Null => false,
            _ => true,
        }
    }

    pub fn divide(&self, left: f64, right: f64) -> Result<f64, CalcError> {
        if right == 0.0 {
            Err(CalcError::new(CalcErrorKind::Div))
        } else {
            Ok(left / right)
        }
    }

    /// Empty matrix that dereferences through this context's store.
    pub fn new_matrix(&self) -> Matrix {
        Matrix::with_source(Rc::clone(&self.store))
    }

    /// Matrix view of a matrix, a range reference or a non-empty literal
    /// array; `None` for anything else.
    ///
    /// Literal arrays are laid out row by row. An element that is itself a
    /// range or array is expanded in place and the row grows to the
    /// tallest such block.
    pub fn as_matrix(&self, val: &Value) -> Option<Matrix> {
        match val {
            Value::Matrix(m) => Some(m.clone()),
            Value::Ref(r @ Reference::Range(range)) => {
                let mut m = self.new_matrix();
                let (top, left) = (range.top_left.row, range.top_left.col);
                for cell in self.store.ref_cells(r) {
                    let row = cell.row as i64 - top as i64;
                    let col = cell.col as i64 - left as i64;
                    if row >= 0 && col >= 0 {
                        m.set(row as usize, col as usize, cell.value);
                    }
                }
                Some(m)
            }
            Value::Array(lines) if !lines.is_empty() => {
                let mut m = self.new_matrix();
                let mut row = 0;
                for line in lines {
                    let elements = match line {
                        Value::Array(items) => items.as_slice(),
                        other => std::slice::from_ref(other),
                    };
                    let mut col = 0;
                    let mut height = 1;
                    for el in elements {
                        let el = match el {
                            Value::Ref(Reference::Range(_)) => el.clone(),
                            Value::Ref(r) => self.store.data(r),
                            other => other.clone(),
                        };
                        let block = match &el {
                            Value::Ref(_) | Value::Array(_) | Value::Matrix(_) => self.as_matrix(&el),
                            _ => None,
                        };
                        match block {
                            Some(block) => {
                                block.each(false, |v, r, c| {
                                    m.set(row + r, col + c, v);
                                    None::<()>
                                });
                                height = height.max(block.height());
                                col += block.width();
                            }
                            None => {
                                let el = if matches!(el, Value::Array(_)) { Value::Null } else { el };
                                m.set(row, col, el);
                                col += 1;
                            }
                        }
                    }
                    row += height;
                }
                Some(m)
            }
            _ => None,
        }
    }

    /* ─────────────────────── evaluation ─────────────────────── */

    /// Invoke a registered function by (case-insensitive) name.
    pub fn func(&mut self, name: &str, args: Vec<Arg>) -> Result<Value, CalcError> {
        match function_registry::get(name) {
            Some(f) => f.call(self, args),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(name, "unknown function");
                Err(CalcError::new(CalcErrorKind::Name).with_message(format!("unknown function {name}")))
            }
        }
    }

    pub fn eval(&mut self, expr: &Expr) -> Result<Value, CalcError> {
        match expr {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Ref(i) => self.refs.get(*i).cloned().map(Value::Ref).ok_or_else(|| {
                CalcError::new(CalcErrorKind::Ref).with_message(format!("no reference #{i}"))
            }),
            Expr::Array(rows) => {
                let mut out = Vec::with_capacity(rows.len());
                for row in rows {
                    let mut line = Vec::with_capacity(row.len());
                    for el in row {
                        line.push(self.eval(el)?);
                    }
                    out.push(Value::Array(line));
                }
                Ok(Value::Array(out))
            }
            Expr::Call { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(match arg {
                        Expr::Lazy(inner) => Arg::Lazy(Thunk::new(Rc::clone(inner))),
                        other => Arg::Value(self.eval(other)?),
                    });
                }
                self.func(name, evaluated)
            }
            Expr::Lazy(inner) => self.eval(inner),
        }
    }
}

fn flatten_into(v: Value, out: &mut SmallVec<[Value; 4]>) {
    match v {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        v => out.push(v),
    }
}
