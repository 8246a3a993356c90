//! Sparse rectangular grid of values.
//!
//! Stored elements may be references; when the matrix was created against
//! a workbook, [`Matrix::get`] dereferences them on the way out. Height and
//! width are high-water marks of the positions ever written.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::traits::Workbook;
use crate::value::Value;

#[derive(Clone, Default)]
pub struct Matrix {
    source: Option<Rc<dyn Workbook>>,
    data: FxHashMap<usize, FxHashMap<usize, Value>>,
    height: usize,
    width: usize,
}

impl Matrix {
    /// Detached matrix; stored references are returned as-is.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix whose stored references are dereferenced through `source`.
    pub fn with_source(source: Rc<dyn Workbook>) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Build from row vectors. Blank elements still extend the bounds.
    pub fn from_rows(rows: Vec<Vec<Value>>) -> Self {
        let mut m = Self::new();
        for (r, row) in rows.into_iter().enumerate() {
            for (c, v) in row.into_iter().enumerate() {
                m.set(r, c, v);
            }
        }
        m
    }

    fn empty_like(&self) -> Self {
        Self {
            source: self.source.clone(),
            ..Self::default()
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    fn raw(&self, row: usize, col: usize) -> Option<&Value> {
        self.data.get(&row).and_then(|r| r.get(&col))
    }

    pub fn get(&self, row: usize, col: usize) -> Value {
        match (self.raw(row, col), &self.source) {
            (Some(Value::Ref(r)), Some(src)) => src.data(r),
            (Some(v), _) => v.clone(),
            (None, _) => Value::Null,
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: Value) {
        self.data.entry(row).or_default().insert(col, value);
        self.height = self.height.max(row + 1);
        self.width = self.width.max(col + 1);
    }

    /// Visit cells row-major, stopping at the first `Some` the visitor
    /// returns. Blank cells are skipped unless `include_empty` is set.
    pub fn each<R>(
        &self,
        include_empty: bool,
        mut f: impl FnMut(Value, usize, usize) -> Option<R>,
    ) -> Option<R> {
        for row in 0..self.height {
            for col in 0..self.width {
                let v = self.get(row, col);
                if !include_empty && v.is_null() {
                    continue;
                }
                if let Some(r) = f(v, row, col) {
                    return Some(r);
                }
            }
        }
        None
    }

    /// Same-shaped matrix of `f` applied to each cell. Skipped blank cells
    /// stay blank in the result.
    pub fn map(&self, include_empty: bool, mut f: impl FnMut(Value, usize, usize) -> Value) -> Matrix {
        let mut out = self.empty_like();
        out.height = self.height;
        out.width = self.width;
        self.each(include_empty, |v, row, col| {
            out.set(row, col, f(v, row, col));
            None::<()>
        });
        out
    }

    pub fn each_row<R>(&self, f: impl FnMut(usize) -> Option<R>) -> Option<R> {
        (0..self.height).find_map(f)
    }

    pub fn each_col<R>(&self, f: impl FnMut(usize) -> Option<R>) -> Option<R> {
        (0..self.width).find_map(f)
    }

    /// Column vector with one entry per row.
    pub fn map_row(&self, mut f: impl FnMut(usize) -> Value) -> Matrix {
        let mut out = self.empty_like();
        for row in 0..self.height {
            out.set(row, 0, f(row));
        }
        out
    }

    /// Row vector with one entry per column.
    pub fn map_col(&self, mut f: impl FnMut(usize) -> Value) -> Matrix {
        let mut out = self.empty_like();
        for col in 0..self.width {
            out.set(0, col, f(col));
        }
        out
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = self.empty_like();
        for (&row, cols) in &self.data {
            for (&col, v) in cols {
                out.set(col, row, v.clone());
            }
        }
        out.height = self.width;
        out.width = self.height;
        out
    }

    /// Stored elements in row-major order, references left as stored.
    pub fn raw_values(&self) -> impl Iterator<Item = &Value> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).filter_map(move |col| self.raw(row, col)))
    }

    /// Dense row vectors, blanks as [`Value::Null`].
    pub fn to_rows(&self) -> Vec<Vec<Value>> {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.get(row, col)).collect())
            .collect()
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.height == other.height && self.width == other.width && self.to_rows() == other.to_rows()
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("rows", &self.to_rows())
            .finish()
    }
}
