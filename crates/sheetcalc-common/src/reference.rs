//! The reference model the evaluator consumes.
//!
//! A reference names one cell, a rectangular range, a union of references,
//! or a defined name. Cell coordinates are zero-based. For every axis marked
//! relative in [`Rel`], the stored coordinate is an *offset* from the cell
//! that owns the formula, and [`CellRef::absolute`] turns it back into a grid
//! position. Parsing and display syntax live outside this crate.

use bitflags::bitflags;

bitflags! {
    /// Which axes of a cell reference are stored relative to the formula cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Rel: u8 {
        const COL = 0b01;
        const ROW = 0b10;
    }
}

/// Optional sheet scoping shared by every reference variant.
///
/// `explicit` records whether the sheet was written in the formula text
/// (`Sheet2!A1`) or merely filled in from the formula's own sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct SheetScope {
    name: Option<String>,
    explicit: bool,
}

/* ───────────────────────────── CellRef ───────────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRef {
    pub row: i32,
    pub col: i32,
    pub rel: Rel,
    scope: SheetScope,
}

impl CellRef {
    pub fn new(row: i32, col: i32, rel: Rel) -> Self {
        Self {
            row,
            col,
            rel,
            scope: SheetScope::default(),
        }
    }

    /// Grid position of this reference when evaluated from `(row, col)`.
    pub fn absolute(&self, row: u32, col: u32) -> CellRef {
        let mut out = self.clone();
        if self.rel.contains(Rel::ROW) {
            out.row += row as i32;
        }
        if self.rel.contains(Rel::COL) {
            out.col += col as i32;
        }
        out.rel = Rel::empty();
        out
    }

    /// Re-express an absolute reference as offsets from `(row, col)` on the
    /// axes selected by `rel`.
    pub fn relative(&self, row: u32, col: u32, rel: Rel) -> CellRef {
        let mut out = self.clone();
        if rel.contains(Rel::ROW) {
            out.row -= row as i32;
        }
        if rel.contains(Rel::COL) {
            out.col -= col as i32;
        }
        out.rel = rel;
        out
    }

    pub fn sheet(&self) -> Option<&str> {
        self.scope.name.as_deref()
    }

    pub fn has_sheet(&self) -> bool {
        self.scope.explicit
    }

    pub fn set_sheet(mut self, sheet: Option<String>, explicit: bool) -> Self {
        self.scope = SheetScope {
            name: sheet,
            explicit,
        };
        self
    }
}

/* ───────────────────────────── RangeRef ──────────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeRef {
    pub top_left: CellRef,
    pub bottom_right: CellRef,
    scope: SheetScope,
}

impl RangeRef {
    pub fn new(top_left: CellRef, bottom_right: CellRef) -> Self {
        Self {
            top_left,
            bottom_right,
            scope: SheetScope::default(),
        }
    }

    /// Absolute range with corners ordered top-left / bottom-right.
    pub fn absolute(&self, row: u32, col: u32) -> RangeRef {
        let a = self.top_left.absolute(row, col);
        let b = self.bottom_right.absolute(row, col);
        let tl = CellRef::new(a.row.min(b.row), a.col.min(b.col), Rel::empty());
        let br = CellRef::new(a.row.max(b.row), a.col.max(b.col), Rel::empty());
        RangeRef {
            top_left: tl,
            bottom_right: br,
            scope: self.scope.clone(),
        }
    }

    pub fn relative(&self, row: u32, col: u32, rel: Rel) -> RangeRef {
        RangeRef {
            top_left: self.top_left.relative(row, col, rel),
            bottom_right: self.bottom_right.relative(row, col, rel),
            scope: self.scope.clone(),
        }
    }

    /// Number of rows spanned (meaningful for absolute ranges).
    pub fn height(&self) -> usize {
        (self.bottom_right.row - self.top_left.row + 1).max(0) as usize
    }

    pub fn width(&self) -> usize {
        (self.bottom_right.col - self.top_left.col + 1).max(0) as usize
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= self.top_left.row
            && row <= self.bottom_right.row
            && col >= self.top_left.col
            && col <= self.bottom_right.col
    }

    pub fn sheet(&self) -> Option<&str> {
        self.scope.name.as_deref()
    }

    pub fn has_sheet(&self) -> bool {
        self.scope.explicit
    }

    pub fn set_sheet(mut self, sheet: Option<String>, explicit: bool) -> Self {
        self.scope = SheetScope {
            name: sheet,
            explicit,
        };
        self
    }
}

/* ──────────────────────────── Union / Name ───────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionRef {
    pub refs: Vec<Reference>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NameRef {
    pub name: String,
    scope: SheetScope,
}

impl NameRef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            scope: SheetScope::default(),
        }
    }
}

/* ──────────────────────────── Reference ──────────────────────────── */

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reference {
    /// The empty reference: what a deleted cell or a failed intersection becomes.
    Null,
    Cell(CellRef),
    Range(RangeRef),
    Union(UnionRef),
    Name(NameRef),
}

impl Reference {
    /// Absolute single cell, no sheet.
    pub fn cell(row: i32, col: i32) -> Self {
        Reference::Cell(CellRef::new(row, col, Rel::empty()))
    }

    /// Absolute range between two corners, no sheet.
    pub fn range(row1: i32, col1: i32, row2: i32, col2: i32) -> Self {
        Reference::Range(RangeRef::new(
            CellRef::new(row1, col1, Rel::empty()),
            CellRef::new(row2, col2, Rel::empty()),
        ))
    }

    pub fn name<S: Into<String>>(name: S) -> Self {
        Reference::Name(NameRef::new(name))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reference::Null)
    }

    pub fn absolute(&self, row: u32, col: u32) -> Reference {
        match self {
            Reference::Cell(c) => Reference::Cell(c.absolute(row, col)),
            Reference::Range(r) => Reference::Range(r.absolute(row, col)),
            Reference::Union(u) => Reference::Union(UnionRef {
                refs: u.refs.iter().map(|r| r.absolute(row, col)).collect(),
            }),
            Reference::Name(_) | Reference::Null => self.clone(),
        }
    }

    pub fn relative(&self, row: u32, col: u32, rel: Rel) -> Reference {
        match self {
            Reference::Cell(c) => Reference::Cell(c.relative(row, col, rel)),
            Reference::Range(r) => Reference::Range(r.relative(row, col, rel)),
            Reference::Union(u) => Reference::Union(UnionRef {
                refs: u.refs.iter().map(|r| r.relative(row, col, rel)).collect(),
            }),
            Reference::Name(_) | Reference::Null => self.clone(),
        }
    }

    fn scope(&self) -> Option<&SheetScope> {
        match self {
            Reference::Cell(c) => Some(&c.scope),
            Reference::Range(r) => Some(&r.scope),
            Reference::Name(n) => Some(&n.scope),
            Reference::Union(_) | Reference::Null => None,
        }
    }

    pub fn sheet(&self) -> Option<&str> {
        self.scope().and_then(|s| s.name.as_deref())
    }

    pub fn has_sheet(&self) -> bool {
        match self {
            Reference::Union(u) => u.refs.iter().all(Reference::has_sheet),
            _ => self.scope().is_some_and(|s| s.explicit),
        }
    }

    /// Scope the reference to `sheet`. Unions forward to every member.
    pub fn set_sheet(self, sheet: Option<String>, explicit: bool) -> Reference {
        match self {
            Reference::Cell(c) => Reference::Cell(c.set_sheet(sheet, explicit)),
            Reference::Range(r) => Reference::Range(r.set_sheet(sheet, explicit)),
            Reference::Name(mut n) => {
                n.scope = SheetScope {
                    name: sheet,
                    explicit,
                };
                Reference::Name(n)
            }
            Reference::Union(u) => Reference::Union(UnionRef {
                refs: u
                    .refs
                    .into_iter()
                    .map(|r| r.set_sheet(sheet.clone(), explicit))
                    .collect(),
            }),
            Reference::Null => Reference::Null,
        }
    }

    /// Cells common to both references, or [`Reference::Null`].
    ///
    /// Both operands are expected to be absolute.
    pub fn intersect(&self, other: &Reference) -> Reference {
        if let (Some(a), Some(b)) = (self.sheet(), other.sheet()) {
            if a != b {
                return Reference::Null;
            }
        }
        match (self, other) {
            (Reference::Union(u), x) | (x, Reference::Union(u)) => {
                let mut parts: Vec<Reference> = u
                    .refs
                    .iter()
                    .map(|r| r.intersect(x))
                    .filter(|r| !r.is_null())
                    .collect();
                match parts.len() {
                    0 => Reference::Null,
                    1 => parts.remove(0),
                    _ => Reference::Union(UnionRef { refs: parts }),
                }
            }
            (Reference::Cell(a), Reference::Cell(b)) => {
                if a.row == b.row && a.col == b.col {
                    self.clone()
                } else {
                    Reference::Null
                }
            }
            (Reference::Cell(c), Reference::Range(r)) | (Reference::Range(r), Reference::Cell(c)) => {
                if r.contains(c.row, c.col) {
                    Reference::Cell(c.clone())
                } else {
                    Reference::Null
                }
            }
            (Reference::Range(a), Reference::Range(b)) => {
                let top = a.top_left.row.max(b.top_left.row);
                let left = a.top_left.col.max(b.top_left.col);
                let bottom = a.bottom_right.row.min(b.bottom_right.row);
                let right = a.bottom_right.col.min(b.bottom_right.col);
                if top > bottom || left > right {
                    return Reference::Null;
                }
                Reference::Range(RangeRef {
                    top_left: CellRef::new(top, left, Rel::empty()),
                    bottom_right: CellRef::new(bottom, right, Rel::empty()),
                    scope: a.scope.clone(),
                })
            }
            _ => Reference::Null,
        }
    }
}

impl From<CellRef> for Reference {
    fn from(c: CellRef) -> Self {
        Reference::Cell(c)
    }
}

impl From<RangeRef> for Reference {
    fn from(r: RangeRef) -> Self {
        Reference::Range(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_applies_offsets_only_on_relative_axes() {
        let r = CellRef::new(-2, 3, Rel::ROW);
        let abs = r.absolute(10, 7);
        assert_eq!((abs.row, abs.col), (8, 3));
        assert!(abs.rel.is_empty());

        let back = abs.relative(10, 7, Rel::ROW);
        assert_eq!(back, r);
    }

    #[test]
    fn range_absolute_orders_corners() {
        let r = RangeRef::new(CellRef::new(5, 5, Rel::empty()), CellRef::new(1, 2, Rel::empty()));
        let abs = r.absolute(0, 0);
        assert_eq!((abs.top_left.row, abs.top_left.col), (1, 2));
        assert_eq!((abs.bottom_right.row, abs.bottom_right.col), (5, 5));
        assert_eq!((abs.height(), abs.width()), (5, 4));
    }

    #[test]
    fn intersect_ranges_and_cells() {
        let a = Reference::range(0, 0, 4, 4);
        let b = Reference::range(2, 3, 8, 9);
        assert_eq!(a.intersect(&b), Reference::range(2, 3, 4, 4));
        assert_eq!(a.intersect(&Reference::cell(1, 1)), Reference::cell(1, 1));
        assert!(a.intersect(&Reference::cell(6, 6)).is_null());
        assert!(Reference::cell(1, 1).intersect(&Reference::cell(1, 2)).is_null());
    }

    #[test]
    fn intersect_respects_sheets() {
        let a = Reference::cell(0, 0).set_sheet(Some("A".into()), true);
        let b = Reference::cell(0, 0).set_sheet(Some("B".into()), true);
        assert!(a.intersect(&b).is_null());
    }

    #[test]
    fn intersect_union_keeps_overlapping_parts() {
        let u = Reference::Union(UnionRef {
            refs: vec![Reference::range(0, 0, 1, 1), Reference::range(10, 10, 11, 11)],
        });
        assert_eq!(u.intersect(&Reference::cell(1, 0)), Reference::cell(1, 0));
        assert!(u.intersect(&Reference::cell(5, 5)).is_null());
    }

    #[test]
    fn set_sheet_tracks_explicitness() {
        let r = Reference::cell(0, 0).set_sheet(Some("Sheet1".into()), false);
        assert_eq!(r.sheet(), Some("Sheet1"));
        assert!(!r.has_sheet());
    }
}
