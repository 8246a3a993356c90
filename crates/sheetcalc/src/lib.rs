//! Meta crate that re-exports the sheetcalc building blocks with sensible
//! defaults. Downstream users can depend on this crate and opt into
//! specific layers via feature flags while keeping access to the
//! underlying crates when deeper integration is required.

#[cfg(feature = "common")]
pub use sheetcalc_common as common;

#[cfg(feature = "eval")]
pub use sheetcalc_eval as eval;

#[cfg(feature = "common")]
pub use sheetcalc_common::{CalcError, CalcErrorKind, CellRef, RangeRef, Reference, Rel};

#[cfg(feature = "eval")]
pub use sheetcalc_eval::{
    Arg, ArgSpec, ArgType, Context, EvalConfig, Expr, Formula, Function, Matrix, Value, Workbook,
    define_function,
};

#[cfg(feature = "eval")]
pub mod doc_examples;
