//! Formula evaluation runtime.
//!
//! Compiled formulas ([`Formula`]) evaluate against a host store
//! ([`Workbook`]), pulling in the formulas they depend on as they go.
//! Functions are looked up by name in a process-wide registry that comes
//! preloaded with the operators and built-ins and accepts new definitions
//! through [`define_function`].

pub mod args;
pub mod broadcast;
pub mod builtins;
pub mod coercion;
pub mod config;
pub mod context;
pub mod expr;
pub mod formula;
pub mod function;
pub mod function_registry;
pub mod matrix;
pub mod test_workbook;
pub mod traits;
pub mod value;

pub use args::{ArgBindings, ArgLiteral, ArgSpec, ArgType, Predicate, Signature, SignatureError};
pub use config::EvalConfig;
pub use context::{Callback, Context};
pub use expr::{Arg, Expr, Thunk};
pub use formula::{AdjustError, Axis, Formula, FormulaId, Printer};
pub use function::{CheckedFunction, Function, FunctionDef, RawFunction, define_function};
pub use matrix::Matrix;
pub use traits::{CellEntry, Workbook};
pub use value::Value;

pub use sheetcalc_common::{CalcError, CalcErrorKind, Reference};

#[cfg(test)]
mod tests;
