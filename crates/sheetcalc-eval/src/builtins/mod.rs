//! Built-in functions, installed into the registry on first use.

pub mod datetime;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod operators;
mod utils;

use crate::function_registry::Registry;

pub(crate) fn install(reg: &Registry) {
    operators::install(reg);
    logical::install(reg);
    info::install(reg);
    math::install(reg);
    lookup::install(reg);
    datetime::install(reg);
}
