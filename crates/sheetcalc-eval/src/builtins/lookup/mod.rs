//! Selection and shape functions.

mod choose;
mod dynamic;
mod reference_info;

use crate::function_registry::Registry;

pub(crate) fn install(reg: &Registry) {
    choose::install(reg);
    dynamic::install(reg);
    reference_info::install(reg);
}
