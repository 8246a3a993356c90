//! TRANSPOSE.

use super::super::utils::checked;
use crate::args::{ArgSpec, ArgType};
use crate::function::FunctionDef;
use crate::function_registry::Registry;
use crate::value::Value;

pub(super) fn install(reg: &Registry) {
    checked(
        reg,
        FunctionDef::new("transpose").sync(vec![ArgSpec::arg("array", ArgType::Matrix)], |_, a| match &a[0] {
            Value::Matrix(m) => Value::Matrix(m.transpose()),
            other => other.clone(),
        }),
    );
}
