/// Knobs the host can tune per workbook through
/// [`Workbook::eval_config`](crate::traits::Workbook::eval_config).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Deepest chain of formulas one top-level evaluation may walk through
    /// before giving up with `#CALC!`. Evaluation recurses on the native
    /// stack, so this bounds stack usage.
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}
