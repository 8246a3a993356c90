//! Scalar coercions shared by the operators and the argument checker.

use std::cmp::Ordering;

use crate::value::Value;

/// Numeric view of a scalar: booleans are 0/1, blanks are 0, text is
/// parsed after trimming (empty text is 0). Anything else has no number.
pub fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => Some(*n),
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(0.0);
            }
            s.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Text view of a scalar, used by concatenation and mixed comparisons.
pub fn to_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integral values print without a fractional part, like a cell would.
pub fn number_to_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

enum Operand {
    Null,
    Number(f64),
    Text(String),
    Boolean(bool),
}

impl Operand {
    fn of(v: &Value) -> Option<Self> {
        Some(match v {
            Value::Null => Operand::Null,
            Value::Number(n) => Operand::Number(*n),
            Value::Text(s) => Operand::Text(s.clone()),
            Value::Boolean(b) => Operand::Boolean(*b),
            _ => return None,
        })
    }

    fn is_text(&self) -> bool {
        matches!(self, Operand::Text(_))
    }

    fn into_text(self) -> Self {
        match self {
            Operand::Null => Operand::Text(String::new()),
            Operand::Number(n) => Operand::Text(number_to_text(n)),
            Operand::Boolean(b) => Operand::Text(if b { "TRUE" } else { "FALSE" }.to_string()),
            text => text,
        }
    }
}

/// Ordering of two scalars under spreadsheet comparison rules, `None` when
/// the operands cannot be compared (the caller reports `#VALUE!`).
///
/// Text against non-text compares against the other side's text form, a
/// blank against a number counts as 0, and text comparison ignores case.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let mut l = Operand::of(left)?;
    let mut r = Operand::of(right)?;
    if l.is_text() && !r.is_text() {
        r = r.into_text();
    }
    if !l.is_text() && r.is_text() {
        l = l.into_text();
    }
    match (&l, &r) {
        (Operand::Number(_), Operand::Null) => r = Operand::Number(0.0),
        (Operand::Null, Operand::Number(_)) => l = Operand::Number(0.0),
        _ => {}
    }
    match (l, r) {
        (Operand::Text(a), Operand::Text(b)) => Some(a.to_lowercase().cmp(&b.to_lowercase())),
        (Operand::Number(a), Operand::Number(b)) => a.partial_cmp(&b),
        (Operand::Boolean(a), Operand::Boolean(b)) => Some(a.cmp(&b)),
        (Operand::Null, Operand::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Exact equality used by `=` and `<>`: same type and same content,
/// text compared case-sensitively.
pub fn strict_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}
