use std::fmt::{self, Display};

use sheetcalc_common::{CalcError, CalcErrorKind, Reference};

use crate::coercion::number_to_text;
use crate::matrix::Matrix;

/// Everything an expression can evaluate to.
///
/// `Array` is the literal nested-array form: a list of rows, each row a
/// list of elements. It is also what [`Workbook::data`](crate::traits::Workbook::data)
/// returns for a range. `Matrix` is the rectangular, lazily dereferencing
/// form built from either.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Empty cell or missing argument.
    #[default]
    Null,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(CalcError),
    Matrix(Matrix),
    Ref(Reference),
    Array(Vec<Value>),
}

impl Value {
    pub fn error(kind: CalcErrorKind) -> Self {
        Value::Error(CalcError::new(kind))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_error(&self) -> Option<&CalcError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Number(n) => f.write_str(&number_to_text(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Error(e) => write!(f, "{e}"),
            Value::Matrix(m) => write!(f, "{m:?}"),
            Value::Ref(r) => write!(f, "{r:?}"),
            Value::Array(a) => write!(f, "{a:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<CalcError> for Value {
    fn from(e: CalcError) -> Self {
        Value::Error(e)
    }
}

impl From<CalcErrorKind> for Value {
    fn from(kind: CalcErrorKind) -> Self {
        Value::Error(CalcError::new(kind))
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Ref(r)
    }
}
