//! Spreadsheet error values.
//!
//! - **`CalcErrorKind`** : the error codes a formula can evaluate to
//! - **`CalcError`**     : the kind plus an optional human explanation
//!
//! Errors are *data*: they flow through evaluation like any other value
//! and are only inspected by the error predicates (`ISERROR` & co).
//! Two errors are equal when their codes are equal; the message is
//! diagnostic only.

use std::{error::Error, fmt};

/// All error codes produced by the engine.
///
/// `Display` renders them the way a cell shows them (`#DIV/0!`, …).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalcErrorKind {
    Null,
    Ref,
    Name,
    Value,
    Div,
    Na,
    Num,
    Circular,
    Calc,
}

impl CalcErrorKind {
    /// The bare code, without the `#…!` decoration.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Ref => "REF",
            Self::Name => "NAME",
            Self::Value => "VALUE",
            Self::Div => "DIV/0",
            Self::Na => "N/A",
            Self::Num => "NUM",
            Self::Circular => "CIRCULAR",
            Self::Calc => "CALC",
        }
    }

    /// Parse a bare code (`"DIV/0"`) or its displayed form (`"#DIV/0!"`).
    pub fn from_code(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        let s = s.strip_suffix('!').unwrap_or(s);
        Some(match s.to_ascii_uppercase().as_str() {
            "NULL" => Self::Null,
            "REF" => Self::Ref,
            "NAME" => Self::Name,
            "VALUE" => Self::Value,
            "DIV/0" => Self::Div,
            "N/A" => Self::Na,
            "NUM" => Self::Num,
            "CIRCULAR" => Self::Circular,
            "CALC" => Self::Calc,
            _ => return None,
        })
    }
}

impl fmt::Display for CalcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}!", self.code())
    }
}

/// The error value passed around by the engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalcError {
    pub kind: CalcErrorKind,
    pub message: Option<String>,
}

/* ───────────────────── Constructors & helpers ─────────────────────── */

impl From<CalcErrorKind> for CalcError {
    fn from(kind: CalcErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl CalcError {
    pub fn new(kind: CalcErrorKind) -> Self {
        kind.into()
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Build from a code string; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        CalcErrorKind::from_code(code).map(Self::new)
    }

    pub fn is(&self, kind: CalcErrorKind) -> bool {
        self.kind == kind
    }
}

/* ───────────────────────── Display / Error ────────────────────────── */

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for CalcError {}

impl PartialEq for CalcError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for CalcError {}

impl std::hash::Hash for CalcError {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl PartialEq<CalcErrorKind> for CalcError {
    fn eq(&self, other: &CalcErrorKind) -> bool {
        self.kind == *other
    }
}

impl PartialEq<str> for CalcError {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for CalcError {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
