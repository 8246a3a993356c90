//! Declarative argument signatures.
//!
//! A function declares what it accepts as a list of [`ArgSpec`]s; the list
//! is compiled once into a [`Signature`] when the function is registered,
//! and every call runs the compiled checks before the handler sees its
//! arguments. Checks may rewrite an argument (dereference it, coerce a
//! boolean to a number, turn a range into a matrix, fill in a default).

use std::fmt;

use sheetcalc_common::{CalcError, CalcErrorKind, Reference};

use crate::context::Context;
use crate::expr::Arg;
use crate::value::Value;

/// Constant that can live in a signature (defaults, allowed values).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgLiteral {
    Number(f64),
    Text(&'static str),
    Boolean(bool),
    Null,
}

impl ArgLiteral {
    pub fn to_value(self) -> Value {
        match self {
            ArgLiteral::Number(n) => Value::Number(n),
            ArgLiteral::Text(s) => Value::Text(s.to_string()),
            ArgLiteral::Boolean(b) => Value::Boolean(b),
            ArgLiteral::Null => Value::Null,
        }
    }

    fn matches(self, v: &Value) -> bool {
        match (self, v) {
            (ArgLiteral::Number(a), Value::Number(b)) => a == *b,
            (ArgLiteral::Text(a), Value::Text(b)) => a == b,
            (ArgLiteral::Boolean(a), Value::Boolean(b)) => a == *b,
            (ArgLiteral::Null, Value::Null) => true,
            _ => false,
        }
    }
}

/// Custom check over the arguments bound so far.
#[derive(Clone, Copy)]
pub struct Predicate(pub fn(&ArgBindings<'_>) -> bool);

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// What a single argument must look like.
#[derive(Debug, Clone)]
pub enum ArgType {
    /// Number, or boolean coerced to 0/1.
    Number,
    /// Number that must not be zero; zero fails with `#DIV/0!`.
    Divisor,
    /// Number `>= 0`.
    NonNegative,
    /// Number `> 0`.
    Positive,
    String,
    Boolean,
    /// Anything convertible to a matrix; the argument becomes that matrix.
    Matrix,
    /// Unevaluated reference of any kind.
    Ref,
    /// Cell or range reference.
    Area,
    Cell,
    /// Missing or blank.
    Null,
    /// Present; references are dereferenced.
    Any,
    /// Present; left untouched (thunks stay unevaluated).
    AnyLazy,
    Or(Vec<ArgType>),
    And(Vec<ArgType>),
    /// Strictly equal to one of the listed constants.
    Values(Vec<ArgLiteral>),
    /// Missing or blank, replaced by the given default.
    Default(ArgLiteral),
    /// Number within the inclusive bounds.
    Between(f64, f64),
    Assert(Predicate),
    /// Like the inner check, but failing with the given error code.
    Fails(Box<ArgType>, CalcErrorKind),
}

impl ArgType {
    /// Parse a primitive type tag such as `"number+"` or `"any*"`.
    pub fn parse(tag: &str) -> Result<Self, SignatureError> {
        Ok(match tag {
            "number" => ArgType::Number,
            "divisor" => ArgType::Divisor,
            "number+" => ArgType::NonNegative,
            "number++" => ArgType::Positive,
            "string" => ArgType::String,
            "boolean" => ArgType::Boolean,
            "matrix" => ArgType::Matrix,
            "ref" => ArgType::Ref,
            "area" => ArgType::Area,
            "cell" => ArgType::Cell,
            "null" => ArgType::Null,
            "any" => ArgType::Any,
            "any*" => ArgType::AnyLazy,
            other => return Err(SignatureError::UnknownType(other.to_string())),
        })
    }

    pub fn or(types: impl IntoIterator<Item = ArgType>) -> Self {
        ArgType::Or(types.into_iter().collect())
    }

    pub fn and(types: impl IntoIterator<Item = ArgType>) -> Self {
        ArgType::And(types.into_iter().collect())
    }

    /// Number, or the default when missing or blank.
    pub fn optional_number(default: f64) -> Self {
        ArgType::Or(vec![ArgType::Number, ArgType::Default(ArgLiteral::Number(default))])
    }

    /// Whether checking this type dereferences the argument, meaning the
    /// formulas it refers to must be evaluated first.
    pub fn forces(&self) -> bool {
        match self {
            ArgType::Ref | ArgType::Area | ArgType::Cell | ArgType::AnyLazy | ArgType::Assert(_) => false,
            ArgType::Or(types) | ArgType::And(types) => types.iter().any(ArgType::forces),
            ArgType::Fails(inner, _) => inner.forces(),
            _ => true,
        }
    }

    fn validate(&self, name: &'static str) -> Result<(), SignatureError> {
        match self {
            ArgType::Between(lo, hi) if lo > hi => Err(SignatureError::InvertedBounds {
                name,
                lo: *lo,
                hi: *hi,
            }),
            ArgType::Or(types) | ArgType::And(types) => types.iter().try_for_each(|t| t.validate(name)),
            ArgType::Fails(inner, _) => inner.validate(name),
            _ => Ok(()),
        }
    }
}

/// One entry of a signature.
#[derive(Debug, Clone)]
pub enum ArgSpec {
    One { name: &'static str, ty: ArgType },
    /// Zero or more repetitions, while arguments remain.
    Group(Vec<ArgSpec>),
    /// One or more repetitions.
    Repeat(Vec<ArgSpec>),
}

impl ArgSpec {
    pub fn arg(name: &'static str, ty: ArgType) -> Self {
        ArgSpec::One { name, ty }
    }

    /// Argument described by a primitive type tag.
    pub fn tagged(name: &'static str, tag: &str) -> Result<Self, SignatureError> {
        Ok(ArgSpec::One {
            name,
            ty: ArgType::parse(tag)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureError {
    #[error("can't check for type: {0}")]
    UnknownType(String),
    #[error("repetition group has no arguments")]
    EmptyGroup,
    #[error("argument `{name}` has inverted bounds {lo} > {hi}")]
    InvertedBounds { name: &'static str, lo: f64, hi: f64 },
    #[error("function name is empty")]
    EmptyName,
}

/// The arguments already checked, plus the one being checked, by name.
pub struct ArgBindings<'a> {
    prev: &'a [(&'static str, Arg)],
    name: &'static str,
    current: &'a Arg,
}

impl ArgBindings<'_> {
    /// Value bound to `name`. When a group repeats, the latest binding wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        if name == self.name {
            return self.current.value();
        }
        self.prev
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .and_then(|(_, a)| a.value())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => Some(*n),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Value> {
        self.current.value()
    }

    /// Number of arguments checked so far, not counting the current one.
    pub fn count(&self) -> usize {
        self.prev.len()
    }
}

#[derive(Debug, Clone)]
enum Node {
    One {
        name: &'static str,
        ty: ArgType,
        forces: bool,
    },
    Group(Vec<Node>),
    Repeat(Vec<Node>),
}

/// A compiled argument signature.
#[derive(Debug, Clone)]
pub struct Signature {
    nodes: Vec<Node>,
    forces: bool,
}

impl Signature {
    pub fn compile(spec: Vec<ArgSpec>) -> Result<Self, SignatureError> {
        let nodes = compile_nodes(spec)?;
        let forces = nodes.iter().any(node_forces);
        Ok(Self { nodes, forces })
    }

    /// Check `args` against the signature, returning the (possibly
    /// rewritten) argument list.
    ///
    /// Formulas behind arguments that get dereferenced are evaluated first.
    /// An error argument is propagated as-is. A failed check yields
    /// `#N/A` when the argument was missing and `#VALUE!` (or the code the
    /// check names) otherwise; leftover arguments yield `#N/A`.
    pub fn check(&self, ctx: &mut Context, args: Vec<Arg>) -> Result<Vec<Arg>, CalcError> {
        if !self.forces {
            return self.run(ctx, args);
        }
        let mut pending = Vec::new();
        let mut pos = 0;
        collect_forced(&self.nodes, &args, &mut pos, &mut pending);
        ctx.resolve_cells(&pending, |ctx| self.run(ctx, args))
    }

    fn run(&self, ctx: &mut Context, args: Vec<Arg>) -> Result<Vec<Arg>, CalcError> {
        let mut state = CheckState {
            input: args,
            pos: 0,
            out: Vec::new(),
        };
        walk(ctx, &self.nodes, &mut state)?;
        if state.pos < state.input.len() {
            return Err(CalcError::new(CalcErrorKind::Na).with_message(format!(
                "expected at most {} arguments, got {}",
                state.pos,
                state.input.len()
            )));
        }
        Ok(state.out.into_iter().map(|(_, a)| a).collect())
    }
}

fn compile_nodes(spec: Vec<ArgSpec>) -> Result<Vec<Node>, SignatureError> {
    spec.into_iter()
        .map(|s| match s {
            ArgSpec::One { name, ty } => {
                ty.validate(name)?;
                let forces = ty.forces();
                Ok(Node::One { name, ty, forces })
            }
            ArgSpec::Group(inner) | ArgSpec::Repeat(inner) if inner.is_empty() => Err(SignatureError::EmptyGroup),
            ArgSpec::Group(inner) => Ok(Node::Group(compile_nodes(inner)?)),
            ArgSpec::Repeat(inner) => Ok(Node::Repeat(compile_nodes(inner)?)),
        })
        .collect()
}

fn node_forces(node: &Node) -> bool {
    match node {
        Node::One { forces, .. } => *forces,
        Node::Group(inner) | Node::Repeat(inner) => inner.iter().any(node_forces),
    }
}

/// Walk the argument positions the way the checks will, collecting the
/// references and arrays that forcing checks are about to dereference.
fn collect_forced(nodes: &[Node], args: &[Arg], pos: &mut usize, out: &mut Vec<Value>) {
    for node in nodes {
        match node {
            Node::One { forces, .. } => {
                if *forces {
                    if let Some(Arg::Value(v @ (Value::Ref(_) | Value::Array(_)))) = args.get(*pos) {
                        out.push(v.clone());
                    }
                }
                *pos += 1;
            }
            Node::Group(inner) | Node::Repeat(inner) => {
                while *pos < args.len() {
                    collect_forced(inner, args, pos, out);
                }
            }
        }
    }
}

struct CheckState {
    input: Vec<Arg>,
    pos: usize,
    out: Vec<(&'static str, Arg)>,
}

fn walk(ctx: &mut Context, nodes: &[Node], st: &mut CheckState) -> Result<(), CalcError> {
    for node in nodes {
        match node {
            Node::One { name, ty, .. } => check_one(ctx, name, ty, st)?,
            Node::Group(inner) => {
                while st.pos < st.input.len() {
                    walk(ctx, inner, st)?;
                }
            }
            Node::Repeat(inner) => loop {
                walk(ctx, inner, st)?;
                if st.pos >= st.input.len() {
                    break;
                }
            },
        }
    }
    Ok(())
}

/// The argument under check.
struct Slot {
    arg: Arg,
    present: bool,
    forced: bool,
}

impl Slot {
    fn value(&self) -> Option<&Value> {
        self.arg.value()
    }

    fn force(&mut self, ctx: &Context) -> Result<(), CalcError> {
        if self.forced {
            return Ok(());
        }
        self.forced = true;
        if let Arg::Value(v @ Value::Ref(_)) = &self.arg {
            let v = ctx.force(v);
            if let Value::Error(e) = v {
                return Err(e);
            }
            self.arg = Arg::Value(v);
        }
        Ok(())
    }

    /// Number (booleans become 0/1), or `None`.
    fn numeric(&mut self, ctx: &Context) -> Result<Option<f64>, CalcError> {
        self.force(ctx)?;
        Ok(match self.arg {
            Arg::Value(Value::Number(n)) => Some(n),
            Arg::Value(Value::Boolean(b)) => {
                let n = if b { 1.0 } else { 0.0 };
                self.arg = Arg::Value(Value::Number(n));
                Some(n)
            }
            _ => None,
        })
    }
}

fn check_one(ctx: &mut Context, name: &'static str, ty: &ArgType, st: &mut CheckState) -> Result<(), CalcError> {
    let raw = st.input.get(st.pos).cloned();
    st.pos += 1;
    if let Some(Arg::Value(Value::Error(e))) = raw {
        return Err(e);
    }
    let present = raw.is_some();
    let mut slot = Slot {
        arg: raw.unwrap_or(Arg::Value(Value::Null)),
        present,
        forced: false,
    };
    let mut fail = CalcErrorKind::Value;
    if !cond(ctx, name, ty, &mut slot, &mut fail, &st.out)? {
        let kind = if present { fail } else { CalcErrorKind::Na };
        return Err(CalcError::new(kind).with_message(format!("argument `{name}`")));
    }
    st.out.push((name, slot.arg));
    Ok(())
}

fn cond(
    ctx: &Context,
    name: &'static str,
    ty: &ArgType,
    slot: &mut Slot,
    fail: &mut CalcErrorKind,
    prev: &[(&'static str, Arg)],
) -> Result<bool, CalcError> {
    Ok(match ty {
        ArgType::Number => slot.numeric(ctx)?.is_some(),
        ArgType::Divisor => match slot.numeric(ctx)? {
            Some(n) if n == 0.0 => {
                *fail = CalcErrorKind::Div;
                false
            }
            Some(_) => true,
            None => false,
        },
        ArgType::NonNegative => slot.numeric(ctx)?.is_some_and(|n| n >= 0.0),
        ArgType::Positive => slot.numeric(ctx)?.is_some_and(|n| n > 0.0),
        ArgType::Between(lo, hi) => slot.numeric(ctx)?.is_some_and(|n| n >= *lo && n <= *hi),
        ArgType::String => {
            slot.force(ctx)?;
            matches!(slot.value(), Some(Value::Text(_)))
        }
        ArgType::Boolean => {
            slot.force(ctx)?;
            matches!(slot.value(), Some(Value::Boolean(_)))
        }
        ArgType::Matrix => {
            slot.force(ctx)?;
            match slot.value().and_then(|v| ctx.as_matrix(v)) {
                Some(m) => {
                    slot.arg = Arg::Value(Value::Matrix(m));
                    true
                }
                None => false,
            }
        }
        ArgType::Ref => matches!(slot.value(), Some(Value::Ref(_))),
        ArgType::Area => matches!(
            slot.value(),
            Some(Value::Ref(Reference::Cell(_) | Reference::Range(_)))
        ),
        ArgType::Cell => matches!(slot.value(), Some(Value::Ref(Reference::Cell(_)))),
        ArgType::Null => {
            slot.force(ctx)?;
            matches!(slot.value(), Some(Value::Null))
        }
        ArgType::Default(lit) => {
            slot.force(ctx)?;
            if matches!(slot.value(), Some(Value::Null)) {
                slot.arg = Arg::Value(lit.to_value());
                true
            } else {
                false
            }
        }
        ArgType::Any => {
            slot.force(ctx)?;
            slot.present
        }
        ArgType::AnyLazy => slot.present,
        ArgType::Values(lits) => {
            slot.force(ctx)?;
            slot.value().is_some_and(|v| lits.iter().any(|l| l.matches(v)))
        }
        ArgType::Or(types) => {
            for t in types {
                if cond(ctx, name, t, slot, fail, prev)? {
                    return Ok(true);
                }
            }
            false
        }
        ArgType::And(types) => {
            for t in types {
                if !cond(ctx, name, t, slot, fail, prev)? {
                    return Ok(false);
                }
            }
            true
        }
        ArgType::Assert(p) => (p.0)(&ArgBindings {
            prev,
            name,
            current: &slot.arg,
        }),
        ArgType::Fails(inner, kind) => {
            if cond(ctx, name, inner, slot, fail, prev)? {
                true
            } else {
                *fail = *kind;
                false
            }
        }
    })
}
