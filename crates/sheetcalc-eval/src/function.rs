//! The `Function` trait and the builder used to define checked functions.

use std::sync::Arc;

use sheetcalc_common::CalcError;
use smallvec::SmallVec;

use crate::args::{ArgSpec, Signature, SignatureError};
use crate::context::Context;
use crate::expr::Arg;
use crate::function_registry;
use crate::value::Value;

/// A callable formula function.
///
/// Implementations receive their arguments evaluated, except for argument
/// expressions the compiler marked lazy, which arrive as thunks.
pub trait Function: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn call(&self, ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError>;
}

pub type RawHandler = fn(&mut Context, Vec<Arg>) -> Result<Value, CalcError>;

/// A function that does its own argument handling (operators, `if`).
pub struct RawFunction {
    name: &'static str,
    handler: RawHandler,
}

impl RawFunction {
    pub fn new(name: &'static str, handler: RawHandler) -> Self {
        Self { name, handler }
    }
}

impl Function for RawFunction {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&self, ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
        (self.handler)(ctx, args)
    }
}

type SyncHandler = Arc<dyn Fn(&mut Context, &[Value]) -> Value + Send + Sync>;
type LazyHandler = Arc<dyn Fn(&mut Context, Vec<Arg>) -> Result<Value, CalcError> + Send + Sync>;

enum Handler {
    /// Gets plain values; returning [`Value::Error`] fails the call.
    Sync(SyncHandler),
    /// Gets the checked arguments, thunks included, and completes itself.
    Lazy(LazyHandler),
}

/// A function whose arguments pass a compiled [`Signature`] before the
/// handler runs.
pub struct CheckedFunction {
    name: String,
    signature: Signature,
    handler: Handler,
}

impl Function for CheckedFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, ctx: &mut Context, args: Vec<Arg>) -> Result<Value, CalcError> {
        let args = self.signature.check(ctx, args)?;
        match &self.handler {
            Handler::Sync(h) => {
                let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
                for a in args {
                    values.push(a.eval(ctx)?);
                }
                match h(ctx, &values) {
                    Value::Error(e) => Err(e),
                    v => Ok(v),
                }
            }
            Handler::Lazy(h) => h(ctx, args),
        }
    }
}

/// Builder returned by [`define_function`].
pub struct FunctionDef {
    name: String,
}

/// Start defining (or redefining) the function `name`.
pub fn define_function(name: &str) -> FunctionDef {
    FunctionDef::new(name)
}

impl FunctionDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
        }
    }

    fn build(self, spec: Vec<ArgSpec>, handler: Handler) -> Result<CheckedFunction, SignatureError> {
        if self.name.is_empty() {
            return Err(SignatureError::EmptyName);
        }
        Ok(CheckedFunction {
            name: self.name,
            signature: Signature::compile(spec)?,
            handler,
        })
    }

    /// Compile a function whose handler maps checked values to a value.
    pub fn sync<F>(self, spec: Vec<ArgSpec>, handler: F) -> Result<CheckedFunction, SignatureError>
    where
        F: Fn(&mut Context, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.build(spec, Handler::Sync(Arc::new(handler)))
    }

    /// Compile a function whose handler takes the checked arguments,
    /// thunks included, and evaluates them as it sees fit.
    pub fn lazy<F>(self, spec: Vec<ArgSpec>, handler: F) -> Result<CheckedFunction, SignatureError>
    where
        F: Fn(&mut Context, Vec<Arg>) -> Result<Value, CalcError> + Send + Sync + 'static,
    {
        self.build(spec, Handler::Lazy(Arc::new(handler)))
    }

    /// Compile and register a synchronous function.
    pub fn args<F>(self, spec: Vec<ArgSpec>, handler: F) -> Result<(), SignatureError>
    where
        F: Fn(&mut Context, &[Value]) -> Value + Send + Sync + 'static,
    {
        function_registry::register(Arc::new(self.sync(spec, handler)?));
        Ok(())
    }

    /// Compile and register a function that completes on its own terms.
    pub fn args_async<F>(self, spec: Vec<ArgSpec>, handler: F) -> Result<(), SignatureError>
    where
        F: Fn(&mut Context, Vec<Arg>) -> Result<Value, CalcError> + Send + Sync + 'static,
    {
        function_registry::register(Arc::new(self.lazy(spec, handler)?));
        Ok(())
    }
}
