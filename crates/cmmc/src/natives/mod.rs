//! Native functions callable from scripts
//!
//! The registry is built once at startup and only read afterwards, so one
//! instance can be shared by any number of compilations. Everything a call
//! produces for later stages goes into the per-run [`CallContext`].

mod builtins;

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::common::{CompileError, CompileResult};
use crate::types::{Value, ValueType};

pub use builtins::register_builtins;

/// Declared type of one native parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Int,
    Float,
    String,
    /// Accepts a value of any type
    Any,
}

impl ParamType {
    pub fn accepts(&self, ty: ValueType) -> bool {
        match self {
            ParamType::Int => ty == ValueType::Int,
            ParamType::Float => ty == ValueType::Float,
            ParamType::String => ty == ValueType::String,
            ParamType::Any => true,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::String => write!(f, "string"),
            ParamType::Any => write!(f, "any"),
        }
    }
}

/// Why a native call was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("Could not call '{function}', that function does not exist.")]
    Unknown { function: String },

    #[error("{function} expects {expected} parameter(s), got {got}.")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    /// `position` is 1-based
    #[error("Parameter {position} has a bad type (expected {expected}, got {got}, in function call {function})")]
    TypeMismatch {
        function: String,
        position: usize,
        expected: ParamType,
        got: ValueType,
    },
}

/// Identifies an operation handed to code generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationId {
    MessageBox,
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationId::MessageBox => write!(f, "messageBox"),
        }
    }
}

/// A side effect recorded by a native call, in call order
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub id: OperationId,
    pub args: Vec<Value>,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.id)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match arg {
                Value::String(s) => write!(f, "{:?}", s)?,
                other => write!(f, "{}", other)?,
            }
        }
        write!(f, ")")
    }
}

/// Per-compilation state native functions may write to
#[derive(Debug, Default)]
pub struct CallContext {
    operations: Vec<Operation>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, id: OperationId, args: Vec<Value>) {
        self.operations.push(Operation { id, args });
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

/// Implementation of a native function
///
/// Arguments have already been checked against the declared signature.
/// Returning `None` means the function produces no value.
pub trait NativeFunction: Send + Sync {
    fn call(&self, args: &[Value], ctx: &mut CallContext) -> Option<Value>;
}

impl<F> NativeFunction for F
where
    F: Fn(&[Value], &mut CallContext) -> Option<Value> + Send + Sync,
{
    fn call(&self, args: &[Value], ctx: &mut CallContext) -> Option<Value> {
        self(args, ctx)
    }
}

/// A registered native function
pub struct NativeDescriptor {
    pub name: String,
    pub params: Vec<ParamType>,
    implementation: Box<dyn NativeFunction>,
}

impl NativeDescriptor {
    /// Check `args` against the signature, first problem wins
    pub fn check_args(&self, args: &[Value]) -> Result<(), CallError> {
        if args.len() != self.params.len() {
            return Err(CallError::ArityMismatch {
                function: self.name.clone(),
                expected: self.params.len(),
                got: args.len(),
            });
        }

        for (i, (param, arg)) in self.params.iter().zip(args).enumerate() {
            if !param.accepts(arg.ty()) {
                return Err(CallError::TypeMismatch {
                    function: self.name.clone(),
                    position: i + 1,
                    expected: *param,
                    got: arg.ty(),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for NativeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Registry of all native functions
#[derive(Debug, Default)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeDescriptor>,
}

impl NativeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the standard built-ins
    pub fn with_builtins() -> CompileResult<Self> {
        let mut registry = Self::new();
        register_builtins(&mut registry)?;
        Ok(registry)
    }

    pub fn register(
        &mut self,
        name: &str,
        params: Vec<ParamType>,
        implementation: impl NativeFunction + 'static,
    ) -> CompileResult<()> {
        if self.exists(name) {
            return Err(CompileError::duplicate_native(name));
        }

        log::trace!("registering native {}({} params)", name, params.len());
        self.functions.insert(
            name.to_string(),
            NativeDescriptor {
                name: name.to_string(),
                params,
                implementation: Box::new(implementation),
            },
        );
        Ok(())
    }

    pub fn exists(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&NativeDescriptor> {
        self.functions.get(name)
    }

    /// Type-check `args` and invoke the function once
    pub fn call(&self, name: &str, args: &[Value], ctx: &mut CallContext) -> Result<Option<Value>, CallError> {
        let function = self.lookup(name).ok_or_else(|| CallError::Unknown {
            function: name.to_string(),
        })?;

        function.check_args(args)?;
        Ok(function.implementation.call(args, ctx))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
