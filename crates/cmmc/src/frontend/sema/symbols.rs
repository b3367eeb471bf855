//! Symbol table
//!
//! Variable names are unique across the whole script, whatever block they
//! are declared in, so the table is a single flat map rather than a chain of
//! scopes. Each symbol remembers the coordinate it was declared at for the
//! access checks done by the checker.

use std::collections::HashMap;
use std::fmt;

use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::frontend::lexer::ScopeCoord;
use crate::types::{Value, ValueType};

/// A declared variable
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    /// Current value; its variant is the declared type
    pub value: Value,
    pub scope: ScopeCoord,
    /// Whether anything has been assigned since the declaration
    pub initialized: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: ValueType, scope: ScopeCoord) -> Self {
        Self {
            name: name.into(),
            value: Value::zero(ty),
            scope,
            initialized: false,
        }
    }

    pub fn ty(&self) -> ValueType {
        self.value.ty()
    }

    /// Store `value` and mark the symbol initialized
    ///
    /// The caller has checked that `value` has the symbol's type.
    pub fn assign(&mut self, value: Value) {
        debug_assert_eq!(value.ty(), self.ty());
        self.value = value;
        self.initialized = true;
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.initialized {
            return write!(
                f,
                "Variable {} has been declared but not yet defined. ({})",
                self.name, self.scope
            );
        }

        match &self.value {
            Value::Float(x) => write!(
                f,
                "Variable {} (float) has value {:.2} ({})",
                self.name, x, self.scope
            ),
            value => write!(
                f,
                "Variable {} ({}) has value {} ({})",
                self.name,
                value.ty(),
                value,
                self.scope
            ),
        }
    }
}

/// Registry of every variable declared in one script
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: DefaultStringInterner,
    index: HashMap<DefaultSymbol, usize>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, name: &str) -> Option<usize> {
        let key = self.names.get(name)?;
        self.index.get(&key).copied()
    }

    /// Whether `name` is declared anywhere in the script so far
    pub fn exists(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.slot(name).map(|i| &self.symbols[i])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.slot(name).map(|i| &mut self.symbols[i])
    }

    /// Declare a new variable
    pub fn declare(&mut self, name: &str, ty: ValueType, scope: ScopeCoord) -> Result<&Symbol, String> {
        if self.exists(name) {
            return Err(format!("'{}' already exists. Cannot re-declare a variable.", name));
        }

        let key = self.names.get_or_intern(name);
        let slot = self.symbols.len();
        self.index.insert(key, slot);
        self.symbols.push(Symbol::new(name, ty, scope));
        Ok(&self.symbols[slot])
    }

    /// Symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}
