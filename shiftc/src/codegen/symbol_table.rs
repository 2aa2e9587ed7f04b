use std::collections::HashMap;

use crate::types::types::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub scope: SymbolScope,
    pub index: u32,
}

/// Lexically nested name table. Indices are dense and monotone per scope;
/// a symbol advances the counter by its type's wire width, so a `string`
/// occupies two consecutive slots. Redefinition in the same scope overwrites
/// silently.
#[derive(Debug, Default)]
pub struct SymbolTable {
    outer: Option<Box<SymbolTable>>,
    store: HashMap<String, Symbol>,
    num_definitions: u32,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enclose(outer: SymbolTable) -> Self {
        Self {
            outer: Some(Box::new(outer)),
            ..Self::default()
        }
    }

    /// Leaves the scope, handing back the enclosing table.
    pub fn pop(self) -> Option<SymbolTable> {
        self.outer.map(|outer| *outer)
    }

    pub fn define(&mut self, name: &str, ty: Type) -> Symbol {
        let scope = if self.outer.is_none() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };

        let symbol = Symbol {
            name: name.to_string(),
            ty,
            scope,
            index: self.num_definitions,
        };

        self.num_definitions += ty.width();
        self.store.insert(name.to_string(), symbol.clone());

        symbol
    }

    /// Walks outward; symbols resolved from an enclosing scope are returned
    /// unchanged.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.store
            .get(name)
            .or_else(|| self.outer.as_ref()?.resolve(name))
    }
}
