//! Process-wide symbol interner.
//!
//! Symbols are interned once, by string equality, and thereafter compared by
//! the integer id returned here — never by string. Special-form dispatch and
//! environment lookups rely on this identity, not on spelling.

use std::collections::HashMap;

/// An interned symbol. Cheap to copy, compares by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

/// Owns the canonical string for every symbol seen so far.
///
/// Lives outside the cons heap entirely, so it is never a GC root: nothing in
/// it is a `Handle`, and interned symbols are never reclaimed.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<Box<str>>,
    ids: HashMap<Box<str>, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning its existing id or allocating a new one.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&sym) = self.ids.get(name) {
            return sym;
        }
        let sym = Symbol(self.names.len() as u32);
        self.names.push(name.into());
        self.ids.insert(name.into(), sym);
        sym
    }

    pub fn name(&self, sym: Symbol) -> &str {
        &self.names[sym.0 as usize]
    }
}

/// Symbols the evaluator dispatches on by identity, interned once at startup.
#[derive(Debug, Clone, Copy)]
pub struct WellKnown {
    pub quote: Symbol,
    pub quasiquote: Symbol,
    pub unquote: Symbol,
    pub unquote_splicing: Symbol,
    pub if_: Symbol,
    pub lambda: Symbol,
    pub define: Symbol,
    pub defmacro: Symbol,
    pub apply: Symbol,
    pub t: Symbol,
    pub nil: Symbol,
    /// Internal frame-kind marker: operator position under resolution.
    pub resolve_op: Symbol,
    /// Internal frame-kind marker: executing a body's remaining forms.
    pub body: Symbol,
}

impl WellKnown {
    pub fn intern(table: &mut SymbolTable) -> Self {
        Self {
            quote: table.intern("quote"),
            quasiquote: table.intern("quasiquote"),
            unquote: table.intern("unquote"),
            unquote_splicing: table.intern("unquote-splicing"),
            if_: table.intern("if"),
            lambda: table.intern("lambda"),
            define: table.intern("define"),
            defmacro: table.intern("defmacro"),
            apply: table.intern("apply"),
            t: table.intern("t"),
            nil: table.intern("nil"),
            resolve_op: table.intern("%resolve-op"),
            body: table.intern("%body"),
        }
    }
}
