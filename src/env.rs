//! Environments as ordinary heap data.
//!
//! An environment is the pair `(parent . bindings)`, where `bindings` is a
//! list of `(symbol . value)` pairs and `parent` is `Nil` at the root.
//! Lookup walks the parent chain; `set!` touches only the local frame,
//! prepending a fresh binding if the symbol isn't already bound there.
//! Binding lookup compares symbols by identity, never by spelling.

use crate::error::EvalError;
use crate::heap::Heap;
use crate::symbol::Symbol;
use crate::value::Value;

pub fn new_env(heap: &mut Heap, parent: Value) -> Value {
    heap.cons(parent, Value::Nil)
}

fn parent(heap: &Heap, env: Value) -> Value {
    heap.car(env.as_pair().expect("environment must be a pair"))
}

fn bindings(heap: &Heap, env: Value) -> Value {
    heap.cdr(env.as_pair().expect("environment must be a pair"))
}

fn set_bindings(heap: &mut Heap, env: Value, bindings: Value) {
    heap.set_cdr(env.as_pair().expect("environment must be a pair"), bindings);
}

/// Look up `sym` starting at `env`, walking outward through parents.
pub fn get(heap: &Heap, env: Value, sym: Symbol) -> Option<Value> {
    let mut cur = env;
    loop {
        if cur.is_nil() {
            return None;
        }
        let mut b = bindings(heap, cur);
        while let Some(pair) = b.as_pair() {
            let entry = heap.car(pair);
            let entry_pair = entry.as_pair().expect("binding must be a pair");
            if heap.car(entry_pair).as_symbol() == Some(sym) {
                return Some(heap.cdr(entry_pair));
            }
            b = heap.cdr(pair);
        }
        cur = parent(heap, cur);
    }
}

/// Bind `sym` to `value` in the local frame of `env`, shadowing any outer
/// binding. Always prepends, so repeated `define`s in the same frame shadow
/// their predecessor rather than mutating it.
pub fn define(heap: &mut Heap, env: Value, sym: Symbol, value: Value) {
    let entry = heap.cons(Value::Symbol(sym), value);
    let rest = bindings(heap, env);
    let new_bindings = heap.cons(entry, rest);
    set_bindings(heap, env, new_bindings);
}

/// Update `sym` in the local frame only. If not already bound locally,
/// prepends a new binding there rather than searching or touching parents.
pub fn set(heap: &mut Heap, env: Value, sym: Symbol, value: Value) -> Result<(), EvalError> {
    let mut b = bindings(heap, env);
    while let Some(pair) = b.as_pair() {
        let entry = heap.car(pair);
        let entry_pair = entry.as_pair().expect("binding must be a pair");
        if heap.car(entry_pair).as_symbol() == Some(sym) {
            heap.set_cdr(entry_pair, value);
            return Ok(());
        }
        b = heap.cdr(pair);
    }
    define(heap, env, sym, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolTable;

    #[test]
    fn define_then_get_in_same_frame() {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let x = syms.intern("x");
        let env = new_env(&mut heap, Value::Nil);
        define(&mut heap, env, x, Value::Integer(42));
        assert_eq!(get(&heap, env, x).unwrap().as_integer(), Some(42));
    }

    #[test]
    fn get_walks_parent_chain() {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let x = syms.intern("x");
        let root = new_env(&mut heap, Value::Nil);
        define(&mut heap, root, x, Value::Integer(1));
        let child = new_env(&mut heap, root);
        assert_eq!(get(&heap, child, x).unwrap().as_integer(), Some(1));
    }

    #[test]
    fn child_binding_shadows_parent() {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let x = syms.intern("x");
        let root = new_env(&mut heap, Value::Nil);
        define(&mut heap, root, x, Value::Integer(1));
        let child = new_env(&mut heap, root);
        define(&mut heap, child, x, Value::Integer(2));
        assert_eq!(get(&heap, child, x).unwrap().as_integer(), Some(2));
        assert_eq!(get(&heap, root, x).unwrap().as_integer(), Some(1));
    }

    #[test]
    fn set_never_reaches_into_parent() {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let x = syms.intern("x");
        let root = new_env(&mut heap, Value::Nil);
        define(&mut heap, root, x, Value::Integer(1));
        let child = new_env(&mut heap, root);
        set(&mut heap, child, x, Value::Integer(99)).unwrap();
        assert_eq!(get(&heap, child, x).unwrap().as_integer(), Some(99));
        assert_eq!(get(&heap, root, x).unwrap().as_integer(), Some(1));
    }

    #[test]
    fn get_missing_symbol_returns_none() {
        let mut heap = Heap::new();
        let mut syms = SymbolTable::new();
        let x = syms.intern("x");
        let env = new_env(&mut heap, Value::Nil);
        assert!(get(&heap, env, x).is_none());
    }
}
