//! Writes `Value`s back out as Lisp source text.

use crate::heap::Heap;
use crate::symbol::SymbolTable;
use crate::value::Value;
use std::fmt::{self, Write};

pub fn write_value(out: &mut impl Write, heap: &Heap, symbols: &SymbolTable, v: Value) -> fmt::Result {
    match v {
        Value::Nil => write!(out, "nil"),
        Value::Integer(n) => write!(out, "{n}"),
        Value::Symbol(s) => write!(out, "{}", symbols.name(s)),
        Value::Builtin(name, _) => write!(out, "#<builtin:{name}>"),
        // A closure/macro is the heap pair `(env . (params . body))`; print
        // its cdr so the `(params . body)` portion shows and the captured
        // environment stays hidden.
        Value::Closure(h) => write_value(out, heap, symbols, heap.cdr(h)),
        Value::Macro(h) => write_value(out, heap, symbols, heap.cdr(h)),
        Value::Pair(h) => {
            write!(out, "(")?;
            write_value(out, heap, symbols, heap.car(h))?;
            let mut rest = heap.cdr(h);
            loop {
                match rest {
                    Value::Nil => break,
                    Value::Pair(p) => {
                        write!(out, " ")?;
                        write_value(out, heap, symbols, heap.car(p))?;
                        rest = heap.cdr(p);
                    }
                    other => {
                        write!(out, " . ")?;
                        write_value(out, heap, symbols, other)?;
                        break;
                    }
                }
            }
            write!(out, ")")
        }
    }
}

pub fn to_string(heap: &Heap, symbols: &SymbolTable, v: Value) -> String {
    let mut s = String::new();
    write_value(&mut s, heap, symbols, v).expect("writing to a String never fails");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::WellKnown;

    #[test]
    fn prints_nil() {
        let heap = Heap::new();
        let symbols = SymbolTable::new();
        assert_eq!(to_string(&heap, &symbols, Value::Nil), "nil");
    }

    #[test]
    fn prints_proper_list() {
        let mut heap = Heap::new();
        let symbols = SymbolTable::new();
        let tail = heap.cons(Value::Integer(2), Value::Nil);
        let list = heap.cons(Value::Integer(1), tail);
        assert_eq!(to_string(&heap, &symbols, list), "(1 2)");
    }

    #[test]
    fn prints_dotted_pair() {
        let mut heap = Heap::new();
        let symbols = SymbolTable::new();
        let pair = heap.cons(Value::Integer(1), Value::Integer(2));
        assert_eq!(to_string(&heap, &symbols, pair), "(1 . 2)");
    }

    #[test]
    fn prints_symbol_by_name() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let _wk = WellKnown::intern(&mut symbols);
        let sym = symbols.intern("foo");
        let _ = &mut heap;
        assert_eq!(to_string(&heap, &symbols, Value::Symbol(sym)), "foo");
    }
}
