//! Two-argument, signed-integer-only arithmetic. No variadic forms: this
//! follows the original Lisp these semantics were distilled from, rather
//! than the fold-style `+`/`-`/`*`/`/` idiom of most Schemes.
//!
//! Integer overflow wraps and division by zero panics — both are host
//! traps, not Lisp-level error conditions.

use super::{as_integer, take_exact};
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

pub fn add(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "+", args, 2)?.try_into().unwrap();
    Ok(Value::Integer(as_integer("+", a)?.wrapping_add(as_integer("+", b)?)))
}

pub fn sub(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "-", args, 2)?.try_into().unwrap();
    Ok(Value::Integer(as_integer("-", a)?.wrapping_sub(as_integer("-", b)?)))
}

pub fn mul(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "*", args, 2)?.try_into().unwrap();
    Ok(Value::Integer(as_integer("*", a)?.wrapping_mul(as_integer("*", b)?)))
}

pub fn div(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "/", args, 2)?.try_into().unwrap();
    Ok(Value::Integer(as_integer("/", a)? / as_integer("/", b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_expr;

    fn eval(src: &str) -> Value {
        let mut ev = Evaluator::new();
        let (form, _) = read_expr(&mut ev.heap, &mut ev.symbols, &ev.wk, src, 0).unwrap().unwrap();
        ev.eval(form, ev.root_env).unwrap()
    }

    #[test]
    fn adds_two_integers() {
        assert_eq!(eval("(+ 2 3)").as_integer(), Some(5));
    }

    #[test]
    fn subtracts_two_integers() {
        assert_eq!(eval("(- 5 3)").as_integer(), Some(2));
    }

    #[test]
    fn multiplies_two_integers() {
        assert_eq!(eval("(* 4 5)").as_integer(), Some(20));
    }

    #[test]
    fn divides_two_integers_truncating() {
        assert_eq!(eval("(/ 7 2)").as_integer(), Some(3));
    }

    #[test]
    fn wrong_arity_is_an_error() {
        let mut ev = Evaluator::new();
        let (form, _) = read_expr(&mut ev.heap, &mut ev.symbols, &ev.wk, "(+ 1)", 0).unwrap().unwrap();
        assert!(ev.eval(form, ev.root_env).is_err());
    }
}
