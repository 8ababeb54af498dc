//! Two-argument numeric comparisons. Results are the symbol `t` or `nil`,
//! matching the truthiness convention used by `if`.

use super::{as_integer, take_exact};
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

fn bool_value(ev: &Evaluator, b: bool) -> Value {
    if b {
        Value::Symbol(ev.wk.t)
    } else {
        Value::Nil
    }
}

pub fn num_eq(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "=", args, 2)?.try_into().unwrap();
    let result = as_integer("=", a)? == as_integer("=", b)?;
    Ok(bool_value(ev, result))
}

pub fn num_lt(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "<", args, 2)?.try_into().unwrap();
    let result = as_integer("<", a)? < as_integer("<", b)?;
    Ok(bool_value(ev, result))
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
    fn equal_integers_yield_t() {
        assert!(!eval("(= 3 3)").is_nil());
    }

    #[test]
    fn unequal_integers_yield_nil() {
        assert!(eval("(= 3 4)").is_nil());
    }

    #[test]
    fn less_than_holds() {
        assert!(!eval("(< 1 2)").is_nil());
    }

    #[test]
    fn less_than_fails() {
        assert!(eval("(< 2 1)").is_nil());
    }
}
