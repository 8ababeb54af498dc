//! `eq?` (identity/value equality per variant) and the `apply` builtin.

use super::take_exact;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

pub fn eqp(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "eq?", args, 2)?.try_into().unwrap();
    Ok(if a.eq_value(&b) { Value::Symbol(ev.wk.t) } else { Value::Nil })
}

/// Unlike the `apply` special form, this is an ordinary builtin: its
/// argument list is already fully evaluated, including the trailing list of
/// spread arguments, and invoking it does not preserve tail position.
pub fn apply_builtin(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let parts = take_exact(ev, "apply", args, 2)?;
    let (f, spread) = (parts[0], parts[1]);
    ev.apply_value(f, spread)
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
    fn eq_true_for_same_integer() {
        assert!(!eval("(eq? 3 3)").is_nil());
    }

    #[test]
    fn eq_false_for_distinct_pairs() {
        assert!(eval("(eq? (cons 1 2) (cons 1 2))").is_nil());
    }

    #[test]
    fn eq_true_for_same_symbol() {
        assert!(!eval("(eq? 'a 'a)").is_nil());
    }
}
