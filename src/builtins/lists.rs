//! Pair primitives: `car`, `cdr`, `cons`, `pair?`.

use super::take_exact;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

pub fn car(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a] = take_exact(ev, "car", args, 1)?.try_into().unwrap();
    if a.is_nil() {
        return Ok(Value::Nil);
    }
    let p = a.as_pair().ok_or_else(|| EvalError::Type { form: "car", detail: "expected a pair".to_string() })?;
    Ok(ev.heap.car(p))
}

pub fn cdr(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a] = take_exact(ev, "cdr", args, 1)?.try_into().unwrap();
    if a.is_nil() {
        return Ok(Value::Nil);
    }
    let p = a.as_pair().ok_or_else(|| EvalError::Type { form: "cdr", detail: "expected a pair".to_string() })?;
    Ok(ev.heap.cdr(p))
}

pub fn cons(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a, b] = take_exact(ev, "cons", args, 2)?.try_into().unwrap();
    Ok(ev.heap.cons(a, b))
}

pub fn pairp(ev: &mut Evaluator, args: Value) -> Result<Value, EvalError> {
    let [a] = take_exact(ev, "pair?", args, 1)?.try_into().unwrap();
    Ok(if a.as_pair().is_some() { Value::Symbol(ev.wk.t) } else { Value::Nil })
}
