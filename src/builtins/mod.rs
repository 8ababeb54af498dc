//! The fixed set of built-in procedures: arithmetic, comparison, pair
//! primitives, and identity/apply. Each takes the already-evaluated
//! argument list as a proper `Value` list, per spec.

mod arithmetic;
mod comparison;
mod lists;
mod misc;

use crate::env;
use crate::eval::Evaluator;
use crate::value::Value;

/// Registers every builtin into the root environment.
pub fn register_all(ev: &mut Evaluator) {
    let entries: &[(&'static str, crate::value::BuiltinFn)] = &[
        ("+", arithmetic::add),
        ("-", arithmetic::sub),
        ("*", arithmetic::mul),
        ("/", arithmetic::div),
        ("=", comparison::num_eq),
        ("<", comparison::num_lt),
        ("car", lists::car),
        ("cdr", lists::cdr),
        ("cons", lists::cons),
        ("pair?", lists::pairp),
        ("eq?", misc::eqp),
        ("apply", misc::apply_builtin),
    ];
    for (name, func) in entries {
        let sym = ev.intern(name);
        env::define(&mut ev.heap, ev.root_env, sym, Value::Builtin(name, *func));
    }
}

/// Pulls exactly `n` arguments out of a proper list, erroring otherwise.
fn take_exact(ev: &Evaluator, form: &'static str, args: Value, n: usize) -> Result<Vec<Value>, crate::error::EvalError> {
    let mut out = Vec::with_capacity(n);
    let mut cur = args;
    for _ in 0..n {
        let p = cur.as_pair().ok_or_else(|| crate::error::EvalError::Args {
            form,
            detail: format!("expected {n} argument(s)"),
        })?;
        out.push(ev.heap.car(p));
        cur = ev.heap.cdr(p);
    }
    if !cur.is_nil() {
        return Err(crate::error::EvalError::Args { form, detail: format!("expected exactly {n} argument(s)") });
    }
    Ok(out)
}

fn as_integer(form: &'static str, v: Value) -> Result<i64, crate::error::EvalError> {
    v.as_integer().ok_or_else(|| crate::error::EvalError::Type { form, detail: "expected an integer".to_string() })
}
