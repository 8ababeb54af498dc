//! A small Scheme-flavored Lisp core: reader, trampolined evaluator with
//! proper tail calls, mark-and-sweep GC, lexical environments, closures and
//! macros.

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod heap;
pub mod printer;
pub mod reader;
pub mod symbol;
pub mod value;

use crate::error::LispError;
use crate::eval::Evaluator;
use crate::value::Value;

/// Reads and evaluates every top-level form in `source`, in order, returning
/// the value of the last form that evaluated successfully (`Nil` if none
/// did). Used for both the optional bootstrap file and non-interactive
/// script runs.
///
/// A form that fails to evaluate has its source text and a one-line error
/// tag printed to stderr; reading and evaluation then resume with the next
/// form rather than abandoning the rest of the buffer. A malformed read is
/// different: the text itself cannot be trusted past that point, so it is
/// returned as `Err` and the loop stops there.
pub fn load_source(ev: &mut Evaluator, source: &str) -> Result<Value, LispError> {
    let mut pos = 0;
    let mut last = Value::Nil;
    while let Some((form, end)) = reader::read_expr(&mut ev.heap, &mut ev.symbols, &ev.wk, source, pos)? {
        pos = end;
        match ev.eval(form, ev.root_env) {
            Ok(v) => last = v,
            Err(e) => eprintln!("error in {}: {e}", printer::to_string(&ev.heap, &ev.symbols, form)),
        }
        ev.collect_now();
    }
    Ok(last)
}
