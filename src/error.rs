//! Error kinds: reader failures and the four evaluator error kinds beyond
//! plain `Ok`. Integer overflow and division by zero are deliberately not
//! represented here — they are host panics, not Lisp-level conditions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unexpected end of input")]
    Eof,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unbalanced parentheses")]
    Unbalanced,
    #[error("stray '.' outside a list")]
    StrayDot,
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unbound symbol: {0}")]
    Unbound(String),
    #[error("{form}: {detail}")]
    Args { form: &'static str, detail: String },
    #[error("{form}: {detail}")]
    Type { form: &'static str, detail: String },
}

#[derive(Debug, Error)]
pub enum LispError {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}
