//! The reader: lexer plus a recursive-descent parser over `&str`.
//!
//! `read_expr` is incremental — it returns the byte offset where it stopped,
//! and the caller passes that offset back in as the next call's start, so a
//! buffer holding several top-level forms can be read one at a time.

use crate::error::ReadError;
use crate::heap::Heap;
use crate::symbol::{SymbolTable, WellKnown};
use crate::value::Value;

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')')
}

/// Skip whitespace and `;`-to-end-of-line comments, returning the offset of
/// the next non-trivial byte.
fn skip_trivia(input: &str, mut pos: usize) -> usize {
    let bytes = input.as_bytes();
    loop {
        while pos < bytes.len() && (bytes[pos] as char).is_whitespace() {
            pos += 1;
        }
        if pos < bytes.len() && bytes[pos] == b';' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            continue;
        }
        break;
    }
    pos
}

fn read_token(input: &str, start: usize) -> (&str, usize) {
    let bytes = input.as_bytes();
    let mut pos = start;
    while pos < bytes.len() && !is_delimiter(bytes[pos] as char) {
        pos += 1;
    }
    (&input[start..pos], pos)
}

fn atom_to_value(token: &str, symbols: &mut SymbolTable, _wk: &WellKnown) -> Value {
    if token == "nil" {
        return Value::Nil;
    }
    if let Ok(n) = token.parse::<i64>() {
        return Value::Integer(n);
    }
    Value::Symbol(symbols.intern(token))
}

/// Read a single expression starting at `start`, skipping leading trivia.
/// Returns the parsed value and the offset immediately after it, or `None`
/// if only trivia/EOF remained.
pub fn read_expr(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    wk: &WellKnown,
    input: &str,
    start: usize,
) -> Result<Option<(Value, usize)>, ReadError> {
    let pos = skip_trivia(input, start);
    if pos >= input.len() {
        return Ok(None);
    }
    let (value, end) = read_form(heap, symbols, wk, input, pos)?;
    Ok(Some((value, end)))
}

fn read_form(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    wk: &WellKnown,
    input: &str,
    pos: usize,
) -> Result<(Value, usize), ReadError> {
    let pos = skip_trivia(input, pos);
    let bytes = input.as_bytes();
    if pos >= bytes.len() {
        return Err(ReadError::Eof);
    }
    match bytes[pos] as char {
        '(' => read_list(heap, symbols, wk, input, pos + 1),
        ')' => Err(ReadError::UnexpectedChar(')')),
        '\'' => {
            let (inner, end) = read_form(heap, symbols, wk, input, pos + 1)?;
            Ok((wrap(heap, wk.quote, inner), end))
        }
        '`' => {
            let (inner, end) = read_form(heap, symbols, wk, input, pos + 1)?;
            Ok((wrap(heap, wk.quasiquote, inner), end))
        }
        ',' => {
            if bytes.get(pos + 1) == Some(&b'@') {
                let (inner, end) = read_form(heap, symbols, wk, input, pos + 2)?;
                Ok((wrap(heap, wk.unquote_splicing, inner), end))
            } else {
                let (inner, end) = read_form(heap, symbols, wk, input, pos + 1)?;
                Ok((wrap(heap, wk.unquote, inner), end))
            }
        }
        _ => {
            let (token, end) = read_token(input, pos);
            if token.is_empty() {
                return Err(ReadError::UnexpectedChar(bytes[pos] as char));
            }
            Ok((atom_to_value(token, symbols, wk), end))
        }
    }
}

fn wrap(heap: &mut Heap, head: crate::symbol::Symbol, inner: Value) -> Value {
    let tail = heap.cons(inner, Value::Nil);
    heap.cons(Value::Symbol(head), tail)
}

/// Reads list contents after the opening `(` has been consumed, handling the
/// dotted-pair tail produced by a lone `.` token.
fn read_list(
    heap: &mut Heap,
    symbols: &mut SymbolTable,
    wk: &WellKnown,
    input: &str,
    mut pos: usize,
) -> Result<(Value, usize), ReadError> {
    let mut items: Vec<Value> = Vec::new();
    let mut tail = Value::Nil;
    loop {
        pos = skip_trivia(input, pos);
        let bytes = input.as_bytes();
        if pos >= bytes.len() {
            return Err(ReadError::Unbalanced);
        }
        if bytes[pos] as char == ')' {
            pos += 1;
            break;
        }
        if bytes[pos] as char == '.' {
            let (token, after_dot) = read_token(input, pos);
            if token == "." {
                let (dotted_tail, end) = read_form(heap, symbols, wk, input, after_dot)?;
                let end = skip_trivia(input, end);
                if input.as_bytes().get(end) != Some(&b')') {
                    return Err(ReadError::StrayDot);
                }
                tail = dotted_tail;
                pos = end + 1;
                break;
            }
        }
        let (item, end) = read_form(heap, symbols, wk, input, pos)?;
        items.push(item);
        pos = end;
    }
    let mut list = tail;
    for item in items.into_iter().rev() {
        list = heap.cons(item, list);
    }
    Ok((list, pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer;

    fn read_one(src: &str) -> (Heap, SymbolTable, Value) {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let wk = WellKnown::intern(&mut symbols);
        let (v, _) = read_expr(&mut heap, &mut symbols, &wk, src, 0).unwrap().unwrap();
        (heap, symbols, v)
    }

    #[test]
    fn reads_integer() {
        let (_, _, v) = read_one("42");
        assert_eq!(v.as_integer(), Some(42));
    }

    #[test]
    fn reads_negative_integer() {
        let (_, _, v) = read_one("-17");
        assert_eq!(v.as_integer(), Some(-17));
    }

    #[test]
    fn reads_nil_literal_not_as_symbol() {
        let (_, _, v) = read_one("nil");
        assert!(v.is_nil());
    }

    #[test]
    fn reads_proper_list() {
        let (heap, _, v) = read_one("(1 2 3)");
        let p = v.as_pair().unwrap();
        assert_eq!(heap.car(p).as_integer(), Some(1));
    }

    #[test]
    fn reads_dotted_pair() {
        let (heap, _, v) = read_one("(1 . 2)");
        let p = v.as_pair().unwrap();
        assert_eq!(heap.car(p).as_integer(), Some(1));
        assert_eq!(heap.cdr(p).as_integer(), Some(2));
    }

    #[test]
    fn quote_reader_macro_expands() {
        let (heap, symbols, v) = read_one("'x");
        let out = printer::to_string(&heap, &symbols, v);
        assert_eq!(out, "(quote x)");
    }

    #[test]
    fn unquote_splicing_reader_macro_expands() {
        let (heap, symbols, v) = read_one(",@x");
        let out = printer::to_string(&heap, &symbols, v);
        assert_eq!(out, "(unquote-splicing x)");
    }

    #[test]
    fn incremental_read_advances_position() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let wk = WellKnown::intern(&mut symbols);
        let src = "1 2 3";
        let (first, end1) = read_expr(&mut heap, &mut symbols, &wk, src, 0).unwrap().unwrap();
        let (second, end2) = read_expr(&mut heap, &mut symbols, &wk, src, end1).unwrap().unwrap();
        assert_eq!(first.as_integer(), Some(1));
        assert_eq!(second.as_integer(), Some(2));
        let (third, _) = read_expr(&mut heap, &mut symbols, &wk, src, end2).unwrap().unwrap();
        assert_eq!(third.as_integer(), Some(3));
    }

    #[test]
    fn comment_is_skipped() {
        let (_, _, v) = read_one("; a comment\n7");
        assert_eq!(v.as_integer(), Some(7));
    }

    #[test]
    fn trailing_trivia_only_yields_none() {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let wk = WellKnown::intern(&mut symbols);
        assert!(read_expr(&mut heap, &mut symbols, &wk, "  ; done", 0).unwrap().is_none());
    }
}
