//! The evaluator: an explicit, heap-allocated evaluation stack driving a
//! trampoline loop, so interpreted procedure calls in tail position never
//! grow the host Rust stack.
//!
//! A frame is six slots — parent, env, kind, pending, accumulated, extra —
//! encoded as five nested cons cells so the ordinary mark phase traces it
//! like any other pair chain reachable from the "current stack" root.

use crate::env;
use crate::error::EvalError;
use crate::heap::Heap;
use crate::symbol::{Symbol, SymbolTable, WellKnown};
use crate::value::{Handle, Value};

pub struct Evaluator {
    pub heap: Heap,
    pub symbols: SymbolTable,
    pub wk: WellKnown,
    pub root_env: Value,
}

impl Evaluator {
    pub fn new() -> Self {
        let mut heap = Heap::new();
        let mut symbols = SymbolTable::new();
        let wk = WellKnown::intern(&mut symbols);
        let root_env = env::new_env(&mut heap, Value::Nil);
        let t_sym = wk.t;
        env::define(&mut heap, root_env, t_sym, Value::Symbol(t_sym));
        let mut ev = Evaluator { heap, symbols, wk, root_env };
        crate::builtins::register_all(&mut ev);
        ev
    }

    pub fn collect_now(&mut self) {
        self.heap.collect(&[self.root_env]);
    }

    /// Runs the trampoline to completion for a single top-level expression.
    pub fn eval(&mut self, expr: Value, env: Value) -> Result<Value, EvalError> {
        let mut expr = expr;
        let mut env = env;
        let mut stack = Value::Nil;

        loop {
            self.heap.tick(&[expr, env, stack]);

            let value = match expr {
                Value::Integer(_) | Value::Nil | Value::Builtin(..) | Value::Closure(_) | Value::Macro(_) => expr,
                Value::Symbol(s) => match env::get(&self.heap, env, s) {
                    Some(v) => v,
                    None => return Err(EvalError::Unbound(self.symbols.name(s).to_string())),
                },
                Value::Pair(h) => {
                    match self.dispatch_pair(h, env, stack)? {
                        Dispatch::Value(v) => v,
                        Dispatch::Continue { expr: e, env: en, stack: st } => {
                            expr = e;
                            env = en;
                            stack = st;
                            continue;
                        }
                    }
                }
            };

            match self.do_return(value, stack)? {
                Step::Done(v) => return Ok(v),
                Step::Continue { expr: e, env: en, stack: st } => {
                    expr = e;
                    env = en;
                    stack = st;
                }
            }
        }
    }

    /// Handles a combination `(op . args)` appearing in operator position.
    /// Special forms are recognized by symbol identity and dispatched
    /// immediately or via a dedicated frame; anything else goes through
    /// operator resolution (`%resolve-op`) since the operator position may
    /// itself be an arbitrary expression evaluating to a macro or procedure.
    fn dispatch_pair(&mut self, h: Handle, env: Value, stack: Value) -> Result<Dispatch, EvalError> {
        let op_expr = self.heap.car(h);
        let args = self.heap.cdr(h);

        if let Value::Symbol(s) = op_expr {
            let wk = self.wk;
            if s == wk.quote {
                let v = self.nth(args, 0).ok_or_else(|| args_err("quote", "expected one argument"))?;
                return Ok(Dispatch::Value(v));
            }
            if s == wk.if_ {
                let cond = self.nth(args, 0).ok_or_else(|| args_err("if", "expected a condition"))?;
                let rest = self.heap.cdr(args.as_pair().expect("nth succeeded above"));
                let rest_pair = rest.as_pair().ok_or_else(|| args_err("if", "expected a then and an else branch"))?;
                let else_slot = self.heap.cdr(rest_pair);
                let else_pair = else_slot.as_pair().ok_or_else(|| args_err("if", "expected an else branch"))?;
                if !self.heap.cdr(else_pair).is_nil() {
                    return Err(args_err("if", "too many arguments"));
                }
                let frame = push_frame(&mut self.heap, stack, env, Value::Symbol(wk.if_), rest, Value::Nil, Value::Nil);
                return Ok(Dispatch::Continue { expr: cond, env, stack: frame });
            }
            if s == wk.lambda {
                let params = self.nth(args, 0).ok_or_else(|| args_err("lambda", "missing parameter list"))?;
                let body = self.heap.cdr(args.as_pair().expect("nth succeeded above"));
                let closure = self.make_closure(params, body, env)?;
                return Ok(Dispatch::Value(closure));
            }
            if s == wk.define {
                return self.dispatch_define(args, env, stack);
            }
            if s == wk.defmacro {
                return self.dispatch_defmacro(args, env);
            }
            if s == wk.apply {
                let f_expr = self.nth(args, 0).ok_or_else(|| args_err("apply", "expected a function"))?;
                let args_pair = args.as_pair().expect("nth succeeded above");
                let args_expr_slot = self.heap.cdr(args_pair);
                let args_expr =
                    self.nth(args_expr_slot, 0).ok_or_else(|| args_err("apply", "expected an argument list"))?;
                let frame = push_frame(
                    &mut self.heap,
                    stack,
                    env,
                    Value::Symbol(wk.apply),
                    args_expr,
                    Value::Nil,
                    Value::Integer(0),
                );
                return Ok(Dispatch::Continue { expr: f_expr, env, stack: frame });
            }
        }

        let frame = push_frame(&mut self.heap, stack, env, Value::Symbol(self.wk.resolve_op), args, Value::Nil, Value::Nil);
        Ok(Dispatch::Continue { expr: op_expr, env, stack: frame })
    }

    fn dispatch_define(&mut self, args: Value, env: Value, stack: Value) -> Result<Dispatch, EvalError> {
        let target = self.nth(args, 0).ok_or_else(|| args_err("define", "missing name"))?;
        let rest = self.heap.cdr(args.as_pair().expect("nth succeeded above"));
        match target {
            Value::Symbol(name) => {
                let value_expr = self.nth(rest, 0).ok_or_else(|| args_err("define", "missing value"))?;
                let frame = push_frame(&mut self.heap, stack, env, Value::Symbol(self.wk.define), Value::Symbol(name), Value::Nil, Value::Nil);
                Ok(Dispatch::Continue { expr: value_expr, env, stack: frame })
            }
            Value::Pair(sig) => {
                let name = self
                    .heap
                    .car(sig)
                    .as_symbol()
                    .ok_or_else(|| EvalError::Type { form: "define", detail: "expected a name".to_string() })?;
                let params = self.heap.cdr(sig);
                let closure = self.make_closure(params, rest, env)?;
                env::define(&mut self.heap, env, name, closure);
                Ok(Dispatch::Value(Value::Symbol(name)))
            }
            _ => Err(syntax("define: malformed target")),
        }
    }

    /// A macro has the identical heap shape as a closure — `(env . (params .
    /// body))` — distinguished only by the `Value` tag on its handle. Surface
    /// syntax mirrors `define`'s function sugar: `(defmacro (name . params)
    /// body...)`.
    fn dispatch_defmacro(&mut self, args: Value, env: Value) -> Result<Dispatch, EvalError> {
        let sig = self.nth(args, 0).ok_or_else(|| args_err("defmacro", "missing name and parameter list"))?;
        let body = self.heap.cdr(args.as_pair().expect("nth succeeded above"));
        let sig_pair = sig
            .as_pair()
            .ok_or_else(|| args_err("defmacro", "expected (name . params)"))?;
        let name = self
            .heap
            .car(sig_pair)
            .as_symbol()
            .ok_or_else(|| EvalError::Type { form: "defmacro", detail: "expected a name".to_string() })?;
        let params = self.heap.cdr(sig_pair);
        let closure = self.make_closure(params, body, env)?;
        let macro_value = match closure {
            Value::Closure(h) => Value::Macro(h),
            _ => unreachable!("make_closure always returns Value::Closure"),
        };
        env::define(&mut self.heap, env, name, macro_value);
        Ok(Dispatch::Value(Value::Symbol(name)))
    }

    /// Builds a closure value `(env . (params . body))`, validating that
    /// `params` is a proper list of symbols optionally ending in a bare
    /// symbol (a rest parameter) and that `body` is nonempty.
    fn make_closure(&mut self, params: Value, body: Value, env: Value) -> Result<Value, EvalError> {
        let mut cur = params;
        loop {
            match cur {
                Value::Nil | Value::Symbol(_) => break,
                Value::Pair(p) => {
                    if self.heap.car(p).as_symbol().is_none() {
                        return Err(EvalError::Type {
                            form: "lambda",
                            detail: "parameters must be symbols".to_string(),
                        });
                    }
                    cur = self.heap.cdr(p);
                }
                _ => {
                    return Err(EvalError::Type {
                        form: "lambda",
                        detail: "parameter list must be proper or end in a symbol".to_string(),
                    })
                }
            }
        }
        if body.is_nil() {
            return Err(args_err("lambda", "body must not be empty"));
        }
        let tail = self.heap.cons(params, body);
        let whole = self.heap.cons(env, tail);
        Ok(Value::Closure(whole.as_pair().unwrap()))
    }

    fn closure_parts(&self, h: Handle) -> (Value, Value, Value) {
        let env = self.heap.car(h);
        let rest = self.heap.cdr(h);
        let rest_pair = rest.as_pair().expect("closure tail must be a pair");
        let params = self.heap.car(rest_pair);
        let body = self.heap.cdr(rest_pair);
        (params, body, env)
    }

    /// Binds `params` to the values in proper list `args` inside `target_env`.
    /// A proper list requires exact arity; a parameter list ending in a bare
    /// symbol binds that symbol to whatever remains of `args` (possibly nil).
    fn bind_params(&mut self, params: Value, args: Value, target_env: Value) -> Result<(), EvalError> {
        let mut p = params;
        let mut a = args;
        loop {
            match p {
                Value::Nil => {
                    if a.is_nil() {
                        return Ok(());
                    }
                    return Err(EvalError::Args {
                        form: "procedure call",
                        detail: "too many arguments".to_string(),
                    });
                }
                Value::Symbol(rest_sym) => {
                    env::define(&mut self.heap, target_env, rest_sym, a);
                    return Ok(());
                }
                Value::Pair(pp) => {
                    let sym = self.heap.car(pp).as_symbol().expect("validated at closure creation");
                    let ap = a.as_pair().ok_or_else(|| EvalError::Args {
                        form: "procedure call",
                        detail: "too few arguments".to_string(),
                    })?;
                    let val = self.heap.car(ap);
                    env::define(&mut self.heap, target_env, sym, val);
                    p = self.heap.cdr(pp);
                    a = self.heap.cdr(ap);
                }
                _ => unreachable!("params validated as proper-or-dotted-symbol at closure creation"),
            }
        }
    }

    fn nth(&self, list: Value, n: usize) -> Option<Value> {
        let mut cur = list;
        let mut i = 0;
        loop {
            let p = cur.as_pair()?;
            if i == n {
                return Some(self.heap.car(p));
            }
            cur = self.heap.cdr(p);
            i += 1;
        }
    }

    /// Processes a value bubbling up from a completed sub-evaluation against
    /// the top frame of `stack`, or finishes if the stack is empty.
    fn do_return(&mut self, value: Value, stack: Value) -> Result<Step, EvalError> {
        let frame = match stack.as_pair() {
            None => return Ok(Step::Done(value)),
            Some(h) => h,
        };
        let f = FrameView::new(&self.heap, frame);
        let wk = self.wk;

        if let Value::Symbol(s) = f.kind {
            if s == wk.if_ {
                let parent = f.parent;
                let env = f.env;
                let branch = if !value.is_nil() {
                    self.nth(f.pending, 0)
                } else {
                    self.nth(f.pending, 1)
                };
                let next = branch.unwrap_or(Value::Nil);
                return Ok(Step::Continue { expr: next, env, stack: parent });
            }
            if s == wk.define {
                let name = f.kind_is_define_name();
                env::define(&mut self.heap, f.env, name, value);
                return self.do_return(Value::Symbol(name), f.parent);
            }
            if s == wk.apply {
                return self.continue_apply_special(frame, value);
            }
            if s == wk.resolve_op {
                return self.resolve_operator(frame, value);
            }
            if s == wk.body {
                return self.continue_body(frame, value);
            }
        }

        if matches!(f.kind, Value::Builtin(..) | Value::Closure(_)) {
            return self.continue_call(frame, value);
        }

        if let Value::Macro(_) = f.kind {
            // Macro expansion finished; re-evaluate the expansion in the
            // call-site environment recorded in this frame, then discard it.
            return Ok(Step::Continue { expr: value, env: f.env, stack: f.parent });
        }

        Err(syntax("internal: unrecognized stack frame kind"))
    }

    fn continue_apply_special(&mut self, frame: Handle, value: Value) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        let phase = f.extra.as_integer().unwrap_or(0);
        if phase == 0 {
            set_accumulated(&mut self.heap, frame, value);
            set_extra(&mut self.heap, frame, Value::Integer(1));
            let args_expr = f.pending;
            return Ok(Step::Continue { expr: args_expr, env: f.env, stack: Value::Pair(frame) });
        }
        let func = f.accumulated;
        let result = self.apply_value(func, value)?;
        self.do_return(result, f.parent)
    }

    fn resolve_operator(&mut self, frame: Handle, op_value: Value) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        let raw_args = f.pending;
        let call_env = f.env;

        if let Value::Macro(mh) = op_value {
            let (params, body, macro_env) = self.closure_parts(mh);
            let child_env = env::new_env(&mut self.heap, macro_env);
            self.bind_params(params, raw_args, child_env)?;
            set_kind(&mut self.heap, frame, op_value);
            return self.enter_body(body, child_env, Value::Pair(frame));
        }

        set_kind(&mut self.heap, frame, op_value);
        set_pending(&mut self.heap, frame, raw_args);
        self.advance_call_args(frame, call_env)
    }

    /// Evaluates the next not-yet-evaluated argument of an in-progress call,
    /// or finalizes the call once all arguments are in.
    fn advance_call_args(&mut self, frame: Handle, call_env: Value) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        match f.pending.as_pair() {
            Some(p) => {
                let next_arg = self.heap.car(p);
                Ok(Step::Continue { expr: next_arg, env: call_env, stack: Value::Pair(frame) })
            }
            None => self.finalize_call(frame),
        }
    }

    fn continue_call(&mut self, frame: Handle, value: Value) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        let rest = self.heap.cdr(f.pending.as_pair().expect("advanced only when pending is a pair"));
        let new_accum = self.heap.cons(value, f.accumulated);
        set_pending(&mut self.heap, frame, rest);
        set_accumulated(&mut self.heap, frame, new_accum);
        let env = f.env;
        self.advance_call_args(frame, env)
    }

    fn finalize_call(&mut self, frame: Handle) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        let args = reverse_list(&mut self.heap, f.accumulated);
        match f.kind {
            Value::Builtin(_, func) => {
                let result = func(self, args)?;
                self.do_return(result, f.parent)
            }
            Value::Closure(ch) => {
                let (params, body, closure_env) = self.closure_parts(ch);
                let child_env = env::new_env(&mut self.heap, closure_env);
                self.bind_params(params, args, child_env)?;
                self.enter_body(body, child_env, f.parent)
            }
            _ => Err(syntax("internal: call frame with non-callable kind")),
        }
    }

    /// Enters a body (a nonempty proper list of forms) for execution under
    /// `env`. The last form is always evaluated with the frame already
    /// popped, so a tail call never nests a new frame under this one.
    fn enter_body(&mut self, body: Value, env: Value, parent: Value) -> Result<Step, EvalError> {
        let p = body.as_pair().expect("closure/macro body is nonempty");
        let first = self.heap.car(p);
        let rest = self.heap.cdr(p);
        if rest.is_nil() {
            return Ok(Step::Continue { expr: first, env, stack: parent });
        }
        let frame = push_frame(&mut self.heap, parent, env, Value::Symbol(self.wk.body), rest, Value::Nil, Value::Nil);
        Ok(Step::Continue { expr: first, env, stack: frame })
    }

    fn continue_body(&mut self, frame: Handle, _discarded: Value) -> Result<Step, EvalError> {
        let f = FrameView::new(&self.heap, frame);
        let p = f.pending.as_pair().expect("body frame always has pending forms");
        let next = self.heap.car(p);
        let rest = self.heap.cdr(p);
        if rest.is_nil() {
            return Ok(Step::Continue { expr: next, env: f.env, stack: f.parent });
        }
        set_pending(&mut self.heap, frame, rest);
        Ok(Step::Continue { expr: next, env: f.env, stack: Value::Pair(frame) })
    }

    /// Invokes `f` on an already-evaluated proper argument list, outside the
    /// trampoline. Used by the `apply` builtin, which — unlike the `apply`
    /// special form and ordinary calls — is not required to preserve tail
    /// position.
    pub fn apply_value(&mut self, f: Value, args: Value) -> Result<Value, EvalError> {
        match f {
            Value::Builtin(_, func) => func(self, args),
            Value::Closure(ch) => {
                let (params, body, closure_env) = self.closure_parts(ch);
                let child_env = env::new_env(&mut self.heap, closure_env);
                self.bind_params(params, args, child_env)?;
                let mut result = Value::Nil;
                let mut cur = body;
                while let Some(p) = cur.as_pair() {
                    let form = self.heap.car(p);
                    result = self.eval(form, child_env)?;
                    cur = self.heap.cdr(p);
                }
                Ok(result)
            }
            _ => Err(EvalError::Type { form: "apply", detail: "not callable".to_string() }),
        }
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

enum Dispatch {
    Value(Value),
    Continue { expr: Value, env: Value, stack: Value },
}

enum Step {
    Done(Value),
    Continue { expr: Value, env: Value, stack: Value },
}

fn syntax(msg: &str) -> EvalError {
    EvalError::Syntax(msg.to_string())
}

fn args_err(form: &'static str, detail: &str) -> EvalError {
    EvalError::Args { form, detail: detail.to_string() }
}

fn reverse_list(heap: &mut Heap, list: Value) -> Value {
    let mut out = Value::Nil;
    let mut cur = list;
    while let Some(p) = cur.as_pair() {
        out = heap.cons(heap.car(p), out);
        cur = heap.cdr(p);
    }
    out
}

fn push_frame(
    heap: &mut Heap,
    parent: Value,
    env: Value,
    kind: Value,
    pending: Value,
    accumulated: Value,
    extra: Value,
) -> Value {
    let c4 = heap.cons(accumulated, extra);
    let c3 = heap.cons(pending, c4);
    let c2 = heap.cons(kind, c3);
    let c1 = heap.cons(env, c2);
    heap.cons(parent, c1)
}

fn set_kind(heap: &mut Heap, frame: Handle, kind: Value) {
    let c1 = heap.cdr(frame).as_pair().unwrap();
    heap.set_car(c1, kind);
}

fn set_pending(heap: &mut Heap, frame: Handle, pending: Value) {
    let c1 = heap.cdr(frame).as_pair().unwrap();
    let c2 = heap.cdr(c1).as_pair().unwrap();
    heap.set_car(c2, pending);
}

fn set_accumulated(heap: &mut Heap, frame: Handle, accumulated: Value) {
    let c1 = heap.cdr(frame).as_pair().unwrap();
    let c2 = heap.cdr(c1).as_pair().unwrap();
    let c3 = heap.cdr(c2).as_pair().unwrap();
    let c4 = heap.cdr(c3).as_pair().unwrap();
    heap.set_car(c4, accumulated);
}

fn set_extra(heap: &mut Heap, frame: Handle, extra: Value) {
    let c1 = heap.cdr(frame).as_pair().unwrap();
    let c2 = heap.cdr(c1).as_pair().unwrap();
    let c3 = heap.cdr(c2).as_pair().unwrap();
    let c4 = heap.cdr(c3).as_pair().unwrap();
    heap.set_cdr(c4, extra);
}

/// Resolves the five cells of a frame once per `do_return` dispatch.
struct FrameView {
    parent: Value,
    env: Value,
    kind: Value,
    pending: Value,
    accumulated: Value,
    extra: Value,
    define_name: Value,
}

impl FrameView {
    fn new(heap: &Heap, frame: Handle) -> Self {
        let parent = heap.car(frame);
        let c1 = heap.cdr(frame).as_pair().unwrap();
        let env = heap.car(c1);
        let c2 = heap.cdr(c1).as_pair().unwrap();
        let kind = heap.car(c2);
        let c3 = heap.cdr(c2).as_pair().unwrap();
        let pending = heap.car(c3);
        let c4 = heap.cdr(c3).as_pair().unwrap();
        let accumulated = heap.car(c4);
        let extra = heap.cdr(c4);
        FrameView { parent, env, kind, pending, accumulated, extra, define_name: pending }
    }

    /// For a `define`-in-progress frame, `pending` holds the bound symbol.
    fn kind_is_define_name(&self) -> Symbol {
        self.define_name.as_symbol().expect("define frame stores its target symbol in pending")
    }
}
