//! End-to-end scenarios exercising the reader, evaluator, GC, and builtins
//! together, mirroring the REPL transcripts this core is expected to match.

use cons_lisp::eval::Evaluator;
use cons_lisp::load_source;
use cons_lisp::printer;

fn run(source: &str) -> String {
    let mut ev = Evaluator::new();
    let value = load_source(&mut ev, source).expect("program should evaluate");
    printer::to_string(&ev.heap, &ev.symbols, value)
}

/// Reads and evaluates a single form directly, bypassing `load_source`'s
/// report-and-continue behavior, so a failing evaluation is observable here.
fn run_err(source: &str) -> bool {
    let mut ev = Evaluator::new();
    let (form, _) = cons_lisp::reader::read_expr(&mut ev.heap, &mut ev.symbols, &ev.wk, source, 0)
        .expect("should parse")
        .expect("should read one form");
    ev.eval(form, ev.root_env).is_err()
}

#[test]
fn arithmetic_and_comparison_compose() {
    assert_eq!(run("(+ (* 2 3) (- 10 4))"), "12");
}

#[test]
fn recursive_factorial_via_self_reference() {
    let src = "(define (fact n) (if (eq? n 0) 1 (* n (fact (- n 1))))) (fact 5)";
    assert_eq!(run(src), "120");
}

#[test]
fn tail_recursive_accumulator_completes_without_stack_overflow() {
    let src = "(define (sum-to n acc) (if (eq? n 0) acc (sum-to (- n 1) (+ acc n)))) (sum-to 100000 0)";
    assert_eq!(run(src), "5000010000");
}

#[test]
fn closures_capture_their_defining_environment() {
    let src = "(define (make-adder n) (lambda (x) (+ x n))) \
               (define add10 (make-adder 10)) (add10 5)";
    assert_eq!(run(src), "15");
}

#[test]
fn each_call_gets_a_fresh_frame_independent_of_other_calls() {
    let src = "(define (make-adder n) (lambda (x) (+ x n))) \
               (define add1 (make-adder 1)) (define add2 (make-adder 2)) \
               (cons (add1 10) (add2 10))";
    assert_eq!(run(src), "(11 . 12)");
}

#[test]
fn defmacro_rewrites_before_evaluation() {
    let src = "(defmacro (unless c body) (cons 'if (cons c (cons nil (cons body nil))))) \
               (unless nil 42)";
    assert_eq!(run(src), "42");
}

#[test]
fn lambda_with_dotted_rest_parameter_collects_extra_args() {
    assert_eq!(run("((lambda (x . rest) rest) 1 2 3)"), "(2 3)");
}

#[test]
fn quoted_data_is_returned_unevaluated() {
    assert_eq!(run("'(+ 1 2)"), "(+ 1 2)");
}

#[test]
fn dotted_pair_round_trips_through_printer() {
    assert_eq!(run("(cons 1 2)"), "(1 . 2)");
}

#[test]
fn apply_spreads_a_list_as_arguments() {
    assert_eq!(run("(apply + (cons 1 (cons 2 nil)))"), "3");
}

#[test]
fn unbound_variable_reference_is_an_error() {
    assert!(run_err("undefined-name"));
}

#[test]
fn calling_a_closure_with_the_wrong_arity_is_an_error() {
    assert!(run_err("((lambda (x y) x) 1)"));
}

#[test]
fn load_source_reports_a_failing_form_and_continues_with_the_next() {
    let mut ev = Evaluator::new();
    let value = load_source(&mut ev, "undefined-name (+ 1 2)").expect("reading should succeed");
    assert_eq!(printer::to_string(&ev.heap, &ev.symbols, value), "3");
}

#[test]
fn set_inside_a_nested_scope_does_not_escape_to_the_parent() {
    let src = "(define x 1) ((lambda () (define x 2) x)) x";
    assert_eq!(run(src), "1");
}
