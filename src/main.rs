use clap::Parser;
use cons_lisp::config::{HISTORY_FILE, PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use cons_lisp::eval::Evaluator;
use cons_lisp::{load_source, printer, reader};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// A small Scheme-flavored Lisp core with TCO and a REPL.
#[derive(Parser, Debug)]
#[command(name = "cons-lisp", version = VERSION)]
struct CliArgs {
    /// Path to a Lisp source file to run non-interactively.
    script: Option<PathBuf>,
}

fn main() {
    let args = CliArgs::parse();
    let mut ev = Evaluator::new();

    match args.script {
        Some(path) => run_script(&mut ev, &path),
        None => run_repl(&mut ev),
    }
}

fn run_script(ev: &mut Evaluator, path: &PathBuf) {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    if let Err(e) = load_source(ev, &source) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run_repl(ev: &mut Evaluator) {
    println!("{WELCOME_MESSAGE} v{VERSION}");
    println!("{WELCOME_SUBTITLE}");
    println!("enter (quit) or press Ctrl-D to exit");

    let mut editor = DefaultEditor::new().expect("failed to initialize line editor");
    let _ = editor.load_history(HISTORY_FILE);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                if trimmed == "(quit)" || trimmed == "(exit)" {
                    break;
                }
                eval_repl_line(ev, trimmed);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
}

/// A line may hold several space-separated top-level forms. Wrapping it in
/// parentheses lets a single `read_expr` call collect them all as one list;
/// each element is then evaluated and reported in turn — an error on one
/// form does not stop the rest of the line from running.
fn eval_repl_line(ev: &mut Evaluator, line: &str) {
    let wrapped = format!("({line})");
    let forms = match reader::read_expr(&mut ev.heap, &mut ev.symbols, &ev.wk, &wrapped, 0) {
        Ok(Some((forms, _))) => forms,
        Ok(None) => return,
        Err(e) => {
            eprintln!("read error: {e}");
            return;
        }
    };

    let mut rest = forms;
    while let Some(p) = rest.as_pair() {
        let form = ev.heap.car(p);
        match ev.eval(form, ev.root_env) {
            Ok(value) => println!("{}", printer::to_string(&ev.heap, &ev.symbols, value)),
            Err(e) => eprintln!("error: {e}"),
        }
        ev.collect_now();
        rest = ev.heap.cdr(p);
    }
}
