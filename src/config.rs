//! Version and banner constants for the CLI/REPL.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "cons-lisp";
pub const WELCOME_SUBTITLE: &str = "a small Scheme-flavored Lisp core with TCO and mark-and-sweep GC";
pub const HISTORY_FILE: &str = ".cons_lisp_history";
pub const PROMPT: &str = "lisp> ";
