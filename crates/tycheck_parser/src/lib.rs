//! tycheck_parser: recursive-descent parser producing the tycheck AST.
//!
//! Grammar coverage is the language subset the checker specifies; JSX and
//! decorators are not part of it. Grammar-error exhaustiveness is a
//! non-goal; the parser recovers by skipping a token and moving on.

mod parser;

pub use parser::Parser;
