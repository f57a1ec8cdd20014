//! tycheck_ast: AST node definitions and the flag/id vocabulary shared by
//! the binder and checker.

pub mod node;
pub mod syntax_kind;
pub mod types;

pub use syntax_kind::SyntaxKind;
