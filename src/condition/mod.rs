//! Condition expressions for composite template components
//!
//! Components of a composite template can be gated by a small boolean
//! expression evaluated against the merged resolution context:
//!
//! ```text
//! show_sidebar && user.role == "admin"
//! !compact || items_count != 0
//! ```
//!
//! Expressions are parsed into an AST and interpreted directly; there is no
//! dynamic code execution involved.

pub mod ast;
mod error;
mod eval;
mod grammar;
mod lexer;

pub use ast::{BinaryOp, Expr, Literal, Spanned};
pub use error::ConditionError;
pub use eval::evaluate;
pub use grammar::parse;
pub use lexer::{lex, Token};

use crate::context::ContextMap;

/// Parse and evaluate a condition in one step
pub fn evaluate_str(input: &str, context: &ContextMap) -> Result<bool, ConditionError> {
    let expr = parse(input)?;
    evaluate(&expr, context)
}
