//! Safe interpreter for condition expressions
//!
//! Conditions never execute caller-supplied code. The interpreter walks the
//! parsed AST and reads values out of the evaluation context, nothing else.

use crate::condition::ast::{BinaryOp, Expr, Literal, Spanned};
use crate::condition::error::ConditionError;
use crate::context::{ContextMap, ContextValue};

/// Evaluate a parsed condition against a context
///
/// The whole expression must produce a boolean.
pub fn evaluate(expr: &Spanned<Expr>, context: &ContextMap) -> Result<bool, ConditionError> {
    expect_bool(expr, context, "condition")
}

fn expect_bool(
    expr: &Spanned<Expr>,
    context: &ContextMap,
    what: &str,
) -> Result<bool, ConditionError> {
    match eval_expr(expr, context)? {
        ContextValue::Bool(b) => Ok(b),
        other => Err(ConditionError::not_a_boolean(what, &other)),
    }
}

fn eval_expr(expr: &Spanned<Expr>, context: &ContextMap) -> Result<ContextValue, ConditionError> {
    match &expr.node {
        Expr::Literal(lit) => Ok(literal_value(lit)),
        Expr::Path(segments) => lookup(context, segments),
        Expr::Not(inner) => {
            let value = expect_bool(inner, context, "operand of `!`")?;
            Ok(ContextValue::Bool(!value))
        }
        Expr::Binary { op, lhs, rhs } => match op {
            BinaryOp::Eq => {
                let equal = values_equal(&eval_expr(lhs, context)?, &eval_expr(rhs, context)?);
                Ok(ContextValue::Bool(equal))
            }
            BinaryOp::Ne => {
                let equal = values_equal(&eval_expr(lhs, context)?, &eval_expr(rhs, context)?);
                Ok(ContextValue::Bool(!equal))
            }
            // && and || short-circuit: the right side is only evaluated
            // when the left side leaves the outcome open
            BinaryOp::And => {
                if !expect_bool(lhs, context, "operand of `&&`")? {
                    return Ok(ContextValue::Bool(false));
                }
                let rhs = expect_bool(rhs, context, "operand of `&&`")?;
                Ok(ContextValue::Bool(rhs))
            }
            BinaryOp::Or => {
                if expect_bool(lhs, context, "operand of `||`")? {
                    return Ok(ContextValue::Bool(true));
                }
                let rhs = expect_bool(rhs, context, "operand of `||`")?;
                Ok(ContextValue::Bool(rhs))
            }
        },
    }
}

fn literal_value(lit: &Literal) -> ContextValue {
    match lit {
        Literal::Bool(b) => ContextValue::Bool(*b),
        Literal::Number(n) => ContextValue::Number(*n),
        Literal::String(s) => ContextValue::String(s.clone()),
    }
}

fn lookup(context: &ContextMap, segments: &[String]) -> Result<ContextValue, ConditionError> {
    let mut current = context
        .get(&segments[0])
        .ok_or_else(|| ConditionError::unknown_value(segments))?;
    for segment in &segments[1..] {
        match current {
            ContextValue::Map(entries) => {
                current = entries
                    .get(segment)
                    .ok_or_else(|| ConditionError::unknown_value(segments))?;
            }
            _ => return Err(ConditionError::unknown_value(segments)),
        }
    }
    Ok(current.clone())
}

/// Structural equality; values of different types are unequal, not an error
fn values_equal(a: &ContextValue, b: &ContextValue) -> bool {
    match (a, b) {
        (ContextValue::Bool(a), ContextValue::Bool(b)) => a == b,
        (ContextValue::Number(a), ContextValue::Number(b)) => a == b,
        (ContextValue::String(a), ContextValue::String(b)) => a == b,
        (ContextValue::List(a), ContextValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (ContextValue::Map(a), ContextValue::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|((ka, va), (kb, vb))| ka == kb && values_equal(va, vb))
        }
        _ => false,
    }
}
