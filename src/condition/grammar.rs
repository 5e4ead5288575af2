//! Parser for condition expressions using chumsky
//!
//! Precedence, loosest first: `||`, `&&`, `==`/`!=`, `!`, atoms. Comparison
//! does not chain (`a == b == c` is a parse error), matching how conditions
//! are written in composite definitions.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::condition::ast::{BinaryOp, Expr, Literal, Spanned};
use crate::condition::error::ConditionError;
use crate::condition::lexer::{lex, Token};

/// Parse a condition string into an expression AST
pub fn parse(input: &str) -> Result<Spanned<Expr>, ConditionError> {
    let len = input.len();

    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));
    let token_stream =
        Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(ConditionError::from)
                .unwrap_or_else(ConditionError::empty_input)
        })
}

/// Helper to extract span range from chumsky's span type
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::Number(n) => Literal::Number(n),
            Token::String(s) => Literal::String(s),
        }
        .map_with(|lit, e| Spanned::new(Expr::Literal(lit), span_range(&e.span())));

        let segment = select! {
            Token::Ident(s) => s,
        };

        let path = segment
            .separated_by(just(Token::Dot))
            .at_least(1)
            .collect::<Vec<_>>()
            .map_with(|segments, e| Spanned::new(Expr::Path(segments), span_range(&e.span())));

        let atom = choice((
            literal,
            path,
            expr.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let unary = just(Token::Bang)
            .map_with(|_, e| span_range(&e.span()))
            .repeated()
            .collect::<Vec<_>>()
            .then(atom)
            .map(|(bangs, inner)| {
                bangs.into_iter().rev().fold(inner, |acc, bang_span| {
                    let span = bang_span.start..acc.span.end;
                    Spanned::new(Expr::Not(Box::new(acc)), span)
                })
            });

        let comparison_op = choice((
            just(Token::EqEq).to(BinaryOp::Eq),
            just(Token::NotEq).to(BinaryOp::Ne),
        ));

        let comparison = unary
            .clone()
            .then(comparison_op.then(unary).or_not())
            .map(|(lhs, rest)| match rest {
                Some((op, rhs)) => binary(op, lhs, rhs),
                None => lhs,
            });

        let and = comparison
            .clone()
            .then(
                just(Token::AndAnd)
                    .to(BinaryOp::And)
                    .then(comparison)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary);

        and.clone()
            .then(
                just(Token::OrOr)
                    .to(BinaryOp::Or)
                    .then(and)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(fold_binary)
    })
}

fn binary(op: BinaryOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.start..rhs.span.end;
    Spanned::new(
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

fn fold_binary((first, rest): (Spanned<Expr>, Vec<(BinaryOp, Spanned<Expr>)>)) -> Spanned<Expr> {
    rest.into_iter()
        .fold(first, |lhs, (op, rhs)| binary(op, lhs, rhs))
}
