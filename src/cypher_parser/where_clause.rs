use nom::{IResult, Parser};

use super::ast::Expression;
use super::common::{keyword, ws};
use super::expression::parse_expression;

/// `WHERE <expr>`: returns the bare condition expression.
pub fn parse_where_clause(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = ws(keyword("WHERE")).parse(input)?;
    parse_expression(input)
}
