use nom::{IResult, Parser};

use super::ast::UnwindClause;
use super::common::{keyword, parse_identifier, ws};
use super::expression::parse_expression;

/// `UNWIND <list-expr> AS <alias>`
pub fn parse_unwind_clause(input: &str) -> IResult<&str, UnwindClause<'_>> {
    let (input, _) = ws(keyword("UNWIND")).parse(input)?;
    let (input, expression) = parse_expression(input)?;
    let (input, _) = ws(keyword("AS")).parse(input)?;
    let (input, alias) = ws(parse_identifier).parse(input)?;

    Ok((input, UnwindClause { expression, alias }))
}
