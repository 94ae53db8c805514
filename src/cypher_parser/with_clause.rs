use nom::{combinator::opt, multi::separated_list1, IResult, Parser};

use super::ast::WithClause;
use super::common::{comma, keyword, ws};
use super::order_by_clause::{parse_limit, parse_order_by, parse_skip};
use super::return_clause::parse_return_item;
use super::where_clause::parse_where_clause;

/// `WITH [DISTINCT] item[, ...] [ORDER BY ...] [SKIP n] [LIMIT n] [WHERE expr]`
pub fn parse_with_clause(input: &str) -> IResult<&str, WithClause<'_>> {
    let (input, _) = ws(keyword("WITH")).parse(input)?;
    let (input, distinct) = opt(ws(keyword("DISTINCT"))).parse(input)?;
    let (input, items) = separated_list1(comma, parse_return_item).parse(input)?;
    let (input, order_by) = opt(parse_order_by).parse(input)?;
    let (input, skip) = opt(parse_skip).parse(input)?;
    let (input, limit) = opt(parse_limit).parse(input)?;
    let (input, where_clause) = opt(parse_where_clause).parse(input)?;

    Ok((
        input,
        WithClause {
            distinct: distinct.is_some(),
            items,
            order_by: order_by.unwrap_or_default(),
            skip,
            limit,
            where_clause,
        },
    ))
}
