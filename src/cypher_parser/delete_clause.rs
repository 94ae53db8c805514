use nom::{combinator::opt, multi::separated_list1, IResult, Parser};

use super::ast::DeleteClause;
use super::common::{comma, keyword, parse_identifier, ws};

/// `[DETACH] DELETE var[, var...]`
pub fn parse_delete_clause(input: &str) -> IResult<&str, DeleteClause<'_>> {
    let (input, detach) = opt(ws(keyword("DETACH"))).parse(input)?;
    let (input, _) = ws(keyword("DELETE")).parse(input)?;
    let (input, items) = separated_list1(comma, ws(parse_identifier)).parse(input)?;

    Ok((
        input,
        DeleteClause {
            detach: detach.is_some(),
            items,
        },
    ))
}
