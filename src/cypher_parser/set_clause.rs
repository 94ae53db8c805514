use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    multi::separated_list1,
    sequence::separated_pair,
    IResult, Parser,
};

use super::ast::{PropertyAccess, SetClause, SetItem};
use super::common::{comma, keyword, parse_identifier, ws};
use super::expression::parse_expression;

/// `SET n.prop = expr, n:Label, ...`
pub fn parse_set_clause(input: &str) -> IResult<&str, SetClause<'_>> {
    let (input, _) = ws(keyword("SET")).parse(input)?;
    let (input, items) = parse_set_items(input)?;
    Ok((input, SetClause { items }))
}

pub fn parse_set_items(input: &str) -> IResult<&str, Vec<SetItem<'_>>> {
    separated_list1(comma, parse_set_item).parse(input)
}

fn parse_set_item(input: &str) -> IResult<&str, SetItem<'_>> {
    alt((
        map(
            separated_pair(
                ws(separated_pair(parse_identifier, char('.'), parse_identifier)),
                ws(char('=')),
                parse_expression,
            ),
            |((base, key), value)| SetItem::Property {
                target: PropertyAccess { base, key },
                value,
            },
        ),
        map(
            ws(separated_pair(parse_identifier, char(':'), parse_identifier)),
            |(variable, label)| SetItem::Label { variable, label },
        ),
    ))
    .parse(input)
}
