use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    multi::separated_list1,
    sequence::separated_pair,
    IResult, Parser,
};

use super::ast::{PropertyAccess, RemoveClause, RemoveItem};
use super::common::{comma, keyword, parse_identifier, ws};

/// `REMOVE n.prop, n:Label, ...`
pub fn parse_remove_clause(input: &str) -> IResult<&str, RemoveClause<'_>> {
    let (input, _) = ws(keyword("REMOVE")).parse(input)?;
    let (input, items) = separated_list1(comma, parse_remove_item).parse(input)?;
    Ok((input, RemoveClause { items }))
}

fn parse_remove_item(input: &str) -> IResult<&str, RemoveItem<'_>> {
    alt((
        map(
            ws(separated_pair(parse_identifier, char('.'), parse_identifier)),
            |(base, key)| RemoveItem::Property(PropertyAccess { base, key }),
        ),
        map(
            ws(separated_pair(parse_identifier, char(':'), parse_identifier)),
            |(variable, label)| RemoveItem::Label { variable, label },
        ),
    ))
    .parse(input)
}
