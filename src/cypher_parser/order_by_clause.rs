use nom::{
    branch::alt,
    combinator::{map, opt},
    multi::separated_list1,
    IResult, Parser,
};

use super::ast::OrderByItem;
use super::common::{comma, keyword, parse_integer, ws};
use super::expression::parse_expression;

/// `ORDER BY expr [ASC|DESC][, ...]`
pub fn parse_order_by(input: &str) -> IResult<&str, Vec<OrderByItem<'_>>> {
    let (input, _) = ws(keyword("ORDER")).parse(input)?;
    let (input, _) = ws(keyword("BY")).parse(input)?;
    separated_list1(comma, parse_order_by_item).parse(input)
}

fn parse_order_by_item(input: &str) -> IResult<&str, OrderByItem<'_>> {
    let (input, expression) = parse_expression(input)?;
    let (input, direction) = opt(ws(alt((
        map(keyword("ASC"), |_| false),
        map(keyword("DESC"), |_| true),
    ))))
    .parse(input)?;
    Ok((
        input,
        OrderByItem {
            expression,
            descending: direction.unwrap_or(false),
        },
    ))
}

/// `SKIP <n>`
pub fn parse_skip(input: &str) -> IResult<&str, i64> {
    let (input, _) = ws(keyword("SKIP")).parse(input)?;
    ws(parse_integer).parse(input)
}

/// `LIMIT <n>`
pub fn parse_limit(input: &str) -> IResult<&str, i64> {
    let (input, _) = ws(keyword("LIMIT")).parse(input)?;
    ws(parse_integer).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_multiple() {
        let (_, items) = parse_order_by("ORDER BY a ASC, b DESC").unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[0].descending);
        assert!(items[1].descending);
    }

    #[test]
    fn test_default_is_ascending() {
        let (_, items) = parse_order_by("ORDER BY n.name").unwrap();
        assert!(!items[0].descending);
    }

    #[test]
    fn test_skip_limit() {
        assert_eq!(parse_skip("SKIP 10").unwrap().1, 10);
        assert_eq!(parse_limit("limit 3").unwrap().1, 3);
    }
}
