use nom::{
    combinator::opt,
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};

use super::ast::{ReturnClause, ReturnItem};
use super::common::{comma, keyword, parse_identifier, ws};
use super::expression::parse_expression;
use super::order_by_clause::{parse_limit, parse_order_by, parse_skip};

/// `RETURN [DISTINCT] item[, item...] [ORDER BY ...] [SKIP n] [LIMIT n]`
pub fn parse_return_clause(input: &str) -> IResult<&str, ReturnClause<'_>> {
    let (input, _) = ws(keyword("RETURN")).parse(input)?;
    let (input, distinct) = opt(ws(keyword("DISTINCT"))).parse(input)?;
    let (input, items) = separated_list1(comma, parse_return_item).parse(input)?;
    let (input, order_by) = opt(parse_order_by).parse(input)?;
    let (input, skip) = opt(parse_skip).parse(input)?;
    let (input, limit) = opt(parse_limit).parse(input)?;

    Ok((
        input,
        ReturnClause {
            distinct: distinct.is_some(),
            items,
            order_by: order_by.unwrap_or_default(),
            skip,
            limit,
        },
    ))
}

pub fn parse_return_item(input: &str) -> IResult<&str, ReturnItem<'_>> {
    let (input, expression) = parse_expression(input)?;
    let (input, alias) =
        opt(preceded(ws(keyword("AS")), ws(parse_identifier))).parse(input)?;
    Ok((input, ReturnItem { expression, alias }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::{Expression, PropertyAccess};

    #[test]
    fn test_return_items_and_aliases() {
        let (_, clause) = parse_return_clause("RETURN a, b.name AS name").unwrap();
        assert!(!clause.distinct);
        assert_eq!(clause.items.len(), 2);
        assert_eq!(clause.items[0].expression, Expression::Identifier("a"));
        assert_eq!(clause.items[0].alias, None);
        assert_eq!(
            clause.items[1].expression,
            Expression::Property(PropertyAccess {
                base: "b",
                key: "name"
            })
        );
        assert_eq!(clause.items[1].alias, Some("name"));
    }

    #[test]
    fn test_return_distinct() {
        let (_, clause) = parse_return_clause("RETURN DISTINCT n.city").unwrap();
        assert!(clause.distinct);
    }

    #[test]
    fn test_return_with_paging() {
        let (_, clause) =
            parse_return_clause("RETURN n ORDER BY n.name DESC SKIP 5 LIMIT 10").unwrap();
        assert_eq!(clause.order_by.len(), 1);
        assert!(clause.order_by[0].descending);
        assert_eq!(clause.skip, Some(5));
        assert_eq!(clause.limit, Some(10));
    }
}
