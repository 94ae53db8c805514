use nom::{IResult, Parser};

use super::ast::MergeClause;
use super::common::{keyword, ws};
use super::match_clause::parse_named_path_pattern;
use super::set_clause::parse_set_items;

/// `MERGE <pattern> [ON CREATE SET items] [ON MATCH SET items]`: the two
/// ON blocks may appear in either order.
pub fn parse_merge_clause(input: &str) -> IResult<&str, MergeClause<'_>> {
    let (input, _) = ws(keyword("MERGE")).parse(input)?;
    let (mut input, pattern) = parse_named_path_pattern(input)?;

    let mut on_create = Vec::new();
    let mut on_match = Vec::new();

    loop {
        let Ok((rest, _)) = ws(keyword("ON")).parse(input) else {
            break;
        };

        if let Ok((rest, _)) = ws(keyword("CREATE")).parse(rest) {
            let (rest, _) = ws(keyword("SET")).parse(rest)?;
            let (rest, items) = parse_set_items(rest)?;
            on_create.extend(items);
            input = rest;
            continue;
        }

        let (rest, _) = ws(keyword("MATCH")).parse(rest)?;
        let (rest, _) = ws(keyword("SET")).parse(rest)?;
        let (rest, items) = parse_set_items(rest)?;
        on_match.extend(items);
        input = rest;
    }

    Ok((
        input,
        MergeClause {
            pattern,
            on_create,
            on_match,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::SetItem;

    #[test]
    fn test_merge_plain() {
        let (_, clause) = parse_merge_clause("MERGE (p:Person {email: 'x@y'})").unwrap();
        assert!(clause.on_create.is_empty());
        assert!(clause.on_match.is_empty());
        assert_eq!(clause.pattern.elements.len(), 1);
    }

    #[test]
    fn test_merge_on_create_on_match() {
        let (_, clause) = parse_merge_clause(
            "MERGE (p:Person {email: 'x@y'}) ON CREATE SET p.created = 1 ON MATCH SET p.seen = 2",
        )
        .unwrap();
        assert_eq!(clause.on_create.len(), 1);
        assert_eq!(clause.on_match.len(), 1);
        assert!(matches!(clause.on_create[0], SetItem::Property { .. }));
    }

    #[test]
    fn test_merge_on_match_first() {
        let (_, clause) = parse_merge_clause(
            "MERGE (p:P) ON MATCH SET p.seen = 1 ON CREATE SET p.created = 1",
        )
        .unwrap();
        assert_eq!(clause.on_create.len(), 1);
        assert_eq!(clause.on_match.len(), 1);
    }

    #[test]
    fn test_merge_relationship_pattern() {
        let (_, clause) = parse_merge_clause("MERGE (a)-[:KNOWS]->(b)").unwrap();
        assert_eq!(clause.pattern.elements.len(), 3);
    }
}
