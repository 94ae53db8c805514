use nom::{
    character::complete::char,
    combinator::opt,
    multi::separated_list1,
    sequence::terminated,
    IResult, Parser,
};

use super::ast::{MatchClause, PathPattern};
use super::common::{comma, keyword, parse_identifier, ws};
use super::path_pattern::parse_path_pattern;
use super::where_clause::parse_where_clause;

/// `MATCH <pattern>[, <pattern>...] [WHERE <expr>]` with an optional
/// `OPTIONAL` prefix and optional `p =` path-variable bindings.
pub fn parse_match_clause(input: &str) -> IResult<&str, MatchClause<'_>> {
    let (input, optional) = opt(ws(keyword("OPTIONAL"))).parse(input)?;
    let (input, _) = ws(keyword("MATCH")).parse(input)?;
    let (input, patterns) = separated_list1(comma, parse_named_path_pattern).parse(input)?;
    let (input, where_clause) = opt(parse_where_clause).parse(input)?;

    Ok((
        input,
        MatchClause {
            patterns,
            where_clause,
            optional: optional.is_some(),
            source_graph: None,
        },
    ))
}

/// A path pattern with an optional leading `name =` binding.
pub fn parse_named_path_pattern(input: &str) -> IResult<&str, PathPattern<'_>> {
    let (input, variable) =
        opt(terminated(ws(parse_identifier), ws(char('=')))).parse(input)?;
    let (input, mut pattern) = parse_path_pattern(input)?;
    pattern.variable = variable;
    Ok((input, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::{PathElement, PathKind};

    #[test]
    fn test_simple_match() {
        let (rest, clause) = parse_match_clause("MATCH (n:Person) RETURN n").unwrap();
        assert!(rest.trim_start().to_uppercase().starts_with("RETURN"));
        assert_eq!(clause.patterns.len(), 1);
        assert!(!clause.optional);
        assert!(clause.where_clause.is_none());
    }

    #[test]
    fn test_optional_match() {
        let (_, clause) = parse_match_clause("OPTIONAL MATCH (n)-[:R]->(m)").unwrap();
        assert!(clause.optional);
    }

    #[test]
    fn test_match_with_where() {
        let (_, clause) = parse_match_clause("MATCH (n) WHERE n.age > 18").unwrap();
        assert!(clause.where_clause.is_some());
    }

    #[test]
    fn test_comma_separated_patterns() {
        let (_, clause) = parse_match_clause("MATCH (a:Person), (b:Person)").unwrap();
        assert_eq!(clause.patterns.len(), 2);
    }

    #[test]
    fn test_path_variable() {
        let (_, clause) = parse_match_clause("MATCH p = (a)-[:R*1..2]->(b)").unwrap();
        assert_eq!(clause.patterns[0].variable, Some("p"));
        assert_eq!(clause.patterns[0].kind, PathKind::Normal);
        assert!(matches!(
            clause.patterns[0].elements[1],
            PathElement::Rel(_)
        ));
    }

    #[test]
    fn test_shortest_path_binding() {
        let (_, clause) = parse_match_clause("MATCH p = shortestPath((a)-[:R*]-(b))").unwrap();
        assert_eq!(clause.patterns[0].variable, Some("p"));
        assert_eq!(clause.patterns[0].kind, PathKind::Shortest);
    }
}
