use nom::{
    branch::alt,
    character::complete::{char, multispace0, space0},
    combinator::{map, opt, peek},
    error::{Error, ErrorKind},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

use super::ast::{
    NodePattern, PathElement, PathKind, PathPattern, Property, PropertyPair, RelPattern,
    VarlenRange,
};
use super::common::{keyword, parse_identifier, ws};
use super::expression;

/// Maximum number of chained relationships in one path pattern. Guards the
/// recursive descent against adversarial inputs; real queries stay far below.
const MAX_RELATIONSHIP_CHAIN: usize = 50;

/// Entry point: a path pattern, optionally wrapped in `shortestPath()` or
/// `allShortestPaths()`.
pub fn parse_path_pattern(input: &str) -> IResult<&str, PathPattern<'_>> {
    alt((parse_shortest_path_wrapper, parse_plain_path)).parse(input)
}

fn parse_shortest_path_wrapper(input: &str) -> IResult<&str, PathPattern<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, kind) = alt((
        map(keyword("shortestPath"), |_| PathKind::Shortest),
        map(keyword("allShortestPaths"), |_| PathKind::AllShortest),
    ))
    .parse(input)?;
    let (input, mut pattern) = delimited(ws(char('(')), parse_plain_path, ws(char(')'))).parse(input)?;
    pattern.kind = kind;
    Ok((input, pattern))
}

fn parse_plain_path(input: &str) -> IResult<&str, PathPattern<'_>> {
    let (input, first) = parse_node_pattern(input)?;

    let mut elements = vec![PathElement::Node(first)];
    let mut remaining = input;

    loop {
        if elements.len() / 2 >= MAX_RELATIONSHIP_CHAIN {
            return Err(nom::Err::Failure(Error::new(remaining, ErrorKind::TooLarge)));
        }

        let (_, starts_rel) = is_relationship_start(remaining)?;
        if !starts_rel {
            break;
        }

        let (rest, rel) = parse_relationship_pattern(remaining)?;
        let (rest, node) = parse_node_pattern(rest)?;
        elements.push(PathElement::Rel(rel));
        elements.push(PathElement::Node(node));
        remaining = rest;
    }

    Ok((
        remaining,
        PathPattern {
            variable: None,
            kind: PathKind::Normal,
            elements,
        },
    ))
}

/// Peek whether the next tokens begin a relationship: `<-`, `->`, `--`, `-[`.
fn is_relationship_start(input: &str) -> IResult<&str, bool> {
    let (input, _) = multispace0.parse(input)?;
    let (_, found) = opt(peek(alt((
        map((char('<'), multispace0, char('-')), |_| ()),
        map((char('-'), multispace0, char('[')), |_| ()),
        map((char('-'), multispace0, char('-')), |_| ()),
        map((char('-'), multispace0, char('>')), |_| ()),
    ))))
    .parse(input)?;
    Ok((input, found.is_some()))
}

/// `(name:Label1:Label2 {props})`, `()`, `(:Label)`, `({k: v})`, `($param)`.
pub fn parse_node_pattern(input: &str) -> IResult<&str, NodePattern<'_>> {
    let (input, _) = multispace0.parse(input)?;
    delimited(char('('), parse_node_body, preceded(space0, char(')'))).parse(input)
}

fn parse_node_body(input: &str) -> IResult<&str, NodePattern<'_>> {
    let (input, variable) = opt(ws(parse_identifier)).parse(input)?;
    // Conjunctive label stack: `:A:B:C`.
    let (input, labels) = many0(preceded(char(':'), parse_identifier)).parse(input)?;
    let (input, properties) = opt(parse_properties).parse(input)?;
    Ok((
        input,
        NodePattern {
            variable,
            labels,
            properties,
        },
    ))
}

/// Inline property map `{k: expr, ...}` or a whole-map parameter `$props`.
pub fn parse_properties(input: &str) -> IResult<&str, Vec<Property<'_>>> {
    alt((
        delimited(
            ws(char('{')),
            separated_list0(
                ws(char(',')),
                map(
                    separated_pair(
                        ws(parse_identifier),
                        char(':'),
                        expression::parse_expression,
                    ),
                    |(key, value)| Property::Pair(PropertyPair { key, value }),
                ),
            ),
            ws(char('}')),
        ),
        map(ws(expression::parse_parameter), |expr| match expr {
            super::ast::Expression::Parameter(name) => vec![Property::Param(name)],
            _ => unreachable!("parse_parameter yields Parameter"),
        }),
    ))
    .parse(input)
}

/// A relationship with optional bracket body:
/// `<-[r:TYPE1|TYPE2 {props} *1..3]-`, `-->`, `-[r]->`, `--`.
pub fn parse_relationship_pattern(input: &str) -> IResult<&str, RelPattern<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, left) = opt(char('<')).parse(input)?;
    let (input, _) = ws(char('-')).parse(input)?;

    let (input, body) = opt(delimited(char('['), parse_rel_body, ws(char(']')))).parse(input)?;

    let (input, _) = ws(char('-')).parse(input)?;
    let (input, right) = opt(char('>')).parse(input)?;

    let (variable, types, properties, varlen) = body.unwrap_or((None, Vec::new(), None, None));

    Ok((
        input,
        RelPattern {
            variable,
            types,
            properties,
            left_arrow: left.is_some(),
            right_arrow: right.is_some(),
            varlen,
        },
    ))
}

type RelBody<'a> = (
    Option<&'a str>,
    Vec<&'a str>,
    Option<Vec<Property<'a>>>,
    Option<VarlenRange>,
);

fn parse_rel_body(input: &str) -> IResult<&str, RelBody<'_>> {
    let (input, variable) = opt(ws(parse_identifier)).parse(input)?;
    // Disjunctive type alternatives: `:T1|T2`.
    let (input, types) = opt(preceded(
        char(':'),
        separated_list1(ws(char('|')), parse_identifier),
    ))
    .parse(input)?;
    let (input, varlen) = opt(parse_varlen_range).parse(input)?;
    let (input, properties) = opt(parse_properties).parse(input)?;
    Ok((
        input,
        (variable, types.unwrap_or_default(), properties, varlen),
    ))
}

/// `*`, `*2`, `*1..3`, `*..5`, `*2..`: `-1` encodes an unbounded side.
fn parse_varlen_range(input: &str) -> IResult<&str, VarlenRange> {
    let (input, _) = ws(char('*')).parse(input)?;

    let (input, min) = opt(nom::character::complete::u32).parse(input)?;
    let (input, dots) = opt(nom::bytes::complete::tag("..")).parse(input)?;

    let range = match (min, dots) {
        // `*n` - exact hop count
        (Some(n), None) => VarlenRange::fixed(n as i32),
        // `*n..` or `*n..m`
        (Some(n), Some(_)) => {
            let (rest, max) = opt(nom::character::complete::u32).parse(input)?;
            return Ok((
                rest,
                VarlenRange {
                    min_hops: n as i32,
                    max_hops: max.map(|m| m as i32).unwrap_or(-1),
                },
            ));
        }
        // `*..m`
        (None, Some(_)) => {
            let (rest, max) = opt(nom::character::complete::u32).parse(input)?;
            return Ok((
                rest,
                VarlenRange {
                    min_hops: -1,
                    max_hops: max.map(|m| m as i32).unwrap_or(-1),
                },
            ));
        }
        // bare `*`
        (None, None) => VarlenRange::unbounded(),
    };
    Ok((input, range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cypher_parser::ast::{Direction, Expression, Literal};

    fn node<'a>(pattern: &'a PathPattern<'a>, index: usize) -> NodePattern<'a> {
        match &pattern.elements[index] {
            PathElement::Node(n) => n.clone(),
            other => panic!("expected node at {}, got {:?}", index, other),
        }
    }

    fn rel<'a>(pattern: &'a PathPattern<'a>, index: usize) -> RelPattern<'a> {
        match &pattern.elements[index] {
            PathElement::Rel(r) => r.clone(),
            other => panic!("expected rel at {}, got {:?}", index, other),
        }
    }

    #[test]
    fn test_single_node() {
        let (rest, pattern) = parse_path_pattern("(a:Person {name: 'Alice'})").unwrap();
        assert_eq!(rest, "");
        assert_eq!(pattern.elements.len(), 1);
        let n = node(&pattern, 0);
        assert_eq!(n.variable, Some("a"));
        assert_eq!(n.labels, vec!["Person"]);
        let props = n.properties.unwrap();
        assert_eq!(
            props[0],
            Property::Pair(PropertyPair {
                key: "name",
                value: Expression::Literal(Literal::String("Alice")),
            })
        );
    }

    #[test]
    fn test_empty_node() {
        let (_, pattern) = parse_path_pattern("()").unwrap();
        let n = node(&pattern, 0);
        assert_eq!(n.variable, None);
        assert!(n.labels.is_empty());
        assert!(n.properties.is_none());
    }

    #[test]
    fn test_multiple_labels_conjunctive() {
        let (_, pattern) = parse_path_pattern("(a:Person:Admin)").unwrap();
        assert_eq!(node(&pattern, 0).labels, vec!["Person", "Admin"]);
    }

    #[test]
    fn test_connected_pattern() {
        let (rest, pattern) =
            parse_path_pattern("(a:Person)-[r:KNOWS {since: 2020}]->(b:Person)").unwrap();
        assert_eq!(rest, "");
        assert_eq!(pattern.elements.len(), 3);

        let r = rel(&pattern, 1);
        assert_eq!(r.variable, Some("r"));
        assert_eq!(r.types, vec!["KNOWS"]);
        assert_eq!(r.direction(), Direction::Outgoing);
        assert!(r.properties.is_some());
    }

    #[test]
    fn test_directions() {
        let (_, p) = parse_path_pattern("(a)<-[:R]-(b)").unwrap();
        assert_eq!(rel(&p, 1).direction(), Direction::Incoming);

        let (_, p) = parse_path_pattern("(a)--(b)").unwrap();
        assert_eq!(rel(&p, 1).direction(), Direction::Either);

        let (_, p) = parse_path_pattern("(a)-->(b)").unwrap();
        assert_eq!(rel(&p, 1).direction(), Direction::Outgoing);

        let (_, p) = parse_path_pattern("(a)-[r]-(b)").unwrap();
        assert_eq!(rel(&p, 1).direction(), Direction::Either);
    }

    #[test]
    fn test_multi_type_disjunctive() {
        let (_, p) = parse_path_pattern("(a)-[:FOLLOWS|LIKES]->(b)").unwrap();
        assert_eq!(rel(&p, 1).types, vec!["FOLLOWS", "LIKES"]);
    }

    #[test]
    fn test_chain() {
        let (_, p) = parse_path_pattern("(a)-[:R]->(b)-[:R]->(c)").unwrap();
        assert_eq!(p.elements.len(), 5);
        assert_eq!(node(&p, 2).variable, Some("b"));
        assert_eq!(node(&p, 4).variable, Some("c"));
    }

    #[test]
    fn test_varlen_forms() {
        let (_, p) = parse_path_pattern("(a)-[:R*2..3]->(b)").unwrap();
        assert_eq!(
            rel(&p, 1).varlen,
            Some(VarlenRange {
                min_hops: 2,
                max_hops: 3
            })
        );

        let (_, p) = parse_path_pattern("(a)-[:R*]->(b)").unwrap();
        assert_eq!(rel(&p, 1).varlen, Some(VarlenRange::unbounded()));

        let (_, p) = parse_path_pattern("(a)-[:R*2]->(b)").unwrap();
        assert_eq!(rel(&p, 1).varlen, Some(VarlenRange::fixed(2)));

        let (_, p) = parse_path_pattern("(a)-[:R*..4]->(b)").unwrap();
        assert_eq!(
            rel(&p, 1).varlen,
            Some(VarlenRange {
                min_hops: -1,
                max_hops: 4
            })
        );
        assert_eq!(rel(&p, 1).varlen.unwrap().effective_min(), 1);

        let (_, p) = parse_path_pattern("(a)-[:R*2..]->(b)").unwrap();
        assert_eq!(
            rel(&p, 1).varlen,
            Some(VarlenRange {
                min_hops: 2,
                max_hops: -1
            })
        );
    }

    #[test]
    fn test_shortest_path() {
        let (_, p) = parse_path_pattern("shortestPath((a)-[:R*]-(b))").unwrap();
        assert_eq!(p.kind, PathKind::Shortest);

        let (_, p) = parse_path_pattern("allShortestPaths((a)-[:R*]-(b))").unwrap();
        assert_eq!(p.kind, PathKind::AllShortest);
    }

    #[test]
    fn test_parameter_properties() {
        let (_, p) = parse_path_pattern("(n $props)").unwrap();
        assert_eq!(
            node(&p, 0).properties,
            Some(vec![Property::Param("props")])
        );
    }
}
