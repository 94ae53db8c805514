use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::{map, opt, peek, recognize},
    error::{Error, ErrorKind},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair},
    IResult, Parser,
};

use super::ast::{
    CaseExpression, ExistsExpr, Expression, FunctionCall, ListComprehension, ListPredicate,
    ListPredicateKind, Literal, MapProjection, MapProjectionItem, Operator, OperatorApplication,
    PatternComprehension, PropertyAccess, ReduceExpression,
};
use super::common::{keyword, parse_identifier, parse_quoted_string, ws};
use super::path_pattern;

pub fn parse_expression(input: &str) -> IResult<&str, Expression<'_>> {
    parse_logical_or(input)
}

fn parse_logical_or(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_logical_xor(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        match preceded(ws(keyword("OR")), parse_logical_xor).parse(remaining) {
            Ok((rest, rhs)) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: Operator::Or,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

fn parse_logical_xor(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_logical_and(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        match preceded(ws(keyword("XOR")), parse_logical_and).parse(remaining) {
            Ok((rest, rhs)) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: Operator::Xor,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

fn parse_logical_and(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_not_expression(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        match preceded(ws(keyword("AND")), parse_not_expression).parse(remaining) {
            Ok((rest, rhs)) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: Operator::And,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

fn parse_not_expression(input: &str) -> IResult<&str, Expression<'_>> {
    alt((
        map(
            preceded(ws(keyword("NOT")), parse_not_expression),
            |expr| Expression::Not(Box::new(expr)),
        ),
        parse_comparison,
    ))
    .parse(input)
}

/// Comparison operators bind looser than arithmetic and are parsed in a
/// flat left-to-right loop.
fn comparison_operator(input: &str) -> IResult<&str, Operator> {
    alt((
        map(tag(">="), |_| Operator::Gte),
        map(tag("<="), |_| Operator::Lte),
        map(tag("<>"), |_| Operator::Neq),
        map(tag("=~"), |_| Operator::Regex),
        map(tag(">"), |_| Operator::Gt),
        map(tag("<"), |_| Operator::Lt),
        map(tag("="), |_| Operator::Eq),
        map(
            pair(ws(keyword("STARTS")), keyword("WITH")),
            |_| Operator::StartsWith,
        ),
        map(
            pair(ws(keyword("ENDS")), keyword("WITH")),
            |_| Operator::EndsWith,
        ),
        map(keyword("CONTAINS"), |_| Operator::Contains),
        map(keyword("IN"), |_| Operator::In),
    ))
    .parse(input)
}

fn parse_comparison(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_additive(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        // NOT IN folds into Not(In(..)).
        if let Ok((rest, _)) =
            pair(ws(keyword("NOT")), ws(keyword("IN"))).parse(remaining)
        {
            let (rest, rhs) = parse_additive(rest)?;
            expr = Expression::Not(Box::new(Expression::BinaryOp(OperatorApplication {
                operator: Operator::In,
                operands: vec![expr, rhs],
            })));
            remaining = rest;
            continue;
        }

        match (ws(comparison_operator), parse_additive).parse(remaining) {
            Ok((rest, (op, rhs))) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: op,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

fn parse_additive(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_multiplicative(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        let op_parse = alt((
            map(char::<_, Error<&str>>('+'), |_| Operator::Add),
            map(char('-'), |_| Operator::Sub),
        ));
        match (ws(op_parse), parse_multiplicative).parse(remaining) {
            Ok((rest, (op, rhs))) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: op,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

fn parse_multiplicative(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, lhs) = parse_postfix(input)?;

    let mut remaining = input;
    let mut expr = lhs;
    loop {
        let op_parse = alt((
            map(char::<_, Error<&str>>('*'), |_| Operator::Mul),
            map(char('/'), |_| Operator::Div),
            map(char('%'), |_| Operator::Mod),
        ));
        match (ws(op_parse), parse_postfix).parse(remaining) {
            Ok((rest, (op, rhs))) => {
                expr = Expression::BinaryOp(OperatorApplication {
                    operator: op,
                    operands: vec![expr, rhs],
                });
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((remaining, expr))
}

/// Postfix forms: `IS [NOT] NULL`, subscript `[i]`, slice `[a..b]`.
fn parse_postfix(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, base) = parse_primary(input)?;

    let mut remaining = input;
    let mut expr = base;
    loop {
        // IS [NOT] NULL
        if let Ok((rest, is_not)) = preceded(
            ws(keyword("IS")),
            alt((
                map(pair(ws(keyword("NOT")), ws(keyword("NULL"))), |_| true),
                map(ws(keyword("NULL")), |_| false),
            )),
        )
        .parse(remaining)
        {
            expr = Expression::NullCheck {
                expr: Box::new(expr),
                is_not,
            };
            remaining = rest;
            continue;
        }

        // Subscript or slice: a '[' immediately after the expression.
        if remaining.starts_with('[') {
            let (rest, _) = char::<_, Error<&str>>('[').parse(remaining)?;
            // Slice: [from..to], [..to], [from..], [..]
            if let Ok((rest2, (from, _, to))) = (
                opt(parse_expression),
                ws(tag::<_, _, Error<&str>>("..")),
                opt(parse_expression),
            )
                .parse(rest)
            {
                let (rest3, _) = ws(char(']')).parse(rest2)?;
                expr = Expression::Slice {
                    base: Box::new(expr),
                    from: from.map(Box::new),
                    to: to.map(Box::new),
                };
                remaining = rest3;
                continue;
            }
            let (rest2, index) = ws(parse_expression).parse(rest)?;
            let (rest3, _) = ws(char(']')).parse(rest2)?;
            expr = Expression::Subscript {
                base: Box::new(expr),
                index: Box::new(index),
            };
            remaining = rest3;
            continue;
        }

        break;
    }
    Ok((remaining, expr))
}

fn parse_primary(input: &str) -> IResult<&str, Expression<'_>> {
    alt((
        parse_case_expression,
        parse_exists_expression,
        parse_reduce_expression,
        parse_list_predicate,
        parse_function_call,
        parse_map_projection,
        parse_property_access,
        parse_label_expression,
        parse_map_literal,
        parse_bracketed,
        parse_parameter,
        parse_literal,
        parse_variable,
        delimited(ws(char('(')), parse_expression, ws(char(')'))),
    ))
    .parse(input)
}

/// `CASE [expr] WHEN .. THEN .. [ELSE ..] END`
fn parse_case_expression(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = ws(keyword("CASE")).parse(input)?;

    // Searched CASE starts directly with WHEN; otherwise parse a scrutinee.
    let (after_ws, _) = multispace0.parse(input)?;
    let is_searched = after_ws.len() >= 4 && after_ws[..4].eq_ignore_ascii_case("when");

    let (input, scrutinee) = if is_searched {
        (input, None)
    } else {
        let (rest, expr) = parse_expression(input)?;
        (rest, Some(Box::new(expr)))
    };

    let mut when_then = Vec::new();
    let mut remaining = input;
    loop {
        match preceded(
            ws(keyword("WHEN")),
            separated_pair(parse_expression, ws(keyword("THEN")), parse_expression),
        )
        .parse(remaining)
        {
            Ok((rest, pair)) => {
                when_then.push(pair);
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    if when_then.is_empty() {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Tag)));
    }

    let (input, else_expr) =
        opt(preceded(ws(keyword("ELSE")), parse_expression)).parse(remaining)?;
    let (input, _) = ws(keyword("END")).parse(input)?;

    Ok((
        input,
        Expression::Case(CaseExpression {
            scrutinee,
            when_then,
            else_expr: else_expr.map(Box::new),
        }),
    ))
}

/// `EXISTS((pattern) [WHERE expr])` / `EXISTS { MATCH (pattern) WHERE expr }`
/// and the property form `EXISTS(n.prop)`.
fn parse_exists_expression(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = ws(keyword("EXISTS")).parse(input)?;

    // Property form first: EXISTS(n.prop)
    if let Ok((rest, prop)) = delimited(
        ws(char('(')),
        parse_property_access_inner,
        ws(char(')')),
    )
    .parse(input)
    {
        return Ok((rest, Expression::Exists(ExistsExpr::Property(prop))));
    }

    // Pattern form: braces or parens around a path pattern with optional WHERE.
    let (input, open) = ws(alt((char('{'), char('(')))).parse(input)?;
    let close = if open == '{' { '}' } else { ')' };
    let (input, _) = opt(ws(keyword("MATCH"))).parse(input)?;
    let (input, pattern) = ws(path_pattern::parse_path_pattern).parse(input)?;
    let (input, where_clause) =
        opt(preceded(ws(keyword("WHERE")), parse_expression)).parse(input)?;
    let (input, _) = ws(char(close)).parse(input)?;

    Ok((
        input,
        Expression::Exists(ExistsExpr::Pattern {
            pattern: Box::new(pattern),
            where_clause: where_clause.map(Box::new),
        }),
    ))
}

/// `reduce(acc = init, x IN list | body)`
fn parse_reduce_expression(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = ws(keyword("reduce")).parse(input)?;
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, accumulator) = ws(parse_identifier).parse(input)?;
    let (input, _) = ws(char('=')).parse(input)?;
    let (input, initial) = parse_expression(input)?;
    let (input, _) = ws(char(',')).parse(input)?;
    let (input, variable) = ws(parse_identifier).parse(input)?;
    let (input, _) = ws(keyword("IN")).parse(input)?;
    let (input, list) = parse_expression(input)?;
    let (input, _) = ws(char('|')).parse(input)?;
    let (input, body) = parse_expression(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::Reduce(ReduceExpression {
            accumulator,
            initial: Box::new(initial),
            variable,
            list: Box::new(list),
            body: Box::new(body),
        }),
    ))
}

/// `all/any/none/single(x IN list WHERE predicate)`
fn parse_list_predicate(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, kind) = ws(alt((
        map(keyword("all"), |_| ListPredicateKind::All),
        map(keyword("any"), |_| ListPredicateKind::Any),
        map(keyword("none"), |_| ListPredicateKind::None),
        map(keyword("single"), |_| ListPredicateKind::Single),
    )))
    .parse(input)?;
    let (input, _) = char('(').parse(input)?;
    let (input, variable) = ws(parse_identifier).parse(input)?;
    let (input, _) = ws(keyword("IN")).parse(input)?;
    let (input, list) = parse_expression(input)?;
    let (input, _) = ws(keyword("WHERE")).parse(input)?;
    let (input, predicate) = parse_expression(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::ListPredicate(ListPredicate {
            kind,
            variable,
            list: Box::new(list),
            predicate: Box::new(predicate),
        }),
    ))
}

pub fn parse_function_call(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, name) = ws(parse_identifier).parse(input)?;
    let (input, _) = char('(').parse(input)?;
    let (input, distinct) = opt(ws(keyword("DISTINCT"))).parse(input)?;
    // `count(*)` keeps the star as an identifier argument.
    let (input, args) = alt((
        map(ws(tag("*")), |star: &str| {
            vec![Expression::Identifier(star)]
        }),
        separated_list0(ws(char(',')), parse_expression),
    ))
    .parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        Expression::FunctionCall(FunctionCall {
            name,
            args,
            distinct: distinct.is_some(),
        }),
    ))
}

fn parse_property_access_inner(input: &str) -> IResult<&str, PropertyAccess<'_>> {
    let (input, (base, key)) =
        separated_pair(parse_identifier, char('.'), parse_identifier).parse(input)?;
    Ok((input, PropertyAccess { base, key }))
}

pub fn parse_property_access(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, prop) = parse_property_access_inner(input)?;
    Ok((input, Expression::Property(prop)))
}

/// `n:Label` inside an expression (label test). Guarded against matching the
/// `alias: expr` form inside map literals by requiring an identifier after
/// the colon that is not followed by another expression start.
fn parse_label_expression(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, (variable, label)) =
        separated_pair(parse_identifier, char(':'), parse_identifier).parse(input)?;
    Ok((input, Expression::Label { variable, label }))
}

/// `{key: value, ...}`
fn parse_map_literal(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, entries) = delimited(
        ws(char('{')),
        separated_list0(
            ws(char(',')),
            separated_pair(ws(parse_identifier), char(':'), parse_expression),
        ),
        ws(char('}')),
    )
    .parse(input)?;
    Ok((input, Expression::Map(entries)))
}

/// `n{.a, key: expr, ...}`
fn parse_map_projection(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, base) = ws(parse_identifier).parse(input)?;
    let (input, _) = peek(char('{')).parse(input)?;
    let (input, items) = delimited(
        char('{'),
        separated_list0(
            ws(char(',')),
            alt((
                map(preceded(ws(char('.')), parse_identifier), |name| {
                    MapProjectionItem::Property(name)
                }),
                map(
                    separated_pair(ws(parse_identifier), char(':'), parse_expression),
                    |(key, value)| MapProjectionItem::Entry { key, value },
                ),
            )),
        ),
        ws(char('}')),
    )
    .parse(input)?;
    Ok((input, Expression::MapProjection(MapProjection { base, items })))
}

/// Anything starting with `[`: a list comprehension, a pattern comprehension,
/// or a plain list literal, tried in that order.
fn parse_bracketed(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (after_bracket, _) = char('[').parse(input)?;

    // List comprehension: [x IN list ...]
    if let Ok((rest, (variable, _))) = (
        ws(parse_identifier),
        ws(keyword("IN")),
    )
        .parse(after_bracket)
    {
        let (rest, list) = parse_expression(rest)?;
        let (rest, where_clause) =
            opt(preceded(ws(keyword("WHERE")), parse_expression)).parse(rest)?;
        let (rest, transform) = opt(preceded(ws(char('|')), parse_expression)).parse(rest)?;
        let (rest, _) = ws(char(']')).parse(rest)?;
        return Ok((
            rest,
            Expression::ListComprehension(ListComprehension {
                variable,
                list: Box::new(list),
                where_clause: where_clause.map(Box::new),
                transform: transform.map(Box::new),
            }),
        ));
    }

    // Pattern comprehension: [(a)-[r]->(b) WHERE cond | proj]
    if after_bracket.trim_start().starts_with('(') {
        if let Ok((rest, pattern)) = path_pattern::parse_path_pattern(after_bracket) {
            if let Ok((rest, (where_clause, _, projection))) = (
                opt(preceded(
                    ws(keyword("WHERE")),
                    parse_expression,
                )),
                ws(char('|')),
                parse_expression,
            )
                .parse(rest)
            {
                let (rest, _) = ws(char(']')).parse(rest)?;
                return Ok((
                    rest,
                    Expression::PatternComprehension(PatternComprehension {
                        pattern: Box::new(pattern),
                        where_clause: where_clause.map(Box::new),
                        projection: Box::new(projection),
                    }),
                ));
            }
        }
    }

    // Plain list literal.
    let (rest, items) = separated_list0(ws(char(',')), parse_expression).parse(after_bracket)?;
    let (rest, _) = ws(char(']')).parse(rest)?;
    Ok((rest, Expression::List(items)))
}

pub fn parse_parameter(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, name) = preceded(char('$'), parse_identifier).parse(input)?;
    Ok((input, Expression::Parameter(name)))
}

fn parse_numeric_literal(input: &str) -> IResult<&str, Expression<'_>> {
    let (rest, text) = recognize(pair(
        opt(char('-')),
        alt((
            recognize((digit1, char('.'), digit1)),
            recognize(pair(char('.'), digit1)),
            digit1,
        )),
    ))
    .parse(input)?;

    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(value) => Ok((rest, Expression::Literal(Literal::Decimal(value)))),
            Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Float))),
        }
    } else {
        match text.parse::<i64>() {
            Ok(value) => Ok((rest, Expression::Literal(Literal::Integer(value)))),
            Err(_) => Err(nom::Err::Error(Error::new(input, ErrorKind::Digit))),
        }
    }
}

pub fn parse_literal(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    alt((
        map(parse_quoted_string, |s| {
            Expression::Literal(Literal::String(s))
        }),
        map(keyword("true"), |_| {
            Expression::Literal(Literal::Boolean(true))
        }),
        map(keyword("false"), |_| {
            Expression::Literal(Literal::Boolean(false))
        }),
        map(keyword("null"), |_| Expression::Literal(Literal::Null)),
        parse_numeric_literal,
    ))
    .parse(input)
}

fn parse_variable(input: &str) -> IResult<&str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, name) = parse_identifier(input)?;
    Ok((input, Expression::Identifier(name)))
}
