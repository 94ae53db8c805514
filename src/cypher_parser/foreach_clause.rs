use nom::{
    branch::alt,
    character::complete::char,
    combinator::map,
    multi::many1,
    IResult, Parser,
};

use super::ast::{Clause, ForeachClause};
use super::common::{keyword, parse_identifier, ws};
use super::expression::parse_expression;
use super::{create_clause, delete_clause, merge_clause, remove_clause, set_clause};

/// `FOREACH (x IN <list> | <update-clause>...)`: the body admits the update
/// clauses only (CREATE, SET, DELETE, REMOVE, MERGE, nested FOREACH).
pub fn parse_foreach_clause(input: &str) -> IResult<&str, ForeachClause<'_>> {
    let (input, _) = ws(keyword("FOREACH")).parse(input)?;
    let (input, _) = ws(char('(')).parse(input)?;
    let (input, variable) = ws(parse_identifier).parse(input)?;
    let (input, _) = ws(keyword("IN")).parse(input)?;
    let (input, list) = parse_expression(input)?;
    let (input, _) = ws(char('|')).parse(input)?;
    let (input, body) = many1(parse_update_clause).parse(input)?;
    let (input, _) = ws(char(')')).parse(input)?;

    Ok((
        input,
        ForeachClause {
            variable,
            list,
            body,
        },
    ))
}

fn parse_update_clause(input: &str) -> IResult<&str, Clause<'_>> {
    alt((
        map(create_clause::parse_create_clause, Clause::Create),
        map(merge_clause::parse_merge_clause, Clause::Merge),
        map(set_clause::parse_set_clause, Clause::Set),
        map(delete_clause::parse_delete_clause, Clause::Delete),
        map(remove_clause::parse_remove_clause, Clause::Remove),
        map(parse_foreach_clause, Clause::Foreach),
    ))
    .parse(input)
}
