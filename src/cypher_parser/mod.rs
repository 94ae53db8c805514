use nom::{
    branch::alt,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::{many0, many1},
    IResult, Parser,
};

use ast::{Clause, Query, Statement, UnionArm};
pub use common::strip_comments;
use common::{keyword, parse_identifier, ws};
pub use errors::ParseError;

pub mod ast;
mod common;
mod create_clause;
mod delete_clause;
pub(crate) mod errors;
mod expression;
mod foreach_clause;
mod load_csv_clause;
mod match_clause;
mod merge_clause;
mod order_by_clause;
mod path_pattern;
mod remove_clause;
mod return_clause;
mod set_clause;
mod unwind_clause;
mod where_clause;
mod with_clause;

/// Parse a complete statement, requiring all input to be consumed.
/// The input must already have comments stripped (see [`strip_comments`]);
/// the AST borrows from it.
pub fn parse(input: &str) -> Result<Statement<'_>, ParseError> {
    match parse_statement(input) {
        Ok((remainder, statement)) => {
            let trimmed = remainder.trim();
            if !trimmed.is_empty() {
                return Err(ParseError::at(input, remainder.trim_start(), "unexpected tokens after query"));
            }
            Ok(statement)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseError::at(input, e.input, "unable to parse query"))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::at(input, "", "incomplete query")),
    }
}

/// Parse a statement: one query plus zero or more UNION arms, with an
/// optional trailing semicolon.
fn parse_statement(input: &str) -> IResult<&str, Statement<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, explain) = opt(ws(keyword("EXPLAIN"))).parse(input)?;
    let (input, mut query) = parse_single_query(input)?;
    query.explain = explain.is_some();

    let (input, unions) = many0(parse_union_arm).parse(input)?;
    let (input, _) = opt(ws(char(';'))).parse(input)?;

    Ok((input, Statement { query, unions }))
}

/// `UNION [ALL]` followed by a query.
fn parse_union_arm(input: &str) -> IResult<&str, UnionArm<'_>> {
    let (input, _) = ws(keyword("UNION")).parse(input)?;
    let (input, all) = opt(ws(keyword("ALL"))).parse(input)?;
    let (input, query) = parse_single_query(input)?;

    Ok((
        input,
        UnionArm {
            all: all.is_some(),
            query,
        },
    ))
}

/// A query is a non-empty sequence of clauses in textual order, optionally
/// preceded by a `USE <graph>` clause that tags its MATCH clauses.
fn parse_single_query(input: &str) -> IResult<&str, Query<'_>> {
    let (input, source_graph) = opt((ws(keyword("USE")), ws(parse_identifier))).parse(input)?;
    let (input, mut clauses) = many1(parse_clause).parse(input)?;

    if let Some((_, graph)) = source_graph {
        for clause in clauses.iter_mut() {
            if let Clause::Match(m) = clause {
                m.source_graph = Some(graph);
            }
        }
    }

    Ok((
        input,
        Query {
            clauses,
            explain: false,
        },
    ))
}

fn parse_clause(input: &str) -> IResult<&str, Clause<'_>> {
    alt((
        map(match_clause::parse_match_clause, Clause::Match),
        map(unwind_clause::parse_unwind_clause, Clause::Unwind),
        map(with_clause::parse_with_clause, Clause::With),
        map(return_clause::parse_return_clause, Clause::Return),
        map(create_clause::parse_create_clause, Clause::Create),
        map(merge_clause::parse_merge_clause, Clause::Merge),
        map(set_clause::parse_set_clause, Clause::Set),
        map(delete_clause::parse_delete_clause, Clause::Delete),
        map(remove_clause::parse_remove_clause, Clause::Remove),
        map(foreach_clause::parse_foreach_clause, Clause::Foreach),
        map(load_csv_clause::parse_load_csv_clause, Clause::LoadCsv),
    ))
    .parse(input)
}
