use nom::{multi::separated_list1, IResult, Parser};

use super::ast::CreateClause;
use super::common::{comma, keyword, ws};
use super::match_clause::parse_named_path_pattern;

/// `CREATE <pattern>[, <pattern>...]`
pub fn parse_create_clause(input: &str) -> IResult<&str, CreateClause<'_>> {
    let (input, _) = ws(keyword("CREATE")).parse(input)?;
    let (input, patterns) = separated_list1(comma, parse_named_path_pattern).parse(input)?;
    Ok((input, CreateClause { patterns }))
}
