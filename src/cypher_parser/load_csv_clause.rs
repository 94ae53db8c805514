use nom::{combinator::opt, sequence::preceded, IResult, Parser};

use super::ast::LoadCsvClause;
use super::common::{keyword, parse_identifier, parse_quoted_string, ws};

/// `LOAD CSV [WITH HEADERS] FROM '<path>' AS <var> [FIELDTERMINATOR '<t>']`
pub fn parse_load_csv_clause(input: &str) -> IResult<&str, LoadCsvClause<'_>> {
    let (input, _) = ws(keyword("LOAD")).parse(input)?;
    let (input, _) = ws(keyword("CSV")).parse(input)?;
    let (input, headers) = opt((ws(keyword("WITH")), ws(keyword("HEADERS")))).parse(input)?;
    let (input, _) = ws(keyword("FROM")).parse(input)?;
    let (input, path) = ws(parse_quoted_string).parse(input)?;
    let (input, _) = ws(keyword("AS")).parse(input)?;
    let (input, alias) = ws(parse_identifier).parse(input)?;
    let (input, terminator) = opt(preceded(
        ws(keyword("FIELDTERMINATOR")),
        ws(parse_quoted_string),
    ))
    .parse(input)?;

    Ok((
        input,
        LoadCsvClause {
            path,
            alias,
            with_headers: headers.is_some(),
            terminator,
        },
    ))
}
