use nom::{
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::recognize,
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair},
    IResult, Parser,
};

/// Strip line (`--`, `//`) and block (`/* */`) comments before parsing.
/// Contents of string literals, double-quoted and backtick identifiers are
/// preserved untouched.
pub fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string: Option<char> = None;
    let mut escape_next = false;

    while let Some(ch) = chars.next() {
        if escape_next {
            result.push(ch);
            escape_next = false;
            continue;
        }

        if in_string.is_some() && ch == '\\' {
            result.push(ch);
            escape_next = true;
            continue;
        }

        if ch == '\'' || ch == '"' || ch == '`' {
            if in_string == Some(ch) {
                in_string = None;
            } else if in_string.is_none() {
                in_string = Some(ch);
            }
            result.push(ch);
            continue;
        }

        if in_string.is_some() {
            result.push(ch);
            continue;
        }

        // Line comment: -- or //
        if (ch == '-' && chars.peek() == Some(&'-')) || (ch == '/' && chars.peek() == Some(&'/')) {
            chars.next();
            for c in chars.by_ref() {
                if c == '\n' {
                    result.push('\n');
                    break;
                }
            }
            continue;
        }

        // Block comment: /* */
        if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    break;
                }
            }
            continue;
        }

        result.push(ch);
    }

    result
}

/// Whitespace-handling combinator.
pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

fn underscore1(input: &str) -> IResult<&str, &str> {
    take_while1(|c| c == '_')(input)
}

/// Unquoted identifier: a letter or underscore run followed by alphanumerics,
/// with embedded underscores allowed (`account_creation_date`, `n1`).
fn bare_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, underscore1)),
        many0(alt((alphanumeric1, underscore1))),
    ))
    .parse(input)
}

/// Backtick-quoted identifier: returns the inner text without the backticks.
fn backtick_identifier(input: &str) -> IResult<&str, &str> {
    delimited(char('`'), take_until("`"), char('`')).parse(input)
}

/// Identifier as used for variables, labels, property keys, and function
/// names. Backtick quoting admits otherwise-reserved characters.
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    alt((backtick_identifier, bare_identifier)).parse(input)
}

/// A keyword match that must not be a prefix of a longer identifier,
/// e.g. `OR` must not match the start of `ORDER`.
pub fn keyword<'a>(kw: &'static str) -> impl Parser<&'a str, Output = &'a str, Error = nom::error::Error<&'a str>> {
    move |input: &'a str| {
        let (rest, matched) = nom::bytes::complete::tag_no_case(kw).parse(input)?;
        if rest
            .chars()
            .next()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )));
        }
        Ok((rest, matched))
    }
}

/// Recognize an integer literal (digits with optional leading minus).
pub fn parse_integer(input: &str) -> IResult<&str, i64> {
    let (rest, text) = recognize(pair(
        nom::combinator::opt(char('-')),
        nom::character::complete::digit1,
    ))
    .parse(input)?;
    match text.parse::<i64>() {
        Ok(value) => Ok((rest, value)),
        Err(_) => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Single- or double-quoted string literal; returns the raw inner slice.
pub fn parse_quoted_string(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_until("'"), char('\'')),
        delimited(char('"'), take_until("\""), char('"')),
    ))
    .parse(input)
}

/// Comma with surrounding whitespace.
pub fn comma(input: &str) -> IResult<&str, char> {
    ws(char(',')).parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::bytes::complete::tag;

    #[test]
    fn test_ws() {
        assert_eq!(
            ws(tag::<&str, &str, nom::error::Error<&str>>("test")).parse("   test   "),
            Ok(("", "test"))
        );
        assert_eq!(
            ws(tag::<&str, &str, nom::error::Error<&str>>("test")).parse("test"),
            Ok(("", "test"))
        );
    }

    #[test]
    fn test_parse_identifier() {
        assert_eq!(parse_identifier("abc rest"), Ok((" rest", "abc")));
        assert_eq!(parse_identifier("abc_def"), Ok(("", "abc_def")));
        assert_eq!(parse_identifier("n1)"), Ok((")", "n1")));
        assert_eq!(parse_identifier("_private"), Ok(("", "_private")));
        assert_eq!(parse_identifier("`weird name`"), Ok(("", "weird name")));
        assert!(parse_identifier("123abc").is_err() || parse_identifier("123abc").unwrap().1 != "123abc");
        assert!(parse_identifier("!abc").is_err());
    }

    #[test]
    fn test_keyword_boundary() {
        assert!(keyword("OR").parse("OR x").is_ok());
        assert!(keyword("OR").parse("or x").is_ok());
        assert!(keyword("OR").parse("ORDER BY").is_err());
        assert!(keyword("IS").parse("ISLAND").is_err());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Ok(("", 42)));
        assert_eq!(parse_integer("-7 "), Ok((" ", -7)));
        assert!(parse_integer("abc").is_err());
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("-- c\nMATCH"), "\nMATCH");
        assert_eq!(strip_comments("// c\nMATCH"), "\nMATCH");
        assert_eq!(strip_comments("/* multi\nline */MATCH"), "MATCH");
        assert_eq!(
            strip_comments("MATCH (n) WHERE n.url = 'http://a--b' RETURN n"),
            "MATCH (n) WHERE n.url = 'http://a--b' RETURN n"
        );
        assert_eq!(
            strip_comments("MATCH (n:`Some--Label`) RETURN n"),
            "MATCH (n:`Some--Label`) RETURN n"
        );
        assert_eq!(
            strip_comments("WHERE n.text = 'it\\'s -- fine' RETURN n"),
            "WHERE n.text = 'it\\'s -- fine' RETURN n"
        );
    }
}
