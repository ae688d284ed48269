//! Lexical grammar shared by program sources and solver output.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_until},
    character::complete::{alphanumeric1, char, digit1, multispace1, none_of, satisfy},
    combinator::{all_consuming, map_res, not, opt, recognize, value},
    error::ParseError,
    multi::many0_count,
    sequence::{delimited, pair, tuple},
    IResult, Parser,
};

/// Skip whitespace and comments. `%* … *%` may span lines,
/// `% …` runs to the end of the line.
pub fn trivia(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0_count(alt((
            multispace1,
            recognize(tuple((tag("%*"), take_until("*%"), tag("*%")))),
            recognize(pair(pair(char('%'), not(char('*'))), opt(is_not("\n")))),
        ))),
    )(input)
}

fn word(input: &str) -> IResult<&str, usize> {
    many0_count(alt((alphanumeric1, tag("_"))))(input)
}

/// A constant or predicate name: `[a-z][A-Za-z0-9_]*`.
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(|c| c.is_ascii_lowercase()), word))(input)
}

/// `[A-Z_][A-Za-z0-9_]*`; a lone `_` is the anonymous variable.
pub fn variable(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(|c| c.is_ascii_uppercase() || c == '_'), word))(input)
}

/// A possibly negative decimal integer.
pub fn number(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
        s.parse::<i64>()
    })(input)
}

/// A double-quoted string. Yields the content between the quotes
/// untouched: escapes are recognized but not interpreted.
pub fn text(input: &str) -> IResult<&str, &str> {
    delimited(
        char('"'),
        recognize(many0_count(alt((
            tag(r#"\""#),
            tag(r"\\"),
            is_not(r#""\"#),
            tag("\\"),
        )))),
        char('"'),
    )(input)
}

fn escaped(input: &str) -> IResult<&str, String> {
    escaped_transform(
        none_of("\\"),
        '\\',
        alt((
            value("\\", tag("\\")),
            value("\"", tag("\"")),
            value("\n", tag("n")),
            value("\r", tag("r")),
            value("\t", tag("t")),
        )),
    )(input)
}

/// Interpret the escapes of raw text content. Content with an unknown
/// escape is returned as is.
pub fn unescape(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match all_consuming(escaped)(raw) {
        Ok((_, s)) => s,
        Err(_) => raw.to_owned(),
    }
}

/// Wrap a parser so that it yields a [`Token`] carrying
/// the input at which it matched.
pub fn token<I, O, E, F>(mut parser: F) -> impl FnMut(I) -> IResult<I, Token<O, I>, E>
where
    I: Clone,
    O: Clone,
    E: ParseError<I>,
    F: Parser<I, O, E>,
{
    move |input: I| {
        let i = input.clone();
        let (input, t) = parser.parse(input)?;
        Ok((input, Token::new(t, i)))
    }
}

/// Define a parser combinator for a token denoted by a tag.
#[macro_export]
macro_rules! lex_token {
    ($function: ident<$ty: ty>, $tag: literal, $token: expr) => {
        fn $function(input: &str) -> ::nom::IResult<&str, $crate::Token<$ty, &str>> {
            $crate::lexer::token(::nom::combinator::map(
                ::nom::bytes::complete::tag($tag),
                |_| $token,
            ))(input)
        }
    };
}

/// A keyword tag that may not run on into a longer word.
pub fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input: &'a str| {
        recognize(pair(
            tag(kw),
            not(satisfy(|c: char| c.is_alphanumeric() || c == '_')),
        ))(input)
    }
}

/// A token with source information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token<T: Clone, S: Clone> {
    pub token: T,
    pub source: S,
}

impl<T: Clone, S: Clone> Token<T, S> {
    pub fn new(token: T, source: S) -> Self {
        Self { token, source }
    }
}

/// A lexer, a.k.a. lexical analyzer, tokenizer.
pub trait Lex<'a, S> {
    type Input;
    type Token;

    /// Tokenize an input stream.
    fn lex(input: Self::Input) -> IResult<Self::Input, Vec<Self::Token>>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn trivia() {
        assert_eq!(super::trivia(""), Ok(("", ())), "nothing");
        assert_eq!(super::trivia("  \n\ta"), Ok(("a", ())), "space");
        assert_eq!(
            super::trivia("% a comment\nb"),
            Ok(("b", ())),
            "line comment"
        );
        assert_eq!(
            super::trivia("%* spans\n two lines *% c"),
            Ok(("c", ())),
            "block comment"
        );
        assert_eq!(super::trivia("%"), Ok(("", ())), "comment at end");
        assert_eq!(
            super::trivia("%* never closed"),
            Ok(("%* never closed", ())),
            "unterminated block comment"
        );
    }

    #[test]
    fn identifier() {
        assert!(super::identifier("").is_err(), "empty");
        assert!(super::identifier("Foo").is_err(), "uppercase");
        assert!(super::identifier("_foo").is_err(), "underscore");
        assert_eq!(
            super::identifier("foo_Bar1(x)"),
            Ok(("(x)", "foo_Bar1")),
            "name"
        );
    }

    #[test]
    fn variable() {
        assert!(super::variable("x").is_err(), "lowercase");
        assert_eq!(super::variable("X1,"), Ok((",", "X1")), "variable");
        assert_eq!(super::variable("_foo"), Ok(("", "_foo")), "underscore");
        assert_eq!(super::variable("_"), Ok(("", "_")), "anonymous");
    }

    #[test]
    fn number() {
        assert!(super::number("").is_err(), "empty");
        assert!(super::number("-").is_err(), "sign only");
        assert!(
            super::number("123456789012345678901234567890").is_err(),
            "too big"
        );
        assert_eq!(super::number("0"), Ok(("", 0)), "zero");
        assert_eq!(super::number("-42)"), Ok((")", -42)), "negative");
    }

    #[test]
    fn text() {
        assert!(super::text("").is_err(), "empty");
        assert!(super::text(r#""foo"#).is_err(), "unterminated");
        assert_eq!(super::text(r#""""#), Ok(("", "")), "empty text");
        assert_eq!(
            super::text(r#""les amis, \"coucou\"." x"#),
            Ok((" x", r#"les amis, \"coucou\"."#)),
            "escaped quotes are kept"
        );
        assert_eq!(
            super::text("\"two\nlines\""),
            Ok(("", "two\nlines")),
            "raw newline"
        );
        assert_eq!(
            super::text(r#""% not a comment""#),
            Ok(("", "% not a comment")),
            "no trivia inside"
        );
        assert_eq!(
            super::text(r#""back\\" rest"#),
            Ok((" rest", r"back\\")),
            "escaped backslash"
        );
    }

    #[test]
    fn unescape() {
        assert_eq!(super::unescape(""), "", "empty");
        assert_eq!(
            super::unescape(r#"Foo:\r\n\t\"Foo\\!\""#),
            "Foo:\r\n\t\"Foo\\!\"",
            "backslash escapes"
        );
        assert_eq!(super::unescape(r"\q"), r"\q", "unknown escape");
    }

    #[test]
    fn keyword() {
        assert_eq!(
            super::keyword("#show")("#show p."),
            Ok((" p.", "#show")),
            "keyword"
        );
        assert!(super::keyword("#show")("#shown").is_err(), "longer word");
    }
}
