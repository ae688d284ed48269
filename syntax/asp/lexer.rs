//! Tokens and tokenizer for program sources.

use nom::{
    branch::alt,
    combinator::map,
    multi::many0,
    sequence::{preceded, terminated},
    IResult, InputLength,
};

use crate::lexer::{identifier, keyword, number, text, token, trivia, variable, Lex, Token};
use crate::{lex_token, Symbol};

/// Lexical element of a program.
/// Named after how they look, not what they mean.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub enum AspToken {
    Ident(Symbol),
    Variable(Symbol),
    Anonymous,
    Number(i64),
    /// Raw content, quotes stripped.
    Text(String),
    Not,
    Show,
    Const,
    If,
    Colon,
    Dot,
    Comma,
    Semi,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Equal,
    Slash,
}

impl From<i64> for AspToken {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

impl From<&str> for AspToken {
    fn from(s: &str) -> Self {
        Self::Text(String::from(s))
    }
}

impl InputLength for AspToken {
    #[inline]
    fn input_len(&self) -> usize {
        1
    }
}

macro_rules! asp_token {
    ($function: ident, $tag: literal, $token: ident) => {
        lex_token!($function<AspToken>, $tag, AspToken::$token);
    };
}

asp_token!(r#if, ":-", If);
asp_token!(colon, ":", Colon);
asp_token!(dot, ".", Dot);
asp_token!(comma, ",", Comma);
asp_token!(semi, ";", Semi);
asp_token!(lparen, "(", LParen);
asp_token!(rparen, ")", RParen);
asp_token!(lbrace, "{", LBrace);
asp_token!(rbrace, "}", RBrace);
asp_token!(equal, "=", Equal);
asp_token!(slash, "/", Slash);

fn directive(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    alt((
        token(map(keyword("#show"), |_| AspToken::Show)),
        token(map(keyword("#const"), |_| AspToken::Const)),
    ))(input)
}

fn name(input: &str) -> IResult<&str, Token<AspToken, &str>> {
    alt((
        token(map(identifier, |s| match s {
            "not" => AspToken::Not,
            _ => AspToken::Ident(Symbol::from(s)),
        })),
        token(map(variable, |s| match s {
            "_" => AspToken::Anonymous,
            _ => AspToken::Variable(Symbol::from(s)),
        })),
    ))(input)
}

/// Program source lexer.
pub struct AspLexer;

impl<'a> Lex<'a, &str> for AspLexer {
    type Input = &'a str;
    type Token = Token<AspToken, &'a str>;

    /// Tokenize as much of a program source as possible.
    /// Whatever remains is not a token.
    fn lex(input: &'a str) -> IResult<&'a str, Vec<Self::Token>> {
        preceded(
            trivia,
            many0(terminated(
                alt((
                    r#if,
                    colon,
                    dot,
                    comma,
                    semi,
                    lparen,
                    rparen,
                    lbrace,
                    rbrace,
                    equal,
                    slash,
                    directive,
                    token(map(number, AspToken::Number)),
                    token(map(text, AspToken::from)),
                    name,
                )),
                trivia,
            )),
        )(input)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn lex(input: &str) -> (&str, Vec<AspToken>) {
        let (rest, tokens) = AspLexer::lex(input).expect("lexable");
        (rest, tokens.into_iter().map(|t| t.token).collect())
    }

    #[test]
    fn asp_lexer() {
        use AspToken::*;

        assert_eq!(lex(""), ("", vec![]), "nothing");
        assert_eq!(lex("  % only a comment"), ("", vec![]), "comment");
        assert_eq!(
            lex("a(X) :- not b(_, -1)."),
            (
                "",
                vec![
                    Ident(Symbol::from("a")),
                    LParen,
                    Variable(Symbol::from("X")),
                    RParen,
                    If,
                    Not,
                    Ident(Symbol::from("b")),
                    LParen,
                    Anonymous,
                    Comma,
                    Number(-1),
                    RParen,
                    Dot,
                ]
            ),
            "rule"
        );
        assert_eq!(
            lex("nothing notX"),
            (
                "",
                vec![Ident(Symbol::from("nothing")), Ident(Symbol::from("notX"))]
            ),
            "not is a whole word"
        );
        assert_eq!(
            lex("#show p/2. #const n=3."),
            (
                "",
                vec![
                    Show,
                    Ident(Symbol::from("p")),
                    Slash,
                    Number(2),
                    Dot,
                    Const,
                    Ident(Symbol::from("n")),
                    Equal,
                    Number(3),
                    Dot,
                ]
            ),
            "directives"
        );
        assert_eq!(
            lex(r#"b("x, %y\"")."#),
            (
                "",
                vec![
                    Ident(Symbol::from("b")),
                    LParen,
                    Text(String::from(r#"x, %y\""#)),
                    RParen,
                    Dot
                ]
            ),
            "text"
        );
        assert_eq!(
            lex("1{a}2 %* block\ncomment *% :- _x."),
            (
                "",
                vec![
                    Number(1),
                    LBrace,
                    Ident(Symbol::from("a")),
                    RBrace,
                    Number(2),
                    If,
                    Variable(Symbol::from("_x")),
                    Dot,
                ]
            ),
            "selection"
        );
    }

    #[test]
    fn lex_errors() {
        assert_eq!(
            lex("a. ?b."),
            ("?b.", vec![AspToken::Ident(Symbol::from("a")), AspToken::Dot]),
            "bad character"
        );
        assert_eq!(lex("a %* open").0, "%* open", "unterminated comment");
        assert_eq!(lex("#shown").0, "#shown", "unknown directive");
    }

    #[test]
    fn token_source() {
        let source = "a :- b.";
        let (_, tokens) = AspLexer::lex(source).expect("lexable");
        let offsets = tokens
            .iter()
            .map(|t| source.len() - t.source.len())
            .collect::<Vec<_>>();
        assert_eq!(offsets, vec![0, 2, 5, 6], "offsets");
    }
}
