//! Parse a stream of tokens with [nom](https://crates.io/crates/nom).

use nom::IResult;

use crate::{Token, Tokens};

/// An input stream to a parser.
pub type Input<'a, T, S> = Tokens<'a, Token<T, S>>;

/// A parser, generic over the source type so that token
/// streams built by hand (in tests) parse the same way as
/// those lexed from a string.
pub trait Parse<'a, S: Clone> {
    /// The lexical (input) token type being parsed.
    type Token: Clone;

    /// The syntax tree (output) type.
    type Tree;

    /// Parse as many trees as possible from the front of a token stream.
    fn parse(
        input: Input<'a, Self::Token, S>,
    ) -> IResult<Input<'a, Self::Token, S>, Vec<Self::Tree>>;
}

/// Produce a parser combinator that recognizes a literal token.
#[macro_export]
macro_rules! parse_token {
    ($function:ident<$ty: ty>, $tag: expr) => {
        fn $function<S: Clone>(
            input: $crate::Tokens<$crate::Token<$ty, S>>,
        ) -> ::nom::IResult<$crate::Tokens<$crate::Token<$ty, S>>, ()> {
            ::nom::combinator::map(
                ::nom::combinator::verify(
                    ::nom::bytes::complete::take(1_usize),
                    |t: &$crate::Tokens<$crate::Token<$ty, S>>| t.tok[0].token == $tag,
                ),
                |_| (),
            )(input)
        }
    };
}

/// Produce a parser combinator that extracts the payload
/// of a single token, if it has the right shape.
#[macro_export]
macro_rules! parse_payload {
    ($function:ident<$ty: ty> -> $out: ty, $pat: pat => $value: expr) => {
        fn $function<S: Clone>(
            input: $crate::Tokens<$crate::Token<$ty, S>>,
        ) -> ::nom::IResult<$crate::Tokens<$crate::Token<$ty, S>>, $out> {
            ::nom::combinator::map_opt(
                ::nom::bytes::complete::take(1_usize),
                |t: $crate::Tokens<$crate::Token<$ty, S>>| match &t.tok[0].token {
                    $pat => Some($value),
                    _ => None,
                },
            )(input)
        }
    };
}
