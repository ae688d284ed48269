//! Program source parser.
//!
//! Recursive descent over the token stream; every statement
//! is parsed independently so that a failure can be reported
//! at the start of the offending statement.

use nom::{
    branch::alt,
    combinator::{map, map_opt, opt, success},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use aspic_tracer::{trace, Trace};

use crate::{
    parse_payload, parse_token, Const, Forall, Lex, MultiRule, Node, Parse, Program, Rule,
    Selection, Show, ShowArity, Symbol, SyntaxError, Term, Tokens,
};

use super::lexer::{AspLexer, AspToken};

/// Local alias.
type Input<'a, S> = crate::parser::Input<'a, AspToken, S>;

/// Program source parser.
pub struct AspParser;

impl<'a, S: Clone> Parse<'a, S> for AspParser {
    type Token = AspToken;
    type Tree = Node;

    /// Parse statements up to the first one that doesn't match.
    fn parse(input: Input<'a, S>) -> IResult<Input<'a, S>, Vec<Self::Tree>> {
        many0(statement)(input)
    }
}

/// Parse a whole program source, all or nothing.
pub fn parse_program(source: &str) -> Result<Program, SyntaxError> {
    parse_program_traced(source, Trace::none())
}

pub fn parse_program_traced(source: &str, trace: Trace) -> Result<Program, SyntaxError> {
    let offset = |rest: &str| source.len() - rest.len();
    let (rest, tokens) = AspLexer::lex(source)
        .map_err(|_| SyntaxError::new(source, 0, "token", lexeme(source)))?;
    if !rest.is_empty() {
        return Err(SyntaxError::new(source, offset(rest), "token", lexeme(rest)));
    }
    trace!(trace, Lex, "lexed {} tokens", tokens.len());

    let (rest, statements) = AspParser::parse(Tokens::new(&tokens))
        .map_err(|_| SyntaxError::new(source, 0, "statement", statement_text(source)))?;
    if let Some(t) = rest.first() {
        return Err(SyntaxError::new(
            source,
            offset(t.source),
            "statement",
            statement_text(t.source),
        ));
    }
    for (i, s) in statements.iter().enumerate() {
        trace!(trace, Parse, "statement {}: {}", i, s);
    }
    Ok(Program::new(statements))
}

fn lexeme(rest: &str) -> &str {
    rest.split_whitespace().next().unwrap_or(rest)
}

fn statement_text(rest: &str) -> &str {
    rest.find('.').map_or(rest, |i| &rest[..=i])
}

/// Define a parser combinator that recognizes a single token.
/// Named (mostly) after what they mean, not how they look.
macro_rules! parse_asp_token {
    ($function: ident, $token: ident) => {
        parse_token!($function<AspToken>, AspToken::$token);
    };
}

parse_asp_token!(r#if, If);
parse_asp_token!(such, Colon);
parse_asp_token!(end, Dot);
parse_asp_token!(comma, Comma);
parse_asp_token!(semi, Semi);
parse_asp_token!(lparen, LParen);
parse_asp_token!(rparen, RParen);
parse_asp_token!(lbrace, LBrace);
parse_asp_token!(rbrace, RBrace);
parse_asp_token!(equals, Equal);
parse_asp_token!(over, Slash);
parse_asp_token!(not, Not);
parse_asp_token!(show, Show);
parse_asp_token!(define, Const);

parse_payload!(ident<AspToken> -> Symbol, AspToken::Ident(s) => s.clone());
parse_payload!(variable<AspToken> -> Symbol, AspToken::Variable(s) => s.clone());
parse_payload!(anonymous<AspToken> -> Node, AspToken::Anonymous => Node::Anonymous);
parse_payload!(number<AspToken> -> i64, AspToken::Number(i) => *i);
parse_payload!(text<AspToken> -> String, AspToken::Text(s) => s.clone());

fn literal<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    alt((
        map(number, Node::Number),
        map(text, Node::Text),
        map(ident, Node::Constant),
        map(variable, Node::Variable),
        anonymous,
    ))(input)
}

/// Parenthesized argument groups: `(a,b;c)` has two.
fn groups<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Vec<Node>>> {
    delimited(lparen, separated_list0(semi, arguments), rparen)(input)
}

fn arguments<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Node>> {
    separated_list1(comma, subterm)(input)
}

/// An argument: a nested term, a tuple or disjunction, or a literal.
fn subterm<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    alt((
        map(pair(ident, groups), |(p, g)| {
            if g.is_empty() {
                Node::Constant(p)
            } else {
                Node::Term(Term::from_groups(Some(p), g))
            }
        }),
        map_opt(groups, |mut g| match g.len() {
            0 => None,
            1 => Some(Node::Term(Term::new(None, g.remove(0)))),
            _ => Some(Node::Disjunction(g)),
        }),
        literal,
    ))(input)
}

fn term<S: Clone>(input: Input<S>) -> IResult<Input<S>, Term> {
    alt((
        map(pair(ident, opt(groups)), |(p, g)| {
            Term::from_groups(Some(p), g.unwrap_or_default())
        }),
        map_opt(groups, |g| (!g.is_empty()).then(|| Term::from_groups(None, g))),
    ))(input)
}

fn condition<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    alt((
        map(preceded(not, term), Node::NegTerm),
        map(term, Node::Term),
    ))(input)
}

fn conditions<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Node>> {
    preceded(such, separated_list1(comma, condition))(input)
}

fn forall<S: Clone>(input: Input<S>) -> IResult<Input<S>, Forall> {
    map(pair(term, conditions), |(t, c)| Forall::new(t, c))(input)
}

/// Whatever follows a `not`.
fn negated<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    alt((
        map(preceded(not, negated), |n| Node::Not(Box::new(n))),
        map(forall, Node::NegForall),
        map(term, Node::NegTerm),
    ))(input)
}

fn expression<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    alt((
        preceded(not, negated),
        map(forall, Node::Forall),
        map(term, Node::Term),
    ))(input)
}

fn body<S: Clone>(input: Input<S>) -> IResult<Input<S>, Vec<Node>> {
    separated_list1(alt((comma, semi)), expression)(input)
}

/// Bounds are told apart by where they're written,
/// not by how many there are.
fn selection<S: Clone>(input: Input<S>) -> IResult<Input<S>, Selection> {
    map(
        tuple((
            opt(number),
            delimited(lbrace, separated_list0(semi, expression), rbrace),
            opt(number),
            opt(preceded(r#if, body)),
        )),
        |(lower, generators, upper, body)| {
            Selection::new(
                lower.unwrap_or(0),
                upper,
                generators,
                body.unwrap_or_default(),
            )
        },
    )(input)
}

/// A fact, a rule, or a rule with a disjunctive head.
fn rule<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    map(
        pair(separated_list1(semi, term), opt(preceded(r#if, body))),
        |(mut heads, body)| match (heads.len(), body) {
            (1, None) => Node::Term(heads.remove(0)),
            (1, Some(body)) => Node::Rule(Rule::new(Node::Term(heads.remove(0)), body)),
            (_, body) => Node::MultiRule(MultiRule::new(
                heads.into_iter().map(Node::Term),
                body.unwrap_or_default(),
            )),
        },
    )(input)
}

fn show_directive<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    preceded(
        show,
        alt((
            map_opt(pair(ident, preceded(over, number)), |(predicate, n)| {
                u32::try_from(n)
                    .ok()
                    .map(|arity| Node::ShowArity(ShowArity { predicate, arity }))
            }),
            map(pair(term, opt(conditions)), |(t, c)| {
                Node::Show(Show {
                    term: Some(Box::new(Node::Term(t))),
                    conditions: c.unwrap_or_default(),
                })
            }),
            success(Node::Show(Show {
                term: None,
                conditions: Vec::new(),
            })),
        )),
    )(input)
}

fn const_directive<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    map(
        tuple((define, ident, equals, subterm)),
        |(_, name, _, value)| {
            Node::Const(Const {
                name,
                value: Box::new(value),
            })
        },
    )(input)
}

fn statement<S: Clone>(input: Input<S>) -> IResult<Input<S>, Node> {
    terminated(
        alt((
            map(selection, Node::Selection),
            map(preceded(r#if, body), Node::Constraint),
            show_directive,
            const_directive,
            rule,
        )),
        end,
    )(input)
}
