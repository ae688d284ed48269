//! Parse the atoms of one answer set, as printed
//! on the line following `Answer: N`.

use std::collections::BTreeSet;
use std::fmt;

use nom::{
    branch::alt,
    character::complete::{char, multispace0},
    combinator::{all_consuming, consumed, map, opt, recognize},
    multi::{many0, many0_count, separated_list0},
    sequence::{delimited, pair, terminated},
    IResult,
};

use aspic_syntax::lexer::{identifier, number, text};

use crate::OutputError;

/// A predicate applied to arguments. An unnamed
/// predicate is a tuple; no arguments is a bare atom.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<Arg>,
}

impl Atom {
    pub fn new(predicate: impl Into<String>, args: impl IntoIterator<Item = Arg>) -> Self {
        Self {
            predicate: predicate.into(),
            args: args.into_iter().collect(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if !self.args.is_empty() || self.predicate.is_empty() {
            let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
            f.write_fmt(format_args!("({})", args.join(",")))?;
        }
        Ok(())
    }
}

/// Texts keep their quotes.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Arg {
    Int(i64),
    Str(String),
    Func(Atom),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => i.fmt(f),
            Self::Str(s) => f.write_str(s),
            Self::Func(a) => a.fmt(f),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Element {
    Atom(Atom),
    /// A whole atom, left as written.
    Collapsed(String),
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(a) => a.fmt(f),
            Self::Collapsed(s) => f.write_str(s),
        }
    }
}

pub type AnswerSet = BTreeSet<Element>;

pub fn answer_set_to_string(answer: &AnswerSet, separator: &str) -> String {
    answer
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// How much structure to recover from an answer line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnswerConfig {
    /// Nested terms in arguments are kept as their surface string.
    pub collapse_args: bool,
    /// Whole atoms are kept as their surface string.
    /// Requires `collapse_args`.
    pub collapse_atoms: bool,
    /// Numeric arguments become integers.
    pub parse_integer: bool,
    /// Always use the full grammar, even on lines that can be split naively.
    pub careful: bool,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            collapse_args: true,
            collapse_atoms: false,
            parse_integer: true,
            careful: false,
        }
    }
}

/// Whether splitting `atom` on parentheses and commas would go wrong:
/// a text holds a separator or a space, or an argument is itself nested.
pub fn careful_parsing_required(atom: &str) -> bool {
    let mut in_text = false;
    let mut escaped = false;
    let mut depth = 0_usize;
    for c in atom.chars() {
        if in_text {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_text = false,
                ',' | ';' | '(' | ')' => return true,
                c if c.is_whitespace() => return true,
                _ => (),
            }
        } else {
            match c {
                '"' => in_text = true,
                '(' if depth > 0 => return true,
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => (),
            }
        }
    }
    false
}

/// Answer line parser for a fixed configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnswerParser {
    config: AnswerConfig,
}

impl AnswerParser {
    pub fn new(config: AnswerConfig) -> Result<Self, OutputError> {
        if config.collapse_atoms && !config.collapse_args {
            return Err(OutputError::InvalidConfiguration);
        }
        Ok(Self { config })
    }

    pub fn parse(&self, line: &str) -> Result<AnswerSet, OutputError> {
        if self.config.careful
            || line.contains('"')
            || line.split_whitespace().any(careful_parsing_required)
        {
            self.parse_careful(line)
        } else {
            self.parse_naive(line)
        }
    }

    /// Split on whitespace, then on parentheses and commas.
    fn parse_naive(&self, line: &str) -> Result<AnswerSet, OutputError> {
        let mut answer = AnswerSet::new();
        let mut rest = line.trim_start();
        while !rest.is_empty() {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let (token, after) = rest.split_at(end);
            let atom = self.naive_atom(token).ok_or_else(|| OutputError::InvalidAtom {
                line: line.to_owned(),
                position: line.len() - rest.len(),
            })?;
            answer.insert(self.element(atom));
            rest = after.trim_start();
        }
        Ok(answer)
    }

    fn naive_atom(&self, token: &str) -> Option<Atom> {
        match token.split_once('(') {
            None => Some(Atom::new(token, [])),
            Some((predicate, rest)) => {
                let args = rest.strip_suffix(')')?;
                if args.is_empty() {
                    return Some(Atom::new(predicate, []));
                }
                Some(Atom::new(
                    predicate,
                    args.split(',').map(|a| self.naive_arg(a)),
                ))
            }
        }
    }

    fn naive_arg(&self, arg: &str) -> Arg {
        match all_consuming(number)(arg) {
            Ok((_, n)) if self.config.parse_integer => Arg::Int(n),
            _ => Arg::Str(arg.to_owned()),
        }
    }

    fn parse_careful<'a>(&self, line: &'a str) -> Result<AnswerSet, OutputError> {
        let config = &self.config;
        let parsed = all_consuming(delimited(
            multispace0,
            many0(terminated(|i: &'a str| atom(i, config), multispace0)),
            multispace0,
        ))(line);
        match parsed {
            Ok((_, atoms)) => Ok(atoms.into_iter().map(|a| self.element(a)).collect()),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(OutputError::InvalidAtom {
                line: line.to_owned(),
                position: line.len() - e.input.len(),
            }),
            Err(nom::Err::Incomplete(_)) => Err(OutputError::InvalidAtom {
                line: line.to_owned(),
                position: line.len(),
            }),
        }
    }

    fn element(&self, atom: Atom) -> Element {
        if self.config.collapse_atoms {
            Element::Collapsed(atom.to_string())
        } else {
            Element::Atom(atom)
        }
    }
}

/// Parse one answer line with a one-off parser.
pub fn parse_answer_line(line: &str, config: &AnswerConfig) -> Result<AnswerSet, OutputError> {
    AnswerParser::new(*config)?.parse(line)
}

/// Predicate names may carry leading underscores.
fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(many0_count(char('_')), identifier))(input)
}

fn args<'a>(input: &'a str, config: &AnswerConfig) -> IResult<&'a str, Vec<Arg>> {
    delimited(
        char('('),
        separated_list0(char(','), |i: &'a str| arg(i, config)),
        char(')'),
    )(input)
}

fn literal<'a>(input: &'a str, config: &AnswerConfig) -> IResult<&'a str, Arg> {
    alt((
        map(text, |t| Arg::Str(format!("\"{t}\""))),
        map(consumed(number), |(surface, n)| {
            if config.parse_integer {
                Arg::Int(n)
            } else {
                Arg::Str(surface.to_owned())
            }
        }),
    ))(input)
}

fn nested(atom: Atom, config: &AnswerConfig) -> Arg {
    if config.collapse_args {
        Arg::Str(atom.to_string())
    } else {
        Arg::Func(atom)
    }
}

fn arg<'a>(input: &'a str, config: &AnswerConfig) -> IResult<&'a str, Arg> {
    alt((
        map(
            pair(name, opt(|i: &'a str| args(i, config))),
            |(p, a)| match a {
                None => Arg::Str(p.to_owned()),
                Some(a) => nested(Atom::new(p, a), config),
            },
        ),
        map(
            |i: &'a str| args(i, config),
            |a| nested(Atom::new("", a), config),
        ),
        |i: &'a str| literal(i, config),
    ))(input)
}

/// Unlike an argument, a bare name is an atom of its own.
fn atom<'a>(input: &'a str, config: &AnswerConfig) -> IResult<&'a str, Atom> {
    alt((
        map(
            pair(name, opt(|i: &'a str| args(i, config))),
            |(p, a)| Atom::new(p, a.unwrap_or_default()),
        ),
        map(|i: &'a str| args(i, config), |a| Atom::new("", a)),
        map(|i: &'a str| literal(i, config), |l| Atom::new(l.to_string(), [])),
    ))(input)
}
