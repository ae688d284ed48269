//! Classify what the solver prints on standard error.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till1},
    character::complete::{char, space0, u32},
    combinator::{map, opt, rest, value},
    sequence::{preceded, terminated, tuple},
    IResult,
};

use aspic_tracer::{trace, Trace};

use crate::OutputError;

const NOT_IN_HEAD: &str = "atom does not occur in any rule head";
const SYNTAX_ERROR: &str = "syntax error, ";

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// One message of the solver about the input program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub filename: String,
    pub line: u32,
    pub col_start: u32,
    pub col_end: u32,
    pub level: Level,
    pub message: String,
    pub human_message: String,
    pub atom: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}:{}:{}-{}: {}: {}",
            self.filename, self.line, self.col_start, self.col_end, self.level, self.human_message
        ))
    }
}

fn level(input: &str) -> IResult<&str, Level> {
    alt((
        value(Level::Error, tag("error")),
        value(Level::Warning, tag("warning")),
        value(Level::Info, tag("info")),
    ))(input)
}

/// The end of a span on another line is written `line:col`.
fn col_end(input: &str) -> IResult<&str, u32> {
    map(
        tuple((u32, opt(preceded(char(':'), u32)))),
        |(col, other)| other.unwrap_or(col),
    )(input)
}

/// `filename:line:colstart-colend: level: message`
fn diagnostic(input: &str) -> IResult<&str, Diagnostic> {
    map(
        tuple((
            terminated(take_till1(|c: char| c == ':'), char(':')),
            terminated(u32, char(':')),
            terminated(u32, char('-')),
            terminated(col_end, tuple((char(':'), space0))),
            terminated(level, tuple((char(':'), space0))),
            rest,
        )),
        |(filename, line, col_start, col_end, level, message)| {
            let message = message.trim();
            Diagnostic {
                filename: filename.to_owned(),
                line,
                col_start,
                col_end,
                level,
                message: message.to_owned(),
                human_message: message
                    .strip_prefix(SYNTAX_ERROR)
                    .unwrap_or(message)
                    .to_owned(),
                atom: None,
            }
        },
    )(input)
}

/// A lazy iterator over the diagnostics found among stderr lines.
/// Lines that are not diagnostics are skipped.
pub struct Diagnostics<I: Iterator> {
    lines: I,
    trace: Trace,
}

impl<I> Diagnostics<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I, trace: Trace) -> Self {
        Self { lines, trace }
    }
}

impl<I> Iterator for Diagnostics<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Diagnostic;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            let Ok((_, mut diagnostic)) = diagnostic(line.as_ref()) else {
                trace!(self.trace, Diagnose, "skipping `{}`", line.as_ref());
                continue;
            };
            if diagnostic.message.starts_with(NOT_IN_HEAD) {
                // The atom is on the next line.
                if let Some(atom) = self.lines.next() {
                    let atom = atom.as_ref().trim().to_owned();
                    diagnostic.human_message =
                        format!("atom {atom} does not occur in any rule head");
                    diagnostic.atom = Some(atom);
                }
            }
            trace!(self.trace, Diagnose, "{}", diagnostic);
            return Some(diagnostic);
        }
    }
}

pub fn classify_stderr<L>(lines: L) -> Diagnostics<L::IntoIter>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
{
    Diagnostics::new(lines.into_iter(), Trace::none())
}

/// Turn the first diagnostic worth failing on into an error.
/// Warnings and infos fail only if `error_on_warning`.
pub fn check_diagnostics(
    diagnostics: impl IntoIterator<Item = Diagnostic>,
    error_on_warning: bool,
) -> Result<(), OutputError> {
    for diagnostic in diagnostics {
        match diagnostic.level {
            Level::Error if diagnostic.message.starts_with(SYNTAX_ERROR) => {
                return Err(OutputError::AspSyntax(diagnostic))
            }
            Level::Error => return Err(OutputError::Solver(diagnostic)),
            Level::Warning | Level::Info if error_on_warning => {
                return Err(OutputError::AspWarning(diagnostic))
            }
            Level::Warning | Level::Info => (),
        }
    }
    Ok(())
}
