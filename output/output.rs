//! Decode what a clasp/clingo solver prints: answer sets on
//! standard output, diagnostics on standard error.

mod answer;
mod diagnostic;
mod stream;

use thiserror::Error;

// Re-exports.
pub use answer::{
    answer_set_to_string, careful_parsing_required, parse_answer_line, AnswerConfig,
    AnswerParser, AnswerSet, Arg, Atom, Element,
};
pub use diagnostic::{check_diagnostics, classify_stderr, Diagnostic, Diagnostics, Level};
pub use stream::{parse_output, OutputOptions, OutputParser, Segment};

/// Things that may go wrong while decoding solver output.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum OutputError {
    #[error("atoms can only be collapsed along with their arguments")]
    InvalidConfiguration,
    #[error("invalid atom at offset {position} of `{line}`")]
    InvalidAtom { line: String, position: usize },
    #[error("unexpected solver output line `{0}`")]
    UnexpectedLine(String),
    #[error("{}:{}:{}: {}", .0.filename, .0.line, .0.col_start, .0.message)]
    AspSyntax(Diagnostic),
    #[error("{}", .0.human_message)]
    AspWarning(Diagnostic),
    #[error("unhandled solver error: {}", .0.human_message)]
    Solver(Diagnostic),
}
