//! The gringo input language, restricted to the constructs
//! listed in [`Node`](crate::Node).

mod lexer;
mod parser;

pub use lexer::{AspLexer, AspToken};
pub use parser::{parse_program, parse_program_traced, AspParser};
