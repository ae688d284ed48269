//! A trivial tracing facility: each bit selects a stage
//! whose progress is reported on standard error.

use bitmask_enum::bitmask;

#[bitmask]
pub enum Trace {
    Lex,
    Parse,
    Output,
    Diagnose,
}

impl Trace {
    /// Look up a stage by its (case-insensitive) name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lex" => Some(Self::Lex),
            "parse" => Some(Self::Parse),
            "output" => Some(Self::Output),
            "diagnose" => Some(Self::Diagnose),
            "all" => Some(Self::Lex | Self::Parse | Self::Output | Self::Diagnose),
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects($crate::Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}
