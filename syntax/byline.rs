//! Split a program source into comments, code, and statement ends
//! by line, without parsing it. Used to regroup a source into the
//! blocks a human wrote, separated by blank lines.

use std::fmt;
use std::ops::Range;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{char, not_line_ending},
    combinator::map,
    sequence::{delimited, preceded},
    IResult,
};

use crate::lexer::text;
use crate::SyntaxError;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    Comment,
    MultiComment,
    Code,
    End,
    Text,
}

impl Kind {
    fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::MultiComment)
    }

    fn is_code(self) -> bool {
        matches!(self, Self::Code | Self::End)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Comment => "comment",
            Self::MultiComment => "multicomment",
            Self::Code => "code",
            Self::End => "end",
            Self::Text => "text",
        })
    }
}

/// A run of lines, numbered from 0 and inclusive at both ends.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SourceLine {
    /// Lines with nothing but whitespace.
    Empty { first: usize, last: usize },
    /// One segment of source. `span` is a byte range; `data` omits
    /// the comment markers and the quotes of a text.
    Segment {
        first: usize,
        last: usize,
        kind: Kind,
        span: Range<usize>,
        data: String,
    },
}

impl SourceLine {
    pub fn first(&self) -> usize {
        match self {
            Self::Empty { first, .. } | Self::Segment { first, .. } => *first,
        }
    }

    pub fn last(&self) -> usize {
        match self {
            Self::Empty { last, .. } | Self::Segment { last, .. } => *last,
        }
    }

    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Empty { .. } => None,
            Self::Segment { kind, .. } => Some(*kind),
        }
    }
}

/// Consecutive lines not separated by an empty one,
/// unless they are in the middle of a statement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceBlock {
    pub has_code: bool,
    pub lines: Vec<SourceLine>,
    pub start: usize,
    pub end: usize,
}

fn code(input: &str) -> IResult<&str, &str> {
    let (_, run) = is_not("%\".")(input)?;
    let code = run.trim_end();
    Ok((&input[code.len()..], code))
}

fn segment(input: &str) -> IResult<&str, (Kind, &str)> {
    alt((
        map(text, |t| (Kind::Text, t)),
        map(
            delimited(tag("%*"), take_until("*%"), tag("*%")),
            |c| (Kind::MultiComment, c),
        ),
        map(preceded(char('%'), not_line_ending), |c| (Kind::Comment, c)),
        map(code, |c| (Kind::Code, c)),
        map(tag("."), |e| (Kind::End, e)),
    ))(input)
}

/// Split a source into segments, with a line range for each and
/// for every gap between them. Only an unterminated text fails.
pub fn parse(source: &str) -> Result<Vec<SourceLine>, SyntaxError> {
    let newlines = source
        .match_indices('\n')
        .map(|(i, _)| i)
        .collect::<Vec<_>>();
    let line_of = |position: usize| newlines.partition_point(|&n| n < position);
    let offset = |rest: &str| source.len() - rest.len();

    let mut lines = Vec::new();
    let mut next_line = 0;
    let mut rest = source.trim_start();
    while !rest.is_empty() {
        let start = offset(rest);
        let (after, (kind, data)) = segment(rest).map_err(|_| {
            SyntaxError::new(
                source,
                start,
                "closing quote",
                rest.lines().next().unwrap_or(rest),
            )
        })?;
        let end = offset(after);
        let (first, last) = (line_of(start), line_of(end));
        if first > next_line {
            lines.push(SourceLine::Empty {
                first: next_line,
                last: first - 1,
            });
        }
        lines.push(SourceLine::Segment {
            first,
            last,
            kind,
            span: start..end,
            data: data.to_owned(),
        });
        next_line = last + 1;
        rest = after.trim_start();
    }
    Ok(lines)
}

/// Group lines into blocks. Empty lines separate blocks, except
/// between the code of a statement and its end.
pub fn clusterize(lines: impl IntoIterator<Item = SourceLine>) -> Vec<SourceBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<SourceBlock> = None;
    let mut in_statement = false;
    for line in lines {
        match line.kind() {
            None => {
                if !in_statement {
                    blocks.extend(current.take());
                }
                continue;
            }
            Some(Kind::Code) => in_statement = true,
            Some(Kind::End) => in_statement = false,
            Some(_) => (),
        }
        let block = current.get_or_insert_with(|| SourceBlock {
            has_code: false,
            lines: Vec::new(),
            start: line.first(),
            end: line.last(),
        });
        block.has_code |= line.kind() == Some(Kind::Code);
        block.start = block.start.min(line.first());
        block.end = block.end.max(line.last());
        block.lines.push(line);
    }
    blocks.extend(current);
    blocks
}

pub fn clusterize_from_source(source: &str) -> Result<Vec<SourceBlock>, SyntaxError> {
    Ok(clusterize(parse(source)?))
}

/// Separators used to write blocks back out.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub block_separator: String,
    pub comment_separator: String,
    pub rule_indent: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            block_separator: String::from("\n\n"),
            comment_separator: String::from("  "),
            rule_indent: String::from("    "),
        }
    }
}

/// Write a block back out. Continuation lines of a statement
/// are indented; segments sharing a line are kept on it.
pub fn cluster_as_string(block: &SourceBlock, layout: &Layout) -> String {
    let mut out = String::new();
    let mut previous: Option<(usize, Kind)> = None;
    let mut in_code = false;
    for line in &block.lines {
        if let SourceLine::Segment {
            first,
            last,
            kind,
            data,
            ..
        } = line
        {
            match previous {
                None => (),
                Some((prev_line, prev)) if prev_line == *first => {
                    if prev.is_comment() || (prev.is_code() && kind.is_comment()) {
                        out.push_str(&layout.comment_separator);
                    }
                }
                Some(_) => {
                    out.push('\n');
                    if in_code {
                        out.push_str(&layout.rule_indent);
                    }
                }
            }
            match kind {
                Kind::Comment => out.push_str(&format!("%{data}")),
                Kind::MultiComment => out.push_str(&format!("%*{data}*%")),
                Kind::Text => out.push_str(&format!("\"{data}\"")),
                Kind::Code => {
                    in_code = true;
                    out.push_str(data);
                }
                Kind::End => {
                    in_code = false;
                    out.push_str(data);
                }
            }
            previous = Some((*last, *kind));
        }
    }
    out
}

pub fn rebuild_clusters(blocks: &[SourceBlock], layout: &Layout) -> String {
    blocks
        .iter()
        .map(|b| cluster_as_string(b, layout))
        .collect::<Vec<_>>()
        .join(&layout.block_separator)
}
