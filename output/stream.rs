//! Slice the standard output of clasp/clingo into typed segments.
//!
//! The solver prints some informative lines, then each answer
//! set under an `Answer: N` header, possibly followed by its
//! optimization values and (when solving in parallel) a progression
//! report. A blank line ends the answers; the statistics follow.

use std::collections::{BTreeMap, VecDeque};
use std::mem::take;

use nom::{
    bytes::complete::tag,
    character::complete::digit1,
    combinator::{all_consuming, map_res},
    sequence::preceded,
    IResult,
};

use aspic_tracer::{trace, Trace};

use crate::{AnswerConfig, AnswerParser, AnswerSet, OutputError};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    Info(Vec<String>),
    AnswerNumber(u64),
    Answer(AnswerSet),
    Optimization(Vec<i64>),
    Progression(String),
    Statistics(BTreeMap<String, String>),
}

/// Which segments to produce besides the answers,
/// and how to parse those.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OutputOptions {
    pub yield_info: bool,
    pub yield_stats: bool,
    pub yield_answer_number: bool,
    pub yield_progression: bool,
    pub answer: AnswerConfig,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Preamble,
    Answers,
    Statistics,
    Done,
}

fn answer_number(input: &str) -> IResult<&str, u64> {
    all_consuming(preceded(
        tag("Answer: "),
        map_res(digit1, |n: &str| n.parse::<u64>()),
    ))(input)
}

/// Parse `Answer: N` exactly.
fn header(line: &str) -> Option<u64> {
    answer_number(line).ok().map(|(_, n)| n)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// A lazy iterator over the segments of a solver transcript.
/// Pulls one line at a time from the underlying iterator, and
/// stops for good after the first error.
pub struct OutputParser<I: Iterator> {
    lines: I,
    options: OutputOptions,
    answers: AnswerParser,
    state: State,
    queue: VecDeque<Result<Segment, OutputError>>,
    info: Vec<String>,
    stats: BTreeMap<String, String>,
    /// Whether the last answer has been optimized, if there is one.
    pending: Option<bool>,
    trace: Trace,
}

impl<I> OutputParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    pub fn new(lines: I, options: OutputOptions, trace: Trace) -> Result<Self, OutputError> {
        Ok(Self {
            lines,
            options,
            answers: AnswerParser::new(options.answer)?,
            state: State::Preamble,
            queue: VecDeque::new(),
            info: Vec::new(),
            stats: BTreeMap::new(),
            pending: None,
            trace,
        })
    }

    /// Consume one line of input (or its end), queueing
    /// any segments it completes.
    fn step(&mut self) {
        let line = self.lines.next();
        let line: Option<&str> = line.as_ref().map(AsRef::as_ref);
        match self.state {
            State::Preamble => self.preamble(line),
            State::Answers => self.answer_stream(line),
            State::Statistics => self.statistics(line),
            State::Done => (),
        }
    }

    fn preamble(&mut self, line: Option<&str>) {
        match line {
            None => {
                self.flush_info(true);
                self.state = State::Done;
            }
            Some(line) => {
                if let Some(number) = header(line) {
                    self.flush_info(true);
                    self.state = State::Answers;
                    self.answer(number);
                } else if line.starts_with("Optimization: ")
                    || line.starts_with("Progression :")
                {
                    // Nothing to optimize yet.
                    self.unexpected(line);
                } else if is_blank(line) && self.info.iter().any(|l| !is_blank(l)) {
                    // No answer at all.
                    self.flush_info(true);
                    self.end_answers();
                } else {
                    self.info.push(line.to_owned());
                }
            }
        }
    }

    fn answer_stream(&mut self, line: Option<&str>) {
        let Some(line) = line else {
            self.flush_info(false);
            self.state = State::Done;
            return;
        };
        if let Some(number) = header(line) {
            self.answer(number);
        } else if let Some(values) = line.strip_prefix("Optimization: ") {
            self.optimization(line, values);
        } else if let Some(progress) = line.strip_prefix("Progression :") {
            if self.pending.is_none() {
                self.unexpected(line);
            } else if self.options.yield_progression {
                self.queue
                    .push_back(Ok(Segment::Progression(progress.trim().to_owned())));
            }
        } else if is_blank(line) {
            self.flush_info(false);
            self.end_answers();
        } else {
            trace!(self.trace, Output, "info: {}", line);
            self.info.push(line.to_owned());
        }
    }

    /// Read and parse the payload following an answer header.
    fn answer(&mut self, number: u64) {
        trace!(self.trace, Output, "answer {}", number);
        if self.options.yield_answer_number {
            self.queue.push_back(Ok(Segment::AnswerNumber(number)));
        }
        let Some(payload) = self.lines.next() else {
            trace!(self.trace, Output, "no payload for answer {}", number);
            self.state = State::Done;
            return;
        };
        match self.answers.parse(payload.as_ref()) {
            Ok(answer) => {
                self.queue.push_back(Ok(Segment::Answer(answer)));
                self.pending = Some(false);
            }
            Err(error) => {
                self.queue.push_back(Err(error));
                self.state = State::Done;
            }
        }
    }

    fn optimization(&mut self, line: &str, values: &str) {
        let values = values
            .split_whitespace()
            .map(|v| v.parse::<i64>())
            .collect::<Result<Vec<_>, _>>();
        match (self.pending, values) {
            (Some(false), Ok(values)) if !values.is_empty() => {
                self.queue.push_back(Ok(Segment::Optimization(values)));
                self.pending = Some(true);
            }
            _ => self.unexpected(line),
        }
    }

    fn statistics(&mut self, line: Option<&str>) {
        match line {
            None => {
                let stats = take(&mut self.stats);
                self.queue.push_back(Ok(Segment::Statistics(stats)));
                self.state = State::Done;
            }
            Some(line) if is_blank(line) => (),
            Some(line) => {
                let (key, value) = line.split_once(':').unwrap_or((line, ""));
                self.stats
                    .insert(key.trim().to_owned(), value.trim().to_owned());
            }
        }
    }

    fn end_answers(&mut self) {
        self.state = if self.options.yield_stats {
            State::Statistics
        } else {
            State::Done
        };
    }

    fn flush_info(&mut self, even_if_empty: bool) {
        let info = take(&mut self.info);
        if self.options.yield_info && (even_if_empty || !info.is_empty()) {
            self.queue.push_back(Ok(Segment::Info(info)));
        }
    }

    fn unexpected(&mut self, line: &str) {
        trace!(self.trace, Output, "unexpected line: {}", line);
        self.queue
            .push_back(Err(OutputError::UnexpectedLine(line.to_owned())));
        self.state = State::Done;
    }
}

impl<I> Iterator for OutputParser<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    type Item = Result<Segment, OutputError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(segment) = self.queue.pop_front() {
                return Some(segment);
            }
            if self.state == State::Done {
                return None;
            }
            self.step();
        }
    }
}

pub fn parse_output<L>(
    lines: L,
    options: OutputOptions,
) -> Result<OutputParser<L::IntoIter>, OutputError>
where
    L: IntoIterator,
    L::Item: AsRef<str>,
{
    OutputParser::new(lines.into_iter(), options, Trace::none())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Atom, Element};

    fn all() -> OutputOptions {
        OutputOptions {
            yield_info: true,
            yield_stats: true,
            yield_answer_number: true,
            yield_progression: true,
            ..OutputOptions::default()
        }
    }

    fn segments(lines: &[&str], options: OutputOptions) -> Vec<Result<Segment, OutputError>> {
        parse_output(lines.iter(), options)
            .expect("valid options")
            .collect()
    }

    fn answer(atoms: &[&str]) -> Segment {
        Segment::Answer(
            atoms
                .iter()
                .map(|a| Element::Atom(Atom::new(*a, [])))
                .collect(),
        )
    }

    fn info(lines: &[&str]) -> Segment {
        Segment::Info(lines.iter().map(|l| String::from(*l)).collect())
    }

    fn stats(pairs: &[(&str, &str)]) -> Segment {
        Segment::Statistics(
            pairs
                .iter()
                .map(|(k, v)| (String::from(*k), String::from(*v)))
                .collect(),
        )
    }

    #[test]
    fn segment_sequence() {
        let lines = ["Answer: 1", "a", "Answer: 2", "b", "SATISFIABLE", "", "Models : 2"];
        assert_eq!(
            segments(&lines, all()),
            vec![
                Ok(info(&[])),
                Ok(Segment::AnswerNumber(1)),
                Ok(answer(&["a"])),
                Ok(Segment::AnswerNumber(2)),
                Ok(answer(&["b"])),
                Ok(info(&["SATISFIABLE"])),
                Ok(stats(&[("Models", "2")])),
            ],
            "every segment"
        );
        assert_eq!(
            segments(&lines, OutputOptions::default()),
            vec![Ok(answer(&["a"])), Ok(answer(&["b"]))],
            "answers only"
        );
    }

    #[test]
    fn optimizations() {
        let lines = [
            "Answer: 1",
            "a",
            "Optimization: -10 6",
            "Progression : [1;2] (Error: 0.5)",
            "Answer: 2",
            "",
            "Answer: 3",
            "c",
        ];
        assert_eq!(
            segments(&lines, all()),
            vec![
                Ok(info(&[])),
                Ok(Segment::AnswerNumber(1)),
                Ok(answer(&["a"])),
                Ok(Segment::Optimization(vec![-10, 6])),
                Ok(Segment::Progression(String::from("[1;2] (Error: 0.5)"))),
                Ok(Segment::AnswerNumber(2)),
                Ok(answer(&[])),
                Ok(Segment::AnswerNumber(3)),
                Ok(answer(&["c"])),
            ],
            "blank payload and end of input"
        );
    }

    #[test]
    fn unexpected_lines() {
        assert_eq!(
            segments(
                &["Answer: 1", "a", "Optimization: 1", "Optimization: 2", "Answer: 2", "b"],
                OutputOptions::default()
            ),
            vec![
                Ok(answer(&["a"])),
                Ok(Segment::Optimization(vec![1])),
                Err(OutputError::UnexpectedLine(String::from("Optimization: 2"))),
            ],
            "second optimization"
        );
        assert_eq!(
            segments(&["Optimization: 3", "Answer: 1", "a"], all()),
            vec![Err(OutputError::UnexpectedLine(String::from("Optimization: 3")))],
            "optimization before any answer"
        );
        assert_eq!(
            segments(&["Solving...", "Progression : x", "Answer: 1", "a"], all()),
            vec![Err(OutputError::UnexpectedLine(String::from("Progression : x")))],
            "progression before any answer"
        );
        assert_eq!(
            segments(&["Answer: 1", "a", "", "Models : 1"], OutputOptions::default()),
            vec![Ok(answer(&["a"]))],
            "statistics not requested"
        );
        let mut parser = parse_output(
            ["Answer: 1", "a(", "Answer: 2", "b"],
            OutputOptions::default(),
        )
        .expect("valid options");
        assert!(
            matches!(parser.next(), Some(Err(OutputError::InvalidAtom { .. }))),
            "invalid payload"
        );
        assert_eq!(parser.next(), None, "fused");
    }

    #[test]
    fn no_answers() {
        assert_eq!(
            segments(&["clasp version 3.2.0", "Solving..."], all()),
            vec![Ok(info(&["clasp version 3.2.0", "Solving..."]))],
            "input ends before any header"
        );
        assert_eq!(
            segments(&["UNSATISFIABLE", "", "Models : 0", "Calls"], all()),
            vec![
                Ok(info(&["UNSATISFIABLE"])),
                Ok(stats(&[("Models", "0"), ("Calls", "")])),
            ],
            "unsatisfiable"
        );
        assert_eq!(
            segments(&["Answer: 1"], all()),
            vec![Ok(info(&[])), Ok(Segment::AnswerNumber(1))],
            "missing payload"
        );
        assert_eq!(segments(&[], OutputOptions::default()), vec![], "nothing");
    }

    #[test]
    fn headers() {
        assert_eq!(header("Answer: 12"), Some(12), "header");
        assert_eq!(header("Answer: 12 "), None, "trailing space");
        assert_eq!(header("Answer:"), None, "no number");
        assert_eq!(header("Answers: 1"), None, "not a header");
    }
}
