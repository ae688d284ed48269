//! Inspect answer set programs and the transcripts
//! of the solvers that run them.

use std::fs::{read_to_string, File};
use std::io::{stdin, BufRead, BufReader, Read};

use anyhow::{anyhow, Context as _, Result};
use atty::Stream;
use clap::{Parser, Subcommand};

use aspic_output::{
    answer_set_to_string, check_diagnostics, AnswerConfig, Diagnostics, OutputOptions,
    OutputParser, Segment,
};
use aspic_syntax::byline::{clusterize_from_source, rebuild_clusters, Layout};
use aspic_syntax::graph::{dependency_graph, program_to_endpoints};
use aspic_syntax::parse_program_traced;
use aspic_tracer::Trace;

#[derive(Parser)]
#[command(name = "aspic", version, about = "Parse ASP programs and solver output")]
struct Cli {
    /// Report on stderr: lex, parse, output, diagnose, or all.
    #[arg(short, long, value_delimiter = ',')]
    trace: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a program and print it back.
    Program { file: Option<String> },
    /// Print which statements feed which.
    Graph { file: Option<String> },
    /// Regroup the lines of a program into blocks.
    Blocks { file: Option<String> },
    /// Decode a solver transcript.
    Output {
        file: Option<String>,
        /// Also print the informative lines.
        #[arg(long)]
        info: bool,
        /// Also print the statistics.
        #[arg(long)]
        stats: bool,
        /// Keep nested terms structured.
        #[arg(long)]
        nested: bool,
        /// Always use the full atom grammar.
        #[arg(long)]
        careful: bool,
        /// Check the solver's standard error, saved in this file.
        #[arg(long)]
        stderr: Option<String>,
        /// Fail on warnings too.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let trace = cli.trace.iter().try_fold(Trace::none(), |trace, name| {
        Trace::from_name(name)
            .map(|level| trace | level)
            .ok_or_else(|| anyhow!("unknown trace level `{name}`"))
    })?;
    match cli.command {
        Command::Program { file } => {
            let program = parse_program_traced(&read_file(file.as_deref())?, trace)?;
            print!("{program}");
        }
        Command::Graph { file } => {
            let program = parse_program_traced(&read_file(file.as_deref())?, trace)?;
            for (producer, consumers) in dependency_graph(&program_to_endpoints(&program)) {
                let consumers = consumers.iter().map(|c| c.to_string()).collect::<Vec<_>>();
                println!("{producer} -> {}", consumers.join(" "));
            }
        }
        Command::Blocks { file } => {
            let blocks = clusterize_from_source(&read_file(file.as_deref())?)?;
            print!("{}", rebuild_clusters(&blocks, &Layout::default()));
        }
        Command::Output {
            file,
            info,
            stats,
            nested,
            careful,
            stderr,
            strict,
        } => {
            let options = OutputOptions {
                yield_info: info,
                yield_stats: stats,
                yield_answer_number: true,
                yield_progression: true,
                answer: AnswerConfig {
                    collapse_args: !nested,
                    careful,
                    ..AnswerConfig::default()
                },
            };
            let mut read_error = None;
            let lines = open_lines(file.as_deref())?
                .lines()
                .map_while(|line| line.map_err(|e| read_error = Some(e)).ok());
            for segment in OutputParser::new(lines, options, trace)? {
                print_segment(segment?);
            }
            if let Some(error) = read_error {
                return Err(error).context("Reading the transcript");
            }
            if let Some(stderr) = stderr {
                let stderr =
                    read_to_string(&stderr).with_context(|| format!("Reading {stderr}"))?;
                check_diagnostics(Diagnostics::new(stderr.lines(), trace), strict)?;
            }
        }
    }
    Ok(())
}

fn print_segment(segment: Segment) {
    match segment {
        Segment::Info(lines) => lines.iter().for_each(|line| println!("% {line}")),
        Segment::AnswerNumber(number) => println!("Answer: {number}"),
        Segment::Answer(answer) => println!("{}", answer_set_to_string(&answer, " ")),
        Segment::Optimization(values) => {
            let values = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
            println!("Optimization: {}", values.join(" "));
        }
        Segment::Progression(progress) => println!("Progression: {progress}"),
        Segment::Statistics(stats) => {
            for (key, value) in stats {
                println!("{key}: {value}");
            }
        }
    }
}

/// Stream the lines of a file or standard input.
fn open_lines(filename: Option<&str>) -> Result<Box<dyn BufRead>> {
    match filename {
        None | Some("-") => Ok(Box::new(stdin().lock())),
        Some(filename) => {
            let file = File::open(filename).with_context(|| format!("Opening {filename}"))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Read a file or standard input and return the content as a string.
fn read_file(filename: Option<&str>) -> Result<String> {
    match filename {
        None | Some("-") => {
            if atty::is(Stream::Stdin) {
                eprintln!("Reading from stdin, terminate with Ctrl-D.");
            }
            let mut buffer = String::new();
            stdin()
                .read_to_string(&mut buffer)
                .context("Reading from stdin")?;
            Ok(buffer)
        }
        Some(filename) => read_to_string(filename).with_context(|| format!("Reading {filename}")),
    }
}
