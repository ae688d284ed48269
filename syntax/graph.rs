//! Dependencies between the statements of a program.
//!
//! Predicates are identified by name only, regardless of arity.

use std::collections::{BTreeMap, BTreeSet};

use crate::{parse_program, Node, Program, Symbol, SyntaxError, Visit};

/// Statement indices, keyed by predicate.
pub type Index<'a> = BTreeMap<&'a Symbol, BTreeSet<usize>>;

/// Statement index to the indices of the statements it feeds.
pub type DependencyGraph = BTreeMap<usize, BTreeSet<usize>>;

/// Where each predicate is produced and where it is consumed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Endpoints<'a> {
    pub producers: Index<'a>,
    pub consumers: Index<'a>,
}

#[derive(Default)]
struct Collector<'a> {
    statement: usize,
    endpoints: Endpoints<'a>,
}

impl<'a> Visit<'a> for Collector<'a> {
    fn visit_statement(&mut self, index: usize, s: &'a Node) {
        self.statement = index;
        crate::visit::visit_statement(self, s);
    }

    fn visit_head_predicate(&mut self, p: &'a Symbol) {
        self.endpoints
            .producers
            .entry(p)
            .or_default()
            .insert(self.statement);
    }

    fn visit_body_predicate(&mut self, p: &'a Symbol) {
        self.endpoints
            .consumers
            .entry(p)
            .or_default()
            .insert(self.statement);
    }
}

pub fn program_to_endpoints(program: &Program) -> Endpoints<'_> {
    let mut collector = Collector::default();
    collector.visit_program(program);
    collector.endpoints
}

/// Link every producer of a predicate to every consumer of it.
pub fn dependency_graph(endpoints: &Endpoints) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (predicate, producers) in &endpoints.producers {
        if let Some(consumers) = endpoints.consumers.get(predicate) {
            for &p in producers {
                graph.entry(p).or_default().extend(consumers);
            }
        }
    }
    graph
}

pub fn program_to_dependency_graph(source: &str) -> Result<DependencyGraph, SyntaxError> {
    let program = parse_program(source)?;
    Ok(dependency_graph(&program_to_endpoints(&program)))
}
