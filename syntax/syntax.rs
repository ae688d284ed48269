//! Syntactic elements of Answer Set Programs as written for
//! the gringo/clingo family of solvers.
//!
//! Parsing produces a [`Program`], an ordered sequence of
//! immutable [`Node`]s. Printing a node (via `Display`)
//! yields ASP source that parses back to the same node.

mod asp;
pub mod byline;
pub mod graph;
pub mod lexer;
mod parser;
mod tokens;
pub mod visit;

use std::fmt;

use thiserror::Error;

pub use asp::{parse_program, parse_program_traced, AspLexer, AspParser, AspToken};
pub use lexer::{Lex, Token};
pub use parser::Parse;
pub use tokens::Tokens;
pub use visit::Visit;

/// Uninterpreted element that names a predicate, a constant, or a variable.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: String) -> Self {
        Symbol(name)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Symbol::new(String::from(s))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate (or, if unnamed, a tuple) applied to arguments.
/// Zero arguments means a bare atom: `a` and `a()` are the same term.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Term {
    pub predicate: Option<Symbol>,
    pub args: Vec<Node>,
}

impl Term {
    pub fn new(predicate: Option<Symbol>, args: impl IntoIterator<Item = Node>) -> Self {
        Self {
            predicate,
            args: args.into_iter().collect(),
        }
    }

    /// Build a term from the `;`-separated argument groups
    /// that were written between its parentheses.
    pub(crate) fn from_groups(predicate: Option<Symbol>, mut groups: Vec<Vec<Node>>) -> Self {
        let args = match groups.len() {
            0 => Vec::new(),
            1 => groups.remove(0),
            _ => vec![Node::Disjunction(groups)],
        };
        Self { predicate, args }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.predicate, self.args.is_empty()) {
            (Some(p), true) => p.fmt(f),
            (Some(p), false) => f.write_fmt(format_args!("{p}({})", join(&self.args, ","))),
            (None, _) => f.write_fmt(format_args!("({})", join(&self.args, ","))),
        }
    }
}

/// A _conditional literal_ `p(X): c1, c2`: for all bindings
/// satisfying the conditions, the literal must hold.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Forall {
    pub term: Term,
    pub conditions: Vec<Node>,
}

impl Forall {
    pub fn new(term: Term, conditions: impl IntoIterator<Item = Node>) -> Self {
        Self {
            term,
            conditions: conditions.into_iter().collect(),
        }
    }
}

impl fmt::Display for Forall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "{}: {}",
            self.term,
            join(&self.conditions, ", ")
        ))
    }
}

/// Cardinality constraint `L { g1; g2 } U :- body`.
/// Omitted bounds are `0` and `None`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Selection {
    pub lower: i64,
    pub upper: Option<i64>,
    pub generators: Vec<Node>,
    pub body: Vec<Node>,
}

impl Selection {
    pub fn new(
        lower: i64,
        upper: Option<i64>,
        generators: impl IntoIterator<Item = Node>,
        body: impl IntoIterator<Item = Node>,
    ) -> Self {
        Self {
            lower,
            upper,
            generators: generators.into_iter().collect(),
            body: body.into_iter().collect(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lower != 0 {
            f.write_fmt(format_args!("{} ", self.lower))?;
        }
        f.write_fmt(format_args!("{{ {} }}", join(&self.generators, "; ")))?;
        if let Some(upper) = self.upper {
            f.write_fmt(format_args!(" {upper}"))?;
        }
        if !self.body.is_empty() {
            f.write_fmt(format_args!(" :- {}", join(&self.body, "; ")))?;
        }
        Ok(())
    }
}

/// A rule with a single atom as its head.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rule {
    pub head: Box<Node>,
    pub body: Vec<Node>,
}

impl Rule {
    pub fn new(head: Node, body: impl IntoIterator<Item = Node>) -> Self {
        Self {
            head: Box::new(head),
            body: body.into_iter().collect(),
        }
    }
}

/// A rule whose head is a disjunction of at least two atoms.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MultiRule {
    pub heads: Vec<Node>,
    pub body: Vec<Node>,
}

impl MultiRule {
    pub fn new(
        heads: impl IntoIterator<Item = Node>,
        body: impl IntoIterator<Item = Node>,
    ) -> Self {
        Self {
            heads: heads.into_iter().collect(),
            body: body.into_iter().collect(),
        }
    }
}

/// `#show.`, `#show t.` or `#show t: c1, c2.`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Show {
    pub term: Option<Box<Node>>,
    pub conditions: Vec<Node>,
}

/// `#show p/n.`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShowArity {
    pub predicate: Symbol,
    pub arity: u32,
}

/// `#const name = value.`
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Const {
    pub name: Symbol,
    pub value: Box<Node>,
}

/// Every construct the parser knows about. Statements, literals,
/// and arguments share this one type so that analyses can walk a
/// program with a single `match`.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Node {
    Term(Term),
    NegTerm(Term),
    Forall(Forall),
    NegForall(Forall),
    /// Negation of an already negated literal; `not not p` is kept
    /// as written, never simplified.
    Not(Box<Node>),
    Constant(Symbol),
    Variable(Symbol),
    Anonymous,
    /// Raw text between the quotes: escapes are not interpreted.
    Text(String),
    Number(i64),
    /// `;`-separated argument groups. Only ever found among a term's arguments.
    Disjunction(Vec<Vec<Node>>),
    Selection(Selection),
    Rule(Rule),
    MultiRule(MultiRule),
    Constraint(Vec<Node>),
    Show(Show),
    ShowArity(ShowArity),
    Const(Const),
}

impl Node {
    /// The predicate of a (possibly negated or conditional) literal.
    pub fn predicate(&self) -> Option<&Symbol> {
        match self {
            Self::Term(t) | Self::NegTerm(t) => t.predicate.as_ref(),
            Self::Forall(f) | Self::NegForall(f) => f.term.predicate.as_ref(),
            Self::Not(n) => n.predicate(),
            _ => None,
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::NegTerm(_) | Self::NegForall(_) | Self::Not(_))
    }

    /// Interpret the backslash escapes of a text literal. Parsing never
    /// does this on its own: equality is defined on the surface form.
    pub fn unescaped_text(&self) -> Option<String> {
        match self {
            Self::Text(raw) => Some(lexer::unescape(raw)),
            _ => None,
        }
    }
}

impl From<i64> for Node {
    fn from(i: i64) -> Self {
        Self::Number(i)
    }
}

impl From<Term> for Node {
    fn from(t: Term) -> Self {
        Self::Term(t)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Node::*;
        match self {
            Term(t) => t.fmt(f),
            NegTerm(t) => f.write_fmt(format_args!("not {t}")),
            Forall(a) => a.fmt(f),
            NegForall(a) => f.write_fmt(format_args!("not {a}")),
            Not(n) => f.write_fmt(format_args!("not {n}")),
            Constant(s) | Variable(s) => s.fmt(f),
            Anonymous => f.write_str("_"),
            Text(s) => f.write_fmt(format_args!("\"{s}\"")),
            Number(i) => i.fmt(f),
            Disjunction(groups) => f.write_fmt(format_args!(
                "({})",
                groups
                    .iter()
                    .map(|g| join(g, ","))
                    .collect::<Vec<_>>()
                    .join(";")
            )),
            Selection(s) => s.fmt(f),
            Rule(r) => f.write_fmt(format_args!("{} :- {}", r.head, join(&r.body, "; "))),
            MultiRule(r) => {
                f.write_str(&join(&r.heads, "; "))?;
                if !r.body.is_empty() {
                    f.write_fmt(format_args!(" :- {}", join(&r.body, "; ")))?;
                }
                Ok(())
            }
            Constraint(body) => f.write_fmt(format_args!(":- {}", join(body, "; "))),
            Show(s) => {
                f.write_str("#show")?;
                if let Some(term) = &s.term {
                    f.write_fmt(format_args!(" {term}"))?;
                }
                if !s.conditions.is_empty() {
                    f.write_fmt(format_args!(": {}", join(&s.conditions, ", ")))?;
                }
                Ok(())
            }
            ShowArity(s) => f.write_fmt(format_args!("#show {}/{}", s.predicate, s.arity)),
            Const(c) => f.write_fmt(format_args!("#const {} = {}", c.name, c.value)),
        }
    }
}

/// A whole source file: top-level statements in source order.
/// Analyses refer to statements by their index here.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Program {
    pub statements: Vec<Node>,
}

impl Program {
    pub fn new(statements: impl IntoIterator<Item = Node>) -> Self {
        Self {
            statements: statements.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.statements.iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            f.write_fmt(format_args!("{statement}.\n"))?;
        }
        Ok(())
    }
}

fn join(nodes: &[Node], sep: &str) -> String {
    nodes
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Source that does not match the grammar. Positions follow the
/// solver's diagnostic convention: 1-based line and column.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{line}:{column}: expected {expected}, found `{found}`")]
pub struct SyntaxError {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub expected: String,
    pub found: String,
}

impl SyntaxError {
    /// Locate `offset` (a byte offset) in `source`.
    pub fn new(
        source: &str,
        offset: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        let before = &source[..offset.min(source.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// These constructor macros make tests involving nodes much
/// more readable. They are *not* intended as a public interface,
/// but [cargo can't currently export test code across
/// crates](https://github.com/rust-lang/cargo/issues/8379).
#[cfg(any(test, feature = "macros"))]
mod macros {
    #[macro_export]
    macro_rules! sym {
        ($name: ident) => {
            $crate::Symbol::from(stringify!($name))
        };
    }

    /// Argument-position leaves: `arg!(a)`, `arg!(X)`, `arg!(3)`.
    #[macro_export]
    macro_rules! arg {
        (_) => {
            $crate::Node::Anonymous
        };
        ($n: literal) => {
            $crate::Node::Number($n)
        };
        ($name: ident) => {{
            let name = stringify!($name);
            if name.starts_with(|c: char| c.is_ascii_uppercase() || c == '_') {
                $crate::Node::Variable($crate::Symbol::from(name))
            } else {
                $crate::Node::Constant($crate::Symbol::from(name))
            }
        }};
    }

    #[macro_export]
    macro_rules! text {
        ($s: literal) => {
            $crate::Node::Text(String::from($s))
        };
    }

    #[macro_export]
    macro_rules! tm {
        ($pred: ident) => {
            $crate::Term::new(Some($crate::sym!($pred)), [])
        };
        ($pred: ident($($arg: expr),* $(,)?)) => {
            $crate::Term::new(Some($crate::sym!($pred)), [$($arg),*])
        };
    }

    #[macro_export]
    macro_rules! term {
        ($pred: ident $(($($args: tt)*))?) => {
            $crate::Node::Term($crate::tm!($pred$(($($args)*))?))
        };
    }

    #[macro_export]
    macro_rules! nterm {
        ($pred: ident $(($($args: tt)*))?) => {
            $crate::Node::NegTerm($crate::tm!($pred$(($($args)*))?))
        };
    }

    #[macro_export]
    macro_rules! forall {
        ($term: expr, [$($cond: expr),* $(,)?]) => {
            $crate::Node::Forall($crate::Forall::new($term, [$($cond),*]))
        };
    }

    #[macro_export]
    macro_rules! nforall {
        ($term: expr, [$($cond: expr),* $(,)?]) => {
            $crate::Node::NegForall($crate::Forall::new($term, [$($cond),*]))
        };
    }

    #[macro_export]
    macro_rules! disj {
        ($([$($arg: expr),* $(,)?]),* $(,)?) => {
            $crate::Node::Disjunction(vec![$(vec![$($arg),*]),*])
        };
    }

    #[macro_export]
    macro_rules! rule {
        ($head: expr, [$($body: expr),* $(,)?]) => {
            $crate::Node::Rule($crate::Rule::new($head, [$($body),*]))
        };
    }

    #[macro_export]
    macro_rules! constraint {
        ($($body: expr),* $(,)?) => {
            $crate::Node::Constraint(vec![$($body),*])
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_terms() {
        assert_eq!(term!(a).to_string(), "a", "bare atom");
        assert_eq!(
            term!(p(arg!(a), arg!(X), arg!(_), arg!(-2))).to_string(),
            "p(a,X,_,-2)",
            "arguments"
        );
        assert_eq!(
            Node::Term(Term::new(None, [arg!(1), arg!(2)])).to_string(),
            "(1,2)",
            "tuple"
        );
        assert_eq!(
            term!(rel(arg!(a), disj!([arg!(c)], [arg!(d)]))).to_string(),
            "rel(a,(c;d))",
            "disjunction"
        );
        assert_eq!(
            term!(b(text!(r#"x, \"y\""#))).to_string(),
            r#"b("x, \"y\"")"#,
            "text keeps its escapes"
        );
    }

    #[test]
    fn display_statements() {
        assert_eq!(
            rule!(term!(a), [nterm!(b), term!(c)]).to_string(),
            "a :- not b; c",
            "rule"
        );
        assert_eq!(
            constraint!(nforall!(tm!(obj(arg!(X))), [term!(obj(arg!(X)))])).to_string(),
            ":- not obj(X): obj(X)",
            "constraint"
        );
        assert_eq!(
            Node::Selection(Selection::new(
                1,
                Some(2),
                [forall!(tm!(sel(arg!(X))), [term!(obj(arg!(X)))])],
                [term!(go)]
            ))
            .to_string(),
            "1 { sel(X): obj(X) } 2 :- go",
            "selection"
        );
        assert_eq!(
            Node::Selection(Selection::new(0, None, [term!(a), term!(b)], [])).to_string(),
            "{ a; b }",
            "default bounds are elided"
        );
        assert_eq!(
            Node::Not(Box::new(nterm!(p))).to_string(),
            "not not p",
            "double negation"
        );
        assert_eq!(
            Node::ShowArity(ShowArity {
                predicate: sym!(p),
                arity: 2
            })
            .to_string(),
            "#show p/2",
            "show arity"
        );
        assert_eq!(
            Program::new([term!(a), rule!(term!(b), [term!(a)])]).to_string(),
            "a.\nb :- a.\n",
            "program"
        );
    }

    #[test]
    fn predicate() {
        assert_eq!(term!(p(arg!(X))).predicate(), Some(&sym!(p)), "term");
        assert_eq!(
            Node::Not(Box::new(nterm!(q))).predicate(),
            Some(&sym!(q)),
            "nested negation"
        );
        assert_eq!(arg!(X).predicate(), None, "variable");
        assert!(nterm!(q).is_negative(), "negative");
        assert!(!term!(q).is_negative(), "positive");
    }

    #[test]
    fn syntax_error_position() {
        let source = "a.\nb(.\n";
        let err = SyntaxError::new(source, 5, "argument", ".");
        assert_eq!((err.line, err.column), (2, 3), "line and column");
        assert_eq!(
            err.to_string(),
            "2:3: expected argument, found `.`",
            "message"
        );
    }

    #[test]
    fn unescaped_text() {
        assert_eq!(
            text!(r#"a \"b\"\n"#).unescaped_text(),
            Some(String::from("a \"b\"\n")),
            "escapes"
        );
        assert_eq!(term!(a).unescaped_text(), None, "not text");
    }
}
