//! Walk a program, i.e., visit every sub-element.

use super::*;

/// Walk a shared borrow of a program or a node.
///
/// We follow [the standard Rust visitor
/// pattern](https://rust-unofficial.github.io/patterns/patterns/behavioural/visitor.html).
/// The methods in this trait are hooks to be overridden.
/// By default, they all call out to walker functions that
/// in turn call back into the visitor to continue the walk.
///
/// Literals are visited either as heads (they are derived by
/// the statement) or as bodies (they are used by it).
pub trait Visit<'a> {
    fn visit_variable(&mut self, _s: &'a Symbol) {}
    fn visit_constant(&mut self, _s: &'a Symbol) {}
    fn visit_head_predicate(&mut self, _p: &'a Symbol) {}
    fn visit_body_predicate(&mut self, _p: &'a Symbol) {}
    fn visit_program(&mut self, p: &'a Program) {
        visit_program(self, p)
    }
    fn visit_statement(&mut self, _index: usize, s: &'a Node) {
        visit_statement(self, s)
    }
    fn visit_head(&mut self, h: &'a Node) {
        visit_head(self, h)
    }
    fn visit_body(&mut self, b: &'a Node) {
        visit_body(self, b)
    }
    fn visit_argument(&mut self, a: &'a Node) {
        visit_argument(self, a)
    }
}

pub fn visit_program<'a, V: Visit<'a> + ?Sized>(v: &mut V, program: &'a Program) {
    for (i, s) in program.iter().enumerate() {
        v.visit_statement(i, s);
    }
}

pub fn visit_statement<'a, V: Visit<'a> + ?Sized>(v: &mut V, statement: &'a Node) {
    use Node::*;
    match statement {
        Term(_) | Forall(_) => v.visit_head(statement),
        Rule(r) => {
            v.visit_head(&r.head);
            r.body.iter().for_each(|b| v.visit_body(b));
        }
        MultiRule(r) => {
            r.heads.iter().for_each(|h| v.visit_head(h));
            r.body.iter().for_each(|b| v.visit_body(b));
        }
        Selection(s) => {
            s.generators.iter().for_each(|g| v.visit_head(g));
            s.body.iter().for_each(|b| v.visit_body(b));
        }
        Constraint(body) => body.iter().for_each(|b| v.visit_body(b)),
        Show(s) => {
            if let Some(t) = &s.term {
                v.visit_body(t);
            }
            s.conditions.iter().for_each(|c| v.visit_body(c));
        }
        ShowArity(s) => v.visit_body_predicate(&s.predicate),
        Const(c) => v.visit_argument(&c.value),
        NegTerm(_) | NegForall(_) | Not(_) => v.visit_body(statement),
        Constant(_) | Variable(_) | Anonymous | Text(_) | Number(_) | Disjunction(_) => {
            v.visit_argument(statement)
        }
    }
}

/// A derived literal. Conditions are still used, not derived.
pub fn visit_head<'a, V: Visit<'a> + ?Sized>(v: &mut V, head: &'a Node) {
    match head {
        Node::Term(t) => visit_head_term(v, t),
        Node::Forall(f) => {
            visit_head_term(v, &f.term);
            f.conditions.iter().for_each(|c| v.visit_body(c));
        }
        _ => v.visit_body(head),
    }
}

fn visit_head_term<'a, V: Visit<'a> + ?Sized>(v: &mut V, term: &'a Term) {
    if let Some(p) = &term.predicate {
        v.visit_head_predicate(p);
    }
    term.args.iter().for_each(|a| v.visit_argument(a));
}

fn visit_body_term<'a, V: Visit<'a> + ?Sized>(v: &mut V, term: &'a Term) {
    if let Some(p) = &term.predicate {
        v.visit_body_predicate(p);
    }
    term.args.iter().for_each(|a| v.visit_argument(a));
}

pub fn visit_body<'a, V: Visit<'a> + ?Sized>(v: &mut V, body: &'a Node) {
    match body {
        Node::Term(t) | Node::NegTerm(t) => visit_body_term(v, t),
        Node::Forall(f) | Node::NegForall(f) => {
            visit_body_term(v, &f.term);
            f.conditions.iter().for_each(|c| v.visit_body(c));
        }
        Node::Not(n) => v.visit_body(n),
        _ => v.visit_argument(body),
    }
}

pub fn visit_argument<'a, V: Visit<'a> + ?Sized>(v: &mut V, arg: &'a Node) {
    match arg {
        Node::Constant(s) => v.visit_constant(s),
        Node::Variable(s) => v.visit_variable(s),
        Node::Term(t) => t.args.iter().for_each(|a| v.visit_argument(a)),
        Node::Disjunction(groups) => groups
            .iter()
            .flatten()
            .for_each(|a| v.visit_argument(a)),
        _ => (),
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeSet;

    use super::*;

    #[derive(Default)]
    struct Names<'a> {
        heads: BTreeSet<&'a str>,
        bodies: BTreeSet<&'a str>,
        variables: BTreeSet<&'a str>,
        constants: BTreeSet<&'a str>,
    }

    impl<'a> Visit<'a> for Names<'a> {
        fn visit_head_predicate(&mut self, p: &'a Symbol) {
            self.heads.insert(p.name());
        }
        fn visit_body_predicate(&mut self, p: &'a Symbol) {
            self.bodies.insert(p.name());
        }
        fn visit_variable(&mut self, s: &'a Symbol) {
            self.variables.insert(s.name());
        }
        fn visit_constant(&mut self, s: &'a Symbol) {
            self.constants.insert(s.name());
        }
    }

    #[test]
    fn heads_and_bodies() {
        let program = Program::new([
            rule!(term!(a(arg!(X))), [term!(b(arg!(X))), nterm!(c)]),
            Node::Selection(Selection::new(
                0,
                None,
                [forall!(tm!(d(arg!(Y))), [term!(e(arg!(Y)))])],
                [Node::Not(Box::new(nterm!(f(arg!(k)))))],
            )),
            term!(g(term!(h(arg!(m))), disj!([arg!(n)], [arg!(Z)]))),
            constraint!(nforall!(tm!(i), [term!(j)])),
        ]);
        let mut names = Names::default();
        names.visit_program(&program);
        assert_eq!(
            names.heads,
            ["a", "d", "g"].into_iter().collect(),
            "head predicates"
        );
        assert_eq!(
            names.bodies,
            ["b", "c", "e", "f", "i", "j"].into_iter().collect(),
            "body predicates"
        );
        assert_eq!(
            names.variables,
            ["X", "Y", "Z"].into_iter().collect(),
            "variables"
        );
        assert_eq!(
            names.constants,
            ["k", "m", "n"].into_iter().collect(),
            "constants"
        );
    }
}
