//! Phase 3: whole-program consistency
//!
//! Runs on a fully resolved program and checks two properties that need the whole program at once:
//! - a method declared more than once for the same service FQN (reopened blocks, possibly in different files)
//!   has the same signature everywhere
//! - no struct reaches itself through direct field references
//!
//! Only plain fields whose type is a bare struct reference count as direct. `array<T>`, `map<K, V>` and
//! `optional<T>` break a cycle, and so do union members.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use arf_core::lang::primitives;
use arf_syntax::ast::{Field, MethodParam, Span, Type};
use arf_syntax::diagnostics::CompileError;

use super::Report;
use crate::frontend::config::CycleDetection;
use crate::frontend::diagnostics::FileDiagnostic;
use crate::frontend::program::{FileId, Program};
use crate::frontend::resolver::Resolutions;
use crate::frontend::symbols::DeclRef;

/// Run phase 3.
#[tracing::instrument(skip_all, fields(files = program.len(), cycle_detection = ?cycle_detection))]
pub fn check_consistency(
    program: &Program,
    resolutions: &Resolutions,
    cycle_detection: CycleDetection,
) -> Vec<FileDiagnostic> {
    let mut report = Report::new(program);

    check_reopened_services(program, resolutions, &mut report);

    let graph = ReferenceGraph::build(program, resolutions);
    let cycles = match cycle_detection {
        CycleDetection::Full => graph.all_cycles(),
        CycleDetection::Shallow => graph.short_cycles(),
    };
    for cycle in &cycles {
        report_cycle(program, &graph, cycle, &mut report);
    }

    let diagnostics = report.finish();
    tracing::debug!(cycles = cycles.len(), errors = diagnostics.len(), "consistency checks finished");
    diagnostics
}

// ============================================================================
// Reopened services
// ============================================================================

fn check_reopened_services(program: &Program, resolutions: &Resolutions, report: &mut Report<'_>) {
    // (service fqn, method name) -> first declaration
    let mut first_seen: HashMap<(String, String), (FileId, Span, String)> = HashMap::new();

    for (file, loaded) in program.files() {
        for id in loaded.ast.service_ids() {
            let fqn = program.service_fqn(file, id);

            for method in &loaded.ast.service(id).methods {
                let signature = format!(
                    "({}) -> ({})",
                    render_params(resolutions, file, &method.inputs),
                    render_params(resolutions, file, &method.outputs)
                );

                match first_seen.entry((fqn.clone(), method.name.node.clone())) {
                    Entry::Vacant(slot) => {
                        slot.insert((file, method.name.span, signature));
                    }
                    Entry::Occupied(slot) => {
                        let (first_file, first_span, first_signature) = slot.get();
                        if *first_signature == signature {
                            tracing::trace!(service = %fqn, method = %method.name.node, "merged identical method");
                            continue;
                        }
                        let location = report.location(*first_file, *first_span);
                        let error = CompileError::semantic(
                            format!(
                                "method `{}` of service `{}` diverges from its earlier declaration at {}",
                                method.name.node, fqn, location
                            ),
                            method.name.span,
                        )
                        .with_note(format!("earlier signature: {}", first_signature))
                        .with_note(format!("this signature: {}", signature));
                        report.push(file, error);
                    }
                }
            }
        }
    }
}

fn render_params(resolutions: &Resolutions, file: FileId, params: &[MethodParam]) -> String {
    params
        .iter()
        .map(|param| {
            let ty = render_type(resolutions, file, &param.ty.node);
            match &param.name {
                Some(name) => format!("{} {}", name.node, ty),
                None => ty,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Like `Type`'s `Display`, with user types replaced by the FQN they resolved to.
fn render_type(resolutions: &Resolutions, file: FileId, ty: &Type) -> String {
    match ty {
        Type::Primitive(id) => primitives::as_str(*id).to_string(),
        Type::Array(inner) => format!("array<{}>", render_type(resolutions, file, &inner.node)),
        Type::Map(key, value) => format!(
            "map<{}, {}>",
            render_type(resolutions, file, &key.node),
            render_type(resolutions, file, &value.node)
        ),
        Type::Optional(inner) => format!("optional<{}>", render_type(resolutions, file, &inner.node)),
        Type::Streaming(inner) => format!("stream {}", render_type(resolutions, file, &inner.node)),
        Type::Simple(type_ref) | Type::Qualified(type_ref) => resolutions
            .get(file, type_ref.id)
            .map_or_else(|| type_ref.dotted(), |resolved| resolved.fqn.clone()),
    }
}

// ============================================================================
// Direct reference cycles
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Edge {
    target: DeclRef,
    /// Where the referencing field's type is written.
    span: Span,
}

/// Direct struct-to-struct references. Nodes are ordered, so every walk over the graph is deterministic.
struct ReferenceGraph {
    edges: BTreeMap<DeclRef, Vec<Edge>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    OnStack,
    Done,
}

impl ReferenceGraph {
    fn build(program: &Program, resolutions: &Resolutions) -> Self {
        let mut edges: BTreeMap<DeclRef, Vec<Edge>> = BTreeMap::new();

        for (file, loaded) in program.files() {
            for id in loaded.ast.struct_ids() {
                let targets = edges.entry(DeclRef::Struct(file, id)).or_default();

                for field in &loaded.ast.struct_decl(id).fields {
                    let Field::Plain(plain) = field else { continue };
                    let Some(type_ref) = plain.ty.node.type_ref() else { continue };
                    match resolutions.get(file, type_ref.id) {
                        Some(resolved) if resolved.decl.is_struct() => targets.push(Edge {
                            target: resolved.decl,
                            span: plain.ty.span,
                        }),
                        _ => {}
                    }
                }
            }
        }

        Self { edges }
    }

    fn edges_of(&self, node: DeclRef) -> &[Edge] {
        self.edges.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn edge(&self, from: DeclRef, to: DeclRef) -> Option<&Edge> {
        self.edges_of(from).iter().find(|edge| edge.target == to)
    }

    /// Every cycle closed by a back edge of a depth-first walk, each reported once. A cyclic program always
    /// yields at least one.
    fn all_cycles(&self) -> Vec<Vec<DeclRef>> {
        let mut walk = CycleWalk {
            graph: self,
            state: HashMap::new(),
            stack: Vec::new(),
            seen: HashSet::new(),
            cycles: Vec::new(),
        };
        for &node in self.edges.keys() {
            if !walk.state.contains_key(&node) {
                walk.visit(node);
            }
        }
        walk.cycles
    }

    /// Self references and two-struct cycles only.
    fn short_cycles(&self) -> Vec<Vec<DeclRef>> {
        let mut cycles = Vec::new();
        for (&from, edges) in &self.edges {
            let mut targets: Vec<DeclRef> = edges.iter().map(|edge| edge.target).collect();
            targets.sort();
            targets.dedup();
            for to in targets {
                if to == from {
                    cycles.push(vec![from]);
                } else if from < to && self.edge(to, from).is_some() {
                    cycles.push(vec![from, to]);
                }
            }
        }
        cycles
    }
}

struct CycleWalk<'g> {
    graph: &'g ReferenceGraph,
    state: HashMap<DeclRef, Visit>,
    stack: Vec<DeclRef>,
    seen: HashSet<Vec<DeclRef>>,
    cycles: Vec<Vec<DeclRef>>,
}

impl CycleWalk<'_> {
    fn visit(&mut self, node: DeclRef) {
        let graph = self.graph;
        self.state.insert(node, Visit::OnStack);
        self.stack.push(node);

        for edge in graph.edges_of(node) {
            match self.state.get(&edge.target) {
                None => self.visit(edge.target),
                Some(Visit::OnStack) => {
                    if let Some(start) = self.stack.iter().position(|&n| n == edge.target) {
                        let cycle = canonical(&self.stack[start..]);
                        if self.seen.insert(cycle.clone()) {
                            self.cycles.push(cycle);
                        }
                    }
                }
                Some(Visit::Done) => {}
            }
        }

        self.stack.pop();
        self.state.insert(node, Visit::Done);
    }
}

/// Rotate a cycle so that it starts at its smallest node.
fn canonical(cycle: &[DeclRef]) -> Vec<DeclRef> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, node)| **node)
        .map_or(0, |(i, _)| i);
    cycle[start..].iter().chain(&cycle[..start]).copied().collect()
}

fn report_cycle(program: &Program, graph: &ReferenceGraph, cycle: &[DeclRef], report: &mut Report<'_>) {
    let Some(&from) = cycle.first() else { return };
    let to = cycle.get(1).copied().unwrap_or(from);
    let Some(edge) = graph.edge(from, to) else { return };

    let from_fqn = program.fqn_of(from);
    let message = if cycle.len() == 1 {
        format!("{} cannot reference itself as a type", from_fqn)
    } else {
        let path: Vec<String> = cycle.iter().chain(std::iter::once(&from)).map(|&n| program.fqn_of(n)).collect();
        format!(
            "{} cannot directly reference {} as it would create a cyclic reference ({})",
            from_fqn,
            program.fqn_of(to),
            path.join(" -> ")
        )
    };

    report.push(
        from.file(),
        CompileError::semantic(message, edge.span)
            .with_hint("wrap one of the references in `optional<...>` to break the cycle"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::validator::test_support::{load, load_files, messages};
    use crate::frontend::validator::{check_declarations, resolve_types};

    fn run(program: &Program, mode: CycleDetection) -> Vec<FileDiagnostic> {
        let (aliases, diagnostics) = check_declarations(program);
        assert!(diagnostics.is_empty(), "phase 1 failed: {:#?}", diagnostics);
        let (resolutions, diagnostics) = resolve_types(program, &aliases);
        assert!(diagnostics.is_empty(), "phase 2 failed: {:#?}", diagnostics);
        check_consistency(program, &resolutions, mode)
    }

    fn errors(source: &str) -> Vec<String> {
        messages(&run(&load(source), CycleDetection::Full))
    }

    #[test]
    fn test_identical_reopened_service_passes() {
        assert!(errors("package p;\nstruct S {}\nservice X { M(i S); }\nservice X { M(i S); }").is_empty());
    }

    #[test]
    fn test_divergent_reopened_service() {
        let diagnostics = run(
            &load("package p;\nstruct S {}\nservice X { M(i S); }\nservice X { M(i S, stream S); }"),
            CycleDetection::Full,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "main.arf:4:13: method `M` of service `p.X` diverges from its earlier declaration at main.arf:3:13"
        );
        assert_eq!(
            diagnostics[0].error.notes,
            ["earlier signature: (i p.S) -> ()", "this signature: (i p.S, stream p.S) -> ()"]
        );
    }

    #[test]
    fn test_divergence_across_files() {
        let program = load_files(&[
            ("main.arf", "package p;\nimport \"more\";\nstruct S {}\nservice Api { Get(S) -> (S); }\n"),
            ("more.arf", "package p;\nstruct T {}\nservice Api { Get(S) -> (T); List(S) -> (S); }\n"),
        ]);
        let diagnostics = run(&program, CycleDetection::Full);
        assert_eq!(
            messages(&diagnostics),
            ["method `Get` of service `p.Api` diverges from its earlier declaration at main.arf:4:15"]
        );
        assert_eq!(diagnostics[0].path.to_str(), Some("more.arf"));
    }

    #[test]
    fn test_same_signature_through_different_spellings() {
        let program = load_files(&[
            ("main.arf", "package acme.v1;\nimport \"more\";\nstruct S {}\nservice Api { Get(S); }\n"),
            ("more.arf", "package acme.v1;\nservice Api { Get(acme.v1.S); }\n"),
        ]);
        assert!(run(&program, CycleDetection::Full).is_empty());
    }

    #[test]
    fn test_self_reference() {
        assert_eq!(errors("struct A { a A; }"), ["A cannot reference itself as a type"]);
    }

    #[test]
    fn test_two_struct_cycle() {
        assert_eq!(
            errors("package p;\nstruct A { b B; }\nstruct B { a A; }"),
            ["p.A cannot directly reference p.B as it would create a cyclic reference (p.A -> p.B -> p.A)"]
        );
    }

    #[test]
    fn test_three_struct_cycle_depends_on_mode() {
        let program = load("struct A { b B; }\nstruct B { c C; }\nstruct C { a A; }");
        assert_eq!(
            messages(&run(&program, CycleDetection::Full)),
            ["A cannot directly reference B as it would create a cyclic reference (A -> B -> C -> A)"]
        );
        assert!(run(&program, CycleDetection::Shallow).is_empty());
    }

    #[test]
    fn test_shallow_mode_reports_short_cycles() {
        let program = load("struct A { a A; b B; }\nstruct B { a A; }");
        assert_eq!(
            messages(&run(&program, CycleDetection::Shallow)),
            [
                "A cannot reference itself as a type",
                "A cannot directly reference B as it would create a cyclic reference (A -> B -> A)",
            ]
        );
    }

    #[test]
    fn test_indirect_references_break_cycles() {
        let source = "struct A { b optional<B>; c array<A>; d map<string, A>; union u { x A; } }\nstruct B { a A; c C; }\nstruct C {}";
        assert!(errors(source).is_empty());
    }

    #[test]
    fn test_nested_struct_cycle() {
        let errs = errors("struct Outer { inner Inner; struct Inner { outer Outer; } }");
        assert_eq!(
            errs,
            ["Outer cannot directly reference Outer.Inner as it would create a cyclic reference (Outer -> Outer.Inner -> Outer)"]
        );
    }

    #[test]
    fn test_enum_references_are_not_edges() {
        assert!(errors("struct A { k Kind; enum Kind { X = 0; } }").is_empty());
    }
}
