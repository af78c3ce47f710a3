//! Instantiation-safety walk.
//!
//! After the graph is built, every entity whose default is parameterless
//! construction must actually be constructible: a non-nullable field with
//! no declared default that itself defaults to construction is a mandatory
//! edge, and a cycle of mandatory edges can never finish constructing.
//! The walk also surfaces fields whose type has no default at all.
//!
//! Collection items and plain union alternatives are not mandatory edges;
//! only the union's default member is followed.

use crate::arena::NodeArena;
use crate::node::{DefaultInfo, Field, NodeId, SynthDefault, TypeKind};
use crate::signature::signature_string;
use fixedbitset::FixedBitSet;
use tracing::debug;
use typegraph_common::{Diagnostic, DiagnosticSink, Interner, codes};

/// Tri-state per pair: not visited, visiting (on the current root's own
/// chain), done. Done pairs are never re-entered, so each pair's mandatory
/// edges are checked exactly once across all roots.
pub struct CycleDefaultVisitor<'a> {
    arena: &'a NodeArena,
    names: &'a Interner,
    visiting: FixedBitSet,
    done: FixedBitSet,
    /// Rendered `Owner.field` segments of the current chain.
    path: Vec<String>,
    errors: usize,
}

impl<'a> CycleDefaultVisitor<'a> {
    pub fn new(arena: &'a NodeArena, names: &'a Interner) -> Self {
        let pairs = arena.pair_count();
        CycleDefaultVisitor {
            arena,
            names,
            visiting: FixedBitSet::with_capacity(pairs),
            done: FixedBitSet::with_capacity(pairs),
            path: Vec::new(),
            errors: 0,
        }
    }

    /// Walk every root; returns the number of errors reported.
    pub fn run(&mut self, roots: &[NodeId], sink: &mut dyn DiagnosticSink) -> usize {
        debug!(roots = roots.len(), "instantiation-safety walk");
        for &root in roots {
            let _ = self.visit(root.non_nullable(), sink);
        }
        self.errors
    }

    /// `Err(())` short-circuits the rest of the current root's chain after
    /// a cycle was reported.
    fn visit(&mut self, id: NodeId, sink: &mut dyn DiagnosticSink) -> Result<(), ()> {
        let index = id.pair_index();
        if self.done.contains(index) {
            return Ok(());
        }
        if self.visiting.contains(index) {
            let target = self.node_label(id);
            let path = format!("{} => {}", self.path.join(", "), target);
            sink.report(
                Diagnostic::error(
                    codes::INSTANTIATION_CYCLE,
                    format!("instantiation of {target} can never finish"),
                )
                .with_path(path),
            );
            self.errors += 1;
            return Err(());
        }
        self.visiting.insert(index);

        let arena = self.arena;
        let owner = self.node_label(id);
        let mut result = Ok(());
        for field in arena.fields_of(id) {
            if let Err(short_circuit) = self.visit_field(&owner, field, sink) {
                result = Err(short_circuit);
                break;
            }
        }
        if result.is_ok()
            && let DefaultInfo::Value(SynthDefault::Member(member)) = arena.default_of(id)
        {
            // A union is constructed through its default member.
            result = self.visit(self.follow(member), sink);
        }

        // Done even after a cycle: the error is reported once and the pair
        // must not trip later roots.
        self.visiting.set(index, false);
        self.done.insert(index);
        result
    }

    fn visit_field(
        &mut self,
        owner: &str,
        field: &Field,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), ()> {
        // Declared defaults and nullable fields never force construction.
        if field.default.is_some() || field.ty.is_nullable() {
            return Ok(());
        }
        let field_name = match field.name {
            Some(name) => self.names.resolve_str(name).to_string(),
            None => field.index.to_string(),
        };
        match self.arena.default_of(field.ty) {
            DefaultInfo::Value(SynthDefault::Instance) => {
                self.path.push(format!("{owner}.{field_name}"));
                let result = self.visit(self.follow(field.ty), sink);
                self.path.pop();
                result
            }
            DefaultInfo::Value(SynthDefault::Member(member)) => {
                self.path.push(format!("{owner}.{field_name}"));
                let result = self.visit(self.follow(member), sink);
                self.path.pop();
                result
            }
            DefaultInfo::Value(_) => Ok(()),
            DefaultInfo::None | DefaultInfo::Disallowed => {
                let signature = signature_string(self.arena, self.names, field.ty);
                let code = if self.arena.kind(field.ty) == TypeKind::Union {
                    codes::UNION_HAS_NO_DEFAULT
                } else {
                    codes::MISSING_DEFAULT
                };
                let mut segments = self.path.clone();
                segments.push(format!("{owner}.{field_name}"));
                sink.report(
                    Diagnostic::error(
                        code,
                        format!(
                            "field {owner}.{field_name} of type {signature} has no default and no way to synthesize one"
                        ),
                    )
                    .with_path(segments.join(", ")),
                );
                self.errors += 1;
                Ok(())
            }
        }
    }

    /// Mandatory edges land on the entity that actually gets constructed.
    fn follow(&self, id: NodeId) -> NodeId {
        let id = id.non_nullable();
        self.arena.pair(id).primary.unwrap_or(id)
    }

    fn node_label(&self, id: NodeId) -> String {
        match self.arena.pair(id).name {
            Some(name) => self.names.resolve_str(name).to_string(),
            None => signature_string(self.arena, self.names, id.non_nullable()),
        }
    }
}

#[cfg(test)]
#[path = "tests/visitor_tests.rs"]
mod tests;
