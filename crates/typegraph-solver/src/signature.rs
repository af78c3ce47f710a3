//! Structural signature rendering.
//!
//! The signature is the canonical text of a node's structural identity:
//! deterministic, process-local, used as the union ordering key and in
//! diagnostics. Scratch buffers are pooled; that is purely a local
//! allocation optimization and carries no cross-call state.

use crate::arena::NodeArena;
use crate::node::{NodeId, TypeKey};
use typegraph_common::Interner;
use typegraph_decl::CollectionMode;

/// Reusable `String` scratch space for signature rendering.
#[derive(Default)]
pub struct SignaturePool {
    buffers: Vec<String>,
}

impl SignaturePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self) -> String {
        self.buffers.pop().unwrap_or_default()
    }

    pub fn release(&mut self, mut buffer: String) {
        buffer.clear();
        self.buffers.push(buffer);
    }
}

/// Render the signature of `id` into `out`.
pub fn write_signature(arena: &NodeArena, names: &Interner, id: NodeId, out: &mut String) {
    write_pair_signature(arena, names, id, out);
    if id.is_nullable() {
        out.push('?');
    }
}

/// Render the signature of `id` as a fresh `String` (diagnostics path).
pub fn signature_string(arena: &NodeArena, names: &Interner, id: NodeId) -> String {
    let mut out = String::new();
    write_signature(arena, names, id, &mut out);
    out
}

fn write_pair_signature(arena: &NodeArena, names: &Interner, id: NodeId, out: &mut String) {
    let pair = arena.pair(id);
    match &pair.key {
        TypeKey::Any => out.push_str("any"),
        TypeKey::Basic(kind) => out.push_str(kind.signature()),
        TypeKey::Enum(_) => {
            out.push_str("enum ");
            push_name(arena, names, id, out);
        }
        TypeKey::NamedRecord(_) => {
            out.push_str("record ");
            push_name(arena, names, id, out);
        }
        TypeKey::AnonymousRecord(fields) => {
            out.push('(');
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_signature(arena, names, field.ty, out);
                if let Some(name) = field.name {
                    out.push(' ');
                    out.push_str(names.resolve_str(name));
                }
                if let Some(default) = &field.default {
                    out.push_str(" = ");
                    default.write_signature(out);
                }
            }
            out.push(')');
        }
        TypeKey::Array(item) => {
            write_signature(arena, names, *item, out);
            out.push_str("[]");
        }
        TypeKey::List(mode, item) => {
            out.push_str(mode_prefix(*mode));
            out.push_str("list<");
            write_signature(arena, names, *item, out);
            out.push('>');
        }
        TypeKey::Set(mode, item) => {
            out.push_str(mode_prefix(*mode));
            out.push_str("set<");
            write_signature(arena, names, *item, out);
            out.push('>');
        }
        TypeKey::Dictionary(mode, key, value) => {
            out.push_str(mode_prefix(*mode));
            out.push_str("dict<");
            write_signature(arena, names, *key, out);
            out.push_str(", ");
            write_signature(arena, names, *value, out);
            out.push('>');
        }
        TypeKey::PrimaryInterface(_) | TypeKey::SecondaryInterface(_) => {
            out.push_str("iface ");
            push_name(arena, names, id, out);
        }
        TypeKey::AbstractInterface(_) => {
            out.push_str("abstract ");
            push_name(arena, names, id, out);
        }
        TypeKey::Union(members) => {
            out.push_str("union<");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_signature(arena, names, *member, out);
            }
            out.push('>');
        }
    }
}

fn push_name(arena: &NodeArena, names: &Interner, id: NodeId, out: &mut String) {
    match arena.pair(id).name {
        Some(name) => out.push_str(names.resolve_str(name)),
        None => out.push_str("<unnamed>"),
    }
}

fn mode_prefix(mode: CollectionMode) -> &'static str {
    match mode {
        CollectionMode::Concrete => "",
        CollectionMode::Interface => "i",
        CollectionMode::ReadOnly => "ro",
    }
}
