//! Named-record and value-tuple (anonymous record) registration.
//!
//! Named records are keyed by declared identity and inserted into the
//! registry before their fields are resolved, so a record containing
//! itself through a nullable path terminates structurally. Tuples are
//! keyed by their ordered (field type, name, default) list; two tuples
//! with identical field types but different names are distinct nodes that
//! share one unnamed oblivious node.

use crate::builder::Builder;
use crate::errors::BuildError;
use crate::node::{DefaultInfo, Field, NodeFlags, NodeId, SynthDefault, TupleFieldKey, TypeKey, TypePair};
use smallvec::SmallVec;
use typegraph_common::Atom;
use typegraph_decl::{AccessKind, DeclId, MemberFacts, TupleElem, TypeDesc, resolve_nullability};

impl<'a> Builder<'a> {
    /// Register a named value record.
    ///
    /// Records must declare at most one constructor and every exposed
    /// member must be writable; otherwise registration fails for the
    /// record but the run continues.
    pub(crate) fn register_record(&mut self, decl: DeclId) -> Result<NodeId, BuildError> {
        let key = TypeKey::NamedRecord(decl);
        if let Some(id) = self.registry.lookup_key(&key) {
            return Ok(id);
        }
        let decls = self.decls;
        let info = decls.get(decl);
        let name = self.display_decl(decl);

        if info.constructor_count > 1 {
            return Err(self.fail(
                BuildError::MultipleConstructors(decl),
                format!("record {name} must declare at most one constructor"),
            ));
        }

        // Placeholder first: self-referencing fields find the node in the
        // registry instead of recursing forever.
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::FINAL)
            .with_decl(decl, info.name)
            .with_default(DefaultInfo::Value(SynthDefault::Instance));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.registry.insert_decl(decl, id);
        {
            let pair = self.arena.pair_mut(id);
            pair.oblivious = Some(id);
            pair.regular = Some(Some(id));
        }

        let members = self.collect_member_facts(decl);
        let (fields, error) = self.resolve_fields(decl, &members, true);
        self.arena.pair_mut(id).fields = fields;
        match error {
            Some(error) => Err(error),
            None => Ok(id),
        }
    }

    /// Pull member facts for a declaration through the provider boundary,
    /// resolving each member's external name.
    pub(crate) fn collect_member_facts(&mut self, decl: DeclId) -> Vec<(Atom, MemberFacts)> {
        let decls = self.decls;
        let facts_provider = self.facts;
        let info = decls.get(decl);
        let mut members = Vec::with_capacity(info.members.len());
        for (index, member) in info.members.iter().enumerate() {
            let Some(facts) = facts_provider.member_facts(decl, index) else {
                continue;
            };
            let name = facts.external_name.unwrap_or(member.name);
            members.push((name, facts));
        }
        members
    }

    /// Resolve members into fields. Failures are reported per member and
    /// the scan continues; the first error is handed back so the caller
    /// can mark the owner failed.
    pub(crate) fn resolve_fields(
        &mut self,
        owner: DeclId,
        members: &[(Atom, MemberFacts)],
        require_mutable: bool,
    ) -> (Vec<Field>, Option<BuildError>) {
        let owner_name = self.display_decl(owner);
        let mut fields = Vec::with_capacity(members.len());
        let mut first_error = None;

        for (index, (name, facts)) in members.iter().enumerate() {
            let member_name = self.names.resolve_str(*name).to_string();

            if require_mutable && facts.access == AccessKind::ReadOnlyAbstract {
                let error = self.fail(
                    BuildError::MustBeFullyMutable(owner),
                    format!("record {owner_name} must be fully mutable: member {member_name} is read-only"),
                );
                first_error.get_or_insert(error);
                continue;
            }

            let nullability =
                match resolve_nullability(facts.read_nullability, facts.write_nullability) {
                    Ok(nullability) => nullability,
                    Err(_) => {
                        let error = self.fail(
                            BuildError::NullabilityMismatch(owner),
                            format!(
                                "member {owner_name}.{member_name} disagrees on read/write nullability"
                            ),
                        );
                        first_error.get_or_insert(error);
                        continue;
                    }
                };

            let declared = facts.declared.clone().with_nullability(nullability);
            let ty = match self.register(&declared) {
                Ok(ty) => ty,
                Err(error) => {
                    first_error.get_or_insert(error);
                    continue;
                }
            };

            fields.push(Field {
                index: index as u32,
                name: Some(*name),
                previous_names: facts.previous_names.clone(),
                ty,
                default: facts.default.clone(),
                access: facts.access,
            });
        }

        (fields, first_error)
    }

    /// Register a value-tuple shape as an anonymous record.
    pub(crate) fn register_tuple(&mut self, elems: &[TupleElem]) -> Result<NodeId, BuildError> {
        let mut flat = Vec::with_capacity(elems.len());
        flatten_tuple(elems, &mut flat);

        let mut keys = Vec::with_capacity(flat.len());
        for elem in flat {
            let ty = self.register(&elem.ty)?;
            keys.push(TupleFieldKey {
                ty,
                name: elem.name,
                default: elem.default.clone(),
            });
        }
        Ok(self.intern_tuple(keys))
    }

    /// Deduplicated construction of an anonymous-record pair from already
    /// registered field keys. Also used when erasing a tuple to its
    /// oblivious form.
    pub(crate) fn intern_tuple(&mut self, keys: Vec<TupleFieldKey>) -> NodeId {
        let key = TypeKey::AnonymousRecord(keys.clone());
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }

        let mut flags = NodeFlags::FINAL;
        let all_readonly = keys
            .iter()
            .all(|k| self.arena.flags(k.ty).contains(NodeFlags::READONLY_COMPLIANT));
        let all_hash_safe = keys
            .iter()
            .all(|k| self.arena.flags(k.ty).contains(NodeFlags::HASH_SAFE));
        if all_readonly {
            flags |= NodeFlags::READONLY_COMPLIANT;
        }
        if all_readonly && all_hash_safe {
            flags |= NodeFlags::HASH_SAFE;
        }

        let fields = keys
            .iter()
            .enumerate()
            .map(|(index, k)| Field {
                index: index as u32,
                name: k.name,
                previous_names: SmallVec::new(),
                ty: k.ty,
                default: k.default.clone(),
                access: AccessKind::HasSetter,
            })
            .collect();

        let mut pair = TypePair::new(key.clone())
            .with_flags(flags)
            .with_default(DefaultInfo::Value(SynthDefault::Instance));
        pair.fields = fields;
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.arena.pair_mut(id).regular = Some(Some(id));

        // The oblivious form erases names and defaults and takes each
        // field type's own oblivious form. A tuple that already is that
        // form is its own fixed point.
        let erased: Vec<TupleFieldKey> = keys
            .iter()
            .map(|k| TupleFieldKey {
                ty: self.oblivious_of(k.ty),
                name: None,
                default: None,
            })
            .collect();
        let oblivious = if erased == keys {
            id
        } else {
            self.intern_tuple(erased)
        };
        self.arena.pair_mut(id).oblivious = Some(oblivious.non_nullable());
        id
    }
}

/// Flatten a declared tuple into one field list.
///
/// Host tuples carry elements beyond seven in a trailing unnamed tuple
/// continuation at the eighth slot; the continuation is transparent and
/// contributes its elements to the flat list.
fn flatten_tuple<'t>(elems: &'t [TupleElem], out: &mut Vec<&'t TupleElem>) {
    for (index, elem) in elems.iter().enumerate() {
        if index == 7
            && elem.name.is_none()
            && elem.default.is_none()
            && !elem.ty.is_declared_nullable()
        {
            if let TypeDesc::Tuple(rest) = &elem.ty.desc {
                flatten_tuple(rest, out);
                continue;
            }
        }
        out.push(elem);
    }
}

#[cfg(test)]
#[path = "tests/records_tests.rs"]
mod tests;
