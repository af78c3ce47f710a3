//! Union vetting and normalization.
//!
//! Declared alternative sets are vetted (no top type, no nullable members),
//! deduplicated, checked pairwise for related members, and finally sorted
//! by structural signature so member order never affects identity. The
//! synthesized default delegates to the first declaration-order member that
//! has one.

use crate::builder::Builder;
use crate::errors::BuildError;
use crate::node::{DefaultInfo, NodeFlags, NodeId, SynthDefault, TypeKey, TypeKind, TypePair};
use typegraph_common::codes;
use typegraph_decl::{Nullability, TypeDesc, TypeRef};

impl<'a> Builder<'a> {
    /// Resolve a declared union into its canonical node.
    ///
    /// With `can_extend` a member assignable to another member is absorbed
    /// with a warning; without it the same situation is an ambiguity error,
    /// because a value of the more specific member could serialize under
    /// either alternative.
    pub(crate) fn resolve_union(
        &mut self,
        members: &[TypeRef],
        can_extend: bool,
    ) -> Result<NodeId, BuildError> {
        let mut ids: Vec<NodeId> = Vec::with_capacity(members.len());
        for member in members {
            if matches!(member.desc, TypeDesc::Any) {
                return Err(self.fail(
                    BuildError::UnionErasedByAny,
                    "a union alternative of the top type would erase the union",
                ));
            }
            if member.nullability == Nullability::Nullable {
                return Err(self.fail(
                    BuildError::UnionMemberNullable,
                    "union alternatives must not be declared nullable; make the union itself nullable",
                ));
            }
            let id = self.register_member(member)?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        // Pairwise relatedness in declaration order.
        let mut removed = vec![false; ids.len()];
        for i in 0..ids.len() {
            if removed[i] {
                continue;
            }
            for j in (i + 1)..ids.len() {
                if removed[j] {
                    continue;
                }
                let (general, specific) = if self.is_assignable(ids[j], ids[i]) {
                    (ids[i], ids[j])
                } else if self.is_assignable(ids[i], ids[j]) {
                    (ids[j], ids[i])
                } else {
                    continue;
                };
                if !can_extend {
                    let general_sig = self.signature(general);
                    let specific_sig = self.signature(specific);
                    return Err(self.fail(
                        BuildError::AmbiguousUnion(general, specific),
                        format!(
                            "ambiguous union: {specific_sig} is assignable to alternative {general_sig}"
                        ),
                    ));
                }
                let general_sig = self.signature(general);
                let specific_sig = self.signature(specific);
                self.warn(
                    codes::REDUNDANT_UNION_MEMBER,
                    format!("union alternative {specific_sig} is absorbed by {general_sig}"),
                );
                let absorbed = if specific == ids[i] { i } else { j };
                removed[absorbed] = true;
                if absorbed == i {
                    break;
                }
            }
        }
        let survivors: Vec<NodeId> = ids
            .iter()
            .zip(&removed)
            .filter(|(_, removed)| !**removed)
            .map(|(id, _)| *id)
            .collect();

        // First surviving declaration-order member with a default becomes
        // the union's default member.
        let default_member = survivors
            .iter()
            .copied()
            .find(|m| self.arena.default_of(*m).is_synthesizable());

        let mut sorted = survivors;
        self.sort_by_signature(&mut sorted);
        Ok(self.intern_union(sorted, default_member))
    }

    /// Register a union member descriptor as its non-nullable node.
    fn register_member(&mut self, member: &TypeRef) -> Result<NodeId, BuildError> {
        let registered = self.register(&member.clone().with_nullability(Nullability::NonNullable))?;
        Ok(registered.non_nullable())
    }

    /// Deduplicated construction of a union pair from an already sorted,
    /// deduplicated member set.
    pub(crate) fn intern_union(
        &mut self,
        members: Vec<NodeId>,
        default_member: Option<NodeId>,
    ) -> NodeId {
        let key = TypeKey::Union(members.clone());
        if let Some(id) = self.registry.lookup_key(&key) {
            return id;
        }
        let default = match default_member {
            Some(member) => DefaultInfo::Value(SynthDefault::Member(member)),
            None => DefaultInfo::None,
        };
        let mut pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::POLYMORPHIC)
            .with_default(default);
        pair.members = members.clone();
        pair.default_member = default_member;
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.arena.pair_mut(id).regular = Some(Some(id));

        // The oblivious union carries its members' oblivious forms.
        let mut erased: Vec<NodeId> = Vec::with_capacity(members.len());
        for &member in &members {
            let oblivious = self.oblivious_of(member).non_nullable();
            if !erased.contains(&oblivious) {
                erased.push(oblivious);
            }
        }
        self.sort_by_signature(&mut erased);
        let oblivious = if erased == members {
            id
        } else {
            let erased_default = default_member
                .map(|m| self.oblivious_of(m).non_nullable())
                .filter(|m| erased.contains(m));
            self.intern_union(erased, erased_default)
        };
        self.arena.pair_mut(id).oblivious = Some(oblivious);
        id
    }

    fn sort_by_signature(&mut self, members: &mut [NodeId]) {
        let mut keyed: Vec<(String, NodeId)> = members
            .iter()
            .map(|&m| {
                let mut buffer = self.sig_pool.acquire();
                crate::signature::write_signature(&self.arena, self.names, m, &mut buffer);
                (buffer, m)
            })
            .collect();
        keyed.sort();
        for (slot, (buffer, id)) in members.iter_mut().zip(keyed) {
            *slot = id;
            self.sig_pool.release(buffer);
        }
    }

    /// Structural assignability as unions see it: identity after alias
    /// normalization, or membership in an abstract interface's transitive
    /// member set.
    pub(crate) fn is_assignable(&self, sub: NodeId, sup: NodeId) -> bool {
        let sub = self.normalize_alias(sub.non_nullable());
        let sup = self.normalize_alias(sup.non_nullable());
        if sub == sup {
            return true;
        }
        if self.arena.kind(sup) == TypeKind::AbstractInterface {
            return self.abstract_contains(sup, sub);
        }
        false
    }

    /// A secondary interface is the same entity as its primary.
    fn normalize_alias(&self, id: NodeId) -> NodeId {
        self.arena.pair(id).primary.unwrap_or(id)
    }

    fn abstract_contains(&self, abstract_id: NodeId, target: NodeId) -> bool {
        for &member in &self.arena.pair(abstract_id).members {
            if member == target {
                return true;
            }
            if self.arena.kind(member) == TypeKind::AbstractInterface
                && self.abstract_contains(member, target)
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
#[path = "tests/unions_tests.rs"]
mod tests;
