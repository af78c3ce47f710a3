//! Interface family and abstract-interface registration.
//!
//! A family is one entity declared across several interface declarations.
//! The primary interface owns the merged field list; secondary interfaces
//! are thin aliases that forward fields, defaults and canonical forms to
//! the primary. Marker declarations become abstract interfaces whose
//! member set is resolved by a memoized walk over sub-markers and
//! implementing families.

use crate::builder::{AbstractState, Builder};
use crate::errors::BuildError;
use crate::node::{DefaultInfo, NodeFlags, NodeId, SynthDefault, TypeKey, TypePair};
use tracing::trace;
use typegraph_common::Atom;
use typegraph_decl::{DeclId, MemberFacts, resolve_nullability};

impl<'a> Builder<'a> {
    /// Register the family at `index`: the primary interface pair, one
    /// secondary pair per remaining declaration, and the merged fields.
    pub(crate) fn register_family(&mut self, index: usize) -> Result<NodeId, BuildError> {
        let primary_decl = self.families[index].primary();
        let key = TypeKey::PrimaryInterface(primary_decl);
        if let Some(id) = self.registry.lookup_key(&key) {
            return Ok(id);
        }
        trace!(family = index, "registering interface family");

        let decls = self.decls;
        let info = decls.get(primary_decl);
        let mut flags = NodeFlags::FINAL;
        if self.families[index].interfaces.len() > 1 {
            flags |= NodeFlags::POLYMORPHIC;
        }

        // Primary placeholder before anything that can recurse back here.
        let pair = TypePair::new(key.clone())
            .with_flags(flags)
            .with_decl(primary_decl, info.name)
            .with_default(DefaultInfo::Value(SynthDefault::Instance));
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.registry.insert_decl(primary_decl, id);
        {
            let pair = self.arena.pair_mut(id);
            pair.oblivious = Some(id);
            pair.regular = Some(Some(id));
        }

        // Secondaries next, so fields typed as a sibling interface resolve
        // through the registry instead of re-entering this family.
        let secondaries: Vec<DeclId> = self.families[index].secondaries().to_vec();
        for secondary in secondaries {
            let secondary_key = TypeKey::SecondaryInterface(secondary);
            let secondary_info = decls.get(secondary);
            let pair = TypePair::new(secondary_key.clone())
                .with_flags(flags)
                .with_decl(secondary, secondary_info.name)
                .with_default(DefaultInfo::Value(SynthDefault::Instance));
            let secondary_id = self.arena.alloc(pair);
            self.registry.insert_key(secondary_key, secondary_id);
            self.registry.insert_decl(secondary, secondary_id);
            let pair = self.arena.pair_mut(secondary_id);
            pair.primary = Some(id);
            pair.oblivious = Some(id);
            pair.regular = Some(Some(id));
        }

        let (members, merge_error) = self.merge_family_members(index, primary_decl);
        let (fields, field_error) = self.resolve_fields(primary_decl, &members, false);
        self.arena.pair_mut(id).fields = fields;
        match merge_error.or(field_error) {
            Some(error) => Err(error),
            None => Ok(id),
        }
    }

    /// Merge member declarations across every interface of a family.
    ///
    /// A member declared by several interfaces must agree on declared type,
    /// nullability and default; the first declaration wins and later
    /// agreeing ones are skipped.
    fn merge_family_members(
        &mut self,
        index: usize,
        primary_decl: DeclId,
    ) -> (Vec<(Atom, MemberFacts)>, Option<BuildError>) {
        let interfaces: Vec<DeclId> = self.families[index].interfaces.clone();
        let mut merged: Vec<(Atom, MemberFacts)> = Vec::new();
        let mut first_error = None;

        for decl in interfaces {
            for (name, facts) in self.collect_member_facts(decl) {
                let Some(position) = merged.iter().position(|(n, _)| *n == name) else {
                    merged.push((name, facts));
                    continue;
                };
                let existing = &merged[position].1;
                // Shape only; declared nullability is judged after the
                // Unknown -> Nullable normalization below.
                let type_conflict = existing.declared.desc != facts.declared.desc;
                let nullability_conflict =
                    resolve_nullability(existing.read_nullability, existing.write_nullability)
                        != resolve_nullability(facts.read_nullability, facts.write_nullability);
                let default_conflict = existing.default != facts.default;

                let member_name = self.names.resolve_str(name).to_string();
                let owner_name = self.display_decl(primary_decl);
                if type_conflict {
                    let error = self.fail(
                        BuildError::FieldTypeConflict(primary_decl),
                        format!(
                            "family of {owner_name} declares member {member_name} with conflicting types"
                        ),
                    );
                    first_error.get_or_insert(error);
                } else if nullability_conflict {
                    let error = self.fail(
                        BuildError::NullabilityMismatch(primary_decl),
                        format!(
                            "family of {owner_name} declares member {member_name} with conflicting nullability"
                        ),
                    );
                    first_error.get_or_insert(error);
                } else if default_conflict {
                    let error = self.fail(
                        BuildError::FieldDefaultConflict(primary_decl),
                        format!(
                            "family of {owner_name} declares member {member_name} with conflicting defaults"
                        ),
                    );
                    first_error.get_or_insert(error);
                }
            }
        }
        (merged, first_error)
    }

    /// Resolve a marker declaration into an abstract interface.
    ///
    /// Members are the abstract interfaces of markers that directly extend
    /// this one plus the primaries of families whose primary directly
    /// implements it. Memoized; re-entry while in progress is an extension
    /// cycle.
    pub(crate) fn resolve_abstract(&mut self, marker: DeclId) -> Result<NodeId, BuildError> {
        match self.abstract_state.get(&marker) {
            Some(AbstractState::Done(id)) => return Ok(*id),
            Some(AbstractState::InProgress) => {
                let name = self.display_decl(marker);
                return Err(self.fail(
                    BuildError::AbstractInterfaceCycle(marker),
                    format!("abstract interface {name} extends itself"),
                ));
            }
            None => {}
        }
        self.abstract_state.insert(marker, AbstractState::InProgress);

        let decls = self.decls;
        let info = decls.get(marker);
        let mut members = Vec::new();
        let mut first_error = None;

        let sub_markers: Vec<DeclId> = decls
            .markers()
            .filter(|sub| decls.get(*sub).extends.contains(&marker))
            .collect();
        for sub in sub_markers {
            match self.resolve_abstract(sub) {
                Ok(member) => members.push(member),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        for index in 0..self.families.len() {
            let primary = self.families[index].primary();
            if !decls.get(primary).extends.contains(&marker) {
                continue;
            }
            match self.register_family(index) {
                Ok(member) => members.push(member),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }
        members.sort();
        members.dedup();

        if members.is_empty() {
            let name = self.display_decl(marker);
            self.warn(
                typegraph_common::codes::IMPLEMENTATIONLESS_ABSTRACT,
                format!("abstract interface {name} has no implementation"),
            );
        }

        let key = TypeKey::AbstractInterface(marker);
        let pair = TypePair::new(key.clone())
            .with_flags(NodeFlags::POLYMORPHIC)
            .with_decl(marker, info.name)
            .with_default(DefaultInfo::Disallowed);
        let id = self.arena.alloc(pair);
        self.registry.insert_key(key, id);
        self.registry.insert_decl(marker, id);
        {
            let pair = self.arena.pair_mut(id);
            pair.members = members;
            pair.oblivious = Some(id);
            pair.regular = Some(Some(id));
        }
        self.abstract_state.insert(marker, AbstractState::Done(id));

        // Member failures were already reported; the node itself is still
        // usable for the rest of the run.
        let _ = first_error;
        Ok(id)
    }
}

#[cfg(test)]
#[path = "tests/interfaces_tests.rs"]
mod tests;
