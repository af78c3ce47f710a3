//! String interner for name deduplication.
//!
//! Intern strings into a pool and pass around u32 indices (Atoms). This
//! eliminates duplicate allocations for common member names like "id",
//! "name", "value", and makes name comparison an integer comparison.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Member names that appear in almost every declared data model. Interned
/// up front so their atoms are stable and cheap.
const COMMON_STRINGS: &[&str] = &[
    "", "id", "name", "value", "key", "kind", "type", "items", "index", "count", "data", "flags",
    "parent", "children", "created", "updated", "version",
];

/// String interner backed by a single map.
///
/// The builder is single-threaded by design, so no sharding or locking is
/// needed; resolved strings are still `Arc<str>` so callers can hold them
/// across later interner growth.
pub struct Interner {
    map: FxHashMap<Arc<str>, u32>,
    strings: Vec<Arc<str>>,
}

impl Interner {
    /// Create an interner with the common strings pre-registered.
    ///
    /// Atom 0 is always the empty string, matching `Atom::NONE`.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(COMMON_STRINGS.len()),
        };
        for s in COMMON_STRINGS {
            interner.intern(s);
        }
        interner
    }

    /// Intern a string, returning its Atom.
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&index) = self.map.get(s) {
            return Atom(index);
        }
        let arc: Arc<str> = Arc::from(s);
        let index = self.strings.len() as u32;
        self.strings.push(arc.clone());
        self.map.insert(arc, index);
        Atom(index)
    }

    /// Intern an owned string without re-allocating it.
    pub fn intern_owned(&mut self, s: String) -> Atom {
        if let Some(&index) = self.map.get(s.as_str()) {
            return Atom(index);
        }
        let arc: Arc<str> = Arc::from(s);
        let index = self.strings.len() as u32;
        self.strings.push(arc.clone());
        self.map.insert(arc, index);
        Atom(index)
    }

    /// Resolve an Atom back to its string.
    ///
    /// Unknown atoms resolve to the empty string rather than panicking; an
    /// unknown atom is a programming error surfaced by tests, not by users.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.strings
            .get(atom.0 as usize)
            .cloned()
            .unwrap_or_else(|| self.strings[0].clone())
    }

    /// Resolve an Atom to a borrowed `&str`.
    pub fn resolve_str(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if only the pre-registered strings are present.
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= COMMON_STRINGS.len()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}
