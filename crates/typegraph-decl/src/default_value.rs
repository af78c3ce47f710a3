//! Attribute-supplied and synthesized default values.

use std::fmt;
use std::hash::{Hash, Hasher};
use typegraph_common::Atom;

/// f64 wrapper with total equality and hashing by bit pattern, so default
/// values can participate in structural signatures.
#[derive(Copy, Clone, Debug)]
pub struct OrderedFloat(pub f64);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl Hash for OrderedFloat {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl fmt::Display for OrderedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A concrete default value carried on a field or synthesized for a type.
///
/// These are the literal forms a Member Facts Provider can supply; the
/// solver adds its own structural defaults (empty collection, constructed
/// instance, union member) on top.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    /// Null / none, the default of every nullable node.
    Null,
    Bool(bool),
    /// All integer widths share one literal representation.
    Int(i128),
    Float(OrderedFloat),
    Str(Atom),
    Char(char),
    /// Canonical zero of decimal/datetime/guid/bigint shapes.
    Zero,
    /// An enum member, by its declared integral value.
    EnumMember(i128),
}

impl DefaultValue {
    /// Render into a signature buffer. Atoms render by index; the signature
    /// only needs to be deterministic, not human-readable.
    pub fn write_signature(&self, out: &mut String) {
        use std::fmt::Write;
        match self {
            DefaultValue::Null => out.push_str("null"),
            DefaultValue::Bool(v) => {
                let _ = write!(out, "{v}");
            }
            DefaultValue::Int(v) => {
                let _ = write!(out, "{v}");
            }
            DefaultValue::Float(v) => {
                let _ = write!(out, "{v}");
            }
            DefaultValue::Str(atom) => {
                let _ = write!(out, "s#{}", atom.index());
            }
            DefaultValue::Char(c) => {
                let _ = write!(out, "'{c}'");
            }
            DefaultValue::Zero => out.push_str("zero"),
            DefaultValue::EnumMember(v) => {
                let _ = write!(out, "e#{v}");
            }
        }
    }
}
