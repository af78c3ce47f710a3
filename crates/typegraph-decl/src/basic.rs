//! The closed allow-list of basic value shapes.

use crate::default_value::{DefaultValue, OrderedFloat};

/// Basic value shapes the builder accepts as leaf types.
///
/// The set is fixed and known in full; registration of anything outside it
/// is an unsupported-shape error, never a fallback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BasicKind {
    Bool,
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    I128,
    U128,
    F32,
    F64,
    Decimal,
    DateTime,
    Guid,
    BigInt,
    Str,
    Char,
}

impl BasicKind {
    /// Integer widths usable as an enum's underlying type.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::I8
                | BasicKind::U8
                | BasicKind::I16
                | BasicKind::U16
                | BasicKind::I32
                | BasicKind::U32
                | BasicKind::I64
                | BasicKind::U64
                | BasicKind::I128
                | BasicKind::U128
        )
    }

    /// The built-in zero default every basic shape carries.
    pub fn default_value(self) -> DefaultValue {
        match self {
            BasicKind::Bool => DefaultValue::Bool(false),
            BasicKind::I8
            | BasicKind::U8
            | BasicKind::I16
            | BasicKind::U16
            | BasicKind::I32
            | BasicKind::U32
            | BasicKind::I64
            | BasicKind::U64
            | BasicKind::I128
            | BasicKind::U128 => DefaultValue::Int(0),
            BasicKind::F32 | BasicKind::F64 => DefaultValue::Float(OrderedFloat(0.0)),
            // Decimal, DateTime, Guid and BigInt all have a canonical zero
            // value the emitter can synthesize without arguments.
            BasicKind::Decimal | BasicKind::DateTime | BasicKind::Guid | BasicKind::BigInt => {
                DefaultValue::Zero
            }
            BasicKind::Str => DefaultValue::Str(typegraph_common::Atom::NONE),
            BasicKind::Char => DefaultValue::Char('\0'),
        }
    }

    /// Canonical signature text, also used in diagnostics.
    pub fn signature(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::I8 => "i8",
            BasicKind::U8 => "u8",
            BasicKind::I16 => "i16",
            BasicKind::U16 => "u16",
            BasicKind::I32 => "i32",
            BasicKind::U32 => "u32",
            BasicKind::I64 => "i64",
            BasicKind::U64 => "u64",
            BasicKind::I128 => "i128",
            BasicKind::U128 => "u128",
            BasicKind::F32 => "f32",
            BasicKind::F64 => "f64",
            BasicKind::Decimal => "decimal",
            BasicKind::DateTime => "datetime",
            BasicKind::Guid => "guid",
            BasicKind::BigInt => "bigint",
            BasicKind::Str => "str",
            BasicKind::Char => "char",
        }
    }
}
