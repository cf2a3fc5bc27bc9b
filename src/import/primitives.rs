//! The fixed mapping from foreign fundamental types to host builtins.
//!
//! Entries are matched by metadata token when the table was bound to the core library
//! ([`PrimitiveTable::from_source`]), otherwise by a hash of the fully qualified name, confirmed
//! by a string compare. The table is built once and only read afterwards.

use std::sync::{Arc, OnceLock};

use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    metadata::{source::MetadataSource, token::Token},
    sema::{BuiltinType, HostType},
};

/// Root namespace of the standard table
pub const STANDARD_ROOT_NAMESPACE: &str = "System";

/// Foreign fundamental types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum PrimitiveKind {
    /// `Void`
    Void,
    /// `Boolean`
    Boolean,
    /// `Char`, a UTF-16 code unit
    Char,
    /// `Byte`
    Byte,
    /// `SByte`
    SByte,
    /// `Int16`
    Int16,
    /// `UInt16`
    UInt16,
    /// `Int32`
    Int32,
    /// `UInt32`
    UInt32,
    /// `Int64`
    Int64,
    /// `UInt64`
    UInt64,
    /// `Single`
    Single,
    /// `Double`
    Double,
    /// `String`
    String,
    /// `IntPtr`
    IntPtr,
    /// `UIntPtr`
    UIntPtr,
}

impl PrimitiveKind {
    /// Simple name within the root namespace
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "Void",
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::SByte => "SByte",
            PrimitiveKind::Int16 => "Int16",
            PrimitiveKind::UInt16 => "UInt16",
            PrimitiveKind::Int32 => "Int32",
            PrimitiveKind::UInt32 => "UInt32",
            PrimitiveKind::Int64 => "Int64",
            PrimitiveKind::UInt64 => "UInt64",
            PrimitiveKind::Single => "Single",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::String => "String",
            PrimitiveKind::IntPtr => "IntPtr",
            PrimitiveKind::UIntPtr => "UIntPtr",
        }
    }

    /// The host builtin this primitive maps to
    #[must_use]
    pub fn builtin(self) -> BuiltinType {
        match self {
            PrimitiveKind::Void => BuiltinType::Void,
            PrimitiveKind::Boolean => BuiltinType::Bool,
            PrimitiveKind::Char => BuiltinType::WChar,
            PrimitiveKind::Byte => BuiltinType::UChar,
            PrimitiveKind::SByte => BuiltinType::SChar,
            PrimitiveKind::Int16 => BuiltinType::Short,
            PrimitiveKind::UInt16 => BuiltinType::UShort,
            PrimitiveKind::Int32 => BuiltinType::Int,
            PrimitiveKind::UInt32 => BuiltinType::UInt,
            PrimitiveKind::Int64 => BuiltinType::LongLong,
            PrimitiveKind::UInt64 => BuiltinType::ULongLong,
            PrimitiveKind::Single => BuiltinType::Float,
            PrimitiveKind::Double => BuiltinType::Double,
            PrimitiveKind::String => BuiltinType::String,
            PrimitiveKind::IntPtr => BuiltinType::IntPtr,
            PrimitiveKind::UIntPtr => BuiltinType::UIntPtr,
        }
    }

    /// True for the reference-kind primitive, used through a handle
    #[must_use]
    pub fn is_reference(self) -> bool {
        self == PrimitiveKind::String
    }

    /// The mapped host type, in handle form for reference kinds
    #[must_use]
    pub fn host_type(self) -> HostType {
        let builtin = HostType::Builtin(self.builtin());
        if self.is_reference() {
            builtin.handle()
        } else {
            builtin
        }
    }
}

/// Hash of a fully qualified type name (FNV-1a with an extra avalanche step)
#[must_use]
pub fn name_hash(full_name: &str) -> u64 {
    let mut state = 0xcbf2_9ce4_8422_2325_u64;
    for byte in full_name.bytes() {
        state ^= u64::from(byte);
        state = state.wrapping_mul(0x0100_0000_01b3_u64);
    }

    state ^= state >> 33;
    state = state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
    state ^= state >> 33;
    state
}

/// One row of the primitive table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveEntry {
    /// Hash of `full_name`
    pub hash: u64,
    /// Fully qualified foreign name
    pub full_name: String,
    /// Which primitive this is
    pub kind: PrimitiveKind,
    /// The mapped host type
    pub host: HostType,
    /// Token of the defining type in the bound core library
    pub token: Option<Token>,
}

/// Foreign fundamental types and their host counterparts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveTable {
    root: String,
    module: Option<String>,
    entries: Vec<PrimitiveEntry>,
}

impl PrimitiveTable {
    /// Build the table for `root_namespace`, without tokens
    #[must_use]
    pub fn new(root_namespace: &str) -> Self {
        let entries = PrimitiveKind::iter()
            .map(|kind| {
                let full_name = format!("{root_namespace}.{}", kind.name());
                PrimitiveEntry {
                    hash: name_hash(&full_name),
                    full_name,
                    kind,
                    host: kind.host_type(),
                    token: None,
                }
            })
            .collect();

        PrimitiveTable {
            root: root_namespace.to_string(),
            module: None,
            entries,
        }
    }

    /// The shared table for the `System` root namespace
    #[must_use]
    pub fn standard() -> Arc<PrimitiveTable> {
        static STANDARD: OnceLock<Arc<PrimitiveTable>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(PrimitiveTable::new(STANDARD_ROOT_NAMESPACE)))
            .clone()
    }

    /// Build the table and bind every primitive the core library defines to its token
    #[must_use]
    pub fn from_source(root_namespace: &str, core_library: &dyn MetadataSource) -> Self {
        let mut table = Self::new(root_namespace);
        table.module = Some(core_library.module_name().to_string());
        for entry in &mut table.entries {
            entry.token = core_library.find_type(root_namespace, entry.kind.name());
        }
        table
    }

    /// Root namespace of the table
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        &self.root
    }

    /// All entries, in [`PrimitiveKind`] order
    #[must_use]
    pub fn entries(&self) -> &[PrimitiveEntry] {
        &self.entries
    }

    /// The entry of `kind`
    #[must_use]
    pub fn get(&self, kind: PrimitiveKind) -> Option<&PrimitiveEntry> {
        self.entries.iter().find(|entry| entry.kind == kind)
    }

    /// Module the tokens were bound from, if any
    #[must_use]
    pub fn bound_module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Match a foreign type: bound token first, then full-name hash.
    ///
    /// Tokens are only unique within one module, so the token match applies only when `module`
    /// is the module the table was bound from.
    #[must_use]
    pub fn lookup(&self, module: &str, token: Token, full_name: &str) -> Option<&PrimitiveEntry> {
        if self.module.as_deref() == Some(module) {
            if let Some(entry) = self.entries.iter().find(|entry| entry.token == Some(token)) {
                return Some(entry);
            }
        }

        self.lookup_name(full_name)
    }

    /// Match a foreign type by fully qualified name
    #[must_use]
    pub fn lookup_name(&self, full_name: &str) -> Option<&PrimitiveEntry> {
        let hash = name_hash(full_name);
        self.entries
            .iter()
            .find(|entry| entry.hash == hash && entry.full_name == full_name)
    }
}
