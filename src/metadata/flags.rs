//! Attribute flags for foreign types, methods and fields.
//!
//! The raw rows keep the 32-bit/16-bit attribute words exactly as the metadata stores them; these
//! types extract the pieces the importer cares about.
//!
//! # Key Types
//! - [`TypeAttributes`]: class semantics (class vs. interface) and the bits used when scaffolding
//! - [`MethodModifiers`], [`FieldModifiers`]: static / special-name bits
//! - [`CallingConvention`]: the vararg bit of a method signature
//! - [`MemberAccess`]: the 3-bit member access field shared by methods and fields

use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

/// Bitmask for member `ACCESS` extraction (methods and fields share the encoding)
pub const MEMBER_ACCESS_MASK: u32 = 0x0007;
/// Bitmask for the type `CLASS_SEMANTICS` extraction
pub const TYPE_CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Type attribute flags (the subset the importer reads)
    pub struct TypeAttributes: u32 {
        /// Type is visible outside its assembly
        const PUBLIC = 0x0000_0001;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type is abstract
        const ABSTRACT = 0x0000_0080;
        /// Type can not be derived from
        const SEALED = 0x0000_0100;
        /// Name is special
        const SPECIAL_NAME = 0x0000_0400;
    }
}

impl TypeAttributes {
    /// Extract the interpreted flags from a raw `TypeDef.Flags` word
    #[must_use]
    pub fn from_type_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags)
    }

    /// True when the class semantics bit marks an interface
    #[must_use]
    pub fn is_interface(flags: u32) -> bool {
        flags & TYPE_CLASS_SEMANTICS_MASK == Self::INTERFACE.bits()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Method modifiers and properties
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

impl MethodModifiers {
    /// Extract method modifiers from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !MEMBER_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Field modifiers
    pub struct FieldModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Field can only be initialized, not written to after init
        const INIT_ONLY = 0x0020;
        /// Value is compile time constant
        const LITERAL = 0x0040;
        /// Field is special
        const SPECIAL_NAME = 0x0200;
        /// CLI provides 'special' behavior, depending upon the name of the field
        const RTSPECIAL_NAME = 0x0400;
    }
}

impl FieldModifiers {
    /// Extract field modifiers from raw field attributes
    #[must_use]
    pub fn from_field_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !MEMBER_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Calling convention bits from a method signature
    pub struct CallingConvention: u8 {
        /// Signature has an explicit `this`
        const HAS_THIS = 0x20;
        /// Variable argument list
        const VARARG = 0x05;
        /// Method is generic
        const GENERIC = 0x10;
    }
}

impl CallingConvention {
    /// True if the low nibble encodes the vararg calling convention
    #[must_use]
    pub fn is_vararg(self) -> bool {
        self.bits() & 0x0F == Self::VARARG.bits()
    }
}

/// Member access, the low three bits of method and field attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum MemberAccess {
    /// Member not referenceable
    CompilerControlled,
    /// Accessible only by the parent type
    Private,
    /// Accessible by sub-types only in this assembly
    FamAndAssem,
    /// Accessible by anyone in the assembly
    Assem,
    /// Accessible only by type and sub-types
    Family,
    /// Accessible by sub-types anywhere, plus anyone in assembly
    FamOrAssem,
    /// Accessible by anyone who has visibility to this scope
    Public,
}

impl MemberAccess {
    /// Extract the access field from raw method or field attributes
    #[must_use]
    pub fn from_flags(flags: u32) -> Self {
        match flags & MEMBER_ACCESS_MASK {
            0x1 => MemberAccess::Private,
            0x2 => MemberAccess::FamAndAssem,
            0x3 => MemberAccess::Assem,
            0x4 => MemberAccess::Family,
            0x5 => MemberAccess::FamOrAssem,
            0x6 => MemberAccess::Public,
            _ => MemberAccess::CompilerControlled,
        }
    }

    /// The raw encoding of this access level
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            MemberAccess::CompilerControlled => 0x0,
            MemberAccess::Private => 0x1,
            MemberAccess::FamAndAssem => 0x2,
            MemberAccess::Assem => 0x3,
            MemberAccess::Family => 0x4,
            MemberAccess::FamOrAssem => 0x5,
            MemberAccess::Public => 0x6,
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_member_access_roundtrip_bits() {
        for access in MemberAccess::iter() {
            assert_eq!(MemberAccess::from_flags(access.bits() | 0x0010), access);
        }
    }

    #[test]
    fn test_reserved_access_value() {
        assert_eq!(MemberAccess::from_flags(0x7), MemberAccess::CompilerControlled);
    }

    #[test]
    fn test_interface_semantics() {
        assert!(TypeAttributes::is_interface(0x0000_00A1));
        assert!(!TypeAttributes::is_interface(0x0010_0001));
    }

    #[test]
    fn test_modifiers_ignore_access() {
        let modifiers = MethodModifiers::from_method_flags(0x0006 | 0x0010 | 0x0800);
        assert!(modifiers.contains(MethodModifiers::STATIC));
        assert!(modifiers.contains(MethodModifiers::SPECIAL_NAME));
        assert!(!modifiers.contains(MethodModifiers::FINAL));
    }

    #[test]
    fn test_vararg_calling_convention() {
        assert!(CallingConvention::from_bits_retain(0x25).is_vararg());
        assert!(!CallingConvention::HAS_THIS.is_vararg());
    }
}
