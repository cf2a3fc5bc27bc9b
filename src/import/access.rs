//! Foreign member access to host access specifiers.

use crate::{metadata::flags::MemberAccess, sema::AccessSpecifier};

/// Map foreign member access to a host access specifier.
///
/// Total over [`MemberAccess`]; compiler-controlled members become private.
#[must_use]
pub fn map_member_access(access: MemberAccess) -> AccessSpecifier {
    match access {
        MemberAccess::Public => AccessSpecifier::Public,
        MemberAccess::Assem => AccessSpecifier::Internal,
        MemberAccess::Family => AccessSpecifier::Protected,
        MemberAccess::FamOrAssem => AccessSpecifier::ProtectedPublic,
        MemberAccess::FamAndAssem => AccessSpecifier::ProtectedPrivate,
        MemberAccess::Private | MemberAccess::CompilerControlled => AccessSpecifier::Private,
    }
}

/// Map raw method or field attributes to a host access specifier
#[must_use]
pub fn map_access_flags(flags: u32) -> AccessSpecifier {
    map_member_access(MemberAccess::from_flags(flags))
}
