use strum::{Display, EnumCount, EnumIter};

/// Host access specifier attached to imported declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum AccessSpecifier {
    /// `public`
    #[strum(serialize = "public")]
    Public,
    /// `protected`
    #[strum(serialize = "protected")]
    Protected,
    /// `private`
    #[strum(serialize = "private")]
    Private,
    /// `internal`, visible within the defining module
    #[strum(serialize = "internal")]
    Internal,
    /// `protected public`: sub-types anywhere, plus anyone in the module
    #[strum(serialize = "protected public")]
    ProtectedPublic,
    /// `protected private`: sub-types within the module only
    #[strum(serialize = "protected private")]
    ProtectedPrivate,
    /// No access applies (namespaces, parameters)
    #[strum(serialize = "none")]
    None,
}

impl AccessSpecifier {
    /// True for any specifier that grants access from outside the declaring record
    #[must_use]
    pub fn is_accessible_externally(self) -> bool {
        matches!(
            self,
            AccessSpecifier::Public | AccessSpecifier::Internal | AccessSpecifier::ProtectedPublic
        )
    }
}
