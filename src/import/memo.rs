//! The declaration memo, keyed by foreign identity.
//!
//! Every declaration the importer creates for a foreign entity is entered here under its
//! `(token, kind)` key before anything recursive happens on its behalf. A later request for the
//! same entity, including a re-entrant one issued while the declaration is still being populated,
//! is answered from the memo and never creates a second declaration.
//!
//! One memo covers one foreign module: tokens are only unique within a module.

use crossbeam_skiplist::SkipMap;

use crate::{metadata::token::Token, sema::DeclId};

/// What kind of declaration a memo entry names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemoKind {
    /// A record (or the class template wrapping it) for a `TypeDef`
    Record,
    /// A function for a `MethodDef`
    Method,
    /// The synthesized `cli::array` class template
    ArrayTemplate,
}

/// Memo key: foreign identity plus declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoKey {
    /// Foreign token (null for synthesized entries)
    pub token: Token,
    /// Declaration kind
    pub kind: MemoKind,
}

impl MemoKey {
    /// Key of the record imported for `token`
    #[must_use]
    pub fn record(token: Token) -> Self {
        MemoKey {
            token,
            kind: MemoKind::Record,
        }
    }

    /// Key of the function imported for `token`
    #[must_use]
    pub fn method(token: Token) -> Self {
        MemoKey {
            token,
            kind: MemoKind::Method,
        }
    }

    /// Key of the `cli::array` template
    #[must_use]
    pub fn array_template() -> Self {
        MemoKey {
            token: Token::default(),
            kind: MemoKind::ArrayTemplate,
        }
    }
}

/// Identity-keyed cache of imported declarations
#[derive(Default)]
pub struct DeclMemo {
    entries: SkipMap<MemoKey, DeclId>,
}

impl DeclMemo {
    /// An empty memo
    #[must_use]
    pub fn new() -> Self {
        DeclMemo {
            entries: SkipMap::new(),
        }
    }

    /// The declaration entered for `key`
    #[must_use]
    pub fn get(&self, key: MemoKey) -> Option<DeclId> {
        self.entries.get(&key).map(|entry| *entry.value())
    }

    /// Enter `decl` for `key` unless an entry exists; returns the entry now in the memo
    pub fn insert(&self, key: MemoKey, decl: DeclId) -> DeclId {
        *self.entries.get_or_insert(key, decl).value()
    }

    /// True if `key` has an entry
    #[must_use]
    pub fn contains(&self, key: MemoKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was imported yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries of `kind`
    #[must_use]
    pub fn count(&self, kind: MemoKind) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().kind == kind)
            .count()
    }

    /// All entries in key order
    #[must_use]
    pub fn entries(&self) -> Vec<(MemoKey, DeclId)> {
        self.entries
            .iter()
            .map(|entry| (*entry.key(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_insert_wins() {
        let memo = DeclMemo::new();
        let key = MemoKey::record(Token::new(0x0200_0002));

        assert_eq!(memo.get(key), None);
        assert_eq!(memo.insert(key, DeclId(5)), DeclId(5));
        assert_eq!(memo.insert(key, DeclId(9)), DeclId(5));
        assert_eq!(memo.get(key), Some(DeclId(5)));
        assert_eq!(memo.len(), 1);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let memo = DeclMemo::new();
        let token = Token::new(0x0200_0002);
        memo.insert(MemoKey::record(token), DeclId(1));
        memo.insert(MemoKey::method(token), DeclId(2));
        memo.insert(MemoKey::array_template(), DeclId(3));

        assert_eq!(memo.get(MemoKey::record(token)), Some(DeclId(1)));
        assert_eq!(memo.get(MemoKey::method(token)), Some(DeclId(2)));
        assert_eq!(memo.count(MemoKind::Record), 1);
        assert_eq!(memo.count(MemoKind::ArrayTemplate), 1);
        assert!(memo.contains(MemoKey::array_template()));
    }
}
