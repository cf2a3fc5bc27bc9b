//! Metadata tokens: the sole stable identity of a foreign entity.
//!
//! A token is unique within one foreign module. The importer keys its declaration memo on it and
//! links property accessors to methods through it; nothing else about a row is trusted as
//! identity.

use std::fmt;

/// Table identifiers carried in the high byte of a [`Token`] (ECMA-335 §II.22).
#[allow(non_snake_case, missing_docs)]
pub mod TABLE {
    pub const TYPE_REF: u8 = 0x01;
    pub const TYPE_DEF: u8 = 0x02;
    pub const FIELD: u8 = 0x04;
    pub const METHOD_DEF: u8 = 0x06;
    pub const PARAM: u8 = 0x08;
    pub const CUSTOM_ATTRIBUTE: u8 = 0x0C;
    pub const PROPERTY: u8 = 0x17;
    pub const GENERIC_PARAM: u8 = 0x2A;
}

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a table id and a 1-based row index
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if this token points into the `TypeDef` table
    #[must_use]
    pub fn is_type_def(&self) -> bool {
        self.table() == TABLE::TYPE_DEF
    }

    /// Returns true if this token points into the `TypeRef` table
    #[must_use]
    pub fn is_type_ref(&self) -> bool {
        self.table() == TABLE::TYPE_REF
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parts() {
        let token = Token::from_parts(TABLE::METHOD_DEF, 7);
        assert_eq!(token.value(), 0x0600_0007);
        assert_eq!(token.table(), TABLE::METHOD_DEF);
        assert_eq!(token.row(), 7);
    }

    #[test]
    fn test_token_row_is_truncated() {
        let token = Token::from_parts(TABLE::TYPE_DEF, 0x0100_0001);
        assert_eq!(token.row(), 1);
        assert!(token.is_type_def());
    }

    #[test]
    fn test_token_kinds() {
        assert!(Token::new(0x0100_0003).is_type_ref());
        assert!(!Token::new(0x0100_0003).is_type_def());
        assert!(Token::default().is_null());
    }

    #[test]
    fn test_token_display_and_debug() {
        let token = Token(0x0600_0001);
        assert_eq!(format!("{token}"), "0x06000001");

        let debug_str = format!("{token:?}");
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering() {
        assert!(Token(0x0600_0001) < Token(0x0600_0002));
        assert!(Token(0x0600_0002) < Token(0x0700_0001));
    }
}
