use std::fmt;

use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// A metadata token as it appears in the operand of a CIL instruction.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table (or `0x70` for the user-string heap)
/// - The low 24 bits (bits 0-23) indicate the row index, or the heap offset for strings
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
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

    /// The kind of entity this token refers to, if the table byte is one CIL operands use.
    #[must_use]
    pub fn kind(&self) -> Option<TokenKind> {
        let table = self.table();
        TokenKind::iter().find(|kind| *kind as u8 == table)
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

/// The token tables that can be referenced from a CIL instruction operand.
///
/// The discriminant is the table byte stored in the high byte of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
#[repr(u8)]
pub enum TokenKind {
    /// `TypeRef` table
    TypeRef = 0x01,
    /// `TypeDef` table
    TypeDef = 0x02,
    /// `Field` table
    Field = 0x04,
    /// `MethodDef` table
    MethodDef = 0x06,
    /// `MemberRef` table (field or method reference)
    MemberRef = 0x0A,
    /// `StandAloneSig` table (`calli` signatures)
    StandAloneSig = 0x11,
    /// `TypeSpec` table (instantiated or constructed types)
    TypeSpec = 0x1B,
    /// `MethodSpec` table (generic method instantiations)
    MethodSpec = 0x2B,
    /// User-string heap (`ldstr`)
    UserString = 0x70,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn token_parts() {
        let token = Token::new(0x0A00_0012);
        assert_eq!(token.value(), 0x0A00_0012);
        assert_eq!(token.table(), 0x0A);
        assert_eq!(token.row(), 0x12);
        assert!(!token.is_null());
        assert!(Token(0).is_null());
    }

    #[test]
    fn token_kind() {
        assert_eq!(Token(0x0600_0001).kind(), Some(TokenKind::MethodDef));
        assert_eq!(Token(0x7000_0001).kind(), Some(TokenKind::UserString));
        assert_eq!(Token(0x1B00_0003).kind(), Some(TokenKind::TypeSpec));
        assert_eq!(Token(0x2300_0001).kind(), None);
        assert_eq!(TokenKind::COUNT, 9);
    }

    #[test]
    fn token_formatting() {
        let token = Token(0x0400_0005);
        assert_eq!(format!("{token}"), "0x04000005");
        assert_eq!(
            format!("{token:?}"),
            "Token(0x04000005, table: 0x04, row: 5)"
        );
    }

    #[test]
    fn token_conversions_and_hash() {
        let token: Token = 0x0200_0001u32.into();
        let raw: u32 = token.into();
        assert_eq!(raw, 0x0200_0001);

        let mut map = HashMap::new();
        map.insert(token, "type");
        assert_eq!(map.get(&Token(0x0200_0001)), Some(&"type"));
    }
}
