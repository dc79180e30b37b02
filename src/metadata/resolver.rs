//! Token resolution boundary between the decoder and the metadata provider.
//!
//! CIL operands reference fields, methods, types, strings and signatures through 4-byte
//! metadata tokens. Turning a token into something meaningful requires the metadata tables of
//! the containing module, which this crate deliberately does not own. Instead, every decode call
//! receives a [`crate::metadata::resolver::TokenResolver`] through its
//! [`crate::metadata::context::MethodContext`].
//!
//! # Key Components
//!
//! - [`crate::metadata::resolver::TokenResolver`] - The capability the decoder calls into
//! - [`crate::metadata::resolver::ResolveError`] - Failures a resolver may report
//! - [`crate::metadata::resolver::TableResolver`] - A `HashMap`-backed resolver
//!
//! # Thread Safety
//!
//! [`TokenResolver`] requires `Send + Sync`, so a single resolver can serve decode calls running
//! on several threads (see [`crate::disassembler::decode_method_bodies`]). Implementations with
//! interior caches must synchronise them themselves.

use std::collections::HashMap;

use thiserror::Error;

use crate::metadata::{
    references::{FieldRefRc, MemberRefRc, MethodRefRc, ResolvedMember, TypeRefRc},
    token::Token,
};

/// Result type returned by [`TokenResolver`] methods.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Failures a [`TokenResolver`] can report.
///
/// The decoder never inspects these; it wraps them unchanged into
/// [`crate::Error::UnresolvableToken`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No entity is known for the token.
    #[error("No metadata entity for token {0}")]
    NotFound(Token),

    /// The token exists but names a different kind of entity than requested.
    #[error("Token {token} does not refer to a {expected}")]
    KindMismatch {
        /// The offending token
        token: Token,
        /// What the caller asked for
        expected: &'static str,
    },

    /// Resolver specific failure.
    #[error("{0}")]
    Other(String),
}

/// The capability the decoder uses to resolve metadata tokens.
///
/// Generic arguments are handed through so that implementations can instantiate `TypeSpec` and
/// `MethodSpec` tokens in the context of the method being decoded. They are the argument lists
/// of the [`crate::metadata::context::MethodContext`], fixed for the whole decode call.
pub trait TokenResolver: Send + Sync {
    /// Resolve a field token (`ldfld`, `stsfld`, ...).
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_field(
        &self,
        token: Token,
        type_args: &[TypeRefRc],
        method_args: &[TypeRefRc],
    ) -> ResolveResult<FieldRefRc>;

    /// Resolve a method token (`call`, `newobj`, `ldftn`, ...).
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_method(
        &self,
        token: Token,
        type_args: &[TypeRefRc],
        method_args: &[TypeRefRc],
    ) -> ResolveResult<MethodRefRc>;

    /// Resolve a type token (`newarr`, `box`, `castclass`, ...).
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_type(
        &self,
        token: Token,
        type_args: &[TypeRefRc],
        method_args: &[TypeRefRc],
    ) -> ResolveResult<TypeRefRc>;

    /// Resolve a token of unknown kind (`ldtoken`).
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_member(
        &self,
        token: Token,
        type_args: &[TypeRefRc],
        method_args: &[TypeRefRc],
    ) -> ResolveResult<ResolvedMember>;

    /// Resolve a user-string token (`ldstr`).
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_string(&self, token: Token) -> ResolveResult<String>;

    /// Resolve a stand-alone signature token (`calli`) to its raw blob.
    ///
    /// # Errors
    /// Any [`ResolveError`] the implementation chooses to report.
    fn resolve_signature(&self, token: Token) -> ResolveResult<Vec<u8>>;
}

/// A [`TokenResolver`] backed by in-memory tables.
///
/// Useful when the metadata has already been loaded elsewhere, and for tests. Entries are added
/// with the builder-style `with_*` methods. Generic arguments are ignored: the stored entities
/// are returned as registered.
///
/// `resolve_member` looks the token up in the field, method, type and member tables, in that
/// order.
///
/// # Examples
///
/// ```rust
/// use ilscope::{Token, TableResolver, TokenResolver};
///
/// let resolver = TableResolver::new().with_string(Token(0x7000_0001), "hello");
/// assert_eq!(resolver.resolve_string(Token(0x7000_0001)).unwrap(), "hello");
/// assert!(resolver.resolve_string(Token(0x7000_0002)).is_err());
/// ```
#[derive(Debug, Default, Clone)]
pub struct TableResolver {
    fields: HashMap<Token, FieldRefRc>,
    methods: HashMap<Token, MethodRefRc>,
    types: HashMap<Token, TypeRefRc>,
    members: HashMap<Token, MemberRefRc>,
    strings: HashMap<Token, String>,
    signatures: HashMap<Token, Vec<u8>>,
}

impl TableResolver {
    /// Create an empty resolver; every lookup fails with [`ResolveError::NotFound`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field under its own token.
    #[must_use]
    pub fn with_field(mut self, field: FieldRefRc) -> Self {
        self.fields.insert(field.token, field);
        self
    }

    /// Register a method under its own token.
    #[must_use]
    pub fn with_method(mut self, method: MethodRefRc) -> Self {
        self.methods.insert(method.token, method);
        self
    }

    /// Register a type under its own token.
    #[must_use]
    pub fn with_type(mut self, ty: TypeRefRc) -> Self {
        self.types.insert(ty.token, ty);
        self
    }

    /// Register an unclassified member under its own token.
    #[must_use]
    pub fn with_member(mut self, member: MemberRefRc) -> Self {
        self.members.insert(member.token, member);
        self
    }

    /// Register a user string.
    #[must_use]
    pub fn with_string(mut self, token: Token, value: &str) -> Self {
        self.strings.insert(token, value.to_string());
        self
    }

    /// Register a stand-alone signature blob.
    #[must_use]
    pub fn with_signature(mut self, token: Token, blob: &[u8]) -> Self {
        self.signatures.insert(token, blob.to_vec());
        self
    }

    /// Distinguish a token registered under another kind from an unknown one.
    fn missing(&self, token: Token, expected: &'static str) -> ResolveError {
        let known = self.fields.contains_key(&token)
            || self.methods.contains_key(&token)
            || self.types.contains_key(&token)
            || self.members.contains_key(&token);

        if known {
            ResolveError::KindMismatch { token, expected }
        } else {
            ResolveError::NotFound(token)
        }
    }
}

impl TokenResolver for TableResolver {
    fn resolve_field(
        &self,
        token: Token,
        _type_args: &[TypeRefRc],
        _method_args: &[TypeRefRc],
    ) -> ResolveResult<FieldRefRc> {
        self.fields
            .get(&token)
            .cloned()
            .ok_or_else(|| self.missing(token, "field"))
    }

    fn resolve_method(
        &self,
        token: Token,
        _type_args: &[TypeRefRc],
        _method_args: &[TypeRefRc],
    ) -> ResolveResult<MethodRefRc> {
        self.methods
            .get(&token)
            .cloned()
            .ok_or_else(|| self.missing(token, "method"))
    }

    fn resolve_type(
        &self,
        token: Token,
        _type_args: &[TypeRefRc],
        _method_args: &[TypeRefRc],
    ) -> ResolveResult<TypeRefRc> {
        self.types
            .get(&token)
            .cloned()
            .ok_or_else(|| self.missing(token, "type"))
    }

    fn resolve_member(
        &self,
        token: Token,
        _type_args: &[TypeRefRc],
        _method_args: &[TypeRefRc],
    ) -> ResolveResult<ResolvedMember> {
        if let Some(field) = self.fields.get(&token) {
            return Ok(ResolvedMember::Field(field.clone()));
        }
        if let Some(method) = self.methods.get(&token) {
            return Ok(ResolvedMember::Method(method.clone()));
        }
        if let Some(ty) = self.types.get(&token) {
            return Ok(ResolvedMember::Type(ty.clone()));
        }
        if let Some(member) = self.members.get(&token) {
            return Ok(ResolvedMember::Other(member.clone()));
        }

        Err(ResolveError::NotFound(token))
    }

    fn resolve_string(&self, token: Token) -> ResolveResult<String> {
        self.strings
            .get(&token)
            .cloned()
            .ok_or(ResolveError::NotFound(token))
    }

    fn resolve_signature(&self, token: Token) -> ResolveResult<Vec<u8>> {
        self.signatures
            .get(&token)
            .cloned()
            .ok_or(ResolveError::NotFound(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::references::{FieldRef, MemberRef, MethodRef, TypeRef};

    fn resolver() -> TableResolver {
        let object = TypeRef::new(Token(0x0100_0001), "System", "Object");
        let int32 = TypeRef::new(Token(0x0100_0002), "System", "Int32");
        TableResolver::new()
            .with_type(object.clone())
            .with_type(int32.clone())
            .with_field(FieldRef::new(Token(0x0400_0001), object.clone(), "f", int32))
            .with_method(MethodRef::new(Token(0x0A00_0001), object, ".ctor"))
            .with_member(MemberRef::new(Token(0x1400_0001), "SomeEvent"))
            .with_signature(Token(0x1100_0001), &[0x00, 0x00, 0x01])
    }

    #[test]
    fn resolve_by_kind() {
        let resolver = resolver();
        assert_eq!(
            resolver
                .resolve_type(Token(0x0100_0002), &[], &[])
                .unwrap()
                .name,
            "Int32"
        );
        assert_eq!(
            resolver
                .resolve_field(Token(0x0400_0001), &[], &[])
                .unwrap()
                .name,
            "f"
        );
        assert_eq!(
            resolver
                .resolve_method(Token(0x0A00_0001), &[], &[])
                .unwrap()
                .name,
            ".ctor"
        );
        assert_eq!(
            resolver.resolve_signature(Token(0x1100_0001)).unwrap(),
            vec![0x00, 0x00, 0x01]
        );
    }

    #[test]
    fn resolve_member_classifies() {
        let resolver = resolver();
        assert!(matches!(
            resolver.resolve_member(Token(0x0400_0001), &[], &[]),
            Ok(ResolvedMember::Field(_))
        ));
        assert!(matches!(
            resolver.resolve_member(Token(0x0A00_0001), &[], &[]),
            Ok(ResolvedMember::Method(_))
        ));
        assert!(matches!(
            resolver.resolve_member(Token(0x0100_0001), &[], &[]),
            Ok(ResolvedMember::Type(_))
        ));
        assert!(matches!(
            resolver.resolve_member(Token(0x1400_0001), &[], &[]),
            Ok(ResolvedMember::Other(_))
        ));
    }

    #[test]
    fn unknown_tokens() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_field(Token(0x0400_0099), &[], &[]),
            Err(ResolveError::NotFound(Token(0x0400_0099)))
        );
        assert_eq!(
            resolver.resolve_member(Token(0x0600_0099), &[], &[]),
            Err(ResolveError::NotFound(Token(0x0600_0099)))
        );
        assert!(resolver.resolve_string(Token(0x7000_0001)).is_err());
    }

    #[test]
    fn wrong_kind() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_field(Token(0x0A00_0001), &[], &[]),
            Err(ResolveError::KindMismatch {
                token: Token(0x0A00_0001),
                expected: "field"
            })
        );
        assert!(matches!(
            resolver.resolve_method(Token(0x0100_0001), &[], &[]),
            Err(ResolveError::KindMismatch { .. })
        ));
    }
}
