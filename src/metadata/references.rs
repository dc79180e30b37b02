//! Resolved metadata entities referenced from CIL operands.
//!
//! The decoder does not parse metadata tables itself. Whenever an instruction carries a token,
//! the caller-supplied [`crate::metadata::resolver::TokenResolver`] turns it into one of the
//! shared reference types defined here. They are plain values behind an [`Arc`], so a single
//! resolved type or method can appear in many instructions (and many method bodies) without
//! being copied.
//!
//! Equality is structural: two references are equal when their token and descriptive fields
//! match, which is what the membership helpers on
//! [`crate::disassembler::InstructionSequence`] rely on.

use std::{fmt, sync::Arc};

use crate::metadata::token::Token;

/// A reference-counted pointer to a [`TypeRef`]
pub type TypeRefRc = Arc<TypeRef>;
/// A reference-counted pointer to a [`FieldRef`]
pub type FieldRefRc = Arc<FieldRef>;
/// A reference-counted pointer to a [`MethodRef`]
pub type MethodRefRc = Arc<MethodRef>;
/// A reference-counted pointer to a [`MemberRef`]
pub type MemberRefRc = Arc<MemberRef>;

/// A resolved type (`TypeDef`, `TypeRef` or `TypeSpec`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    /// Token the type was resolved from
    pub token: Token,
    /// Namespace, empty for nested or global types
    pub namespace: String,
    /// Simple name, including any generic arity suffix
    pub name: String,
}

impl TypeRef {
    /// Create a new shared type reference.
    #[must_use]
    pub fn new(token: Token, namespace: &str, name: &str) -> TypeRefRc {
        Arc::new(TypeRef {
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    /// The namespace-qualified name, e.g. `System.String`.
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// A resolved field (`Field` row or field-shaped `MemberRef`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Token the field was resolved from
    pub token: Token,
    /// Type that declares the field
    pub declaring_type: TypeRefRc,
    /// Field name
    pub name: String,
    /// Declared field type
    pub field_type: TypeRefRc,
}

impl FieldRef {
    /// Create a new shared field reference.
    #[must_use]
    pub fn new(
        token: Token,
        declaring_type: TypeRefRc,
        name: &str,
        field_type: TypeRefRc,
    ) -> FieldRefRc {
        Arc::new(FieldRef {
            token,
            declaring_type,
            name: name.to_string(),
            field_type,
        })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}::{}",
            self.field_type, self.declaring_type, self.name
        )
    }
}

/// A resolved method (`MethodDef`, method-shaped `MemberRef` or `MethodSpec`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Token the method was resolved from
    pub token: Token,
    /// Type that declares the method
    pub declaring_type: TypeRefRc,
    /// Method name, e.g. `.ctor` or `WriteLine`
    pub name: String,
    /// Generic arguments of an instantiated method, empty otherwise
    pub generic_args: Vec<TypeRefRc>,
}

impl MethodRef {
    /// Create a new shared, non-generic method reference.
    #[must_use]
    pub fn new(token: Token, declaring_type: TypeRefRc, name: &str) -> MethodRefRc {
        Arc::new(MethodRef {
            token,
            declaring_type,
            name: name.to_string(),
            generic_args: Vec::new(),
        })
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.declaring_type, self.name)?;
        if !self.generic_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.generic_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// A member that is neither a field, a method nor a type.
///
/// Produced by `ldtoken` when the resolver cannot classify the token any further.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Token the member was resolved from
    pub token: Token,
    /// Descriptive name of the member
    pub name: String,
}

impl MemberRef {
    /// Create a new shared member reference.
    #[must_use]
    pub fn new(token: Token, name: &str) -> MemberRefRc {
        Arc::new(MemberRef {
            token,
            name: name.to_string(),
        })
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The result of resolving an arbitrary member token (`ldtoken`).
///
/// The resolver decides what the token refers to; the decoder only matches on the returned
/// variant to pick the operand shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedMember {
    /// The token names a field
    Field(FieldRefRc),
    /// The token names a method
    Method(MethodRefRc),
    /// The token names a type
    Type(TypeRefRc),
    /// The token names something else
    Other(MemberRefRc),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_fullname() {
        let string = TypeRef::new(Token(0x0100_0001), "System", "String");
        assert_eq!(string.fullname(), "System.String");
        assert_eq!(format!("{string}"), "System.String");

        let global = TypeRef::new(Token(0x0200_0001), "", "<Module>");
        assert_eq!(global.fullname(), "<Module>");
    }

    #[test]
    fn field_display() {
        let owner = TypeRef::new(Token(0x0200_0002), "App", "Counter");
        let int32 = TypeRef::new(Token(0x0100_0002), "System", "Int32");
        let field = FieldRef::new(Token(0x0400_0001), owner, "count", int32);
        assert_eq!(format!("{field}"), "System.Int32 App.Counter::count");
    }

    #[test]
    fn method_display_generic() {
        let enumerable = TypeRef::new(Token(0x0100_0003), "System.Linq", "Enumerable");
        let int32 = TypeRef::new(Token(0x0100_0002), "System", "Int32");
        let method = Arc::new(MethodRef {
            token: Token(0x2B00_0001),
            declaring_type: enumerable,
            name: "ToList".to_string(),
            generic_args: vec![int32],
        });
        assert_eq!(
            format!("{method}"),
            "System.Linq.Enumerable::ToList<System.Int32>"
        );
    }

    #[test]
    fn structural_equality() {
        let a = TypeRef::new(Token(0x0100_0001), "System", "Object");
        let b = TypeRef::new(Token(0x0100_0001), "System", "Object");
        let c = TypeRef::new(Token(0x0100_0002), "System", "Object");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
