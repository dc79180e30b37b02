//! Reference membership queries over a decoded sequence.
//!
//! All queries are linear scans comparing resolved operands structurally. `ldtoken` operands
//! take part as well, since they decode to the same field, method and type operands as their
//! dedicated instructions.

use crate::{
    disassembler::{InstructionSequence, Operand},
    metadata::references::{FieldRef, MethodRef, TypeRef},
};

impl InstructionSequence {
    /// `true` if any instruction references `field`.
    #[must_use]
    pub fn references_field(&self, field: &FieldRef) -> bool {
        self.iter()
            .any(|instruction| matches!(&instruction.operand, Operand::Field(f) if **f == *field))
    }

    /// `true` if any instruction references `method`.
    #[must_use]
    pub fn references_method(&self, method: &MethodRef) -> bool {
        self.iter()
            .any(|instruction| matches!(&instruction.operand, Operand::Method(m) if **m == *method))
    }

    /// `true` if any instruction references `ty`.
    #[must_use]
    pub fn references_type(&self, ty: &TypeRef) -> bool {
        self.iter()
            .any(|instruction| matches!(&instruction.operand, Operand::Type(t) if **t == *ty))
    }

    /// `true` if every field in `fields` is referenced.
    pub fn references_all_fields<'f>(
        &self,
        fields: impl IntoIterator<Item = &'f FieldRef>,
    ) -> bool {
        fields.into_iter().all(|field| self.references_field(field))
    }

    /// `true` if at least one field in `fields` is referenced.
    pub fn references_any_field<'f>(&self, fields: impl IntoIterator<Item = &'f FieldRef>) -> bool {
        fields.into_iter().any(|field| self.references_field(field))
    }

    /// `true` if every method in `methods` is referenced.
    pub fn references_all_methods<'m>(
        &self,
        methods: impl IntoIterator<Item = &'m MethodRef>,
    ) -> bool {
        methods.into_iter().all(|method| self.references_method(method))
    }

    /// `true` if at least one method in `methods` is referenced.
    pub fn references_any_method<'m>(
        &self,
        methods: impl IntoIterator<Item = &'m MethodRef>,
    ) -> bool {
        methods.into_iter().any(|method| self.references_method(method))
    }

    /// `true` if every type in `types` is referenced.
    pub fn references_all_types<'t>(&self, types: impl IntoIterator<Item = &'t TypeRef>) -> bool {
        types.into_iter().all(|ty| self.references_type(ty))
    }

    /// `true` if at least one type in `types` is referenced.
    pub fn references_any_type<'t>(&self, types: impl IntoIterator<Item = &'t TypeRef>) -> bool {
        types.into_iter().any(|ty| self.references_type(ty))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        decode_method_body,
        metadata::references::{FieldRef, MethodRef, TypeRef},
        MethodContext, TableResolver, Token,
    };

    #[test]
    fn membership() {
        let object = TypeRef::new(Token(0x0100_0001), "System", "Object");
        let string = TypeRef::new(Token(0x0100_0002), "System", "String");
        let ctor = MethodRef::new(Token(0x0A00_0001), object.clone(), ".ctor");
        let to_string = MethodRef::new(Token(0x0A00_0002), object.clone(), "ToString");
        let empty = FieldRef::new(Token(0x0400_0001), string.clone(), "Empty", string.clone());
        let length = FieldRef::new(Token(0x0400_0002), string.clone(), "Length", object.clone());

        let resolver = TableResolver::new()
            .with_type(object.clone())
            .with_type(string.clone())
            .with_method(ctor.clone())
            .with_method(to_string.clone())
            .with_field(empty.clone())
            .with_field(length.clone());
        let context = MethodContext::new(&resolver);

        let il = [
            0x02, // ldarg.0
            0x28, 0x01, 0x00, 0x00, 0x0A, // call .ctor
            0xD0, 0x01, 0x00, 0x00, 0x04, // ldtoken Empty
            0x8C, 0x01, 0x00, 0x00, 0x01, // box Object
            0x2A,
        ];
        let sequence = decode_method_body(&il, &context).unwrap();

        assert!(sequence.references_method(&ctor));
        assert!(!sequence.references_method(&to_string));
        assert!(sequence.references_field(&empty));
        assert!(!sequence.references_field(&length));
        assert!(sequence.references_type(&object));
        assert!(!sequence.references_type(&string));

        assert!(sequence.references_any_method([&*ctor, &*to_string]));
        assert!(!sequence.references_all_methods([&*ctor, &*to_string]));
        assert!(sequence.references_all_methods([&*ctor]));
        assert!(sequence.references_all_fields([&*empty]));
        assert!(!sequence.references_any_field([&*length]));
        assert!(sequence.references_any_type([&*string, &*object]));
        assert!(!sequence.references_all_types([&*string, &*object]));
        assert!(sequence.references_all_types(std::iter::empty()));
    }
}
