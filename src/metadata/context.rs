//! The immutable method snapshot a decode call runs against.
//!
//! [`crate::metadata::context::MethodContext`] bundles everything the decoder needs to know
//! about the method whose body it decodes: whether it is static, its declared parameters and
//! locals, the generic arguments in scope and the token resolver. The snapshot is borrowed for
//! the duration of one decode call and never mutated.
//!
//! # Argument Slots
//!
//! CIL addresses arguments by raw slot number. For instance methods slot 0 is the implicit
//! `this` and declared parameter `n` lives in slot `n + 1`; for static methods declared
//! parameter `n` lives in slot `n`. [`crate::metadata::context::MethodContext::parameter_for_slot`]
//! applies that shift.

use std::fmt;

use crate::metadata::{references::TypeRefRc, resolver::TokenResolver};

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Position in the declared parameter list (0-based, `this` excluded)
    pub index: u16,
    /// Declared parameter type
    pub param_type: TypeRefRc,
    /// Parameter name, empty when the metadata carries none
    pub name: String,
}

impl Parameter {
    /// Create a new parameter description.
    #[must_use]
    pub fn new(index: u16, param_type: TypeRefRc, name: &str) -> Self {
        Parameter {
            index,
            param_type,
            name: name.to_string(),
        }
    }
}

/// A declared local variable of the method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// Slot index of the local
    pub index: u16,
    /// Declared local type
    pub local_type: TypeRefRc,
    /// `true` if the local is declared `pinned`
    pub is_pinned: bool,
}

impl LocalVariable {
    /// Create a new local variable description.
    #[must_use]
    pub fn new(index: u16, local_type: TypeRefRc, is_pinned: bool) -> Self {
        LocalVariable {
            index,
            local_type,
            is_pinned,
        }
    }
}

/// Method-level information used while decoding a method body.
///
/// # Examples
///
/// ```rust
/// use ilscope::{LocalVariable, MethodContext, Parameter, TableResolver, Token, TypeRef};
///
/// let int32 = TypeRef::new(Token(0x0100_0001), "System", "Int32");
/// let resolver = TableResolver::new();
///
/// let context = MethodContext::new(&resolver)
///     .with_static(true)
///     .with_parameter(Parameter::new(0, int32.clone(), "value"))
///     .with_local(LocalVariable::new(0, int32, false));
///
/// assert_eq!(context.parameter_for_slot(0).map(|p| p.name.as_str()), Some("value"));
/// ```
#[derive(Clone)]
pub struct MethodContext<'a> {
    /// `true` for static methods (no implicit `this` in slot 0)
    pub is_static: bool,
    /// Declared parameters in declaration order
    pub parameters: Vec<Parameter>,
    /// Declared locals in slot order
    pub locals: Vec<LocalVariable>,
    /// Generic arguments of the declaring type, possibly empty
    pub declaring_type_generic_args: Vec<TypeRefRc>,
    /// Generic arguments of the method itself, possibly empty
    pub method_generic_args: Vec<TypeRefRc>,
    /// Resolver for every metadata token found in the body
    pub resolver: &'a dyn TokenResolver,
}

impl<'a> MethodContext<'a> {
    /// Create a context for an instance method without parameters, locals or generics.
    #[must_use]
    pub fn new(resolver: &'a dyn TokenResolver) -> Self {
        MethodContext {
            is_static: false,
            parameters: Vec::new(),
            locals: Vec::new(),
            declaring_type_generic_args: Vec::new(),
            method_generic_args: Vec::new(),
            resolver,
        }
    }

    /// Set whether the method is static.
    #[must_use]
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Append a declared parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Append a declared local variable.
    #[must_use]
    pub fn with_local(mut self, local: LocalVariable) -> Self {
        self.locals.push(local);
        self
    }

    /// Set the generic arguments of the declaring type.
    #[must_use]
    pub fn with_type_generic_args(mut self, args: Vec<TypeRefRc>) -> Self {
        self.declaring_type_generic_args = args;
        self
    }

    /// Set the generic arguments of the method.
    #[must_use]
    pub fn with_method_generic_args(mut self, args: Vec<TypeRefRc>) -> Self {
        self.method_generic_args = args;
        self
    }

    /// The declared parameter addressed by raw argument slot `slot`.
    ///
    /// Returns `None` for the `this` slot of instance methods and for slots beyond the declared
    /// parameters.
    #[must_use]
    pub fn parameter_for_slot(&self, slot: u16) -> Option<&Parameter> {
        let index = if self.is_static {
            slot
        } else {
            slot.checked_sub(1)?
        };
        self.parameters.get(usize::from(index))
    }

    /// The declared local in slot `slot`.
    #[must_use]
    pub fn local(&self, slot: u16) -> Option<&LocalVariable> {
        self.locals.get(usize::from(slot))
    }
}

impl fmt::Debug for MethodContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodContext")
            .field("is_static", &self.is_static)
            .field("parameters", &self.parameters)
            .field("locals", &self.locals)
            .field(
                "declaring_type_generic_args",
                &self.declaring_type_generic_args,
            )
            .field("method_generic_args", &self.method_generic_args)
            .finish_non_exhaustive()
    }
}
