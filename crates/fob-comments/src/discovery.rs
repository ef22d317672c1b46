//! Seams between the resolver and whatever knows where comments live.

#[cfg(feature = "oxc")]
pub mod oxc;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::jsdoc::JsDocDeclaration;
use crate::source::DiscoveredComment;

/// What a documented symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionKind {
    Project,
    Module,
    Namespace,
    Enum,
    EnumMember,
    Variable,
    Function,
    Class,
    Interface,
    Constructor,
    Property,
    Method,
    CallSignature,
    ConstructorSignature,
    Accessor,
    GetSignature,
    SetSignature,
    TypeAlias,
    TypeParameter,
    Parameter,
    TypeLiteral,
    Reference,
}

impl ReflectionKind {
    /// Kinds whose declarations also act as call signatures.
    pub fn has_signature(self) -> bool {
        matches!(
            self,
            ReflectionKind::Function
                | ReflectionKind::Method
                | ReflectionKind::Constructor
                | ReflectionKind::CallSignature
                | ReflectionKind::ConstructorSignature
        )
    }
}

/// A symbol as seen by the resolver.
pub trait DocSymbol {
    /// `true` when the symbol stands for a whole source unit (a module).
    fn is_source_unit(&self) -> bool;

    /// The JSDoc construct that declared this symbol, for symbols that only
    /// exist inside a comment (`@typedef`, `@callback`, `@enum`, ...).
    fn jsdoc_declaration(&self) -> Option<JsDocDeclaration<'_>> {
        None
    }
}

/// Locates the raw comment for symbols and signatures.
///
/// Implementations decide which comment belongs to which declaration; the
/// resolver only parses, caches and filters what they report.
pub trait CommentDiscovery {
    type Symbol: DocSymbol + ?Sized;
    type Signature: ?Sized;

    fn discover_comment(
        &self,
        symbol: &Self::Symbol,
        kind: ReflectionKind,
        diagnostics: &dyn Diagnostics,
    ) -> Option<DiscoveredComment>;

    fn discover_signature_comment(&self, signature: &Self::Signature) -> Option<DiscoveredComment>;

    /// For a property declared as a constructor parameter, the constructor
    /// signature and the parameter name.
    fn constructor_parameter(&self, _symbol: &Self::Symbol) -> Option<(&Self::Signature, String)> {
        None
    }
}
