use crate::core::data::QualifiedName;

/// The scope-related part of the parser state.
///
/// Saved and restored around `#define` bodies and `#if`/`#else` branches,
/// and used as part of the include cache key: a header parsed detached
/// under one snapshot is reused by every includer presenting an equal one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParserSnapshot {
    /// Open namespaces and classes, starting with the root.
    pub namespaces: QualifiedName,
    /// For each open brace that entered a scope, the length of
    /// `namespaces` before entering it.
    pub namespace_depths: Vec<usize>,
    /// Owner of the function body being parsed.
    pub function_context: QualifiedName,
    /// Literal remainder when the owner could not be fully resolved.
    pub function_context_unresolved: String,
    /// Qualifier of a member definition seen before its body opened.
    pub pending_context: String,
}

impl ParserSnapshot {
    /// State at the start (and, for balanced input, at the end) of a file.
    pub fn top_level() -> Self {
        Self {
            namespaces: QualifiedName::root(),
            namespace_depths: Vec::new(),
            function_context: QualifiedName::root(),
            function_context_unresolved: String::new(),
            pending_context: String::new(),
        }
    }
}
