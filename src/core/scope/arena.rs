//! Arena of namespace and class scopes.
//!
//! Scopes are addressed by [`ScopeId`] within one [`ScopeTree`]; the
//! "definition" relation may point into the tree of an included file and
//! is therefore a [`DefinitionRef`] rather than a plain id.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::core::data::{QualifiedName, Segment};

use super::result::ParseResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

/// The scope that carries localization support for a logical entity.
///
/// Re-opened namespaces and out-of-line class members create scopes in the
/// including file's tree that must share state with the original definition.
#[derive(Clone)]
pub enum DefinitionRef {
    Local(ScopeId),
    Included(Arc<ParseResult>, ScopeId),
}

impl DefinitionRef {
    /// Resolve to the scope, looking local ids up in `results`.
    pub fn scope<'a>(&'a self, results: &'a ParseResult) -> &'a Scope {
        match self {
            DefinitionRef::Local(id) => results.tree.get(*id),
            DefinitionRef::Included(owner, id) => owner.tree.get(*id),
        }
    }
}

impl fmt::Debug for DefinitionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionRef::Local(id) => write!(f, "Local({:?})", id),
            DefinitionRef::Included(owner, id) => {
                write!(f, "Included({:?}, {:?})", owner.file_id, id)
            }
        }
    }
}

/// `namespace A = B;` or `using B::A;`.
///
/// The target is resolved once, either when declared or on first use. A
/// target that still cannot be resolved at that point drops the alias.
#[derive(Debug)]
pub struct Alias {
    written: QualifiedName,
    resolved: OnceLock<Option<QualifiedName>>,
    resolving: AtomicBool,
}

impl Alias {
    pub fn resolved(target: QualifiedName) -> Self {
        Self {
            written: target.clone(),
            resolved: OnceLock::from(Some(target)),
            resolving: AtomicBool::new(false),
        }
    }

    pub fn pending(written: QualifiedName) -> Self {
        Self {
            written,
            resolved: OnceLock::new(),
            resolving: AtomicBool::new(false),
        }
    }

    pub fn written(&self) -> &QualifiedName {
        &self.written
    }

    /// `Some(target)` once resolution has been attempted.
    pub fn resolution(&self) -> Option<&Option<QualifiedName>> {
        self.resolved.get()
    }

    /// Claim the right to resolve. Fails when a resolution is already in
    /// progress further up the stack.
    pub fn begin_resolution(&self) -> bool {
        !self.resolving.swap(true, Ordering::AcqRel)
    }

    pub fn finish_resolution(&self, target: Option<QualifiedName>) {
        let _ = self.resolved.set(target);
        self.resolving.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct Scope {
    pub children: HashMap<Segment, ScopeId>,
    pub aliases: HashMap<Segment, Alias>,
    pub usings: Vec<QualifiedName>,
    /// Resolved base classes, in declaration order.
    pub bases: Vec<QualifiedName>,
    pub class_def: DefinitionRef,
    pub has_tr_functions: bool,
    tr_qualification: OnceLock<String>,
    complained: AtomicBool,
}

impl Scope {
    fn new(class_def: DefinitionRef) -> Self {
        Self {
            children: HashMap::new(),
            aliases: HashMap::new(),
            usings: Vec::new(),
            bases: Vec::new(),
            class_def,
            has_tr_functions: false,
            tr_qualification: OnceLock::new(),
            complained: AtomicBool::new(false),
        }
    }

    /// The context string for calls resolved to this scope, computed once.
    pub fn tr_qualification(&self, compute: impl FnOnce() -> String) -> String {
        self.tr_qualification.get_or_init(compute).clone()
    }

    pub fn set_tr_qualification(&mut self, qualification: String) {
        self.tr_qualification = OnceLock::from(qualification);
    }

    /// Returns true the first time it is called.
    pub fn complain_once(&self) -> bool {
        !self.complained.swap(true, Ordering::AcqRel)
    }
}

#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self {
            scopes: vec![Scope::new(DefinitionRef::Local(ScopeId::ROOT))],
        }
    }
}

impl ScopeTree {
    pub fn root(&self) -> &Scope {
        self.get(ScopeId::ROOT)
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0]
    }

    pub fn child(&self, parent: ScopeId, segment: &Segment) -> Option<ScopeId> {
        self.get(parent).children.get(segment).copied()
    }

    /// Create a child scope. Without an explicit definition it defines itself.
    pub fn add_child(
        &mut self,
        parent: ScopeId,
        segment: Segment,
        class_def: Option<DefinitionRef>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes
            .push(Scope::new(class_def.unwrap_or(DefinitionRef::Local(id))));
        self.get_mut(parent).children.insert(segment, id);
        id
    }

    /// Follow `path` (segments below the root) from the root.
    pub fn walk(&self, path: &[Segment]) -> Option<ScopeId> {
        path.iter()
            .try_fold(ScopeId::ROOT, |id, segment| self.child(id, segment))
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
