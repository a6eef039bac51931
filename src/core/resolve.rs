//! Phase 3: Resolution - Qualifying written names against the scope trees.
//!
//! A name written at some point of the scope stack is resolved to an
//! absolute [`QualifiedName`]. Each segment is looked up in a candidate
//! scope by trying, in order:
//! - the scope's own children and aliases (`OWN_LOOKUPS`), in the current
//!   file's tree and then in every tree reachable through includes
//! - the targets of the scope's `using namespace` directives
//!
//! Uses retry at each enclosing scope outward; declarations only look in
//! the exact nesting they are written in.

use std::{collections::HashSet, sync::Arc};

use crate::core::{
    data::{QualifiedName, Segment},
    scope::{DefinitionRef, FileId, ParseResult, Scope, ScopeId},
};

/// Where a visited scope lives.
#[derive(Clone, Copy)]
enum Owner<'r> {
    Current(&'r ParseResult),
    Included(&'r Arc<ParseResult>),
}

impl<'r> Owner<'r> {
    fn result(self) -> &'r ParseResult {
        match self {
            Owner::Current(result) => result,
            Owner::Included(result) => result,
        }
    }
}

/// A scope found while visiting the current file or its includes.
#[derive(Clone, Copy)]
pub struct ScopeRef<'r> {
    owner: Owner<'r>,
    id: ScopeId,
}

impl<'r> ScopeRef<'r> {
    pub fn scope(&self) -> &'r Scope {
        self.owner.result().tree.get(self.id)
    }

    /// The definition reference, rebased so it is valid from the current file.
    pub fn definition(&self) -> DefinitionRef {
        match (&self.scope().class_def, self.owner) {
            (DefinitionRef::Local(id), Owner::Included(result)) => {
                DefinitionRef::Included(Arc::clone(result), *id)
            }
            (def, _) => def.clone(),
        }
    }

    /// The scope carrying localization support for this one.
    pub fn definition_scope(&self) -> &'r Scope {
        let result = self.owner.result();
        match &self.scope().class_def {
            DefinitionRef::Local(id) => result.tree.get(*id),
            DefinitionRef::Included(owner, id) => {
                let owner: &'r ParseResult = owner;
                owner.tree.get(*id)
            }
        }
    }
}

/// A name that could only be resolved partially.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialQualification {
    /// Longest resolved prefix; the root when nothing resolved.
    pub resolved: QualifiedName,
    pub unresolved: Vec<Segment>,
}

type Lookup = fn(&Resolver<'_>, ScopeRef<'_>, &[Segment], &Segment) -> Option<QualifiedName>;

/// Lookups tried in each visited scope before falling back to usings.
const OWN_LOOKUPS: &[Lookup] = &[lookup_child, lookup_alias];

fn lookup_child(
    _resolver: &Resolver<'_>,
    scope: ScopeRef<'_>,
    prefix: &[Segment],
    segment: &Segment,
) -> Option<QualifiedName> {
    scope
        .scope()
        .children
        .contains_key(segment)
        .then(|| QualifiedName::from_segments(prefix.to_vec()).child(segment.clone()))
}

fn lookup_alias(
    resolver: &Resolver<'_>,
    scope: ScopeRef<'_>,
    prefix: &[Segment],
    segment: &Segment,
) -> Option<QualifiedName> {
    let alias = scope.scope().aliases.get(segment)?;
    if let Some(target) = alias.resolution() {
        return target.clone();
    }
    if !alias.begin_resolution() {
        return None;
    }
    let target = resolver
        .fully_qualify(prefix, prefix.len(), alias.written().segments(), false)
        .ok();
    alias.finish_resolution(target.clone());
    target
}

/// Read-only view for resolving names against one file's results.
pub struct Resolver<'r> {
    results: &'r ParseResult,
}

impl<'r> Resolver<'r> {
    pub fn new(results: &'r ParseResult) -> Self {
        Self { results }
    }

    /// Call `f` for the scope at `path` in the current tree, then in each
    /// included tree (each file at most once), until it returns a value.
    fn visit<T>(
        &self,
        path: &[Segment],
        mut f: impl FnMut(ScopeRef<'r>) -> Option<T>,
    ) -> Option<T> {
        let mut visited = HashSet::new();
        visit_result(Owner::Current(self.results), path, &mut f, &mut visited)
    }

    /// The first scope found at `namespaces[..count]`.
    pub fn find_namespace(&self, namespaces: &[Segment], count: usize) -> Option<ScopeRef<'r>> {
        let path = namespaces.get(1..count).unwrap_or_default();
        self.visit(path, Some)
    }

    /// Resolve one segment relative to the scope at `namespaces[..count]`.
    pub fn qualify_one(
        &self,
        namespaces: &[Segment],
        count: usize,
        segment: &Segment,
    ) -> Option<QualifiedName> {
        let mut visited_usings = HashSet::new();
        self.qualify_one_guarded(namespaces, count, segment, &mut visited_usings)
    }

    fn qualify_one_guarded(
        &self,
        namespaces: &[Segment],
        count: usize,
        segment: &Segment,
        visited_usings: &mut HashSet<QualifiedName>,
    ) -> Option<QualifiedName> {
        let prefix = &namespaces[..count];
        let path = prefix.get(1..).unwrap_or_default();

        let own = self.visit(path, |scope| {
            OWN_LOOKUPS
                .iter()
                .find_map(|lookup| lookup(self, scope, prefix, segment))
        });
        if own.is_some() {
            return own;
        }

        self.visit(path, |scope| {
            for using in &scope.scope().usings {
                if visited_usings.insert(using.clone())
                    && let Some(found) = self.qualify_one_guarded(
                        using.segments(),
                        using.len(),
                        segment,
                        visited_usings,
                    )
                {
                    return Some(found);
                }
            }
            None
        })
    }

    /// Resolve `segments` as written inside `namespaces[..count]`.
    ///
    /// A leading empty segment (an explicit `::`) starts at the root.
    pub fn fully_qualify(
        &self,
        namespaces: &[Segment],
        count: usize,
        segments: &[Segment],
        is_declaration: bool,
    ) -> Result<QualifiedName, PartialQualification> {
        let Some(first) = segments.first() else {
            return Err(PartialQualification {
                resolved: QualifiedName::root(),
                unresolved: Vec::new(),
            });
        };
        if namespaces.is_empty() {
            return Err(PartialQualification {
                resolved: QualifiedName::root(),
                unresolved: segments[usize::from(first.is_empty())..].to_vec(),
            });
        }
        let count = count.min(namespaces.len());
        let (init, mut ns_idx) = if first.is_empty() {
            if segments.len() == 1 {
                return Ok(QualifiedName::root());
            }
            (1, 0)
        } else {
            (0, count.saturating_sub(1))
        };

        loop {
            if let Some(mut resolved) = self.qualify_one(namespaces, ns_idx + 1, &segments[init]) {
                for (seg_idx, segment) in segments.iter().enumerate().skip(init + 1) {
                    match self.qualify_one(resolved.segments(), resolved.len(), segment) {
                        Some(next) => resolved = next,
                        None => {
                            return Err(PartialQualification {
                                resolved,
                                unresolved: segments[seg_idx..].to_vec(),
                            });
                        }
                    }
                }
                return Ok(resolved);
            }
            if is_declaration || ns_idx == 0 {
                break;
            }
            ns_idx -= 1;
        }

        Err(PartialQualification {
            resolved: QualifiedName::root(),
            unresolved: segments[init..].to_vec(),
        })
    }

    /// [`Self::fully_qualify`] for a `::`-separated string.
    pub fn fully_qualify_str(
        &self,
        namespaces: &QualifiedName,
        written: &str,
        is_declaration: bool,
    ) -> Result<QualifiedName, PartialQualification> {
        let segments = QualifiedName::parse_written(written);
        self.fully_qualify(
            namespaces.segments(),
            namespaces.len(),
            segments.segments(),
            is_declaration,
        )
    }
}

fn visit_result<'r, T>(
    owner: Owner<'r>,
    path: &[Segment],
    f: &mut impl FnMut(ScopeRef<'r>) -> Option<T>,
    visited: &mut HashSet<FileId>,
) -> Option<T> {
    let result = owner.result();
    if let Some(id) = result.tree.walk(path)
        && let Some(found) = f(ScopeRef { owner, id })
    {
        return Some(found);
    }
    for include in result.includes.values() {
        if visited.insert(include.file_id)
            && let Some(found) = visit_result(Owner::Included(include), path, f, visited)
        {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::scope::{Alias, ScopeTree};

    fn name(text: &str) -> QualifiedName {
        let mut out = QualifiedName::root();
        for part in text.split("::").filter(|p| !p.is_empty()) {
            out.push(Segment::from(part));
        }
        out
    }

    fn add_path(tree: &mut ScopeTree, path: &str) -> ScopeId {
        let mut id = ScopeId::ROOT;
        for part in path.split("::") {
            let segment = Segment::from(part);
            id = match tree.child(id, &segment) {
                Some(child) => child,
                None => tree.add_child(id, segment, None),
            };
        }
        id
    }

    fn qualify(
        results: &ParseResult,
        at: &str,
        written: &str,
        decl: bool,
    ) -> Result<QualifiedName, PartialQualification> {
        Resolver::new(results).fully_qualify_str(&name(at), written, decl)
    }

    #[test]
    fn test_outward_retry_for_uses() {
        let mut results = ParseResult::new(FileId(0));
        add_path(&mut results.tree, "A::Inner");
        add_path(&mut results.tree, "Top");

        assert_eq!(qualify(&results, "A::Inner", "Top", false), Ok(name("Top")));
        assert_eq!(qualify(&results, "A", "Inner", false), Ok(name("A::Inner")));
    }

    #[test]
    fn test_declarations_do_not_retry_outward() {
        let mut results = ParseResult::new(FileId(0));
        add_path(&mut results.tree, "A");
        add_path(&mut results.tree, "Top");

        let err = qualify(&results, "A", "Top", true).unwrap_err();
        assert_eq!(err.resolved, QualifiedName::root());
        assert_eq!(err.unresolved, vec![Segment::from("Top")]);
    }

    #[test]
    fn test_partial_resolution_keeps_prefix() {
        let mut results = ParseResult::new(FileId(0));
        add_path(&mut results.tree, "N::C");

        let err = qualify(&results, "", "N::Missing::X", false).unwrap_err();
        assert_eq!(err.resolved, name("N"));
        assert_eq!(
            err.unresolved,
            vec![Segment::from("Missing"), Segment::from("X")]
        );
    }

    #[test]
    fn test_explicit_root() {
        let mut results = ParseResult::new(FileId(0));
        add_path(&mut results.tree, "A::B");
        add_path(&mut results.tree, "B");

        assert_eq!(qualify(&results, "A", "::B", false), Ok(name("B")));
        assert_eq!(qualify(&results, "A", "B", false), Ok(name("A::B")));
        let at = name("A");
        assert_eq!(
            Resolver::new(&results).fully_qualify(at.segments(), at.len(), &[Segment::root()], false),
            Ok(QualifiedName::root())
        );
    }

    #[test]
    fn test_empty_namespace_stack_is_unresolved() {
        let results = ParseResult::new(FileId(0));
        let resolver = Resolver::new(&results);
        let written = name("A::B");

        let err = resolver
            .fully_qualify(&[], 0, &written.segments()[1..], false)
            .unwrap_err();
        assert_eq!(err.resolved, QualifiedName::root());
        assert_eq!(err.unresolved, written.segments()[1..].to_vec());

        assert!(resolver.fully_qualify(&[], 3, written.segments(), true).is_err());
    }

    #[test]
    fn test_pending_alias_resolves_once() {
        let mut results = ParseResult::new(FileId(0));
        add_path(&mut results.tree, "Outer::Inner");
        results.tree.get_mut(ScopeId::ROOT).aliases.insert(
            Segment::from("Short"),
            Alias::pending(QualifiedName::parse_written("Outer::Inner")),
        );

        let first = qualify(&results, "", "Short", false);
        assert_eq!(first, Ok(name("Outer::Inner")));
        let alias = &results.tree.root().aliases[&Segment::from("Short")];
        assert_eq!(alias.resolution(), Some(&Some(name("Outer::Inner"))));
        assert_eq!(qualify(&results, "", "Short", false), first);
    }

    #[test]
    fn test_unresolvable_alias_is_dropped() {
        let mut results = ParseResult::new(FileId(0));
        results.tree.get_mut(ScopeId::ROOT).aliases.insert(
            Segment::from("Gone"),
            Alias::pending(QualifiedName::parse_written("Nowhere")),
        );

        assert!(qualify(&results, "", "Gone", false).is_err());
        let alias = &results.tree.root().aliases[&Segment::from("Gone")];
        assert_eq!(alias.resolution(), Some(&None));
    }

    #[test]
    fn test_self_referential_alias_terminates() {
        let mut results = ParseResult::new(FileId(0));
        results.tree.get_mut(ScopeId::ROOT).aliases.insert(
            Segment::from("Loop"),
            Alias::pending(QualifiedName::parse_written("Loop")),
        );

        assert!(qualify(&results, "", "Loop", false).is_err());
    }

    #[test]
    fn test_mutual_usings_terminate() {
        let mut results = ParseResult::new(FileId(0));
        let a = add_path(&mut results.tree, "A");
        let b = add_path(&mut results.tree, "B");
        add_path(&mut results.tree, "B::Target");
        results.tree.get_mut(a).usings.push(name("B"));
        results.tree.get_mut(b).usings.push(name("A"));

        assert_eq!(qualify(&results, "A", "Target", false), Ok(name("B::Target")));
        assert!(qualify(&results, "A", "Absent", false).is_err());
    }

    #[test]
    fn test_lookup_through_includes() {
        let mut header = ParseResult::new(FileId(1));
        add_path(&mut header.tree, "Lib::Widget");
        let header = Arc::new(header);

        let mut results = ParseResult::new(FileId(2));
        add_path(&mut results.tree, "App");
        results.add_include(header.clone());

        assert_eq!(
            qualify(&results, "App", "Lib::Widget", false),
            Ok(name("Lib::Widget"))
        );
        let found = Resolver::new(&results)
            .find_namespace(name("Lib::Widget").segments(), 3)
            .map(|scope| scope.definition());
        assert!(matches!(found, Some(DefinitionRef::Included(owner, _)) if Arc::ptr_eq(&owner, &header)));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut header = ParseResult::new(FileId(1));
        add_path(&mut header.tree, "N::C");
        let mut results = ParseResult::new(FileId(2));
        results.add_include(Arc::new(header));
        results.tree.get_mut(ScopeId::ROOT).aliases.insert(
            Segment::from("Alias"),
            Alias::pending(QualifiedName::parse_written("N::C")),
        );

        let first = qualify(&results, "", "Alias", false);
        let scopes = results.tree.len();
        let second = qualify(&results, "", "Alias", false);
        assert_eq!(first, second);
        assert_eq!(results.tree.len(), scopes);
    }
}
