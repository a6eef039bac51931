use std::{collections::BTreeMap, sync::Arc};

use super::arena::ScopeTree;

/// Synthetic per-file identifier, unique within one include cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

/// Scope information gathered from one file.
///
/// Results of included headers are shared by reference; the same
/// `Arc<ParseResult>` may appear in the includes of many files.
#[derive(Debug)]
pub struct ParseResult {
    pub file_id: FileId,
    pub tree: ScopeTree,
    pub includes: BTreeMap<FileId, Arc<ParseResult>>,
}

impl ParseResult {
    pub fn new(file_id: FileId) -> Self {
        Self {
            file_id,
            tree: ScopeTree::default(),
            includes: BTreeMap::new(),
        }
    }

    pub fn add_include(&mut self, result: Arc<ParseResult>) {
        self.includes.entry(result.file_id).or_insert(result);
    }

    /// A header that declares nothing itself and includes exactly one file.
    pub fn is_forwarding(&self) -> bool {
        let root = self.tree.root();
        self.includes.len() == 1
            && root.children.is_empty()
            && root.aliases.is_empty()
            && root.usings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarding_header_detection() {
        let inner = Arc::new(ParseResult::new(FileId(1)));
        let mut outer = ParseResult::new(FileId(2));
        assert!(!outer.is_forwarding());
        outer.add_include(inner.clone());
        outer.add_include(inner);
        assert_eq!(outer.includes.len(), 1);
        assert!(outer.is_forwarding());
    }
}
