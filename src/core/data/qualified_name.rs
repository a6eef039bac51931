//! Name segments and absolute paths through the scope tree.
//!
//! A [`QualifiedName`] always starts at the global root, which is stored as
//! an empty leading [`Segment`]. `N::C` is therefore `["", "N", "C"]`, and
//! rendering skips the root. The same type doubles as a "written" name
//! (what appeared in the source): there a leading empty segment marks an
//! explicit `::` prefix.

use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, OnceLock},
};

pub const SEPARATOR: &str = "::";

/// One component of a qualified name.
///
/// The hash is computed on first use and cached; replacing the value
/// through [`Segment::set_value`] invalidates it.
#[derive(Clone, Default)]
pub struct Segment {
    text: Arc<str>,
    hash: OnceLock<u64>,
}

impl Segment {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            hash: OnceLock::new(),
        }
    }

    /// The unnamed segment (global root, or a leading `::`).
    pub fn root() -> Self {
        Self::new("")
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn set_value(&mut self, text: impl Into<Arc<str>>) {
        self.text = text.into();
        self.hash = OnceLock::new();
    }

    fn cached_hash(&self) -> u64 {
        *self.hash.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            self.text.hash(&mut hasher);
            hasher.finish()
        })
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Segment {}

impl Hash for Segment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.cached_hash());
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.text)
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Ordered list of segments, rooted at the global namespace.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName(Vec<Segment>);

impl QualifiedName {
    /// The path containing only the global root.
    pub fn root() -> Self {
        Self(vec![Segment::root()])
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Split a `::`-separated name as written in the source.
    ///
    /// `"::A::B"` yields `["", "A", "B"]`, `"A::B"` yields `["A", "B"]`.
    pub fn parse_written(text: &str) -> Self {
        Self(text.split(SEPARATOR).map(Segment::from).collect())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Segment> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// The first `len` segments as a new name.
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// A copy with `segment` appended.
    pub fn child(&self, segment: Segment) -> Self {
        let mut out = self.clone();
        out.push(segment);
        out
    }

    /// Join segments from index `start` onwards with `::`.
    pub fn join_from(&self, start: usize) -> String {
        join_segments(self.0.get(start..).unwrap_or_default())
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join_from(1))
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

pub fn join_segments(segments: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(segment.as_str());
    }
    out
}

/// Join two context strings, omitting the separator when either is empty.
pub fn join_contexts(one: &str, two: &str) -> String {
    match (one.is_empty(), two.is_empty()) {
        (_, true) => one.to_string(),
        (true, false) => two.to_string(),
        (false, false) => format!("{}{}{}", one, SEPARATOR, two),
    }
}
