use std::{
    collections::{BTreeMap, HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::core::{
    data::CandidateMessage,
    scope::{FileId, ParseResult, ParserSnapshot},
};

/// Key under which a detached parse result is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub path: PathBuf,
    pub state: ParserSnapshot,
}

impl CacheKey {
    pub fn new(path: impl Into<PathBuf>, state: ParserSnapshot) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }

    pub fn top_level(path: impl Into<PathBuf>) -> Self {
        Self::new(path, ParserSnapshot::top_level())
    }
}

/// Files that include each other, sharing one set of results.
#[derive(Debug, Default)]
struct IncludeCycle {
    file_names: HashSet<PathBuf>,
    results: BTreeMap<FileId, Arc<ParseResult>>,
}

#[derive(Debug, Default)]
struct CycleTable {
    keys: HashMap<CacheKey, usize>,
    groups: HashMap<usize, IncludeCycle>,
    next_group: usize,
}

impl CycleTable {
    fn new_group(&mut self, cycle: IncludeCycle) -> usize {
        let id = self.next_group;
        self.next_group += 1;
        self.groups.insert(id, cycle);
        id
    }
}

/// Results shared between the files of one extraction run.
///
/// Each table sits behind its own lock, held only for a single lookup or
/// insert and never across a parse.
#[derive(Debug, Default)]
pub struct IncludeCache {
    cycles: Mutex<CycleTable>,
    blacklist: Mutex<HashSet<PathBuf>>,
    messages: Mutex<HashMap<PathBuf, Vec<CandidateMessage>>>,
    next_file_id: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl IncludeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_file_id(&self) -> FileId {
        FileId(self.next_file_id.fetch_add(1, Ordering::Relaxed))
    }

    /// All results recorded for the group `key` belongs to.
    pub fn get_results(&self, key: &CacheKey) -> Vec<Arc<ParseResult>> {
        let table = lock(&self.cycles);
        table
            .keys
            .get(key)
            .and_then(|group| table.groups.get(group))
            .map(|cycle| cycle.results.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_results(&self, key: CacheKey, result: Arc<ParseResult>) {
        let mut table = lock(&self.cycles);
        let group = match table.keys.get(&key) {
            Some(group) => *group,
            None => {
                let group = table.new_group(IncludeCycle::default());
                table.keys.insert(key.clone(), group);
                group
            }
        };
        if let Some(cycle) = table.groups.get_mut(&group) {
            cycle.file_names.insert(key.path);
            cycle.results.entry(result.file_id).or_insert(result);
        }
    }

    /// Merge `file_names` and every group intersecting them into one cycle.
    pub fn add_include_cycle(&self, file_names: &[PathBuf], state: &ParserSnapshot) {
        let mut table = lock(&self.cycles);
        let mut cycle = IncludeCycle {
            file_names: file_names.iter().cloned().collect(),
            results: BTreeMap::new(),
        };

        let mut merged = HashSet::new();
        for file_name in file_names {
            let key = CacheKey::new(file_name.clone(), state.clone());
            if let Some(group) = table.keys.get(&key).copied()
                && merged.insert(group)
                && let Some(existing) = table.groups.remove(&group)
            {
                cycle.file_names.extend(existing.file_names);
                cycle.results.extend(existing.results);
            }
        }
        tracing::debug!(
            files = cycle.file_names.len(),
            merged = merged.len(),
            "recorded include cycle"
        );

        let names: Vec<PathBuf> = cycle.file_names.iter().cloned().collect();
        let group = table.new_group(cycle);
        for name in names {
            table.keys.insert(CacheKey::new(name, state.clone()), group);
        }
    }

    pub fn is_blacklisted(&self, path: &Path) -> bool {
        lock(&self.blacklist).contains(path)
    }

    /// Mark a file parsed inline; its detached results are never trusted.
    pub fn set_blacklisted(&self, path: &Path) {
        lock(&self.blacklist).insert(path.to_path_buf());
    }

    pub fn set_messages(&self, path: &Path, messages: Vec<CandidateMessage>) {
        if !messages.is_empty() {
            lock(&self.messages).insert(path.to_path_buf(), messages);
        }
    }

    pub fn messages(&self, path: &Path) -> Vec<CandidateMessage> {
        lock(&self.messages).get(path).cloned().unwrap_or_default()
    }
}
