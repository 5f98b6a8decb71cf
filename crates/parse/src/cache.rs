// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A memory-aware AST cache. Long analysis runs reparse and revisit the
//! same files across passes (structure, imports, definitions, calls);
//! caching the tree avoids reparsing but an unbounded cache of every file
//! in a large repository is its own memory leak, so this one evicts.

use crate::parser::ParsedFile;
use codegraph_core::FastMap;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const DEFAULT_MAX_ENTRIES: usize = 1000;
const DEFAULT_MAX_MEMORY_BYTES: usize = 500 * 1024 * 1024;

/// LRU-ordered AST cache with a soft memory ceiling. Eviction is a no-op
/// correctness concern, not a hard one: a miss just means the caller
/// reparses, so the policy only needs to keep the common case (recently
/// touched files) resident.
pub struct AstCache {
    entries: FastMap<PathBuf, ParsedFile>,
    /// Front = least recently used.
    order: VecDeque<PathBuf>,
    max_entries: usize,
    max_memory_bytes: usize,
}

impl Default for AstCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, DEFAULT_MAX_MEMORY_BYTES)
    }
}

impl AstCache {
    pub fn new(max_entries: usize, max_memory_bytes: usize) -> Self {
        Self {
            entries: FastMap::default(),
            order: VecDeque::new(),
            max_entries,
            max_memory_bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the cached parse for `path`, then enforce the
    /// size and memory limits.
    pub fn insert(&mut self, path: PathBuf, parsed: ParsedFile) {
        if self.entries.contains_key(&path) {
            self.touch_order(&path);
        } else {
            self.order.push_back(path.clone());
        }
        self.entries.insert(path, parsed);
        self.enforce_limits();
    }

    /// Fetch a cached parse, marking it most-recently-used.
    pub fn get(&mut self, path: &Path) -> Option<&ParsedFile> {
        if self.entries.contains_key(path) {
            self.touch_order(path);
        }
        self.entries.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn remove(&mut self, path: &Path) {
        self.entries.remove(path);
        self.order.retain(|p| p != path);
    }

    fn touch_order(&mut self, path: &Path) {
        if let Some(pos) = self.order.iter().position(|p| p == path) {
            let key = self.order.remove(pos).expect("position just checked");
            self.order.push_back(key);
        }
    }

    fn enforce_limits(&mut self) {
        while self.order.len() > self.max_entries {
            self.evict_oldest();
        }
        if self.estimated_bytes() > self.max_memory_bytes {
            let to_remove = (self.order.len() / 10).max(1);
            for _ in 0..to_remove {
                if self.order.is_empty() {
                    break;
                }
                self.evict_oldest();
            }
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.order.pop_front() {
            self.entries.remove(&oldest);
        }
    }

    /// Source length is an exact lower bound; the parsed tree itself is
    /// opaque to us, so we approximate its footprint as a small multiple
    /// of the source it was built from. Unlike the reference
    /// implementation's `sys.getsizeof` probe, this estimator cannot
    /// fail, so there is no count-based fallback path here.
    fn estimated_bytes(&self) -> usize {
        const TREE_OVERHEAD_FACTOR: usize = 4;
        self.entries
            .values()
            .map(|p| p.source.len() * TREE_OVERHEAD_FACTOR)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_languages::LanguageTag;
    use tree_sitter::Parser;

    fn dummy_parsed(source: &str) -> ParsedFile {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        ParsedFile {
            tree,
            source: source.to_string(),
            language: LanguageTag::Python,
        }
    }

    #[test]
    fn evicts_least_recently_used_past_max_entries() {
        let mut cache = AstCache::new(2, usize::MAX);
        cache.insert(PathBuf::from("a.py"), dummy_parsed("a = 1"));
        cache.insert(PathBuf::from("b.py"), dummy_parsed("b = 2"));
        cache.insert(PathBuf::from("c.py"), dummy_parsed("c = 3"));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&PathBuf::from("a.py")));
        assert!(cache.contains(&PathBuf::from("c.py")));
    }

    #[test]
    fn get_refreshes_recency_and_saves_from_eviction() {
        let mut cache = AstCache::new(2, usize::MAX);
        cache.insert(PathBuf::from("a.py"), dummy_parsed("a = 1"));
        cache.insert(PathBuf::from("b.py"), dummy_parsed("b = 2"));
        cache.get(&PathBuf::from("a.py"));
        cache.insert(PathBuf::from("c.py"), dummy_parsed("c = 3"));
        // `b` was least recently used after `a` was touched, so it goes.
        assert!(!cache.contains(&PathBuf::from("b.py")));
        assert!(cache.contains(&PathBuf::from("a.py")));
    }

    #[test]
    fn evicts_oldest_tenth_on_memory_pressure() {
        let mut cache = AstCache::new(1000, 1);
        for i in 0..20 {
            cache.insert(PathBuf::from(format!("f{i}.py")), dummy_parsed("x = 1"));
        }
        assert!(cache.len() < 20);
    }
}
