// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! `FunctionRegistry`: a `QN -> NodeKind` index maintained as both a flat
//! map (exact lookup, membership) and a segment trie (prefix queries).
//! The invariant the rest of the analyzer leans on: for every endpoint in
//! the trie there is exactly one entry in the flat map with equal QN and
//! kind, and vice versa — `delete` keeps both in lock-step and prunes
//! trie branches that go endpoint-less and child-less, so repeated
//! file re-ingest does not leak memory.

use crate::{FastMap, FastSet, NodeKind};

#[derive(Debug, Default)]
struct TrieNode {
    children: FastMap<String, TrieNode>,
    /// `Some((qn, kind))` if a definition ends exactly at this node.
    endpoint: Option<(String, NodeKind)>,
}

impl TrieNode {
    fn is_empty(&self) -> bool {
        self.endpoint.is_none() && self.children.is_empty()
    }
}

/// Segment-indexed prefix tree over qualified names, backed by a flat map
/// for O(1) exact lookup. See the module docs for the sync invariant.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    flat: FastMap<String, NodeKind>,
    root: TrieNode,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    /// Insert or overwrite `qn -> kind`. Idempotent: inserting the same
    /// `(qn, kind)` twice is a no-op beyond the first write.
    pub fn insert(&mut self, qn: impl Into<String>, kind: NodeKind) {
        let qn = qn.into();
        self.flat.insert(qn.clone(), kind);

        let mut node = &mut self.root;
        for part in qn.split('.') {
            node = node.children.entry(part.to_string()).or_default();
        }
        node.endpoint = Some((qn, kind));
    }

    pub fn get(&self, qn: &str) -> Option<NodeKind> {
        self.flat.get(qn).copied()
    }

    pub fn contains(&self, qn: &str) -> bool {
        self.flat.contains_key(qn)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.flat.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeKind)> {
        self.flat.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Remove `qn` from both the flat map and the trie, pruning any
    /// ancestor trie node that becomes endpoint-less and child-less.
    pub fn delete(&mut self, qn: &str) {
        if self.flat.remove(qn).is_none() {
            return;
        }
        let parts: Vec<&str> = qn.split('.').collect();
        Self::prune(&mut self.root, &parts);
    }

    /// Returns `true` if `node` is now empty and its caller should remove
    /// its edge to it.
    fn prune(node: &mut TrieNode, parts: &[&str]) -> bool {
        let Some((first, rest)) = parts.split_first() else {
            node.endpoint = None;
            return node.is_empty();
        };
        let child_empty = match node.children.get_mut(*first) {
            Some(child) => Self::prune(child, rest),
            None => return false,
        };
        if child_empty {
            node.children.remove(*first);
        }
        node.is_empty()
    }

    /// O(N) fallback: every QN ending with `.{suffix}` (or equal to it at
    /// the top level — a bare single-segment name).
    pub fn find_ending_with(&self, suffix: &str) -> Vec<String> {
        let dotted = format!(".{suffix}");
        self.flat
            .keys()
            .filter(|qn| qn.ends_with(&dotted) || qn.as_str() == suffix)
            .cloned()
            .collect()
    }

    /// All `(QN, kind)` whose dotted-segment sequence begins with
    /// `prefix`'s segments.
    pub fn find_with_prefix(&self, prefix: &str) -> Vec<(String, NodeKind)> {
        let Some(start) = self.descend(prefix) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        Self::collect(start, &mut out);
        out
    }

    /// `find_with_prefix` filtered to QNs also ending with `.{suffix}`.
    pub fn find_with_prefix_and_suffix(&self, prefix: &str, suffix: &str) -> Vec<String> {
        let dotted = format!(".{suffix}");
        self.find_with_prefix(prefix)
            .into_iter()
            .filter(|(qn, _)| qn.ends_with(&dotted))
            .map(|(qn, _)| qn)
            .collect()
    }

    fn descend(&self, prefix: &str) -> Option<&TrieNode> {
        let mut node = &self.root;
        if prefix.is_empty() {
            return Some(node);
        }
        for part in prefix.split('.') {
            node = node.children.get(part)?;
        }
        Some(node)
    }

    fn collect<'a>(node: &'a TrieNode, out: &mut Vec<(String, NodeKind)>) {
        if let Some((qn, kind)) = &node.endpoint {
            out.push((qn.clone(), *kind));
        }
        for child in node.children.values() {
            Self::collect(child, out);
        }
    }
}

/// `name -> set<QN>`, always a superset of the suffix-indexed view of the
/// registry. Used for last-resort resolution and parameter-name
/// heuristics; re-synced whenever the registry deletes a QN.
#[derive(Debug, Default)]
pub struct SimpleNameLookup {
    by_name: FastMap<String, FastSet<String>>,
}

impl SimpleNameLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, qn: &str) {
        let simple = qn.rsplit('.').next().unwrap_or(qn).to_string();
        self.by_name.entry(simple).or_default().insert(qn.to_string());
    }

    pub fn get(&self, simple_name: &str) -> Option<&FastSet<String>> {
        self.by_name.get(simple_name)
    }

    /// Remove every QN in `removed` from whichever simple-name buckets
    /// contain it, dropping buckets that become empty.
    pub fn remove_all(&mut self, removed: &FastSet<String>) {
        self.by_name.retain(|_, qns| {
            qns.retain(|qn| !removed.contains(qn));
            !qns.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_delete_round_trip() {
        let mut reg = FunctionRegistry::new();
        reg.insert("proj.mod.Class.method", NodeKind::Method);
        assert_eq!(reg.get("proj.mod.Class.method"), Some(NodeKind::Method));
        reg.delete("proj.mod.Class.method");
        assert_eq!(reg.get("proj.mod.Class.method"), None);
        assert!(reg.find_with_prefix("proj").is_empty());
    }

    #[test]
    fn insert_is_idempotent_overwrite() {
        let mut reg = FunctionRegistry::new();
        reg.insert("proj.mod.f", NodeKind::Function);
        reg.insert("proj.mod.f", NodeKind::Function);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn delete_prunes_empty_ancestors_but_not_shared_ones() {
        let mut reg = FunctionRegistry::new();
        reg.insert("proj.mod.A.f", NodeKind::Method);
        reg.insert("proj.mod.A.g", NodeKind::Method);
        reg.delete("proj.mod.A.f");
        // Sibling `g` keeps the `proj.mod.A` branch alive.
        assert_eq!(reg.find_with_prefix("proj.mod.A").len(), 1);
        reg.delete("proj.mod.A.g");
        assert!(reg.find_with_prefix("proj").is_empty());
        assert!(reg.root.children.is_empty());
    }

    #[test]
    fn find_with_prefix_matches_whole_segments() {
        let mut reg = FunctionRegistry::new();
        reg.insert("proj.package.module.f", NodeKind::Function);
        reg.insert("proj.packageextra.module.g", NodeKind::Function);
        let matches = reg.find_with_prefix("proj.package");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "proj.package.module.f");
    }

    #[test]
    fn find_ending_with_scans_suffix() {
        let mut reg = FunctionRegistry::new();
        reg.insert("a.b.helper", NodeKind::Function);
        reg.insert("c.d.helper", NodeKind::Function);
        reg.insert("c.d.other", NodeKind::Function);
        let mut matches = reg.find_ending_with("helper");
        matches.sort();
        assert_eq!(matches, vec!["a.b.helper".to_string(), "c.d.helper".to_string()]);
    }

    #[test]
    fn simple_name_lookup_stays_in_sync_on_delete() {
        let mut reg = FunctionRegistry::new();
        let mut names = SimpleNameLookup::new();
        reg.insert("proj.mod.helper", NodeKind::Function);
        names.insert("proj.mod.helper");
        assert!(names.get("helper").unwrap().contains("proj.mod.helper"));

        reg.delete("proj.mod.helper");
        let mut removed = FastSet::default();
        removed.insert("proj.mod.helper".to_string());
        names.remove_all(&removed);
        assert!(names.get("helper").is_none());
    }
}
