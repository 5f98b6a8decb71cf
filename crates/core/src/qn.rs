// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Qualified names: the ordered, dotted (or `::`-separated) path that
//! uniquely identifies a definition.

use std::fmt;

/// The separator used to join qualified-name segments in the registry.
/// Individual languages may emit `::` at the syntax level (Rust), but the
/// canonical form stored in the registry always joins segments with `.`;
/// `CallResolver` normalizes language-specific separators before lookup.
pub const SEPARATOR: char = '.';

/// An ordered, dotted path uniquely identifying a definition:
/// `<project>.<pkg1>...<pkgN>.<module>[.<class>]*.<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName(String);

impl QualifiedName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Dotted segments of this qualified name, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// The final segment (the definition's own simple name).
    pub fn last_segment(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// The qualified name of the enclosing container, if any
    /// (`a.b.c` -> `Some("a.b")`; `a` -> `None`).
    pub fn parent(&self) -> Option<QualifiedName> {
        self.0
            .rfind(SEPARATOR)
            .map(|idx| QualifiedName(self.0[..idx].to_string()))
    }

    /// Build a child qualified name by appending a segment.
    pub fn child(&self, name: &str) -> QualifiedName {
        QualifiedName(format!("{}{SEPARATOR}{name}", self.0))
    }

    pub fn starts_with(&self, prefix: &QualifiedName) -> bool {
        self.0 == prefix.0 || self.0.starts_with(&format!("{}{SEPARATOR}", prefix.0))
    }

    /// `true` if `self`'s dotted-segment sequence begins with `prefix`'s
    /// segments (matching on whole segments, not raw substrings).
    pub fn has_segment_prefix(&self, prefix: &str) -> bool {
        if prefix.is_empty() {
            return true;
        }
        let mut mine = self.segments();
        for want in prefix.split(SEPARATOR) {
            match mine.next() {
                Some(have) if have == want => continue,
                _ => return false,
            }
        }
        true
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QualifiedName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for QualifiedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_and_child_round_trip() {
        let qn = QualifiedName::new("proj.pkg.mod.Class.method");
        assert_eq!(qn.last_segment(), "method");
        let parent = qn.parent().unwrap();
        assert_eq!(parent.as_str(), "proj.pkg.mod.Class");
        assert_eq!(parent.child("method"), qn);
    }

    #[test]
    fn segment_prefix_matches_whole_segments_only() {
        let qn = QualifiedName::new("proj.package.module");
        assert!(qn.has_segment_prefix("proj.package"));
        assert!(qn.has_segment_prefix("proj"));
        assert!(qn.has_segment_prefix(""));
        assert!(!qn.has_segment_prefix("proj.pack"));
        assert!(!qn.has_segment_prefix("proj.package.module.extra"));
    }

    #[test]
    fn starts_with_requires_segment_boundary() {
        let qn = QualifiedName::new("proj.packageextra.module");
        let prefix = QualifiedName::new("proj.package");
        assert!(!qn.starts_with(&prefix));
    }
}
