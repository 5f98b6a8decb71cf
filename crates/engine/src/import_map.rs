// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-module alias tables. One `ImportMap` entry set is built per module
//! from its import statements; the call resolver consults it before
//! falling back to same-module or trie resolution.

use codegraph_core::FastMap;

/// `LocalName -> TargetQN` for one module. A `LocalName` starting with
/// `*` is a wildcard/namespace entry: key `"*p"` -> value `"p"` means "try
/// `p.<name>` for any name not otherwise resolvable".
#[derive(Debug, Default, Clone)]
pub struct ModuleImports {
    aliases: FastMap<String, String>,
}

impl ModuleImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, local_name: impl Into<String>, target_qn: impl Into<String>) {
        self.aliases.insert(local_name.into(), target_qn.into());
    }

    pub fn bind_wildcard(&mut self, root_qn: impl Into<String>) {
        let root = root_qn.into();
        self.aliases.insert(format!("*{root}"), root);
    }

    pub fn resolve(&self, local_name: &str) -> Option<&str> {
        self.aliases.get(local_name).map(String::as_str)
    }

    pub fn wildcards(&self) -> impl Iterator<Item = &str> {
        self.aliases
            .iter()
            .filter(|(k, _)| k.starts_with('*'))
            .map(|(_, v)| v.as_str())
    }
}

/// `ModuleQN -> ModuleImports`, populated once per module during the
/// definitions pass and consulted read-only during call resolution.
#[derive(Debug, Default)]
pub struct ImportMap {
    modules: FastMap<String, ModuleImports>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module_mut(&mut self, module_qn: &str) -> &mut ModuleImports {
        self.modules.entry(module_qn.to_string()).or_default()
    }

    pub fn module(&self, module_qn: &str) -> Option<&ModuleImports> {
        self.modules.get(module_qn)
    }

    pub fn remove_prefix(&mut self, qn_prefix: &str) {
        self.modules
            .retain(|qn, _| !(qn == qn_prefix || qn.starts_with(&format!("{qn_prefix}."))));
    }
}

/// Resolve a relative import's leading-dot depth against the importing
/// module's own segments: one leading dot means "this package", two means
/// "parent package", mirroring Python's `from . import x` / `from ..
/// import x`. JS/TS callers count `../` segments the same way and pass
/// that count here instead.
pub fn resolve_relative(module_qn: &str, dot_depth: usize, tail: &str) -> String {
    let mut segments: Vec<&str> = module_qn.split('.').collect();
    // One dot stays in the current package (drop just the module leaf);
    // each further dot climbs one more package level.
    let drop = dot_depth.max(1);
    for _ in 0..drop {
        segments.pop();
    }
    if tail.is_empty() {
        segments.join(".")
    } else {
        segments.push(tail);
        segments.join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_aliased_binds() {
        let mut m = ModuleImports::new();
        m.bind("X", "pkg.mod.X");
        m.bind("Y", "pkg.mod.X");
        assert_eq!(m.resolve("X"), Some("pkg.mod.X"));
        assert_eq!(m.resolve("Y"), Some("pkg.mod.X"));
    }

    #[test]
    fn wildcard_roundtrips_through_marker_key() {
        let mut m = ModuleImports::new();
        m.bind_wildcard("proj.utils");
        let roots: Vec<&str> = m.wildcards().collect();
        assert_eq!(roots, vec!["proj.utils"]);
    }

    #[test]
    fn single_dot_stays_in_package() {
        assert_eq!(resolve_relative("proj.pkg.mod", 1, "sibling"), "proj.pkg.sibling");
    }

    #[test]
    fn double_dot_climbs_to_parent_package() {
        assert_eq!(resolve_relative("proj.pkg.sub.mod", 2, "x"), "proj.pkg.x");
    }
}
