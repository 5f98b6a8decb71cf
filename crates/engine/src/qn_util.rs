// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared helpers for turning a file path into the module's qualified
//! name. Every pass that needs a module QN from a path goes through here
//! so the dotting convention stays in one place.

use std::path::Path;

/// `<project>.<pkg1>...<module>`, dropping the file extension and
/// treating `__init__`/`mod`/`index` leaves as their enclosing package.
pub fn module_qn(project_name: &str, root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let mut segments: Vec<String> = vec![project_name.to_string()];
    let mut components: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();

    if let Some(last) = components.last_mut() {
        if let Some(stem) = Path::new(last).file_stem().and_then(|s| s.to_str()) {
            *last = stem.to_string();
        }
    }
    if matches!(components.last().map(String::as_str), Some("__init__" | "mod" | "index")) {
        components.pop();
    }
    segments.extend(components);
    segments.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn drops_extension_and_dots_path() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/pkg/sub/mod.py");
        assert_eq!(module_qn("proj", &root, &file), "proj.pkg.sub.mod");
    }

    #[test]
    fn init_py_collapses_to_package() {
        let root = PathBuf::from("/repo");
        let file = PathBuf::from("/repo/pkg/__init__.py");
        assert_eq!(module_qn("proj", &root, &file), "proj.pkg");
    }
}
