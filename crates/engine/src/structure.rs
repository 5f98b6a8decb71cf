// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pass 1: walk the repository tree, emit `Project`/`Package`/`Folder`
//! and generic `File` nodes, and hand back the list of source files a
//! supported language can parse.

use codegraph_core::{EdgeKind, Ingestor, NodeKind, NodeRef};
use codegraph_languages::LanguageTag;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// A source file discovered during the structure pass, tagged with the
/// language its extension maps to.
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub language: LanguageTag,
}

/// Scans `root`, respecting `.gitignore` and the fixed ignore list, and
/// emits structural nodes. Returns the files pass 2 should parse.
pub struct StructureProcessor<'a, I: Ingestor> {
    ingestor: &'a mut I,
}

const IGNORED_DIR_NAMES: &[&str] = &[
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "venv",
    ".mypy_cache",
    ".pytest_cache",
];

impl<'a, I: Ingestor> StructureProcessor<'a, I> {
    pub fn new(ingestor: &'a mut I) -> Self {
        Self { ingestor }
    }

    pub fn run(&mut self, root: &Path, project_name: &str) -> Vec<DiscoveredFile> {
        let project = NodeRef::path(NodeKind::Project, root.to_string_lossy().to_string());
        self.ingestor.ensure_node(project.clone(), Default::default());

        let mut discovered = Vec::new();
        let walker = WalkBuilder::new(root)
            .hidden(false)
            .filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !IGNORED_DIR_NAMES.contains(&name))
                    .unwrap_or(true)
            })
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if path == root {
                continue;
            }
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let parent = path.parent().unwrap_or(root);
            let parent_ref = if parent == root {
                project.clone()
            } else {
                NodeRef::path(NodeKind::Folder, parent.to_string_lossy().to_string())
            };

            if is_dir {
                let folder = NodeRef::path(NodeKind::Folder, path.to_string_lossy().to_string());
                self.ingestor.ensure_node(folder.clone(), Default::default());
                self.ingestor
                    .ensure_relationship(parent_ref, EdgeKind::ContainsPackage, folder, Default::default());
                continue;
            }

            let file_ref = NodeRef::path(NodeKind::File, path.to_string_lossy().to_string());
            self.ingestor.ensure_node(file_ref.clone(), Default::default());
            self.ingestor
                .ensure_relationship(parent_ref, EdgeKind::ContainsFile, file_ref, Default::default());

            if let Some(language) = path.extension().and_then(|e| e.to_str()).and_then(LanguageTag::from_extension) {
                discovered.push(DiscoveredFile {
                    path: path.to_path_buf(),
                    language,
                });
            }
        }

        let _ = project_name;
        discovered
    }
}
