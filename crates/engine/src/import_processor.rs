// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pass 2 (imports half): one AST walk per file populating the module's
//! entry in the `ImportMap`. Each language's import syntax is different
//! enough (Python's dotted/relative forms, JS/TS's specifier lists, Java's
//! scoped identifiers, Rust's `use` trees, Go/C/C++'s string paths, Lua's
//! `require(...)` calls, Scala's `import` statements) that this is mostly
//! a per-language dispatch rather than one shared table, unlike
//! `definitions.rs`.

use crate::import_map::ImportMap;
use codegraph_languages::LanguageTag;
use tree_sitter::Node;

pub struct ImportProcessor<'a> {
    imports: &'a mut ImportMap,
}

impl<'a> ImportProcessor<'a> {
    pub fn new(imports: &'a mut ImportMap) -> Self {
        Self { imports }
    }

    pub fn run(&mut self, root: Node<'_>, source: &str, module_qn: &str, language: LanguageTag) {
        let mut cursor = root.walk();
        self.walk(root, source, module_qn, language, &mut cursor);
    }

    fn walk<'t>(&mut self, node: Node<'t>, source: &str, module_qn: &str, language: LanguageTag, cursor: &mut tree_sitter::TreeCursor<'t>) {
        match language {
            LanguageTag::Python => self.python(node, source, module_qn),
            LanguageTag::JavaScript | LanguageTag::TypeScript => self.js(node, source, module_qn),
            LanguageTag::Java => self.java(node, source, module_qn),
            LanguageTag::Rust => self.rust(node, source, module_qn),
            LanguageTag::Go => self.go(node, source, module_qn),
            LanguageTag::Cpp | LanguageTag::C => self.c_family(node, source, module_qn),
            LanguageTag::Lua => self.lua(node, source, module_qn),
            LanguageTag::Scala => self.scala(node, source, module_qn),
        }
        for child in node.children(cursor) {
            self.walk(child, source, module_qn, language, &mut child.walk());
        }
    }

    fn python(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    self.python_name_entry(name, source, module_qn, None);
                }
            }
            "import_from_statement" => {
                let module_node = node.child_by_field_name("module_name");
                let base = match module_node {
                    Some(m) if m.kind() == "relative_import" => {
                        let text = text_of(m, source);
                        let (depth, tail) = split_leading_dots(&text);
                        crate::import_map::resolve_relative(module_qn, depth, tail)
                    }
                    Some(m) => text_of(m, source),
                    None => module_qn.to_string(),
                };
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    if name.kind() == "wildcard_import" {
                        self.imports.module_mut(module_qn).bind_wildcard(base.clone());
                        continue;
                    }
                    self.python_name_entry(name, source, module_qn, Some(&base));
                }
            }
            _ => {}
        }
    }

    fn python_name_entry(&mut self, name: Node<'_>, source: &str, module_qn: &str, base: Option<&str>) {
        let (name_text, alias) = if name.kind() == "aliased_import" {
            let inner = match name.child_by_field_name("name") {
                Some(n) => text_of(n, source),
                None => return,
            };
            let alias = name.child_by_field_name("alias").map(|n| text_of(n, source));
            (inner, alias)
        } else {
            (text_of(name, source), None)
        };

        let target = match base {
            Some(base) => format!("{base}.{name_text}"),
            None => name_text.clone(),
        };
        let local = alias.unwrap_or_else(|| name_text.rsplit('.').next().unwrap_or(&name_text).to_string());
        self.imports.module_mut(module_qn).bind(local, target);
    }

    fn js(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "import_statement" {
            return;
        }
        let Some(source_node) = node.child_by_field_name("source") else { return };
        let raw = text_of(source_node, source);
        let path = raw.trim_matches(|c| c == '"' || c == '\'');
        let base = if path.starts_with('.') {
            let (depth, tail) = relative_js_path(path);
            crate::import_map::resolve_relative(module_qn, depth, tail)
        } else {
            path.replace('/', ".")
        };

        let Some(clause) = node.child_by_field_name("import_clause") else {
            // A bare `import "./side-effect"` with no bindings.
            return;
        };
        self.js_clause(clause, source, module_qn, &base);
    }

    fn js_clause(&mut self, clause: Node<'_>, source: &str, module_qn: &str, base: &str) {
        match clause.kind() {
            "identifier" => {
                let local = text_of(clause, source);
                self.imports.module_mut(module_qn).bind(local, format!("{base}.default"));
            }
            "namespace_import" => {
                self.imports.module_mut(module_qn).bind_wildcard(base.to_string());
            }
            "named_imports" => {
                let mut cursor = clause.walk();
                for specifier in clause.named_children(&mut cursor) {
                    if specifier.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(name_node) = specifier.child_by_field_name("name") else { continue };
                    let name = text_of(name_node, source);
                    let local = specifier.child_by_field_name("alias").map(|n| text_of(n, source)).unwrap_or_else(|| name.clone());
                    self.imports.module_mut(module_qn).bind(local, format!("{base}.{name}"));
                }
            }
            _ => {
                let mut cursor = clause.walk();
                for child in clause.named_children(&mut cursor) {
                    self.js_clause(child, source, module_qn, base);
                }
            }
        }
    }

    fn java(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "import_declaration" {
            return;
        }
        let mut cursor = node.walk();
        let Some(path_node) = node.named_children(&mut cursor).find(|n| matches!(n.kind(), "scoped_identifier" | "identifier")) else {
            return;
        };
        let path = text_of(path_node, source).replace("::", ".");
        let is_wildcard = text_of(node, source).trim_end_matches(';').ends_with(".*");
        if is_wildcard {
            self.imports.module_mut(module_qn).bind_wildcard(path);
        } else if let Some((_parent, leaf)) = path.rsplit_once('.') {
            self.imports.module_mut(module_qn).bind(leaf, path.clone());
        } else {
            self.imports.module_mut(module_qn).bind(path.clone(), path);
        }
    }

    fn rust(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "use_declaration" {
            return;
        }
        let Some(argument) = node.child_by_field_name("argument") else { return };
        self.rust_use_tree(argument, source, module_qn, &[]);
    }

    fn rust_use_tree(&mut self, node: Node<'_>, source: &str, module_qn: &str, prefix: &[String]) {
        match node.kind() {
            "scoped_identifier" => {
                let path = text_of(node, source);
                let segments: Vec<&str> = path.split("::").collect();
                if let Some((leaf, head)) = segments.split_last() {
                    let mut full: Vec<String> = prefix.to_vec();
                    full.extend(head.iter().map(|s| s.to_string()));
                    full.push((*leaf).to_string());
                    self.imports.module_mut(module_qn).bind(*leaf, full.join("."));
                }
            }
            "identifier" | "self" => {
                let name = text_of(node, source);
                let mut full = prefix.to_vec();
                full.push(name.clone());
                self.imports.module_mut(module_qn).bind(name, full.join("."));
            }
            "use_as_clause" => {
                if let (Some(path), Some(alias)) = (node.child_by_field_name("path"), node.child_by_field_name("alias")) {
                    let mut full = prefix.to_vec();
                    full.push(text_of(path, source));
                    self.imports.module_mut(module_qn).bind(text_of(alias, source), full.join("."));
                }
            }
            "scoped_use_list" => {
                let Some(path) = node.child_by_field_name("path") else { return };
                let mut full = prefix.to_vec();
                full.push(text_of(path, source));
                if let Some(list) = node.child_by_field_name("list") {
                    let mut cursor = list.walk();
                    for item in list.named_children(&mut cursor) {
                        self.rust_use_tree(item, source, module_qn, &full);
                    }
                }
            }
            "use_list" => {
                let mut cursor = node.walk();
                for item in node.named_children(&mut cursor) {
                    self.rust_use_tree(item, source, module_qn, prefix);
                }
            }
            "use_wildcard" => {
                let Some(path) = node.named_child(0) else { return };
                let mut full = prefix.to_vec();
                full.push(text_of(path, source));
                self.imports.module_mut(module_qn).bind_wildcard(full.join("."));
            }
            _ => {}
        }
    }

    fn go(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "import_spec" {
            return;
        }
        let Some(path_node) = node.child_by_field_name("path") else { return };
        let raw = text_of(path_node, source);
        let path = raw.trim_matches('"');
        let target = path.replace('/', ".");
        let default_local = path.rsplit('/').next().unwrap_or(path).to_string();
        let local = node.child_by_field_name("name").map(|n| text_of(n, source)).unwrap_or(default_local);
        if local == "_" {
            return;
        }
        self.imports.module_mut(module_qn).bind(local, target);
    }

    fn c_family(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "preproc_include" {
            return;
        }
        let Some(path_node) = node.child_by_field_name("path") else { return };
        let raw = text_of(path_node, source);
        let path = raw.trim_matches(|c| c == '"' || c == '<' || c == '>');
        let stem = path.trim_end_matches(".h").trim_end_matches(".hpp");
        let target = stem.replace('/', ".");
        self.imports.module_mut(module_qn).bind_wildcard(target);
    }

    fn lua(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "function_call" {
            return;
        }
        let Some(name_node) = node.child_by_field_name("name") else { return };
        if name_node.kind() != "identifier" || text_of(name_node, source) != "require" {
            return;
        }
        let Some(args) = node.child_by_field_name("arguments") else { return };
        let Some(arg) = args.named_child(0) else { return };
        if arg.kind() != "string" {
            return;
        }
        let raw = text_of(arg, source);
        let path = raw.trim_matches(|c| c == '"' || c == '\'');
        let target = path.replace('.', "/").replace('/', ".");
        let local = path.rsplit(['.', '/']).next().unwrap_or(path).to_string();
        self.imports.module_mut(module_qn).bind(local, target);
    }

    fn scala(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        if node.kind() != "import_declaration" {
            return;
        }
        let mut cursor = node.walk();
        for expr in node.named_children(&mut cursor) {
            self.scala_import_expr(expr, source, module_qn);
        }
    }

    fn scala_import_expr(&mut self, node: Node<'_>, source: &str, module_qn: &str) {
        match node.kind() {
            "stable_identifier" | "identifier" => {
                let path = text_of(node, source);
                if let Some((_, leaf)) = path.rsplit_once('.') {
                    self.imports.module_mut(module_qn).bind(leaf, path.clone());
                } else {
                    self.imports.module_mut(module_qn).bind(path.clone(), path);
                }
            }
            "wildcard_import" => {
                if let Some(prefix) = node.prev_sibling() {
                    let path = text_of(prefix, source);
                    self.imports.module_mut(module_qn).bind_wildcard(path);
                }
            }
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.scala_import_expr(child, source, module_qn);
                }
            }
        }
    }
}

fn text_of(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

/// Python relative imports keep their leading dots as literal text on the
/// `relative_import` node (e.g. `..shared.utils`, or just `.` for a bare
/// `from . import x`); count them directly rather than relying on an
/// internal grammar field.
fn split_leading_dots(text: &str) -> (usize, &str) {
    let dots = text.chars().take_while(|c| *c == '.').count();
    (dots, text.trim_start_matches('.'))
}

/// JS/TS relative specifiers are slash paths, not dot-counted: `./x` stays
/// in the current package (depth 1), each leading `../` climbs one more.
fn relative_js_path(path: &str) -> (usize, &str) {
    let mut depth = 1;
    let mut rest = path;
    if let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    while let Some(stripped) = rest.strip_prefix("../") {
        depth += 1;
        rest = stripped;
    }
    (depth, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_python(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn python_bare_import_binds_full_path() {
        let source = "import os\n";
        let tree = parse_python(source);
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(tree.root_node(), source, "proj.mod", LanguageTag::Python);
        assert_eq!(imports.module("proj.mod").unwrap().resolve("os"), Some("os"));
    }

    #[test]
    fn python_from_import_aliased() {
        let source = "from proj.utils import helper as h\n";
        let tree = parse_python(source);
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(tree.root_node(), source, "proj.mod", LanguageTag::Python);
        assert_eq!(imports.module("proj.mod").unwrap().resolve("h"), Some("proj.utils.helper"));
    }

    #[test]
    fn python_wildcard_import() {
        let source = "from proj.utils import *\n";
        let tree = parse_python(source);
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(tree.root_node(), source, "proj.mod", LanguageTag::Python);
        let roots: Vec<&str> = imports.module("proj.mod").unwrap().wildcards().collect();
        assert_eq!(roots, vec!["proj.utils"]);
    }

    #[test]
    fn python_relative_import_resolves_against_module_qn() {
        let source = "from ..shared import utils\n";
        let tree = parse_python(source);
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(
            tree.root_node(),
            source,
            "proj.src.components.ui.Button",
            LanguageTag::Python,
        );
        assert_eq!(
            imports.module("proj.src.components.ui.Button").unwrap().resolve("utils"),
            Some("proj.src.components.shared.utils")
        );
    }

    #[test]
    fn js_relative_double_dot_import() {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_javascript::LANGUAGE.into()).unwrap();
        let source = "import { helper } from \"../../shared/utils\";\n";
        let tree = parser.parse(source, None).unwrap();
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(
            tree.root_node(),
            source,
            "test_project.src.components.ui.Button",
            LanguageTag::JavaScript,
        );
        assert_eq!(
            imports.module("test_project.src.components.ui.Button").unwrap().resolve("helper"),
            Some("test_project.src.shared.utils.helper")
        );
    }

    #[test]
    fn rust_use_list_binds_each_member() {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_rust::LANGUAGE.into()).unwrap();
        let source = "use std::collections::{HashMap, HashSet};\n";
        let tree = parser.parse(source, None).unwrap();
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(tree.root_node(), source, "proj.mod", LanguageTag::Rust);
        assert_eq!(imports.module("proj.mod").unwrap().resolve("HashMap"), Some("std.collections.HashMap".to_string()).as_deref());
        assert_eq!(imports.module("proj.mod").unwrap().resolve("HashSet"), Some("std.collections.HashSet".to_string()).as_deref());
    }

    #[test]
    fn go_import_spec_uses_final_path_segment_as_local_name() {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into()).unwrap();
        let source = "package main\nimport \"proj/pkg/util\"\n";
        let tree = parser.parse(source, None).unwrap();
        let mut imports = ImportMap::new();
        ImportProcessor::new(&mut imports).run(tree.root_node(), source, "proj.main", LanguageTag::Go);
        assert_eq!(imports.module("proj.main").unwrap().resolve("util"), Some("proj.pkg.util"));
    }
}
