// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pass 2 (definitions half): one AST walk per file, emitting
//! `DEFINES`/`DEFINES_METHOD`/`INHERITS` and populating the registry,
//! simple-name index, and class-inheritance table. Method qualification
//! and nested-function QN inheritance follow the rules in the engine's
//! requirements document; a handful of languages (Go receivers, C++
//! out-of-class `Class::method`, Rust `impl` blocks, Lua dotted method
//! names) need a small amount of per-language handling beyond the
//! generic scope-stack walk, kept in `special_case` below.

use codegraph_core::{ClassInheritance, EdgeKind, FastMap, FunctionRegistry, Ingestor, NodeKind, NodeRef, SimpleNameLookup};
use codegraph_languages::LanguageTag;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// One entry in a language's definition table: a tree-sitter node kind
/// that opens a new scope, the `NodeKind` it produces (subject to the
/// function→method reclassification below), the field holding its name,
/// and, for class-like nodes, the field holding its base-class clause.
struct DefKindSpec {
    node_kind: &'static str,
    produced: NodeKind,
    name_field: &'static str,
    bases_field: Option<&'static str>,
}

fn def_table(language: LanguageTag) -> &'static [DefKindSpec] {
    use NodeKind::{Class, Enum, Function, Interface};
    match language {
        LanguageTag::Python => &[
            DefKindSpec { node_kind: "class_definition", produced: Class, name_field: "name", bases_field: Some("superclasses") },
            DefKindSpec { node_kind: "function_definition", produced: Function, name_field: "name", bases_field: None },
        ],
        LanguageTag::JavaScript => &[
            DefKindSpec { node_kind: "class_declaration", produced: Class, name_field: "name", bases_field: Some("superclass") },
            DefKindSpec { node_kind: "function_declaration", produced: Function, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "method_definition", produced: NodeKind::Method, name_field: "name", bases_field: None },
        ],
        LanguageTag::TypeScript => &[
            DefKindSpec { node_kind: "class_declaration", produced: Class, name_field: "name", bases_field: Some("superclass") },
            DefKindSpec { node_kind: "interface_declaration", produced: Interface, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "enum_declaration", produced: Enum, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "function_declaration", produced: Function, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "method_definition", produced: NodeKind::Method, name_field: "name", bases_field: None },
        ],
        LanguageTag::Java => &[
            DefKindSpec { node_kind: "class_declaration", produced: Class, name_field: "name", bases_field: Some("superclass") },
            DefKindSpec { node_kind: "interface_declaration", produced: Interface, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "enum_declaration", produced: Enum, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "method_declaration", produced: NodeKind::Method, name_field: "name", bases_field: None },
        ],
        LanguageTag::Rust => &[
            DefKindSpec { node_kind: "struct_item", produced: Class, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "enum_item", produced: Enum, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "trait_item", produced: Interface, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "function_item", produced: Function, name_field: "name", bases_field: None },
        ],
        LanguageTag::Scala => &[
            DefKindSpec { node_kind: "class_definition", produced: Class, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "object_definition", produced: Class, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "trait_definition", produced: Interface, name_field: "name", bases_field: None },
            DefKindSpec { node_kind: "function_definition", produced: Function, name_field: "name", bases_field: None },
        ],
        // Go, C, C++, Lua have irregular enough shapes (receiver clauses,
        // nested function declarators, dotted method names) that they're
        // handled entirely by `special_case` instead of this table.
        LanguageTag::Go | LanguageTag::C | LanguageTag::Cpp | LanguageTag::Lua => &[],
    }
}

#[derive(Clone)]
struct Scope {
    qn: String,
    kind: NodeKind,
}

pub struct DefinitionProcessor<'a, I: Ingestor> {
    ingestor: &'a mut I,
    registry: &'a mut FunctionRegistry,
    names: &'a mut SimpleNameLookup,
    inheritance: &'a mut ClassInheritance,
    /// `QN -> file path`, so the type-inference engine can later locate a
    /// method's body to infer its return type.
    locations: &'a mut FastMap<String, PathBuf>,
    /// `file path -> module QN`, so the calls pass can reconstruct the
    /// scope stack needed to re-locate a given QN's AST node in another
    /// file (see `scope::find_definition_node`).
    file_modules: &'a mut FastMap<PathBuf, String>,
    current_file: PathBuf,
}

impl<'a, I: Ingestor> DefinitionProcessor<'a, I> {
    pub fn new(
        ingestor: &'a mut I,
        registry: &'a mut FunctionRegistry,
        names: &'a mut SimpleNameLookup,
        inheritance: &'a mut ClassInheritance,
        locations: &'a mut FastMap<String, PathBuf>,
        file_modules: &'a mut FastMap<PathBuf, String>,
    ) -> Self {
        Self { ingestor, registry, names, inheritance, locations, file_modules, current_file: PathBuf::new() }
    }

    /// Walk `root` (the file's tree-sitter root node) and emit every
    /// definition found, scoped under `module_qn`.
    pub fn run(&mut self, root: Node<'_>, source: &str, module_qn: &str, language: LanguageTag, file: &Path) {
        self.current_file = file.to_path_buf();
        self.locations.insert(module_qn.to_string(), file.to_path_buf());
        self.file_modules.insert(file.to_path_buf(), module_qn.to_string());
        let module_scope = Scope { qn: module_qn.to_string(), kind: NodeKind::Module };
        let mut stack = vec![module_scope];
        self.walk(root, source, language, &mut stack);
    }

    fn walk(&mut self, node: Node<'_>, source: &str, language: LanguageTag, stack: &mut Vec<Scope>) {
        if let Some(scope) = self.try_generic_def(node, source, language, stack.as_slice()) {
            stack.push(scope);
            self.walk_children(node, source, language, stack);
            stack.pop();
            return;
        }
        if let Some(scope) = special_case::try_special_def(
            node,
            source,
            language,
            stack.as_slice(),
            self.registry,
            self.names,
            self.ingestor,
            self.locations,
            &self.current_file,
        ) {
            stack.push(scope);
            self.walk_children(node, source, language, stack);
            stack.pop();
            return;
        }
        self.walk_children(node, source, language, stack);
    }

    fn walk_children(&mut self, node: Node<'_>, source: &str, language: LanguageTag, stack: &mut Vec<Scope>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, source, language, stack);
        }
    }

    fn try_generic_def(&mut self, node: Node<'_>, source: &str, language: LanguageTag, stack: &[Scope]) -> Option<Scope> {
        let spec = def_table(language).iter().find(|s| s.node_kind == node.kind())?;
        let name_node = node.child_by_field_name(spec.name_field)?;
        let name = text_of(name_node, source);
        let parent = stack.last().expect("module scope always present");

        let (qn, kind) = self.qualify(parent, spec.produced, &name);
        self.emit_definition(parent, &qn, kind, node, source, spec.bases_field);
        Some(Scope { qn, kind })
    }

    /// Compute the new definition's QN and its effective kind: a
    /// `Function`-shaped def nested in a class/interface becomes a
    /// `Method`; nested inside another function it inherits that
    /// function's QN as a prefix and keeps its own produced kind.
    fn qualify(&self, parent: &Scope, produced: NodeKind, name: &str) -> (String, NodeKind) {
        let kind = if produced == NodeKind::Function
            && matches!(parent.kind, NodeKind::Class | NodeKind::Interface | NodeKind::Enum)
        {
            NodeKind::Method
        } else {
            produced
        };
        (format!("{}.{name}", parent.qn), kind)
    }

    fn emit_definition(
        &mut self,
        parent: &Scope,
        qn: &str,
        kind: NodeKind,
        node: Node<'_>,
        source: &str,
        bases_field: Option<&'static str>,
    ) {
        self.registry.insert(qn, kind);
        self.names.insert(qn);
        self.locations.insert(qn.to_string(), self.current_file.clone());

        let parent_ref = NodeRef::qualified_name(parent.kind, parent.qn.clone());
        let child_ref = NodeRef::qualified_name(kind, qn.to_string());
        let edge = if kind == NodeKind::Method { EdgeKind::DefinesMethod } else { EdgeKind::Defines };
        self.ingestor.ensure_relationship(parent_ref, edge, child_ref, Default::default());

        if let Some(field) = bases_field {
            if let Some(bases_node) = node.child_by_field_name(field) {
                let module_qn = self.file_modules.get(&self.current_file).cloned().unwrap_or_default();
                let parents: Vec<String> = extract_base_names(bases_node, source)
                    .into_iter()
                    .map(|raw| self.resolve_base_name(&raw, &module_qn))
                    .collect();
                if !parents.is_empty() {
                    for base in &parents {
                        let base_ref = NodeRef::qualified_name(NodeKind::Class, base.clone());
                        let child_ref = NodeRef::qualified_name(kind, qn.to_string());
                        self.ingestor
                            .ensure_relationship(child_ref, EdgeKind::Inherits, base_ref, Default::default());
                    }
                    self.inheritance.set_parents(qn.to_string(), parents);
                }
            }
        }
    }

    /// Resolve a base-class clause's raw identifier text to a qualified
    /// name: same-module first, then any already-known class/interface
    /// whose QN ends with that simple name (picking the one sharing the
    /// longest dotted prefix with the referencing module), falling back
    /// to the raw text itself for bases this analysis never sees defined
    /// (an external or third-party superclass).
    fn resolve_base_name(&self, raw: &str, module_qn: &str) -> String {
        if raw.contains("::") {
            return raw.replace("::", ".");
        }
        if raw.contains('.') {
            return raw.to_string();
        }
        let same_module = format!("{module_qn}.{raw}");
        if matches!(self.registry.get(&same_module), Some(NodeKind::Class | NodeKind::Interface)) {
            return same_module;
        }
        let mut candidates: Vec<String> = self
            .registry
            .find_ending_with(raw)
            .into_iter()
            .filter(|candidate| matches!(self.registry.get(candidate), Some(NodeKind::Class | NodeKind::Interface)))
            .collect();
        candidates.sort_by(|a, b| common_prefix_len(b, module_qn).cmp(&common_prefix_len(a, module_qn)));
        candidates.into_iter().next().unwrap_or_else(|| raw.to_string())
    }
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.split('.').zip(b.split('.')).take_while(|(x, y)| x == y).count()
}

/// Pull every identifier-shaped leaf out of a bases/superclass clause, as
/// raw source text. `resolve_base_name` turns each of these into a
/// qualified name once this call returns.
fn extract_base_names(node: Node<'_>, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    collect_identifiers(node, source, &mut cursor, &mut out);
    out
}

fn collect_identifiers<'a>(node: Node<'a>, source: &str, cursor: &mut tree_sitter::TreeCursor<'a>, out: &mut Vec<String>) {
    if matches!(node.kind(), "identifier" | "type_identifier" | "scoped_identifier" | "qualified_identifier") {
        out.push(text_of(node, source));
        return;
    }
    for child in node.children(cursor) {
        collect_identifiers(child, source, &mut child.walk(), out);
    }
}

pub(crate) fn text_of(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

mod special_case {
    use super::{text_of, Scope};
    use codegraph_core::{EdgeKind, FastMap, FunctionRegistry, Ingestor, NodeKind, NodeRef, SimpleNameLookup};
    use codegraph_languages::LanguageTag;
    use std::path::{Path, PathBuf};
    use tree_sitter::Node;

    /// Handles the shapes the generic table can't: Go's receiver-based
    /// methods and struct/interface `type_declaration`s, Rust `impl`
    /// blocks (scope-opening but not themselves a definition), C/C++
    /// function declarators (name buried inside `function_declarator`,
    /// possibly qualified as `Class::method`), and Lua's dotted method
    /// names.
    pub(super) fn try_special_def<I: Ingestor>(
        node: Node<'_>,
        source: &str,
        language: LanguageTag,
        stack: &[Scope],
        registry: &mut FunctionRegistry,
        names: &mut SimpleNameLookup,
        ingestor: &mut I,
        locations: &mut FastMap<String, PathBuf>,
        current_file: &Path,
    ) -> Option<Scope> {
        match language {
            LanguageTag::Rust if node.kind() == "impl_item" => {
                let type_name = node.child_by_field_name("type").map(|n| text_of(n, source))?;
                let parent = stack.last()?;
                let qn = format!("{}.{type_name}", parent.qn);
                // The struct/enum itself was already defined; entering
                // this scope only affects where nested `fn`s land.
                Some(Scope { qn, kind: NodeKind::Class })
            }
            LanguageTag::Go if node.kind() == "method_declaration" => {
                let receiver = node.child_by_field_name("receiver")?;
                let type_name = find_type_identifier(receiver, source)?;
                let name = node.child_by_field_name("name").map(|n| text_of(n, source))?;
                let parent = stack.last()?;
                let qn = format!("{}.{type_name}.{name}", parent.qn);
                define(registry, names, ingestor, locations, current_file, &NodeRef::qualified_name(NodeKind::Class, format!("{}.{type_name}", parent.qn)), &qn, NodeKind::Method, EdgeKind::DefinesMethod);
                None
            }
            LanguageTag::Go if node.kind() == "type_declaration" => {
                let spec = node.named_child(0)?;
                let name = spec.child_by_field_name("name").map(|n| text_of(n, source))?;
                let ty = spec.child_by_field_name("type")?;
                let parent = stack.last()?;
                let kind = match ty.kind() {
                    "interface_type" => NodeKind::Interface,
                    _ => NodeKind::Class,
                };
                let qn = format!("{}.{name}", parent.qn);
                define(registry, names, ingestor, locations, current_file, &NodeRef::qualified_name(parent.kind, parent.qn.clone()), &qn, kind, EdgeKind::Defines);
                Some(Scope { qn, kind })
            }
            LanguageTag::C | LanguageTag::Cpp if node.kind() == "function_definition" => {
                let declarator = node.child_by_field_name("declarator")?;
                let inner = find_function_declarator_name(declarator, source)?;
                let parent = stack.last()?;
                // `Class::method` resolves to the class, not the file module.
                let (owner_qn, owner_kind, name, is_method) = if let Some((class, method)) = inner.split_once("::") {
                    (format!("{}.{class}", parent.qn), NodeKind::Class, method.to_string(), true)
                } else {
                    (parent.qn.clone(), parent.kind, inner, false)
                };
                let kind = if is_method { NodeKind::Method } else { NodeKind::Function };
                let qn = format!("{owner_qn}.{name}");
                let edge = if is_method { EdgeKind::DefinesMethod } else { EdgeKind::Defines };
                define(registry, names, ingestor, locations, current_file, &NodeRef::qualified_name(owner_kind, owner_qn), &qn, kind, edge);
                Some(Scope { qn, kind })
            }
            LanguageTag::Lua if node.kind() == "function_declaration" => {
                let name_node = node.child_by_field_name("name")?;
                let parent = stack.last()?;
                if name_node.kind() == "dot_index_expression" {
                    let object = name_node.child_by_field_name("table").map(|n| text_of(n, source))?;
                    let field = name_node.child_by_field_name("field").map(|n| text_of(n, source))?;
                    let owner_qn = format!("{}.{object}", parent.qn);
                    let qn = format!("{owner_qn}.{field}");
                    define(registry, names, ingestor, locations, current_file, &NodeRef::qualified_name(NodeKind::Class, owner_qn), &qn, NodeKind::Method, EdgeKind::DefinesMethod);
                    Some(Scope { qn, kind: NodeKind::Method })
                } else {
                    let name = text_of(name_node, source);
                    let qn = format!("{}.{name}", parent.qn);
                    define(registry, names, ingestor, locations, current_file, &NodeRef::qualified_name(parent.kind, parent.qn.clone()), &qn, NodeKind::Function, EdgeKind::Defines);
                    Some(Scope { qn, kind: NodeKind::Function })
                }
            }
            _ => None,
        }
    }

    fn define<I: Ingestor>(
        registry: &mut FunctionRegistry,
        names: &mut SimpleNameLookup,
        ingestor: &mut I,
        locations: &mut FastMap<String, PathBuf>,
        current_file: &Path,
        parent_ref: &NodeRef,
        qn: &str,
        kind: NodeKind,
        edge: EdgeKind,
    ) {
        registry.insert(qn, kind);
        names.insert(qn);
        locations.insert(qn.to_string(), current_file.to_path_buf());
        let child_ref = NodeRef::qualified_name(kind, qn.to_string());
        ingestor.ensure_relationship(parent_ref.clone(), edge, child_ref, Default::default());
    }

    fn find_type_identifier(node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() == "type_identifier" {
            return Some(text_of(node, source));
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_type_identifier(child, source) {
                return Some(found);
            }
        }
        None
    }

    /// Descend a (possibly pointer-wrapped) `function_declarator` chain to
    /// find its name, which may be a plain `identifier` or a
    /// `qualified_identifier`/`field_identifier` for an out-of-class
    /// C++ method definition.
    fn find_function_declarator_name(node: Node<'_>, source: &str) -> Option<String> {
        if node.kind() == "function_declarator" {
            let inner = node.child_by_field_name("declarator")?;
            return find_function_declarator_name(inner, source);
        }
        if matches!(node.kind(), "identifier" | "field_identifier" | "qualified_identifier") {
            return Some(text_of(node, source));
        }
        node.child_by_field_name("declarator")
            .and_then(|inner| find_function_declarator_name(inner, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{ClassInheritance, FunctionRegistry};
    use std::path::PathBuf;
    use tree_sitter::Parser;

    fn parse_python(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[derive(Default)]
    struct RecordingIngestor {
        inherits: Vec<(String, String)>,
    }

    impl Ingestor for RecordingIngestor {
        fn ensure_node(&mut self, _node: NodeRef, _properties: codegraph_core::Properties) {}
        fn ensure_relationship(&mut self, src: NodeRef, kind: EdgeKind, dst: NodeRef, _properties: codegraph_core::Properties) {
            if kind == EdgeKind::Inherits {
                self.inherits.push((src.value, dst.value));
            }
        }
        fn flush_all(&mut self) -> codegraph_core::CoreResult<()> {
            Ok(())
        }
    }

    /// A bare base-class reference (`class B(A):`) must resolve to the
    /// defining module's QN, not survive as the literal source text `A`,
    /// since `OverrideProcessor` and `super()` resolution both key
    /// `ClassInheritance`'s parent lists by QN.
    #[test]
    fn bare_base_name_resolves_to_same_module_qn() {
        let source = "class A:\n    pass\n\nclass B(A):\n    pass\n";
        let tree = parse_python(source);
        let mut registry = FunctionRegistry::new();
        let mut names = SimpleNameLookup::new();
        let mut inheritance = ClassInheritance::default();
        let mut locations = FastMap::default();
        let mut file_modules = FastMap::default();
        let mut ingestor = RecordingIngestor::default();

        {
            let mut processor =
                DefinitionProcessor::new(&mut ingestor, &mut registry, &mut names, &mut inheritance, &mut locations, &mut file_modules);
            processor.run(tree.root_node(), source, "proj.mod", LanguageTag::Python, &PathBuf::from("mod.py"));
        }

        assert!(ingestor.inherits.contains(&("proj.mod.B".to_string(), "proj.mod.A".to_string())));
        let ancestor = inheritance.find_ancestor("proj.mod.B", |parent| (parent == "proj.mod.A").then(|| parent.to_string()));
        assert_eq!(ancestor, Some("proj.mod.A".to_string()));
    }

    /// A base class that is never defined anywhere this analysis sees
    /// (an external/third-party superclass) keeps its literal name rather
    /// than being dropped.
    #[test]
    fn unknown_base_name_falls_back_to_literal_text() {
        let source = "class Widget(Unknown):\n    pass\n";
        let tree = parse_python(source);
        let mut registry = FunctionRegistry::new();
        let mut names = SimpleNameLookup::new();
        let mut inheritance = ClassInheritance::default();
        let mut locations = FastMap::default();
        let mut file_modules = FastMap::default();
        let mut ingestor = RecordingIngestor::default();

        {
            let mut processor =
                DefinitionProcessor::new(&mut ingestor, &mut registry, &mut names, &mut inheritance, &mut locations, &mut file_modules);
            processor.run(tree.root_node(), source, "proj.mod", LanguageTag::Python, &PathBuf::from("mod.py"));
        }

        assert!(ingestor.inherits.contains(&("proj.mod.Widget".to_string(), "Unknown".to_string())));
    }
}
