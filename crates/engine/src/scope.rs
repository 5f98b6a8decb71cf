// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A pure (side-effect-free) mirror of the scope transitions
//! `DefinitionProcessor` recognizes, used by the calls pass to know which
//! function/method QN a call site belongs to without redoing any of the
//! definitions pass's node/edge emission. Kept in its own module instead
//! of sharing `DefinitionProcessor`'s walk because the two passes need
//! different side effects (emit-and-scope vs scope-only).

use crate::definitions::text_of;
use codegraph_core::NodeKind;
use codegraph_languages::LanguageTag;
use tree_sitter::Node;

#[derive(Clone)]
pub struct Scope {
    pub qn: String,
    pub kind: NodeKind,
}

struct DefSpec {
    node_kind: &'static str,
    produced: NodeKind,
    name_field: &'static str,
}

fn table(language: LanguageTag) -> &'static [DefSpec] {
    use NodeKind::{Class, Enum, Function, Interface};
    match language {
        LanguageTag::Python => &[
            DefSpec { node_kind: "class_definition", produced: Class, name_field: "name" },
            DefSpec { node_kind: "function_definition", produced: Function, name_field: "name" },
        ],
        LanguageTag::JavaScript => &[
            DefSpec { node_kind: "class_declaration", produced: Class, name_field: "name" },
            DefSpec { node_kind: "function_declaration", produced: Function, name_field: "name" },
            DefSpec { node_kind: "method_definition", produced: NodeKind::Method, name_field: "name" },
        ],
        LanguageTag::TypeScript => &[
            DefSpec { node_kind: "class_declaration", produced: Class, name_field: "name" },
            DefSpec { node_kind: "interface_declaration", produced: Interface, name_field: "name" },
            DefSpec { node_kind: "enum_declaration", produced: Enum, name_field: "name" },
            DefSpec { node_kind: "function_declaration", produced: Function, name_field: "name" },
            DefSpec { node_kind: "method_definition", produced: NodeKind::Method, name_field: "name" },
        ],
        LanguageTag::Java => &[
            DefSpec { node_kind: "class_declaration", produced: Class, name_field: "name" },
            DefSpec { node_kind: "interface_declaration", produced: Interface, name_field: "name" },
            DefSpec { node_kind: "enum_declaration", produced: Enum, name_field: "name" },
            DefSpec { node_kind: "method_declaration", produced: NodeKind::Method, name_field: "name" },
        ],
        LanguageTag::Rust => &[
            DefSpec { node_kind: "struct_item", produced: Class, name_field: "name" },
            DefSpec { node_kind: "enum_item", produced: Enum, name_field: "name" },
            DefSpec { node_kind: "trait_item", produced: Interface, name_field: "name" },
            DefSpec { node_kind: "function_item", produced: Function, name_field: "name" },
        ],
        LanguageTag::Scala => &[
            DefSpec { node_kind: "class_definition", produced: Class, name_field: "name" },
            DefSpec { node_kind: "object_definition", produced: Class, name_field: "name" },
            DefSpec { node_kind: "trait_definition", produced: Interface, name_field: "name" },
            DefSpec { node_kind: "function_definition", produced: Function, name_field: "name" },
        ],
        LanguageTag::Go | LanguageTag::C | LanguageTag::Cpp | LanguageTag::Lua => &[],
    }
}

/// If `node` opens a new definition scope, return it (with the
/// function-in-a-class -> method reclassification already applied).
/// Mirrors `DefinitionProcessor::try_generic_def`/`special_case` but
/// performs no registry/ingestor mutation.
pub fn next_scope(node: Node<'_>, source: &str, language: LanguageTag, stack: &[Scope]) -> Option<Scope> {
    if let Some(spec) = table(language).iter().find(|s| s.node_kind == node.kind()) {
        let name_node = node.child_by_field_name(spec.name_field)?;
        let name = text_of(name_node, source);
        let parent = stack.last()?;
        let kind = if spec.produced == NodeKind::Function
            && matches!(parent.kind, NodeKind::Class | NodeKind::Interface | NodeKind::Enum)
        {
            NodeKind::Method
        } else {
            spec.produced
        };
        return Some(Scope { qn: format!("{}.{name}", parent.qn), kind });
    }

    match language {
        LanguageTag::Rust if node.kind() == "impl_item" => {
            let type_name = node.child_by_field_name("type").map(|n| text_of(n, source))?;
            let parent = stack.last()?;
            Some(Scope { qn: format!("{}.{type_name}", parent.qn), kind: NodeKind::Class })
        }
        LanguageTag::Go if node.kind() == "method_declaration" => {
            let receiver = node.child_by_field_name("receiver")?;
            let type_name = find_type_identifier(receiver, source)?;
            let name = node.child_by_field_name("name").map(|n| text_of(n, source))?;
            let parent = stack.last()?;
            Some(Scope { qn: format!("{}.{type_name}.{name}", parent.qn), kind: NodeKind::Method })
        }
        LanguageTag::Go if node.kind() == "type_declaration" => {
            let spec = node.named_child(0)?;
            let name = spec.child_by_field_name("name").map(|n| text_of(n, source))?;
            let ty = spec.child_by_field_name("type")?;
            let parent = stack.last()?;
            let kind = if ty.kind() == "interface_type" { NodeKind::Interface } else { NodeKind::Class };
            Some(Scope { qn: format!("{}.{name}", parent.qn), kind })
        }
        LanguageTag::C | LanguageTag::Cpp if node.kind() == "function_definition" => {
            let declarator = node.child_by_field_name("declarator")?;
            let inner = find_function_declarator_name(declarator, source)?;
            let parent = stack.last()?;
            let (owner_qn, name, is_method) = if let Some((class, method)) = inner.split_once("::") {
                (format!("{}.{class}", parent.qn), method.to_string(), true)
            } else {
                (parent.qn.clone(), inner, false)
            };
            let kind = if is_method { NodeKind::Method } else { NodeKind::Function };
            Some(Scope { qn: format!("{owner_qn}.{name}"), kind })
        }
        LanguageTag::Lua if node.kind() == "function_declaration" => {
            let name_node = node.child_by_field_name("name")?;
            let parent = stack.last()?;
            if name_node.kind() == "dot_index_expression" {
                let object = name_node.child_by_field_name("table").map(|n| text_of(n, source))?;
                let field = name_node.child_by_field_name("field").map(|n| text_of(n, source))?;
                Some(Scope { qn: format!("{}.{object}.{field}", parent.qn), kind: NodeKind::Method })
            } else {
                let name = text_of(name_node, source);
                Some(Scope { qn: format!("{}.{name}", parent.qn), kind: NodeKind::Function })
            }
        }
        _ => None,
    }
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

/// The nearest enclosing function/method scope in `stack`, or the module
/// scope (stack[0]) if the call site sits directly in module-level code.
pub fn enclosing_callable(stack: &[Scope]) -> &Scope {
    stack
        .iter()
        .rev()
        .find(|s| s.kind.is_callable())
        .unwrap_or_else(|| stack.first().expect("module scope always present"))
}

/// The nearest enclosing class/interface/enum QN in `stack`, if any —
/// the `self`/`cls`/`this` type used by `super` resolution and attribute
/// type inference.
pub fn enclosing_class(stack: &[Scope]) -> Option<&str> {
    stack
        .iter()
        .rev()
        .find(|s| matches!(s.kind, NodeKind::Class | NodeKind::Interface | NodeKind::Enum))
        .map(|s| s.qn.as_str())
}

/// Re-walks a file's AST looking for the scope whose computed QN equals
/// `target_qn`, returning its node and (if nested in a class) the
/// enclosing class's QN. Used by the calls pass to locate a called
/// method's body for return-type inference without storing a node
/// reference for every definition up front (tree-sitter nodes borrow
/// from the tree they came from, so they can't be stashed in the
/// registry alongside the QN).
pub fn find_definition_node<'t>(
    root: Node<'t>,
    source: &str,
    language: LanguageTag,
    module_qn: &str,
    target_qn: &str,
) -> Option<(Node<'t>, Option<String>)> {
    let mut stack = vec![Scope { qn: module_qn.to_string(), kind: NodeKind::Module }];
    find_in(root, source, language, &mut stack, target_qn)
}

fn find_in<'t>(
    node: Node<'t>,
    source: &str,
    language: LanguageTag,
    stack: &mut Vec<Scope>,
    target_qn: &str,
) -> Option<(Node<'t>, Option<String>)> {
    if let Some(scope) = next_scope(node, source, language, stack) {
        if scope.qn == target_qn {
            let class_ctx = stack
                .last()
                .filter(|s| matches!(s.kind, NodeKind::Class | NodeKind::Interface | NodeKind::Enum))
                .map(|s| s.qn.clone());
            return Some((node, class_ctx));
        }
        stack.push(scope);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if let Some(found) = find_in(child, source, language, stack, target_qn) {
                stack.pop();
                return Some(found);
            }
        }
        stack.pop();
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_in(child, source, language, stack, target_qn) {
            return Some(found);
        }
    }
    None
}
