// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The subset shared by every non-Python language: explicit parameter
//! annotations and simple `x = Ctor(...)`/`x = new Ctor(...)` assignment
//! tracking. No parameter-name guessing — these languages require or
//! strongly favor explicit types, so the heuristic the Python engine uses
//! would just be noise here. Languages whose grammar doesn't expose a
//! clean enough shape for one of these two things (C, C++, Lua, Scala's
//! assignment forms) simply yield an empty map for that part; `None` is
//! always a safe answer the call resolver is built to fall through on.

use super::{LocalVarTypes, TypeInferenceEngine, simple_name};
use crate::definitions::text_of;
use codegraph_languages::LanguageTag;
use tree_sitter::Node;

pub struct GenericEngine {
    language: LanguageTag,
}

impl GenericEngine {
    pub fn new(language: LanguageTag) -> Self {
        Self { language }
    }
}

struct ParamSpec {
    param_kind: &'static str,
    name_field: &'static str,
    type_field: &'static str,
}

fn param_spec(language: LanguageTag) -> Option<ParamSpec> {
    match language {
        LanguageTag::TypeScript => Some(ParamSpec { param_kind: "required_parameter", name_field: "pattern", type_field: "type" }),
        LanguageTag::Java => Some(ParamSpec { param_kind: "formal_parameter", name_field: "name", type_field: "type" }),
        LanguageTag::Rust => Some(ParamSpec { param_kind: "parameter", name_field: "pattern", type_field: "type" }),
        LanguageTag::Go => Some(ParamSpec { param_kind: "parameter_declaration", name_field: "name", type_field: "type" }),
        _ => None,
    }
}

struct AssignSpec {
    node_kind: &'static str,
    name_field: &'static str,
    value_field: &'static str,
}

fn assign_specs(language: LanguageTag) -> &'static [AssignSpec] {
    match language {
        LanguageTag::JavaScript | LanguageTag::TypeScript => &[
            AssignSpec { node_kind: "variable_declarator", name_field: "name", value_field: "value" },
        ],
        LanguageTag::Java => &[
            AssignSpec { node_kind: "variable_declarator", name_field: "name", value_field: "value" },
        ],
        LanguageTag::Rust => &[
            AssignSpec { node_kind: "let_declaration", name_field: "pattern", value_field: "value" },
        ],
        LanguageTag::Go => &[
            AssignSpec { node_kind: "short_var_declaration", name_field: "left", value_field: "right" },
        ],
        LanguageTag::Scala => &[
            AssignSpec { node_kind: "val_definition", name_field: "pattern", value_field: "value" },
            AssignSpec { node_kind: "var_definition", name_field: "pattern", value_field: "value" },
        ],
        LanguageTag::C | LanguageTag::Cpp | LanguageTag::Lua => &[],
    }
}

/// `new Ctor(...)` (JS/TS/Java), or a bare `Ctor(...)`/`Ctor{...}` call
/// whose callee matches a known class name (Rust/Go/Scala).
fn constructor_class(node: Node<'_>, source: &str, candidates: &[String]) -> Option<String> {
    let callee = match node.kind() {
        "new_expression" | "object_creation_expression" => node.child_by_field_name("constructor").or_else(|| node.child_by_field_name("type"))?,
        "call_expression" | "call" => node.child_by_field_name("function")?,
        _ => return None,
    };
    let name = text_of(callee, source);
    candidates.iter().find(|c| simple_name(c) == name).cloned()
}

impl TypeInferenceEngine for GenericEngine {
    fn build_local_variable_type_map(
        &mut self,
        function_node: Node<'_>,
        source: &str,
        _module_qn: &str,
        _class_context: Option<&str>,
        candidate_classes: &[String],
    ) -> LocalVarTypes {
        let mut locals = LocalVarTypes::default();

        if let Some(spec) = param_spec(self.language) {
            if let Some(params) = function_node.child_by_field_name("parameters") {
                collect_params(params, &spec, source, &mut locals);
            }
        }

        let specs = assign_specs(self.language);
        if !specs.is_empty() {
            if let Some(body) = function_node.child_by_field_name("body") {
                collect_assignments(body, specs, source, candidate_classes, &mut locals);
            }
        }

        locals
    }

    fn infer_expression_return_type(
        &self,
        expression_text: &str,
        _module_qn: &str,
        locals: &LocalVarTypes,
    ) -> Option<String> {
        locals.get(expression_text).cloned()
    }
}

fn collect_params(params: Node<'_>, spec: &ParamSpec, source: &str, locals: &mut LocalVarTypes) {
    let mut cursor = params.walk();
    for param in params.children(&mut cursor) {
        if param.kind() != spec.param_kind {
            continue;
        }
        let (Some(name_node), Some(type_node)) =
            (param.child_by_field_name(spec.name_field), param.child_by_field_name(spec.type_field))
        else {
            continue;
        };
        let ty = text_of(type_node, source);
        let ty = ty.trim_start_matches(':').trim().to_string();
        locals.insert(text_of(name_node, source), ty);
    }
}

fn collect_assignments(node: Node<'_>, specs: &[AssignSpec], source: &str, candidates: &[String], locals: &mut LocalVarTypes) {
    if let Some(spec) = specs.iter().find(|s| s.node_kind == node.kind()) {
        if let (Some(name_node), Some(value_node)) =
            (node.child_by_field_name(spec.name_field), node.child_by_field_name(spec.value_field))
        {
            if let Some(class) = constructor_class(value_node, source, candidates) {
                locals.insert(text_of(name_node, source), class);
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_assignments(child, specs, source, candidates, locals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    #[test]
    fn rust_let_binds_constructor_call() {
        let source = "fn f() {\n    let w = Widget();\n}\n";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_rust::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let func = tree.root_node().named_child(0).unwrap();
        let mut engine = GenericEngine::new(LanguageTag::Rust);
        let candidates = vec!["Widget".to_string()];
        let locals = engine.build_local_variable_type_map(func, source, "mod::f", None, &candidates);
        assert_eq!(locals.get("w"), Some(&"Widget".to_string()));
    }

    #[test]
    fn java_formal_parameter_type_is_used_verbatim() {
        let source = "class C { void f(Widget w) { } }";
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_java::LANGUAGE.into()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let class_body = tree.root_node().named_child(0).unwrap().child_by_field_name("body").unwrap();
        let method = class_body.named_child(0).unwrap();
        let mut engine = GenericEngine::new(LanguageTag::Java);
        let locals = engine.build_local_variable_type_map(method, source, "C.f", None, &[]);
        assert_eq!(locals.get("w"), Some(&"Widget".to_string()));
    }
}
