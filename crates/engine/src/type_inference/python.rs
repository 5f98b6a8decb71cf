// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The fully-specified engine: parameter-type heuristic, a single body
//! walk covering simple assignment / for-binders / self-attribute
//! tracking, and memoized, reentrancy-guarded method-return inference.

use super::{LocalVarTypes, TypeInferenceEngine, best_heuristic_match, simple_name};
use crate::definitions::text_of;
use codegraph_core::{FastMap, RecursionGuard};
use tree_sitter::Node;

#[derive(Default)]
pub struct PythonEngine {
    recursion_guard: RecursionGuard,
    return_type_memo: FastMap<String, Option<String>>,
}

impl PythonEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step 5: infer a method's return type by scanning its `return`
    /// statements. `body` is `None` when the method's source couldn't be
    /// located (e.g. it lives in a file outside the cache); the result is
    /// memoized either way so a miss isn't retried every call site.
    pub fn infer_method_return_type(
        &mut self,
        method_qn: &str,
        body: Option<(Node<'_>, &str, Option<&str>)>,
        candidate_classes: &[String],
    ) -> Option<String> {
        if let Some(cached) = self.return_type_memo.get(method_qn) {
            return cached.clone();
        }
        let Some(_scope) = self.recursion_guard.enter(method_qn.to_string()) else {
            // Cycle: mutually recursive methods. Don't memoize a guess for
            // an in-flight key, just report "unknown" for this call.
            return None;
        };

        let result = body.and_then(|(node, source, class_ctx)| {
            self.first_return_type(node, source, class_ctx, candidate_classes)
        });
        self.return_type_memo.insert(method_qn.to_string(), result.clone());
        result
    }

    fn first_return_type(
        &mut self,
        body: Node<'_>,
        source: &str,
        class_ctx: Option<&str>,
        candidates: &[String],
    ) -> Option<String> {
        let locals = self.build_local_variable_type_map(body, source, "", class_ctx, candidates);
        let mut found = None;
        walk_returns(body, &mut |expr| {
            if found.is_some() {
                return;
            }
            found = self.infer_return_expression(expr, source, class_ctx, candidates, &locals);
        });
        found
    }

    fn infer_return_expression(
        &self,
        expr: Node<'_>,
        source: &str,
        class_ctx: Option<&str>,
        candidates: &[String],
        locals: &LocalVarTypes,
    ) -> Option<String> {
        match expr.kind() {
            "call" => {
                let callee = expr.child_by_field_name("function")?;
                let name = text_of(callee, source);
                candidates.iter().find(|c| simple_name(c) == name).cloned()
            }
            "identifier" => {
                let name = text_of(expr, source);
                if name == "self" || name == "cls" {
                    class_ctx.map(str::to_string)
                } else {
                    locals.get(&name).cloned()
                }
            }
            "attribute" => {
                let object = expr.child_by_field_name("object")?;
                if object.kind() == "identifier" && text_of(object, source) == "self" {
                    class_ctx.map(str::to_string)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Depth-first, not descending into nested `function_definition` bodies
/// (their `return`s belong to the inner function, not this one).
fn walk_returns<'a>(node: Node<'a>, on_return: &mut impl FnMut(Node<'a>)) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "function_definition" {
            continue;
        }
        if child.kind() == "return_statement" {
            if let Some(expr) = child.named_child(0) {
                on_return(expr);
            }
            continue;
        }
        walk_returns(child, on_return);
    }
}

impl TypeInferenceEngine for PythonEngine {
    fn build_local_variable_type_map(
        &mut self,
        function_node: Node<'_>,
        source: &str,
        _module_qn: &str,
        class_context: Option<&str>,
        candidate_classes: &[String],
    ) -> LocalVarTypes {
        let mut locals = LocalVarTypes::default();

        if let Some(params) = function_node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.children(&mut cursor) {
                match param.kind() {
                    "typed_parameter" | "typed_default_parameter" => {
                        if let (Some(name_node), Some(type_node)) =
                            (param.named_child(0), param.child_by_field_name("type"))
                        {
                            locals.insert(text_of(name_node, source), text_of(type_node, source));
                        }
                    }
                    "identifier" => {
                        let name = text_of(param, source);
                        if name == "self" || name == "cls" {
                            continue;
                        }
                        if let Some(guess) = best_heuristic_match(&name, candidate_classes) {
                            locals.insert(name, guess);
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut self_attrs = FastMap::default();
        if let Some(body) = function_node.child_by_field_name("body") {
            walk_assignments(body, &mut |left, right| {
                let Some(ctor) = constructor_class(right, source, candidate_classes) else { return };
                match left.kind() {
                    "identifier" => {
                        locals.insert(text_of(left, source), ctor);
                    }
                    "attribute" => {
                        if let Some(object) = left.child_by_field_name("object") {
                            if object.kind() == "identifier" && text_of(object, source) == "self" {
                                if let Some(field) = left.child_by_field_name("attribute") {
                                    self_attrs.insert(text_of(field, source), ctor);
                                }
                            }
                        }
                    }
                    _ => {}
                }
            });
            walk_for_binders(body, source, candidate_classes, &mut locals);
        }

        for (attr, ty) in self_attrs {
            locals.insert(format!("self.{attr}"), ty);
        }
        let _ = class_context;
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

fn constructor_class(expr: Node<'_>, source: &str, candidates: &[String]) -> Option<String> {
    if expr.kind() != "call" {
        return None;
    }
    let callee = expr.child_by_field_name("function")?;
    if callee.kind() != "identifier" {
        return None;
    }
    let name = text_of(callee, source);
    candidates.iter().find(|c| simple_name(c) == name).cloned()
}

fn walk_assignments<'a>(node: Node<'a>, on_assign: &mut impl FnMut(Node<'a>, Node<'a>)) {
    if node.kind() == "assignment" {
        if let (Some(left), Some(right)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) {
            on_assign(left, right);
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_assignments(child, on_assign);
    }
}

/// Step 3: when a `for` loop's iterable is a list literal of constructor
/// calls, bind the loop variable to the (single, shared) element type.
fn walk_for_binders(node: Node<'_>, source: &str, candidates: &[String], locals: &mut LocalVarTypes) {
    if node.kind() == "for_statement" {
        if let (Some(left), Some(right)) = (node.child_by_field_name("left"), node.child_by_field_name("right")) {
            if left.kind() == "identifier" && right.kind() == "list" {
                let mut cursor = right.walk();
                let element_type = right
                    .named_children(&mut cursor)
                    .find_map(|el| constructor_class(el, source, candidates));
                if let Some(ty) = element_type {
                    locals.insert(text_of(left, source), ty);
                }
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_binders(child, source, candidates, locals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn simple_assignment_binds_constructor_type() {
        let source = "def f():\n    x = Widget()\n    return x\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let mut engine = PythonEngine::new();
        let candidates = vec!["Widget".to_string()];
        let locals = engine.build_local_variable_type_map(func, source, "mod.f", None, &candidates);
        assert_eq!(locals.get("x"), Some(&"Widget".to_string()));
    }

    #[test]
    fn annotated_parameter_is_used_verbatim() {
        let source = "def f(x: Widget):\n    return x\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let mut engine = PythonEngine::new();
        let locals = engine.build_local_variable_type_map(func, source, "mod.f", None, &[]);
        assert_eq!(locals.get("x"), Some(&"Widget".to_string()));
    }

    #[test]
    fn return_type_memoizes_and_guards_recursion() {
        let source = "def f(self):\n    return self\n";
        let tree = parse(source);
        let func = tree.root_node().named_child(0).unwrap();
        let mut engine = PythonEngine::new();
        let first = engine.infer_method_return_type("mod.Class.f", Some((func, source, Some("mod.Class"))), &[]);
        assert_eq!(first, Some("mod.Class".to_string()));
        // Second call hits the memo without needing `body` again.
        let second = engine.infer_method_return_type("mod.Class.f", None, &[]);
        assert_eq!(second, Some("mod.Class".to_string()));
    }
}
