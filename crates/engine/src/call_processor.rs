// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pass 3: walk every cached AST, extract call sites, resolve each
//! through `CallResolver`, and emit `CALLS` edges. Owns the per-language
//! type-inference engine (see `Engine` below) so the Python engine's
//! memoized return-type cache survives across the whole pass rather than
//! being rebuilt per file.

use crate::call_resolver::{CallHead, CallResolver, IIFE_MARKER};
use crate::import_map::ImportMap;
use crate::scope::{self, Scope};
use crate::type_inference::{GenericEngine, LocalVarTypes, PythonEngine, TypeInferenceEngine};
use codegraph_core::{ClassInheritance, EdgeKind, FastMap, FunctionRegistry, Ingestor, NodeKind, NodeRef, SimpleNameLookup};
use codegraph_languages::LanguageTag;
use codegraph_parse::AstCache;
use std::path::{Path, PathBuf};
use tree_sitter::Node;

/// Per-language type engine. Kept as an enum rather than a trait object
/// because only `PythonEngine` exposes the extra memoized
/// `infer_method_return_type` step the method-chain resolution step
/// needs; the other languages stop at parameter/assignment typing.
pub enum Engine {
    Python(PythonEngine),
    Generic(GenericEngine),
}

impl Engine {
    pub fn for_language(language: LanguageTag) -> Self {
        match language {
            LanguageTag::Python => Engine::Python(PythonEngine::new()),
            other => Engine::Generic(GenericEngine::new(other)),
        }
    }

    fn build_locals(
        &mut self,
        function_node: Node<'_>,
        source: &str,
        module_qn: &str,
        class_context: Option<&str>,
        candidates: &[String],
    ) -> LocalVarTypes {
        match self {
            Engine::Python(e) => e.build_local_variable_type_map(function_node, source, module_qn, class_context, candidates),
            Engine::Generic(e) => e.build_local_variable_type_map(function_node, source, module_qn, class_context, candidates),
        }
    }

    fn infer_expression_return_type(&self, expr_text: &str, module_qn: &str, locals: &LocalVarTypes) -> Option<String> {
        match self {
            Engine::Python(e) => e.infer_expression_return_type(expr_text, module_qn, locals),
            Engine::Generic(e) => e.infer_expression_return_type(expr_text, module_qn, locals),
        }
    }

    /// Only the Python engine can chase a resolved callee's own return
    /// type for further method-chain resolution; other languages stop
    /// the chain here and let it fall through unresolved.
    fn infer_call_return_type(
        &mut self,
        callee_qn: &str,
        body: Option<(Node<'_>, &str, Option<&str>)>,
        candidates: &[String],
    ) -> Option<String> {
        match self {
            Engine::Python(e) => e.infer_method_return_type(callee_qn, body, candidates),
            Engine::Generic(_) => None,
        }
    }
}

/// What one call-expression's syntax yields, independent of language:
/// the receiver (if any, with `super` already normalized to the literal
/// text `"super"`), the bare method/function name, and whether this is
/// an immediately-invoked function expression.
struct ExtractedCall<'t> {
    receiver_node: Option<Node<'t>>,
    receiver_text: Option<String>,
    method: String,
    is_iife: bool,
}

pub struct CallProcessor<'a, I: Ingestor> {
    ingestor: &'a mut I,
    registry: &'a FunctionRegistry,
    names: &'a SimpleNameLookup,
    imports: &'a ImportMap,
    inheritance: &'a ClassInheritance,
    cache: &'a mut AstCache,
    locations: &'a FastMap<String, PathBuf>,
    file_modules: &'a FastMap<PathBuf, String>,
}

impl<'a, I: Ingestor> CallProcessor<'a, I> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ingestor: &'a mut I,
        registry: &'a FunctionRegistry,
        names: &'a SimpleNameLookup,
        imports: &'a ImportMap,
        inheritance: &'a ClassInheritance,
        cache: &'a mut AstCache,
        locations: &'a FastMap<String, PathBuf>,
        file_modules: &'a FastMap<PathBuf, String>,
    ) -> Self {
        Self { ingestor, registry, names, imports, inheritance, cache, locations, file_modules }
    }

    pub fn run(&mut self, root: Node<'_>, source: &str, module_qn: &str, language: LanguageTag, engine: &mut Engine) {
        let candidates: Vec<String> = self
            .registry
            .iter()
            .filter(|(_, kind)| matches!(kind, NodeKind::Class | NodeKind::Interface | NodeKind::Enum))
            .map(|(qn, _)| qn.to_string())
            .collect();
        let mut stack = vec![Scope { qn: module_qn.to_string(), kind: NodeKind::Module }];
        let mut locals = LocalVarTypes::default();
        self.walk(root, source, module_qn, language, &mut stack, &mut locals, engine, &candidates);
    }

    fn walk(
        &mut self,
        node: Node<'_>,
        source: &str,
        module_qn: &str,
        language: LanguageTag,
        stack: &mut Vec<Scope>,
        locals: &mut LocalVarTypes,
        engine: &mut Engine,
        candidates: &[String],
    ) {
        if let Some(scope) = scope::next_scope(node, source, language, stack) {
            let mut new_locals = locals.clone();
            if scope.kind.is_callable() {
                let class_context = scope::enclosing_class(stack);
                new_locals = engine.build_locals(node, source, module_qn, class_context, candidates);
            }
            stack.push(scope);
            self.walk_children(node, source, module_qn, language, stack, &mut new_locals, engine, candidates);
            stack.pop();
            return;
        }

        if let Some(extracted) = extract_call(node, source, language) {
            self.emit_call(node, &extracted, source, module_qn, language, stack, locals, engine, candidates);
        }

        self.walk_children(node, source, module_qn, language, stack, locals, engine, candidates);
    }

    fn walk_children(
        &mut self,
        node: Node<'_>,
        source: &str,
        module_qn: &str,
        language: LanguageTag,
        stack: &mut Vec<Scope>,
        locals: &mut LocalVarTypes,
        engine: &mut Engine,
        candidates: &[String],
    ) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, source, module_qn, language, stack, locals, engine, candidates);
        }
    }

    fn emit_call(
        &mut self,
        call_node: Node<'_>,
        extracted: &ExtractedCall<'_>,
        source: &str,
        module_qn: &str,
        language: LanguageTag,
        stack: &[Scope],
        locals: &LocalVarTypes,
        engine: &mut Engine,
        candidates: &[String],
    ) {
        let class_context = scope::enclosing_class(stack);
        let Some((kind, callee_qn)) = self.resolve(extracted, source, module_qn, language, class_context, locals, engine, candidates) else {
            return;
        };
        let caller = scope::enclosing_callable(stack);
        let caller_ref = NodeRef::qualified_name(caller.kind, caller.qn.clone());
        let callee_ref = NodeRef::qualified_name(kind, callee_qn);
        self.ingestor.ensure_relationship(caller_ref, EdgeKind::Calls, callee_ref, Default::default());
        let _ = call_node;
    }

    fn resolve(
        &mut self,
        extracted: &ExtractedCall<'_>,
        source: &str,
        module_qn: &str,
        language: LanguageTag,
        class_context: Option<&str>,
        locals: &LocalVarTypes,
        engine: &mut Engine,
        candidates: &[String],
    ) -> Option<(NodeKind, String)> {
        let prefix_type = match (&extracted.receiver_text, extracted.receiver_node) {
            (Some(text), Some(node)) if text.contains('(') => {
                self.infer_chain_prefix_type(node, source, module_qn, language, class_context, locals, engine, candidates)
            }
            _ => None,
        };

        let method = if extracted.is_iife { IIFE_MARKER.to_string() } else { extracted.method.clone() };
        let head = CallHead {
            receiver: extracted.receiver_text.as_deref(),
            method: &method,
            is_iife: extracted.is_iife,
        };
        let resolver = CallResolver { registry: self.registry, names: self.names, imports: self.imports, inheritance: self.inheritance };
        resolver.resolve(&head, module_qn, class_context, locals, |_| prefix_type.clone())
    }

    /// The prefix of a method chain (`a.b().c`) is itself a call
    /// expression; resolve it first, then ask the engine what its
    /// resolved callee returns.
    #[allow(clippy::too_many_arguments)]
    fn infer_chain_prefix_type(
        &mut self,
        prefix_node: Node<'_>,
        source: &str,
        module_qn: &str,
        language: LanguageTag,
        class_context: Option<&str>,
        locals: &LocalVarTypes,
        engine: &mut Engine,
        candidates: &[String],
    ) -> Option<String> {
        let inner = extract_call(prefix_node, source, language)?;
        let (_, callee_qn) = self.resolve(&inner, source, module_qn, language, class_context, locals, engine, candidates)?;

        if let Some(direct) = engine.infer_expression_return_type(&callee_qn, module_qn, locals) {
            return Some(direct);
        }

        let file = self.locations.get(&callee_qn)?.clone();
        let parsed = self.cache.get(&file)?;
        let callee_module_qn = self.file_modules.get(&file)?.clone();
        let (def_node, def_class_ctx) =
            scope::find_definition_node(parsed.tree.root_node(), &parsed.source, parsed.language, &callee_module_qn, &callee_qn)?;
        let body = def_node.child_by_field_name("body").unwrap_or(def_node);
        engine.infer_call_return_type(&callee_qn, Some((body, parsed.source.as_str(), def_class_ctx.as_deref())), candidates)
    }
}

fn extract_call<'t>(node: Node<'t>, source: &str, language: LanguageTag) -> Option<ExtractedCall<'t>> {
    match language {
        LanguageTag::Python => extract_python(node, source),
        LanguageTag::JavaScript | LanguageTag::TypeScript => extract_js(node, source),
        LanguageTag::Java => extract_java(node, source),
        LanguageTag::Rust => extract_rust(node, source),
        LanguageTag::Go => extract_go(node, source),
        LanguageTag::Cpp | LanguageTag::C => extract_c_family(node, source),
        LanguageTag::Lua => extract_lua(node, source),
        LanguageTag::Scala => extract_scala(node, source),
    }
}

fn text_of(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or_default().to_string()
}

fn bare(method: String) -> ExtractedCall<'static> {
    ExtractedCall { receiver_node: None, receiver_text: None, method, is_iife: false }
}

fn extract_python(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "attribute" => {
            let object = function.child_by_field_name("object")?;
            let attribute = function.child_by_field_name("attribute")?;
            let method = text_of(attribute, source);
            let receiver_text = Some(python_receiver_text(object, source));
            Some(ExtractedCall { receiver_node: Some(object), receiver_text, method, is_iife: false })
        }
        _ => None,
    }
}

fn python_receiver_text(object: Node<'_>, source: &str) -> String {
    if object.kind() == "call" {
        if let Some(callee) = object.child_by_field_name("function") {
            if callee.kind() == "identifier" && text_of(callee, source) == "super" {
                return "super".to_string();
            }
        }
    }
    text_of(object, source)
}

fn extract_js(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "member_expression" => {
            let object = function.child_by_field_name("object")?;
            let property = function.child_by_field_name("property")?;
            let method = text_of(property, source);
            let receiver_text = Some(if object.kind() == "super" { "super".to_string() } else { text_of(object, source) });
            Some(ExtractedCall { receiver_node: Some(object), receiver_text, method, is_iife: false })
        }
        "parenthesized_expression" => {
            let inner = function.named_child(0)?;
            if matches!(inner.kind(), "function_expression" | "function" | "arrow_function") {
                Some(ExtractedCall { receiver_node: None, receiver_text: None, method: IIFE_MARKER.to_string(), is_iife: true })
            } else {
                None
            }
        }
        _ => None,
    }
}

fn extract_java(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "method_invocation" {
        return None;
    }
    let name = node.child_by_field_name("name")?;
    let method = text_of(name, source);
    match node.child_by_field_name("object") {
        None => Some(bare(method)),
        Some(object) => {
            let receiver_text = Some(if object.kind() == "super" { "super".to_string() } else { text_of(object, source) });
            Some(ExtractedCall { receiver_node: Some(object), receiver_text, method, is_iife: false })
        }
    }
}

fn extract_rust(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "field_expression" => {
            let value = function.child_by_field_name("value")?;
            let field = function.child_by_field_name("field")?;
            let method = text_of(field, source);
            let receiver_text = Some(if value.kind() == "self" { "self".to_string() } else { text_of(value, source) });
            Some(ExtractedCall { receiver_node: Some(value), receiver_text, method, is_iife: false })
        }
        "scoped_identifier" => {
            let path = text_of(function, source).replace("::", ".");
            match path.rsplit_once('.') {
                Some((receiver, method)) => {
                    Some(ExtractedCall { receiver_node: None, receiver_text: Some(receiver.to_string()), method: method.to_string(), is_iife: false })
                }
                None => Some(bare(path)),
            }
        }
        _ => None,
    }
}

fn extract_go(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "selector_expression" => {
            let operand = function.child_by_field_name("operand")?;
            let field = function.child_by_field_name("field")?;
            let method = text_of(field, source);
            Some(ExtractedCall { receiver_node: Some(operand), receiver_text: Some(text_of(operand, source)), method, is_iife: false })
        }
        _ => None,
    }
}

fn extract_c_family(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "field_expression" => {
            let argument = function.child_by_field_name("argument")?;
            let field = function.child_by_field_name("field")?;
            let method = text_of(field, source);
            Some(ExtractedCall { receiver_node: Some(argument), receiver_text: Some(text_of(argument, source)), method, is_iife: false })
        }
        "qualified_identifier" => {
            let path = text_of(function, source).replace("::", ".");
            match path.rsplit_once('.') {
                Some((receiver, method)) => {
                    Some(ExtractedCall { receiver_node: None, receiver_text: Some(receiver.to_string()), method: method.to_string(), is_iife: false })
                }
                None => Some(bare(path)),
            }
        }
        _ => None,
    }
}

fn extract_lua(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "function_call" {
        return None;
    }
    let name = node.child_by_field_name("name")?;
    match name.kind() {
        "identifier" => Some(bare(text_of(name, source))),
        "dot_index_expression" => {
            let table = name.child_by_field_name("table")?;
            let field = name.child_by_field_name("field")?;
            let method = text_of(field, source);
            Some(ExtractedCall { receiver_node: Some(table), receiver_text: Some(text_of(table, source)), method, is_iife: false })
        }
        _ => None,
    }
}

fn extract_scala(node: Node<'_>, source: &str) -> Option<ExtractedCall<'_>> {
    if node.kind() != "call_expression" {
        return None;
    }
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some(bare(text_of(function, source))),
        "field_expression" => {
            let value = function.child_by_field_name("value")?;
            let field = function.child_by_field_name("field")?;
            let method = text_of(field, source);
            Some(ExtractedCall { receiver_node: Some(value), receiver_text: Some(text_of(value, source)), method, is_iife: false })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::{ClassInheritance, FunctionRegistry};
    use tree_sitter::Parser;

    fn parse_python(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser.set_language(&tree_sitter_python::LANGUAGE.into()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[derive(Default)]
    struct RecordingIngestor {
        calls: Vec<(String, String)>,
    }

    impl Ingestor for RecordingIngestor {
        fn ensure_node(&mut self, _node: NodeRef, _properties: codegraph_core::Properties) {}
        fn ensure_relationship(&mut self, src: NodeRef, kind: EdgeKind, dst: NodeRef, _properties: codegraph_core::Properties) {
            if kind == EdgeKind::Calls {
                self.calls.push((src.value, dst.value));
            }
        }
        fn flush_all(&mut self) -> codegraph_core::CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn same_module_call_resolves() {
        let source = "def helper():\n    pass\n\ndef f():\n    helper()\n";
        let tree = parse_python(source);
        let mut registry = FunctionRegistry::new();
        registry.insert("proj.mod.helper", NodeKind::Function);
        registry.insert("proj.mod.f", NodeKind::Function);
        let names = SimpleNameLookup::new();
        let imports = ImportMap::new();
        let inheritance = ClassInheritance::default();
        let mut cache = AstCache::default();
        let locations = FastMap::default();
        let file_modules = FastMap::default();
        let mut ingestor = RecordingIngestor::default();
        let mut engine = Engine::for_language(LanguageTag::Python);

        {
            let mut processor = CallProcessor::new(&mut ingestor, &registry, &names, &imports, &inheritance, &mut cache, &locations, &file_modules);
            processor.run(tree.root_node(), source, "proj.mod", LanguageTag::Python, &mut engine);
        }

        assert!(ingestor.calls.contains(&("proj.mod.f".to_string(), "proj.mod.helper".to_string())));
    }
}
