// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-language tree-sitter query sources. Each is a tuple of query
//! strings for the four things the definitions/calls/imports passes walk
//! for: type definitions (class/interface/enum), callables
//! (function/method), call expressions, and import statements. Capture
//! names are consistent across languages (`@definition.*`, `@call.*`,
//! `@import.*`) so the engine's query-result handling doesn't need a
//! per-language branch beyond picking the right `LanguageQueries`.

use crate::tag::LanguageTag;

/// The compiled-on-demand query sources for one language. `tree_sitter`
/// queries are parsed lazily by the engine against the concrete
/// `Language`, so this struct only carries the source text.
#[derive(Debug, Clone, Copy)]
pub struct LanguageQueries {
    pub definitions: &'static str,
    pub calls: &'static str,
    pub imports: &'static str,
}

impl LanguageQueries {
    pub fn for_tag(tag: LanguageTag) -> Self {
        match tag {
            LanguageTag::Python => PYTHON,
            LanguageTag::JavaScript => JAVASCRIPT,
            LanguageTag::TypeScript => TYPESCRIPT,
            LanguageTag::Java => JAVA,
            LanguageTag::Rust => RUST,
            LanguageTag::Go => GO,
            LanguageTag::Cpp => CPP,
            LanguageTag::C => C,
            LanguageTag::Lua => LUA,
            LanguageTag::Scala => SCALA,
        }
    }
}

const PYTHON: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_definition name: (identifier) @definition.class
            superclasses: (argument_list)? @definition.class.bases) @definition.class.node
        (function_definition name: (identifier) @definition.function) @definition.function.node
    "#,
    calls: r#"
        (call function: (identifier) @call.callee) @call.node
        (call function: (attribute attribute: (identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (import_statement name: (dotted_name) @import.module)
        (import_from_statement
            module_name: (dotted_name)? @import.module
            name: (dotted_name) @import.name)
        (aliased_import name: (dotted_name) @import.module alias: (identifier) @import.alias)
    "#,
};

const JAVASCRIPT: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_declaration name: (identifier) @definition.class
            superclass: (class_heritage)? @definition.class.bases) @definition.class.node
        (function_declaration name: (identifier) @definition.function) @definition.function.node
        (method_definition name: (property_identifier) @definition.method) @definition.method.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (member_expression property: (property_identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (import_statement source: (string) @import.module)
        (import_specifier name: (identifier) @import.name alias: (identifier)? @import.alias)
    "#,
};

const TYPESCRIPT: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_declaration name: (type_identifier) @definition.class
            (class_heritage)? @definition.class.bases) @definition.class.node
        (interface_declaration name: (type_identifier) @definition.interface) @definition.interface.node
        (function_declaration name: (identifier) @definition.function) @definition.function.node
        (method_definition name: (property_identifier) @definition.method) @definition.method.node
        (enum_declaration name: (identifier) @definition.enum) @definition.enum.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (member_expression property: (property_identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (import_statement source: (string) @import.module)
        (import_specifier name: (identifier) @import.name alias: (identifier)? @import.alias)
    "#,
};

const JAVA: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_declaration name: (identifier) @definition.class
            superclass: (superclass)? @definition.class.bases
            interfaces: (super_interfaces)? @definition.class.interfaces) @definition.class.node
        (interface_declaration name: (identifier) @definition.interface) @definition.interface.node
        (enum_declaration name: (identifier) @definition.enum) @definition.enum.node
        (method_declaration name: (identifier) @definition.method) @definition.method.node
    "#,
    calls: r#"
        (method_invocation name: (identifier) @call.callee) @call.node
    "#,
    imports: r#"
        (import_declaration (scoped_identifier) @import.module)
    "#,
};

const RUST: LanguageQueries = LanguageQueries {
    definitions: r#"
        (struct_item name: (type_identifier) @definition.class) @definition.class.node
        (enum_item name: (type_identifier) @definition.enum) @definition.enum.node
        (trait_item name: (type_identifier) @definition.interface) @definition.interface.node
        (impl_item trait: (type_identifier)? @definition.class.bases type: (type_identifier) @definition.class) @definition.class.node
        (function_item name: (identifier) @definition.function) @definition.function.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (field_expression field: (field_identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (use_declaration argument: (_) @import.module)
    "#,
};

const GO: LanguageQueries = LanguageQueries {
    definitions: r#"
        (type_declaration (type_spec name: (type_identifier) @definition.class type: (struct_type))) @definition.class.node
        (type_declaration (type_spec name: (type_identifier) @definition.interface type: (interface_type))) @definition.interface.node
        (function_declaration name: (identifier) @definition.function) @definition.function.node
        (method_declaration name: (field_identifier) @definition.method) @definition.method.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (selector_expression field: (field_identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (import_spec path: (interpreted_string_literal) @import.module)
    "#,
};

const CPP: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_specifier name: (type_identifier) @definition.class
            (base_class_clause)? @definition.class.bases) @definition.class.node
        (function_definition declarator: (function_declarator declarator: (identifier) @definition.function)) @definition.function.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (field_expression field: (field_identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (preproc_include path: (_) @import.module)
    "#,
};

const C: LanguageQueries = LanguageQueries {
    definitions: r#"
        (function_definition declarator: (function_declarator declarator: (identifier) @definition.function)) @definition.function.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
    "#,
    imports: r#"
        (preproc_include path: (_) @import.module)
    "#,
};

const LUA: LanguageQueries = LanguageQueries {
    definitions: r#"
        (function_declaration name: (identifier) @definition.function) @definition.function.node
        (function_declaration name: (dot_index_expression field: (identifier) @definition.method)) @definition.method.node
    "#,
    calls: r#"
        (function_call name: (identifier) @call.callee) @call.node
        (function_call name: (dot_index_expression field: (identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (function_call name: (identifier) @import._require (#eq? @import._require "require")
            arguments: (arguments (string) @import.module))
    "#,
};

const SCALA: LanguageQueries = LanguageQueries {
    definitions: r#"
        (class_definition name: (identifier) @definition.class
            (extends_clause)? @definition.class.bases) @definition.class.node
        (trait_definition name: (identifier) @definition.interface) @definition.interface.node
        (object_definition name: (identifier) @definition.class) @definition.class.node
        (function_definition name: (identifier) @definition.function) @definition.function.node
    "#,
    calls: r#"
        (call_expression function: (identifier) @call.callee) @call.node
        (call_expression function: (field_expression field: (identifier) @call.callee)) @call.node
    "#,
    imports: r#"
        (import_declaration path: (_) @import.module)
    "#,
};
