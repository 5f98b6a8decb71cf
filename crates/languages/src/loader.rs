// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Grammar loading is pulled behind a trait so the engine never links
//! directly against a `tree_sitter_*` crate — it depends only on
//! `GrammarLoader`, which keeps the ten grammars an implementation
//! detail of this crate and swappable in tests.

use crate::tag::LanguageTag;
use thiserror::Error;
use tree_sitter::Language;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("tree-sitter rejected the grammar for {0}: {1}")]
    InvalidGrammar(&'static str, tree_sitter::LanguageError),
}

/// Supplies a parsed `tree_sitter::Language` for a tag. An external
/// collaborator in principle (tests can substitute a stub), though in
/// practice `DefaultGrammarLoader` below is the only implementation this
/// workspace ships.
pub trait GrammarLoader {
    fn language(&self, tag: LanguageTag) -> Result<Language, LoaderError>;
}

/// Loads the ten bundled tree-sitter grammars directly.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGrammarLoader;

impl GrammarLoader for DefaultGrammarLoader {
    fn language(&self, tag: LanguageTag) -> Result<Language, LoaderError> {
        let lang = match tag {
            LanguageTag::Python => tree_sitter_python::LANGUAGE.into(),
            LanguageTag::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            LanguageTag::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            LanguageTag::Java => tree_sitter_java::LANGUAGE.into(),
            LanguageTag::Rust => tree_sitter_rust::LANGUAGE.into(),
            LanguageTag::Go => tree_sitter_go::LANGUAGE.into(),
            LanguageTag::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            LanguageTag::C => tree_sitter_c::LANGUAGE.into(),
            LanguageTag::Lua => tree_sitter_lua::LANGUAGE.into(),
            LanguageTag::Scala => tree_sitter_scala::LANGUAGE.into(),
        };
        Ok(lang)
    }
}
