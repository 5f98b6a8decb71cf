// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use codegraph_languages::{GrammarLoader, LanguageTag, LoaderError};
use thiserror::Error;
use tree_sitter::{Parser, Tree};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("tree-sitter could not set the {0} grammar on the parser")]
    LanguageMismatch(&'static str),

    #[error("tree-sitter returned no tree for this source (cancelled or too large)")]
    NoTree,
}

/// A parsed file: the tree plus the exact source text the tree indexes
/// into (tree-sitter nodes are byte ranges, not owned strings).
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub tree: Tree,
    pub source: String,
    pub language: LanguageTag,
}

/// Parse `source` as `tag`, using `loader` to obtain the grammar. A
/// single-shot helper; `AstCache` wraps this with memoization.
pub fn parse_source(
    loader: &impl GrammarLoader,
    tag: LanguageTag,
    source: &str,
) -> Result<ParsedFile, ParseError> {
    let language = loader.language(tag)?;
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|_| ParseError::LanguageMismatch(tag.as_str()))?;
    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    Ok(ParsedFile {
        tree,
        source: source.to_string(),
        language: tag,
    })
}
