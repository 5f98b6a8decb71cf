// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Language identification and tree-sitter grammar loading. This crate
//! knows which extensions map to which language and how to get a
//! `tree_sitter::Language` plus the per-kind queries out of it; it does
//! not itself parse anything (see `codegraph-parse`).

mod loader;
mod queries;
mod tag;

pub use loader::{DefaultGrammarLoader, GrammarLoader, LoaderError};
pub use queries::LanguageQueries;
pub use tag::LanguageTag;
