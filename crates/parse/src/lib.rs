// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parsing a single file into a tree-sitter AST, and a bounded cache so a
//! long-running analysis run doesn't hold every AST it has ever seen in
//! memory.

mod cache;
mod parser;

pub use cache::AstCache;
pub use parser::{ParseError, ParsedFile, parse_source};
