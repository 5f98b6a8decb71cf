// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The closed set of languages the analyzer understands, and the
//! extension table that routes a walked file to one of them.

/// A supported source language. Python gets the full type-inference
/// treatment (see `codegraph-engine`); the rest get structural analysis
/// (definitions, imports, calls, inheritance) plus whatever type
/// inference their syntax supports without heuristic guessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Rust,
    Go,
    Cpp,
    C,
    Lua,
    Scala,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 10] = [
        LanguageTag::Python,
        LanguageTag::JavaScript,
        LanguageTag::TypeScript,
        LanguageTag::Java,
        LanguageTag::Rust,
        LanguageTag::Go,
        LanguageTag::Cpp,
        LanguageTag::C,
        LanguageTag::Lua,
        LanguageTag::Scala,
    ];

    /// Look up the language for a file by its extension (no leading dot,
    /// case-insensitive). Returns `None` for unrecognized or extensionless
    /// files, which the walker skips.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Some(match ext.as_str() {
            "py" | "pyi" => LanguageTag::Python,
            "js" | "jsx" | "mjs" | "cjs" => LanguageTag::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => LanguageTag::TypeScript,
            "java" => LanguageTag::Java,
            "rs" => LanguageTag::Rust,
            "go" => LanguageTag::Go,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => LanguageTag::Cpp,
            "c" | "h" => LanguageTag::C,
            "lua" => LanguageTag::Lua,
            "scala" | "sc" => LanguageTag::Scala,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::JavaScript => "javascript",
            LanguageTag::TypeScript => "typescript",
            LanguageTag::Java => "java",
            LanguageTag::Rust => "rust",
            LanguageTag::Go => "go",
            LanguageTag::Cpp => "cpp",
            LanguageTag::C => "c",
            LanguageTag::Lua => "lua",
            LanguageTag::Scala => "scala",
        }
    }

    /// `true` for languages whose type inference is limited to parameter
    /// annotations and simple assignment (no heuristic parameter-name
    /// scoring, no self-attribute tracking).
    pub fn has_heuristic_inference(self) -> bool {
        matches!(
            self,
            LanguageTag::Python | LanguageTag::JavaScript | LanguageTag::TypeScript | LanguageTag::Java
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(LanguageTag::from_extension("PY"), Some(LanguageTag::Python));
        assert_eq!(LanguageTag::from_extension("Rs"), Some(LanguageTag::Rust));
    }

    #[test]
    fn unknown_extension_is_none() {
        assert_eq!(LanguageTag::from_extension("txt"), None);
    }

    #[test]
    fn header_extensions_default_to_c() {
        assert_eq!(LanguageTag::from_extension("h"), Some(LanguageTag::C));
    }
}
