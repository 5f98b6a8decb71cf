// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The closed node and edge kind enumerations. Keeping these as enums
//! rather than strings lets the ingestor accept them by value and lets
//! the compiler catch an unhandled variant at every `match`.

/// A definition or structural entity tracked in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    Project,
    Package,
    Folder,
    Module,
    File,
    Class,
    Interface,
    Enum,
    Function,
    Method,
    ExternalPackage,
}

impl NodeKind {
    /// `true` for the kinds the function registry and call resolver care
    /// about (things that can be called or overridden).
    pub fn is_callable(self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Project => "Project",
            NodeKind::Package => "Package",
            NodeKind::Folder => "Folder",
            NodeKind::Module => "Module",
            NodeKind::File => "File",
            NodeKind::Class => "Class",
            NodeKind::Interface => "Interface",
            NodeKind::Enum => "Enum",
            NodeKind::Function => "Function",
            NodeKind::Method => "Method",
            NodeKind::ExternalPackage => "ExternalPackage",
        }
    }
}

/// A relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeKind {
    Defines,
    DefinesMethod,
    Inherits,
    Overrides,
    Calls,
    Imports,
    ContainsPackage,
    ContainsFile,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Defines => "DEFINES",
            EdgeKind::DefinesMethod => "DEFINES_METHOD",
            EdgeKind::Inherits => "INHERITS",
            EdgeKind::Overrides => "OVERRIDES",
            EdgeKind::Calls => "CALLS",
            EdgeKind::Imports => "IMPORTS",
            EdgeKind::ContainsPackage => "CONTAINS_PACKAGE",
            EdgeKind::ContainsFile => "CONTAINS_FILE",
        }
    }
}
