// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Data model shared by every stage of the analyzer: qualified names, the
//! closed node/edge kind enumerations, the function registry trie, the
//! import map, class-inheritance BFS, the `Ingestor` collaborator trait,
//! and the error/trace scaffolding the rest of the workspace builds on.

pub mod error;
pub mod inheritance;
pub mod kinds;
pub mod qn;
pub mod recursion_guard;
pub mod registry;
pub mod sink;
pub mod trace;

pub use error::{CoreError, CoreResult};
pub use inheritance::ClassInheritance;
pub use kinds::{EdgeKind, NodeKind};
pub use qn::QualifiedName;
pub use recursion_guard::RecursionGuard;
pub use registry::{FunctionRegistry, SimpleNameLookup};
pub use sink::{CountingIngestor, Ingestor, NodeRef, PropertyValue, Properties};
pub use trace::Granularity;

/// A plain `HashMap` alias. The reference implementation reaches for a
/// concurrent map here; this analyzer is single-threaded by design (see
/// the concurrency model), so a concurrent map buys nothing and a plain
/// `std::collections::HashMap` is the honest choice.
pub type FastMap<K, V> = std::collections::HashMap<K, V>;
/// See [`FastMap`].
pub type FastSet<K> = std::collections::HashSet<K>;
