// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The ingestor interface: the graph sink the core calls into. The real
//! sink (a database or binary-format writer) is an external collaborator
//! — this crate only defines the trait it must satisfy.

use crate::kinds::{EdgeKind, NodeKind};
use crate::error::CoreResult;
use std::collections::HashMap;

/// A property value attached to a node or relationship.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

pub type Properties = HashMap<String, PropertyValue>;

/// A reference to a node by its unique key property. `qualified_name` is
/// the key for every definition kind; structural nodes (`Project`,
/// `Folder`, `File`) key on their path instead.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub key_property: &'static str,
    pub value: String,
}

impl NodeRef {
    pub fn qualified_name(kind: NodeKind, qn: impl Into<String>) -> Self {
        Self {
            kind,
            key_property: "qualified_name",
            value: qn.into(),
        }
    }

    pub fn path(kind: NodeKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            key_property: "path",
            value: path.into(),
        }
    }
}

/// The collaborator the analyzer emits graph mutations to. Every
/// `ensure_*` call is an idempotent upsert so re-ingesting an unchanged
/// file is a no-op from the sink's perspective.
pub trait Ingestor {
    fn ensure_node(&mut self, node: NodeRef, properties: Properties);

    fn ensure_relationship(
        &mut self,
        src: NodeRef,
        kind: EdgeKind,
        dst: NodeRef,
        properties: Properties,
    );

    /// Drain any buffered writes. Fatal on failure (see the error
    /// taxonomy): a flush failure aborts the run.
    fn flush_all(&mut self) -> CoreResult<()>;
}

/// Wraps any `Ingestor`, counting every `ensure_node`/`ensure_relationship`
/// call. `GraphUpdater` uses this to produce the run report (node and
/// relationship totals) called for in the error-handling design without
/// requiring every processor to track its own counters.
#[derive(Debug, Default)]
pub struct CountingIngestor<I> {
    inner: I,
    nodes: usize,
    relationships: usize,
}

impl<I: Ingestor> CountingIngestor<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            nodes: 0,
            relationships: 0,
        }
    }

    pub fn counts(&self) -> (usize, usize) {
        (self.nodes, self.relationships)
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}

impl<I: Ingestor> Ingestor for CountingIngestor<I> {
    fn ensure_node(&mut self, node: NodeRef, properties: Properties) {
        self.nodes += 1;
        self.inner.ensure_node(node, properties);
    }

    fn ensure_relationship(
        &mut self,
        src: NodeRef,
        kind: EdgeKind,
        dst: NodeRef,
        properties: Properties,
    ) {
        self.relationships += 1;
        self.inner.ensure_relationship(src, kind, dst, properties);
    }

    fn flush_all(&mut self) -> CoreResult<()> {
        self.inner.flush_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullIngestor;

    impl Ingestor for NullIngestor {
        fn ensure_node(&mut self, _node: NodeRef, _properties: Properties) {}
        fn ensure_relationship(&mut self, _src: NodeRef, _kind: EdgeKind, _dst: NodeRef, _properties: Properties) {}
        fn flush_all(&mut self) -> CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn counts_nodes_and_relationships() {
        let mut counting = CountingIngestor::new(NullIngestor);
        counting.ensure_node(NodeRef::qualified_name(NodeKind::Function, "a.f"), Properties::default());
        counting.ensure_node(NodeRef::qualified_name(NodeKind::Function, "a.g"), Properties::default());
        counting.ensure_relationship(
            NodeRef::qualified_name(NodeKind::Module, "a"),
            EdgeKind::Defines,
            NodeRef::qualified_name(NodeKind::Function, "a.f"),
            Properties::default(),
        );
        assert_eq!(counting.counts(), (2, 1));
    }
}
