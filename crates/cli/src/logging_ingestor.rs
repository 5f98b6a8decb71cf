// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A minimal in-process `Ingestor`: counts every mutation and, if asked,
//! prints it. Stands in for the real graph database sink, which is out
//! of scope for this workspace.

use codegraph_core::{CoreResult, EdgeKind, Ingestor, NodeRef, Properties};

pub struct LoggingIngestor {
    log_mutations: bool,
    nodes: usize,
    relationships: usize,
}

impl LoggingIngestor {
    pub fn new(log_mutations: bool) -> Self {
        Self { log_mutations, nodes: 0, relationships: 0 }
    }
}

impl Ingestor for LoggingIngestor {
    fn ensure_node(&mut self, node: NodeRef, _properties: Properties) {
        self.nodes += 1;
        if self.log_mutations {
            eprintln!("node  {:?} {}={}", node.kind, node.key_property, node.value);
        }
    }

    fn ensure_relationship(&mut self, src: NodeRef, kind: EdgeKind, dst: NodeRef, _properties: Properties) {
        self.relationships += 1;
        if self.log_mutations {
            eprintln!("edge  {} --{kind:?}--> {}", src.value, dst.value);
        }
    }

    fn flush_all(&mut self) -> CoreResult<()> {
        Ok(())
    }
}
