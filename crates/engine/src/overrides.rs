// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Pass 3b: after every definition is known, for each method walk its
//! class's ancestors and emit `OVERRIDES` to the *nearest* one that
//! defines a method of the same simple name.

use codegraph_core::{ClassInheritance, EdgeKind, FunctionRegistry, Ingestor, NodeKind, NodeRef};

pub struct OverrideProcessor<'a, I: Ingestor> {
    ingestor: &'a mut I,
    registry: &'a FunctionRegistry,
    inheritance: &'a ClassInheritance,
}

impl<'a, I: Ingestor> OverrideProcessor<'a, I> {
    pub fn new(ingestor: &'a mut I, registry: &'a FunctionRegistry, inheritance: &'a ClassInheritance) -> Self {
        Self { ingestor, registry, inheritance }
    }

    /// For every `Method` QN in the registry, split off its owning
    /// class's QN and method name, then BFS the class's parents for the
    /// nearest one that also defines that method name.
    pub fn run(&mut self) {
        let methods: Vec<String> = self
            .registry
            .iter()
            .filter(|(_, kind)| *kind == NodeKind::Method)
            .map(|(qn, _)| qn.to_string())
            .collect();

        for method_qn in methods {
            let Some((class_qn, name)) = method_qn.rsplit_once('.') else { continue };
            let Some(ancestor_method) = self.inheritance.find_ancestor(class_qn, |parent| {
                let candidate = format!("{parent}.{name}");
                if self.registry.get(&candidate) == Some(NodeKind::Method) {
                    Some(candidate)
                } else {
                    None
                }
            }) else {
                continue;
            };

            let child_ref = NodeRef::qualified_name(NodeKind::Method, method_qn.clone());
            let parent_ref = NodeRef::qualified_name(NodeKind::Method, ancestor_method);
            self.ingestor.ensure_relationship(child_ref, EdgeKind::Overrides, parent_ref, Default::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_core::Properties;

    #[derive(Default)]
    struct RecordingIngestor {
        overrides: Vec<(String, String)>,
    }

    impl Ingestor for RecordingIngestor {
        fn ensure_node(&mut self, _node: NodeRef, _properties: Properties) {}
        fn ensure_relationship(&mut self, src: NodeRef, kind: EdgeKind, dst: NodeRef, _properties: Properties) {
            if kind == EdgeKind::Overrides {
                self.overrides.push((src.value, dst.value));
            }
        }
        fn flush_all(&mut self) -> codegraph_core::CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn nearest_ancestor_defining_method_wins() {
        let mut registry = FunctionRegistry::new();
        registry.insert("proj.Base", NodeKind::Class);
        registry.insert("proj.Base.run", NodeKind::Method);
        registry.insert("proj.Mid", NodeKind::Class);
        registry.insert("proj.Mid.run", NodeKind::Method);
        registry.insert("proj.Child", NodeKind::Class);
        registry.insert("proj.Child.run", NodeKind::Method);

        let mut inheritance = ClassInheritance::new();
        inheritance.set_parents("proj.Child", vec!["proj.Mid".to_string()]);
        inheritance.set_parents("proj.Mid", vec!["proj.Base".to_string()]);

        let mut ingestor = RecordingIngestor::default();
        {
            let mut processor = OverrideProcessor::new(&mut ingestor, &registry, &inheritance);
            processor.run();
        }

        assert!(ingestor.overrides.contains(&("proj.Child.run".to_string(), "proj.Mid.run".to_string())));
    }

    #[test]
    fn no_ancestor_definition_emits_nothing() {
        let mut registry = FunctionRegistry::new();
        registry.insert("proj.Base", NodeKind::Class);
        registry.insert("proj.Child", NodeKind::Class);
        registry.insert("proj.Child.run", NodeKind::Method);
        let mut inheritance = ClassInheritance::new();
        inheritance.set_parents("proj.Child", vec!["proj.Base".to_string()]);

        let mut ingestor = RecordingIngestor::default();
        {
            let mut processor = OverrideProcessor::new(&mut ingestor, &registry, &inheritance);
            processor.run();
        }
        assert!(ingestor.overrides.is_empty());
    }
}
