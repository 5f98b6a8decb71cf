// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! End-to-end tests over `GraphUpdater::run`, writing real files to a
//! temp directory rather than feeding the driver pre-built ASTs. Each
//! per-pass unit test elsewhere in this crate exercises one processor in
//! isolation; these exercise the full five-pass pipeline together.

use codegraph_core::{CoreResult, EdgeKind, Ingestor, NodeKind, NodeRef, Properties};
use codegraph_engine::{AnalysisConfig, GraphUpdater};
use codegraph_languages::DefaultGrammarLoader;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Records every node and relationship as a comparable, order-independent
/// set, so two runs over equivalent input can be asserted equal (R1) or
/// inspected for specific edges (the end-to-end scenarios).
#[derive(Default)]
struct RecordingIngestor {
    nodes: BTreeSet<(String, String)>,
    edges: BTreeSet<(String, String, String)>,
}

impl Ingestor for RecordingIngestor {
    fn ensure_node(&mut self, node: NodeRef, _properties: Properties) {
        self.nodes.insert((node.kind.as_str().to_string(), node.value));
    }

    fn ensure_relationship(&mut self, src: NodeRef, kind: EdgeKind, dst: NodeRef, _properties: Properties) {
        self.edges.insert((src.value, kind.as_str().to_string(), dst.value));
    }

    fn flush_all(&mut self) -> CoreResult<()> {
        Ok(())
    }
}

impl RecordingIngestor {
    fn has_edge(&self, src: &str, kind: EdgeKind, dst: &str) -> bool {
        self.edges.contains(&(src.to_string(), kind.as_str().to_string(), dst.to_string()))
    }
}

fn config(project_name: &str) -> AnalysisConfig {
    AnalysisConfig { project_name: project_name.to_string(), ..AnalysisConfig::default() }
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Scenario 1 + B3: `A` defines `f`, `B(A)` overrides it, and a diamond
/// `D(B, C)` that does *not* redefine `m` gets no `OVERRIDES` edge of its
/// own, while `B.m`/`C.m` each override `A.m`.
#[test]
fn python_inheritance_and_diamond_overrides() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "model.py",
        "class A:\n\
         \x20   def f(self):\n\
         \x20       pass\n\
         \x20   def m(self):\n\
         \x20       pass\n\n\
         class B(A):\n\
         \x20   def f(self):\n\
         \x20       pass\n\
         \x20   def m(self):\n\
         \x20       pass\n\n\
         class C(A):\n\
         \x20   def m(self):\n\
         \x20       pass\n\n\
         class D(B, C):\n\
         \x20   pass\n",
    );

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    let report = updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert_eq!(report.files_failed, 0);
    assert!(ingestor.has_edge("proj.model.B", EdgeKind::Inherits, "proj.model.A"));
    assert!(ingestor.has_edge("proj.model.B.f", EdgeKind::Overrides, "proj.model.A.f"));
    assert!(ingestor.has_edge("proj.model.B.m", EdgeKind::Overrides, "proj.model.A.m"));
    assert!(ingestor.has_edge("proj.model.C.m", EdgeKind::Overrides, "proj.model.A.m"));
    // D never defines `m` itself, so it has nothing to override with.
    assert!(!ingestor.edges.iter().any(|(src, kind, _)| src == "proj.model.D.m" && kind == "OVERRIDES"));
}

/// Scenario 2: `super().__init__()` inside an overriding method resolves
/// to the nearest ancestor's method of the same name.
#[test]
fn python_super_call_resolves_to_ancestor() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "model.py",
        "class A:\n\
         \x20   def __init__(self):\n\
         \x20       pass\n\n\
         class B(A):\n\
         \x20   def __init__(self):\n\
         \x20       super().__init__()\n",
    );

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert!(ingestor.has_edge("proj.model.B.__init__", EdgeKind::Calls, "proj.model.A.__init__"));
}

/// Scenario 3: a wildcard `from utils import *` followed by a bare call
/// to a name only `utils` defines resolves through the wildcard entry.
#[test]
fn python_wildcard_import_resolves_call() {
    let dir = tempdir().unwrap();
    write(dir.path(), "utils.py", "def helper_function():\n    pass\n");
    write(
        dir.path(),
        "main.py",
        "from proj.utils import *\n\n\
         def run():\n\
         \x20   helper_function()\n",
    );

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert!(ingestor.has_edge("proj.main.run", EdgeKind::Calls, "proj.utils.helper_function"));
}

/// Scenario 4: `pkg.a` and `pkg.b` each define `func`; a call from `pkg.a`
/// resolves to its own module's definition rather than the sibling's.
#[test]
fn sibling_module_call_prefers_same_module() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "pkg/a.py",
        "def func():\n\
         \x20   pass\n\n\
         def caller():\n\
         \x20   func()\n",
    );
    write(dir.path(), "pkg/b.py", "def func():\n    pass\n");

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert!(ingestor.has_edge("proj.pkg.a.caller", EdgeKind::Calls, "proj.pkg.a.func"));
    assert!(!ingestor.has_edge("proj.pkg.a.caller", EdgeKind::Calls, "proj.pkg.b.func"));
}

/// Scenario 5: a qualified Java call through an imported class resolves
/// both the method-chain prefix and the outer call.
#[test]
fn java_qualified_call_resolves_both_links() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "Storage.java",
        "public class Storage {\n\
         \x20   public static Storage getInstance() { return new Storage(); }\n\
         \x20   public void clearAll() {}\n\
         }\n",
    );
    write(
        dir.path(),
        "App.java",
        "import main.Storage.Storage;\n\n\
         public class App {\n\
         \x20   public void run() {\n\
         \x20       Storage.getInstance().clearAll();\n\
         \x20   }\n\
         }\n",
    );

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("main"));
    updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert!(ingestor.has_edge("main.App.run", EdgeKind::Calls, "main.Storage.Storage.getInstance"));
    assert!(ingestor.has_edge("main.App.run", EdgeKind::Calls, "main.Storage.Storage.clearAll"));
}

/// R1: two independent runs over an unchanged repository emit the same
/// node and edge sets.
#[test]
fn repeated_run_is_deterministic() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "model.py",
        "class A:\n\
         \x20   def f(self):\n\
         \x20       pass\n\n\
         class B(A):\n\
         \x20   def f(self):\n\
         \x20       pass\n",
    );

    let mut updater_a = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater_a.run(dir.path()).unwrap();
    let first = updater_a.into_ingestor();

    let mut updater_b = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater_b.run(dir.path()).unwrap();
    let second = updater_b.into_ingestor();

    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.edges, second.edges);
}

/// R2: removing a file's state and re-ingesting it reproduces the
/// original single-pass node/edge set for that file's definitions.
#[test]
fn remove_then_reingest_matches_original_state() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "model.py",
        "class A:\n\
         \x20   def f(self):\n\
         \x20       pass\n",
    );

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater.run(dir.path()).unwrap();
    let baseline = updater.into_ingestor();
    assert!(baseline.nodes.contains(&("Class".to_string(), "proj.model.A".to_string())));

    let file = dir.path().join("model.py");
    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    updater.run(dir.path()).unwrap();
    updater.remove_file_from_state(dir.path(), &file);
    // Re-run the whole pipeline; the file's definitions should come back
    // identically since nothing on disk changed.
    let report = updater.run(dir.path()).unwrap();
    let after = updater.into_ingestor();

    assert_eq!(report.files_failed, 0);
    assert!(after.nodes.contains(&("Class".to_string(), "proj.model.A".to_string())));
    assert!(after.nodes.contains(&("Method".to_string(), "proj.model.A.f".to_string())));
}

/// B1: a file that can't even be read (invalid UTF-8) is counted as
/// failed but does not stop the rest of the repository from being
/// processed.
#[test]
fn unreadable_file_does_not_block_other_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.py"), [0xFF, 0xFE, 0x00, 0xFF]).unwrap();
    write(dir.path(), "good.py", "def ok():\n    pass\n");

    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    let report = updater.run(dir.path()).unwrap();
    let ingestor = updater.into_ingestor();

    assert_eq!(report.files_failed, 1);
    assert!(ingestor.nodes.contains(&(NodeKind::Function.as_str().to_string(), "proj.good.ok".to_string())));
}

/// An empty repository is not a misconfiguration: the driver still
/// succeeds, discovering and parsing nothing.
#[test]
fn empty_repository_runs_cleanly() {
    let dir = tempdir().unwrap();
    let mut updater = GraphUpdater::new(RecordingIngestor::default(), DefaultGrammarLoader, config("proj"));
    let report = updater.run(dir.path()).unwrap();

    assert_eq!(report.files_discovered, 0);
    assert_eq!(report.files_parsed, 0);
    assert_eq!(report.files_failed, 0);
}
