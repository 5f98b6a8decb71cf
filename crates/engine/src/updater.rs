// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The driver: owns every piece of analysis state and runs the five
//! passes in order over one repository. `GraphUpdater::run` is the only
//! entry point a caller needs; everything else in this crate exists to
//! support it.

use crate::call_processor::{CallProcessor, Engine};
use crate::error::{any_language_available, EngineError, EngineResult};
use crate::import_map::ImportMap;
use crate::import_processor::ImportProcessor;
use crate::definitions::DefinitionProcessor;
use crate::overrides::OverrideProcessor;
use crate::qn_util::module_qn;
use crate::structure::StructureProcessor;
use codegraph_core::{trace_summary, ClassInheritance, CountingIngestor, FastMap, FastSet, FunctionRegistry, Granularity, Ingestor, SimpleNameLookup};
use codegraph_languages::{GrammarLoader, LanguageTag};
use codegraph_parse::{parse_source, AstCache};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Construction-time knobs, passed by value — no ambient/global state.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub project_name: String,
    pub granularity: Granularity,
    pub ast_cache_max_entries: usize,
    pub ast_cache_max_memory_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            project_name: "project".to_string(),
            granularity: Granularity::Silent,
            ast_cache_max_entries: 1000,
            ast_cache_max_memory_bytes: 500 * 1024 * 1024,
        }
    }
}

/// Counts and timing the driver hands back on completion. This is the
/// typed form of the "driver reports counts" requirement.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files_discovered: usize,
    pub files_parsed: usize,
    pub files_failed: usize,
    pub nodes: usize,
    pub relationships: usize,
    pub duration: Duration,
}

/// Owns the registry, simple-name index, inheritance table, import map,
/// AST cache, and per-file location/module bookkeeping for one
/// repository's worth of analysis state. Single-threaded, per §5: all of
/// this is mutated during passes 1-2 and read during pass 3, with no
/// cross-file fan-out.
pub struct GraphUpdater<I: Ingestor, L: GrammarLoader> {
    ingestor: CountingIngestor<I>,
    loader: L,
    config: AnalysisConfig,
    registry: FunctionRegistry,
    names: SimpleNameLookup,
    inheritance: ClassInheritance,
    imports: ImportMap,
    cache: AstCache,
    locations: FastMap<String, PathBuf>,
    file_modules: FastMap<PathBuf, String>,
}

impl<I: Ingestor, L: GrammarLoader> GraphUpdater<I, L> {
    pub fn new(ingestor: I, loader: L, config: AnalysisConfig) -> Self {
        let cache = AstCache::new(config.ast_cache_max_entries, config.ast_cache_max_memory_bytes);
        Self {
            ingestor: CountingIngestor::new(ingestor),
            loader,
            config,
            registry: FunctionRegistry::new(),
            names: SimpleNameLookup::new(),
            inheritance: ClassInheritance::new(),
            imports: ImportMap::new(),
            cache,
            locations: FastMap::default(),
            file_modules: FastMap::default(),
        }
    }

    /// Run the full pipeline over `root`: structure, then imports +
    /// definitions per file, then calls, then overrides, then flush.
    pub fn run(&mut self, root: &Path) -> EngineResult<RunReport> {
        let started = Instant::now();
        let reporter = codegraph_core::trace::Reporter::new(self.config.granularity);

        let loaded: Vec<LanguageTag> = LanguageTag::ALL.iter().copied().filter(|tag| self.loader.language(*tag).is_ok()).collect();
        any_language_available(&loaded)?;

        let discovered = StructureProcessor::new(&mut self.ingestor).run(root, &self.config.project_name);
        trace_summary!(reporter, "discovered {} candidate source files", discovered.len());

        let mut parsed_files: Vec<(PathBuf, LanguageTag, String)> = Vec::new();
        let mut files_failed = 0usize;

        for file in &discovered {
            let source = match std::fs::read_to_string(&file.path) {
                Ok(s) => s,
                Err(_) => {
                    files_failed += 1;
                    trace_summary!(reporter, "skipping {}: could not read file", file.path.display());
                    continue;
                }
            };
            match parse_source(&self.loader, file.language, &source) {
                Ok(parsed) => {
                    let qn = module_qn(&self.config.project_name, root, &file.path);
                    self.cache.insert(file.path.clone(), parsed);
                    parsed_files.push((file.path.clone(), file.language, qn));
                }
                Err(err) => {
                    files_failed += 1;
                    trace_summary!(reporter, "skipping {}: {err}", file.path.display());
                }
            }
        }

        for (path, language, module_qn) in &parsed_files {
            let Some(parsed) = self.cache.get(path) else { continue };
            let root_node = parsed.tree.root_node();
            let source = parsed.source.clone();
            DefinitionProcessor::new(
                &mut self.ingestor,
                &mut self.registry,
                &mut self.names,
                &mut self.inheritance,
                &mut self.locations,
                &mut self.file_modules,
            )
            .run(root_node, &source, module_qn, *language, path);
            ImportProcessor::new(&mut self.imports).run(root_node, &source, module_qn, *language);
        }
        trace_summary!(reporter, "definitions pass complete: {} files", parsed_files.len());

        let mut engines: FastMap<&'static str, Engine> =
            LanguageTag::ALL.iter().map(|tag| (tag.as_str(), Engine::for_language(*tag))).collect();

        for (path, language, module_qn) in &parsed_files {
            // Cloned rather than held by reference: `CallProcessor` needs
            // its own `&mut AstCache` for cross-file return-type lookups,
            // which would otherwise conflict with a borrow of this file's
            // own cached entry.
            let Some(parsed) = self.cache.get(path).cloned() else { continue };
            let root_node = parsed.tree.root_node();
            let source = parsed.source.clone();
            let engine = engines.get_mut(language.as_str()).expect("engine seeded for every language tag");
            CallProcessor::new(
                &mut self.ingestor,
                &self.registry,
                &self.names,
                &self.imports,
                &self.inheritance,
                &mut self.cache,
                &self.locations,
                &self.file_modules,
            )
            .run(root_node, &source, module_qn, *language, engine);
        }
        trace_summary!(reporter, "calls pass complete");

        OverrideProcessor::new(&mut self.ingestor, &self.registry, &self.inheritance).run();
        trace_summary!(reporter, "overrides pass complete");

        self.ingestor.flush_all().map_err(EngineError::Core)?;

        let (nodes, relationships) = self.ingestor.counts();
        let report = RunReport {
            files_discovered: discovered.len(),
            files_parsed: parsed_files.len(),
            files_failed,
            nodes,
            relationships,
            duration: started.elapsed(),
        };
        trace_summary!(reporter, "run complete: {} nodes, {} relationships in {:?}", report.nodes, report.relationships, report.duration);
        Ok(report)
    }

    /// Purge every QN under `path`'s module prefix from the registry and
    /// simple-name index, plus the cached AST, so the caller can re-ingest
    /// just that file without a full rebuild.
    pub fn remove_file_from_state(&mut self, root: &Path, path: &Path) {
        let prefix = module_qn(&self.config.project_name, root, path);
        let stale: Vec<String> = self
            .registry
            .iter()
            .map(|(qn, _)| qn.to_string())
            .filter(|qn| qn == &prefix || qn.starts_with(&format!("{prefix}.")))
            .collect();
        let mut removed = FastSet::default();
        for qn in stale {
            self.registry.delete(&qn);
            self.locations.remove(&qn);
            removed.insert(qn);
        }
        self.names.remove_all(&removed);
        self.imports.remove_prefix(&prefix);
        self.file_modules.remove(path);
        self.cache.remove(path);
    }

    /// Give the caller back the ingestor, e.g. to read its final counts
    /// or hand it to a different sink after the run.
    pub fn into_ingestor(self) -> I {
        self.ingestor.into_inner()
    }
}
