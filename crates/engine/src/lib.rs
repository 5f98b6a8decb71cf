// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The analysis passes that turn one repository's worth of parsed ASTs
//! into a code property graph: structure discovery, import resolution,
//! definition collection, type inference, call resolution, and override
//! detection, orchestrated by [`GraphUpdater`].

mod call_processor;
mod call_resolver;
mod definitions;
mod error;
mod import_map;
mod import_processor;
mod overrides;
mod qn_util;
mod scope;
mod structure;
mod type_inference;
mod updater;

pub use call_processor::{CallProcessor, Engine};
pub use call_resolver::{CallHead, CallResolver, IIFE_MARKER};
pub use definitions::DefinitionProcessor;
pub use error::{any_language_available, EngineError, EngineResult};
pub use import_map::{resolve_relative, ImportMap, ModuleImports};
pub use import_processor::ImportProcessor;
pub use overrides::OverrideProcessor;
pub use qn_util::module_qn;
pub use structure::{DiscoveredFile, StructureProcessor};
pub use type_inference::{GenericEngine, LocalVarTypes, PythonEngine, TypeInferenceEngine};
pub use updater::{AnalysisConfig, GraphUpdater, RunReport};
