// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fatal-only error type for the engine driver. Per-file parse failures,
//! unresolved calls, and type-inference misses never reach this type —
//! they are logged and swallowed where they occur. `AnalysisError` is
//! reserved for the handful of conditions `GraphUpdater::run` cannot run
//! past: an ingestor flush failure, or a misconfigured run with no
//! parsers loaded at all.

use codegraph_core::CoreError;
use codegraph_languages::LanguageTag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("no parsers were loaded for any of the configured languages; at least one must succeed")]
    NoParsersLoaded,
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Guards against a `GraphUpdater` configured with a grammar loader that
/// fails to produce a single usable language. A repo scan that can parse
/// nothing is a misconfiguration, not an empty result.
pub fn any_language_available(loaded: &[LanguageTag]) -> EngineResult<()> {
    if loaded.is_empty() { Err(EngineError::NoParsersLoaded) } else { Ok(()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_language_list_is_fatal() {
        assert!(any_language_available(&[]).is_err());
    }

    #[test]
    fn at_least_one_language_is_fine() {
        assert!(any_language_available(&[LanguageTag::Python]).is_ok());
    }
}
