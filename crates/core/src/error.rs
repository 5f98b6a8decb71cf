// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fatal-only error type for the core data structures. Per-file parse
//! failures, unresolved calls, and type-inference misses are not errors
//! in this taxonomy — they are `None`/empty results the caller logs and
//! continues past. `CoreError` is reserved for conditions that make the
//! in-memory state itself inconsistent or unusable.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("qualified name `{0}` was not found in the registry")]
    NotFound(String),

    #[error("ingestor flush failed: {0}")]
    Flush(String),

    #[error("no parsers were loaded; at least one language must be configured")]
    NoParsersLoaded,
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
