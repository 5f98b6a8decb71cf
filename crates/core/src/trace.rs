// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! A small, self-contained trace reporter. No external logging crate is
//! pulled in for this — the granularity knob and the events it gates are
//! specific enough to the analyzer's three-tier error taxonomy that a
//! dozen lines here beat a dependency and its feature surface.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// How much a run reports. Each level is a superset of the ones below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Granularity {
    /// Report nothing at all.
    #[default]
    Silent = 0,
    /// Report per-pass progress and the final run report.
    Summary = 1,
    /// Also report per-file and per-call-site detail: skipped files,
    /// unresolved calls, degraded cache evictions.
    Detail = 2,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Silent => "silent",
            Granularity::Summary => "summary",
            Granularity::Detail => "detail",
        })
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silent" => Ok(Granularity::Silent),
            "summary" => Ok(Granularity::Summary),
            "detail" => Ok(Granularity::Detail),
            other => Err(format!("unknown granularity `{other}`")),
        }
    }
}

/// Writes gated trace lines to an arbitrary sink (stderr by default).
pub struct Reporter<W: Write> {
    level: Granularity,
    out: Mutex<W>,
}

impl Reporter<std::io::Stderr> {
    pub fn new(level: Granularity) -> Self {
        Self {
            level,
            out: Mutex::new(std::io::stderr()),
        }
    }
}

impl<W: Write> Reporter<W> {
    pub fn with_writer(level: Granularity, writer: W) -> Self {
        Self {
            level,
            out: Mutex::new(writer),
        }
    }

    pub fn level(&self) -> Granularity {
        self.level
    }

    /// Emit a `Summary`-level line (pass boundaries, degraded fallbacks).
    pub fn summary(&self, msg: fmt::Arguments<'_>) {
        self.emit(Granularity::Summary, msg);
    }

    /// Emit a `Detail`-level line (per-file / per-call-site).
    pub fn detail(&self, msg: fmt::Arguments<'_>) {
        self.emit(Granularity::Detail, msg);
    }

    fn emit(&self, required: Granularity, msg: fmt::Arguments<'_>) {
        if self.level < required {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(out, "{msg}");
        }
    }
}

/// Convenience macros mirroring `log::debug!`/`log::info!` call sites so
/// engine code reads like ordinary logging rather than an unfamiliar API.
#[macro_export]
macro_rules! trace_summary {
    ($reporter:expr, $($arg:tt)*) => {
        $reporter.summary(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! trace_detail {
    ($reporter:expr, $($arg:tt)*) => {
        $reporter.detail(format_args!($($arg)*))
    };
}
