// SPDX-FileCopyrightText: 2025 Knitli Inc. <knitli@knit.li>
// SPDX-FileContributor: Adam Poulemanos <adam@knit.li>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Command-line driver for `codegraph`: a thin layer that wires a
//! `DefaultGrammarLoader` and a logging `Ingestor` to `GraphUpdater` and
//! prints the run report. The real graph sink (a database writer) is an
//! external collaborator this binary stands in for.

mod logging_ingestor;

use clap::{Parser, Subcommand};
use codegraph_core::Granularity;
use codegraph_engine::{AnalysisConfig, GraphUpdater};
use codegraph_languages::DefaultGrammarLoader;
use logging_ingestor::LoggingIngestor;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "codegraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a repository and build its code property graph.
    Analyze {
        /// Root directory to scan.
        path: PathBuf,

        /// Name the graph's root `Project` node is qualified under.
        #[arg(long)]
        project_name: Option<String>,

        /// How much progress and degraded-fallback detail to print.
        #[arg(long, value_enum, default_value = "summary")]
        granularity: GranularityArg,

        /// Log every `ensure_node`/`ensure_relationship` call at `Detail`
        /// granularity instead of only counting them.
        #[arg(long)]
        log_mutations: bool,

        /// Maximum number of parsed ASTs the engine keeps resident.
        #[arg(long, default_value_t = 1000)]
        max_ast_entries: usize,

        /// Soft memory ceiling for the AST cache, in megabytes.
        #[arg(long, default_value_t = 500)]
        max_ast_memory_mb: usize,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum GranularityArg {
    Silent,
    Summary,
    Detail,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Silent => Granularity::Silent,
            GranularityArg::Summary => Granularity::Summary,
            GranularityArg::Detail => Granularity::Detail,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Command::Analyze { path, project_name, granularity, log_mutations, max_ast_entries, max_ast_memory_mb } = cli.command;

    let project_name = project_name.unwrap_or_else(|| {
        path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "project".to_string())
    });
    let granularity: Granularity = granularity.into();
    let config = AnalysisConfig {
        project_name,
        granularity,
        ast_cache_max_entries: max_ast_entries,
        ast_cache_max_memory_bytes: max_ast_memory_mb * 1024 * 1024,
    };

    let ingestor = LoggingIngestor::new(log_mutations && granularity == Granularity::Detail);
    let mut updater = GraphUpdater::new(ingestor, DefaultGrammarLoader, config);
    let report = updater.run(&path)?;

    println!(
        "scanned {} files ({} parsed, {} failed) -> {} nodes, {} relationships in {:?}",
        report.files_discovered, report.files_parsed, report.files_failed, report.nodes, report.relationships, report.duration
    );
    Ok(())
}
