//! Ontograph CLI
//!
//! Builds the term graph for a spreadsheet snapshot and writes it out:
//! - `build`: graph (JSON), Graphviz DOT, or hierarchy trees
//! - `check`: diagnostics only, optionally failing on warnings

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use ontograph_core::{apply_filters, BuildReport, Diagnostic, GraphBuilder, Severity};

mod input;
mod viz;

use input::{load_config, load_filters, read_json, BuildInput};
use viz::VizFormat;

#[derive(Parser)]
#[command(
    name = "ontograph",
    version,
    about = "Ontograph: ontology term graphs for spreadsheet editors"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, filter and render the term graph of a sheet snapshot.
    Build {
        #[command(flatten)]
        common: CommonArgs,
        /// Output format: json|dot|tree
        #[arg(long, default_value = "json")]
        format: String,
        /// Filter options JSON (default: everything visible)
        #[arg(long)]
        filters: Option<PathBuf>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Build the graph and report diagnostics only.
    Check {
        #[command(flatten)]
        common: CommonArgs,
        /// Exit non-zero if any warning was reported.
        #[arg(long)]
        deny_warnings: bool,
        /// Print diagnostics as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Snapshot bundle JSON (`-` for stdin)
    input: PathBuf,
    /// Build configuration JSON (column names, palette, defaults)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_build(common: &CommonArgs) -> Result<BuildReport> {
    let bundle: BuildInput = read_json(&common.input)?;
    let config = load_config(common.config.as_deref())?;
    let builder = GraphBuilder::new(config);
    let report = builder.build(&bundle.sheet, &bundle.payload, &bundle.selection)?;
    tracing::info!(
        input = %common.input.display(),
        nodes = report.graph.node_count(),
        pruned = report.pruned,
        "graph built"
    );
    Ok(report)
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let tag = match diagnostic.severity {
        Severity::Warning => "warning".yellow().bold(),
        Severity::Info => "info".blue().bold(),
    };
    eprintln!("{tag}: {diagnostic}");
}

fn cmd_build(
    common: &CommonArgs,
    format: &str,
    filters: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    let format = VizFormat::parse(format)?;
    let report = run_build(common)?;
    let options = load_filters(filters, &report.graph)?;
    let filtered = apply_filters(&report.graph, &options);

    for diagnostic in report.warnings() {
        print_diagnostic(diagnostic);
    }

    let text = viz::render(
        format,
        &filtered,
        report.graph.summary(),
        report.pruned,
        &report.diagnostics,
    )?;
    match out {
        Some(path) => {
            fs::write(path, text.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "{} {} ({} of {} nodes visible)",
                "wrote".green().bold(),
                path.display().to_string().bold(),
                filtered.nodes.len(),
                report.graph.node_count()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_check(common: &CommonArgs, deny_warnings: bool, json: bool) -> Result<()> {
    let report = run_build(common)?;
    let warnings = report.warnings().count();

    if json {
        println!("{}", serde_json::to_string_pretty(&report.diagnostics)?);
    } else {
        for diagnostic in &report.diagnostics {
            print_diagnostic(diagnostic);
        }
        let summary = report.graph.summary();
        eprintln!(
            "{} {} current, {} dependency, {} derived; {} pruned; {} warning(s)",
            "checked".green().bold(),
            summary.current,
            summary.dependency,
            summary.derived,
            report.pruned,
            warnings
        );
    }

    if deny_warnings && warnings > 0 {
        return Err(anyhow!("{warnings} warning(s) reported (--deny-warnings)"));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Build {
            common,
            format,
            filters,
            out,
        } => cmd_build(common, format, filters.as_deref(), out.as_deref()),
        Commands::Check {
            common,
            deny_warnings,
            json,
        } => cmd_check(common, *deny_warnings, *json),
    }
}
