//! Command-line interface.
//!
//! `failset run` selects a failure set and prints the tree or a JSON report,
//! `failset neighborhood` prints the radius-`d` ball around one node, and
//! `failset samples` lists the built-in trees. Commands return their output
//! as a `String` so they can be driven from tests; `main` only prints.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;

use crate::config::{FailSetConfig, OutputFormat};
use crate::error::{FailSetError, Result};
use crate::graph::builder::TreeBuilder;
use crate::graph::selection::SelectionEngine;
use crate::graph::store::TreeStore;
use crate::graph::traversal::NeighborhoodQuery;
use crate::labels::auto_labels;
use crate::observability::RunMetrics;
use crate::report::{render_tree, FailureReport};
use crate::samples::SampleTree;
use crate::types::{LookaheadPolicy, NodeId};

#[derive(Parser, Debug)]
#[command(name = "failset")]
#[command(version, about = "Failure-set selection on rooted trees", long_about = None)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select a failure set and print the result
    Run(RunArgs),

    /// Print the nodes within distance D of a node
    #[command(alias = "nb")]
    Neighborhood(NeighborhoodArgs),

    /// List the built-in sample trees
    #[command(alias = "ls")]
    Samples,
}

/// Where the input tree comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct TreeSource {
    /// Built-in sample tree (see `failset samples`)
    #[arg(long, value_parser = parse_sample, conflicts_with = "tree")]
    pub sample: Option<SampleTree>,

    /// Tree description file (.yaml, .yml or .json)
    #[arg(long)]
    pub tree: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: TreeSource,

    /// Forbidden surviving component size
    #[arg(short = 'k', allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Near-failure radius
    #[arg(short = 'l', allow_negative_numbers = true)]
    pub l: Option<i64>,

    /// Lookahead policy
    #[arg(long, value_enum)]
    pub lookahead: Option<LookaheadArg>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Skip the post-run census of surviving components
    #[arg(long)]
    pub no_verify: bool,
}

#[derive(Args, Debug, Clone)]
pub struct NeighborhoodArgs {
    #[command(flatten)]
    pub source: TreeSource,

    /// Node name or auto-label
    #[arg(long)]
    pub node: String,

    /// Radius
    #[arg(short = 'd', default_value_t = 1, allow_negative_numbers = true)]
    pub d: i64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookaheadArg {
    Frontier,
    Horizon,
}

impl From<LookaheadArg> for LookaheadPolicy {
    fn from(arg: LookaheadArg) -> Self {
        match arg {
            LookaheadArg::Frontier => LookaheadPolicy::Frontier,
            LookaheadArg::Horizon => LookaheadPolicy::Horizon,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn parse_sample(s: &str) -> std::result::Result<SampleTree, String> {
    SampleTree::from_str_loose(s).ok_or_else(|| {
        let known: Vec<&str> = SampleTree::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown sample `{s}` (expected one of: {})", known.join(", "))
    })
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run one parsed command against an already loaded config.
pub fn execute(cli: &Cli, config: FailSetConfig) -> Result<String> {
    match &cli.command {
        Commands::Run(args) => run_command(args, config),
        Commands::Neighborhood(args) => neighborhood_command(args),
        Commands::Samples => samples_command(),
    }
}

impl RunArgs {
    /// Layer the flags given on the command line over `config`.
    pub fn apply_to(&self, config: &mut FailSetConfig) {
        if let Some(k) = self.k {
            config.selection.k = k;
        }
        if let Some(l) = self.l {
            config.selection.l = l;
        }
        if let Some(lookahead) = self.lookahead {
            config.selection.lookahead = lookahead.into();
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if self.no_verify {
            config.output.verify = false;
        }
    }
}

impl TreeSource {
    /// Build the tree; the reference sample when nothing is given.
    pub fn load(&self) -> Result<TreeStore> {
        match (&self.tree, self.sample) {
            (Some(path), _) => TreeBuilder::load_file(path),
            (None, Some(sample)) => sample.build(),
            (None, None) => SampleTree::Reference.build(),
        }
    }

    fn describe(&self) -> String {
        match (&self.tree, self.sample) {
            (Some(path), _) => path.display().to_string(),
            (None, Some(sample)) => sample.to_string(),
            (None, None) => SampleTree::Reference.to_string(),
        }
    }
}

fn run_command(args: &RunArgs, mut config: FailSetConfig) -> Result<String> {
    args.apply_to(&mut config);
    let params = config.selection.params()?;
    let mut store = args.source.load()?;
    tracing::info!(
        source = %args.source.describe(),
        nodes = store.len(),
        "tree loaded"
    );

    let started = Instant::now();
    let outcome = SelectionEngine::new(params)
        .with_policy(config.selection.lookahead)
        .run(&mut store)?;
    let metrics = RunMetrics::record(&store, &outcome, started.elapsed());
    tracing::debug!(metrics = %metrics.to_json(), "run metrics");

    let report = FailureReport::build(&store, &outcome);
    if config.output.verify && !report.guarantee_holds {
        tracing::error!(
            largest = report.largest_surviving,
            k = report.k,
            "surviving component reaches k"
        );
        return Err(FailSetError::InvariantViolation(format!(
            "surviving component of size {} reaches k = {}",
            report.largest_surviving, report.k
        )));
    }

    match config.output.format {
        OutputFormat::Json => report.to_json(),
        OutputFormat::Text => {
            let mut out = render_tree(&store);
            out.push('\n');
            out.push_str(&summary(&report));
            Ok(out)
        }
    }
}

fn summary(report: &FailureReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} k = {}, l = {}, lookahead = {}",
        style("parameters:").bold(),
        report.k,
        report.l,
        report.policy
    );
    let _ = writeln!(
        out,
        "{} {} of {} [{}]",
        style("selected:").bold(),
        style(report.num_selected).cyan(),
        report.nodes,
        report.selected.join(", ")
    );
    let _ = writeln!(out, "{} {}", style("near-failed:").bold(), report.num_near);
    let verdict = if report.guarantee_holds {
        style("below k").green()
    } else {
        style("reaches k").red()
    };
    let _ = writeln!(
        out,
        "{} {} components, largest {} ({verdict})",
        style("surviving:").bold(),
        report.surviving_components,
        report.largest_surviving
    );
    out
}

fn neighborhood_command(args: &NeighborhoodArgs) -> Result<String> {
    let store = args.source.load()?;
    let labels = auto_labels(&store);
    let node = resolve_node(&store, &labels, &args.node)?;
    let query = NeighborhoodQuery::new(&store);
    let radius = isize::try_from(args.d)
        .map_err(|_| FailSetError::invalid_parameter("d", "radius out of range"))?;

    let mut ball: Vec<(usize, NodeId)> = query
        .neighborhood(node, radius)
        .into_iter()
        .map(|id| (query.distance(node, id), id))
        .collect();
    ball.sort();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} nodes within {} of {}",
        style("neighborhood:").bold(),
        ball.len(),
        args.d,
        labels[node.index()]
    );
    for (distance, id) in ball {
        let _ = writeln!(out, "  {} (distance {distance})", labels[id.index()]);
    }
    Ok(out)
}

/// Look a node up by explicit name first, then by auto-label.
fn resolve_node(store: &TreeStore, labels: &[String], key: &str) -> Result<NodeId> {
    store
        .find_by_name(key)
        .or_else(|| labels.iter().position(|l| l == key).map(NodeId))
        .ok_or_else(|| FailSetError::UnknownNode(key.to_string()))
}

fn samples_command() -> Result<String> {
    let mut out = String::new();
    for sample in SampleTree::ALL {
        let nodes = sample.build()?.len();
        let _ = writeln!(
            out,
            "{:<10} {:>3} nodes  {}",
            style(sample.as_str()).cyan(),
            nodes,
            sample.description()
        );
    }
    Ok(out)
}

/// Config for this invocation: `--config` if given, else the user file,
/// then environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<FailSetConfig> {
    FailSetConfig::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_run_flags() {
        let cli = parse(&[
            "failset", "run", "--sample", "counter", "-k", "4", "-l", "1", "--lookahead", "horizon",
            "--format", "json",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source.sample, Some(SampleTree::Counter));
        assert_eq!(args.k, Some(4));
        assert_eq!(args.l, Some(1));
        assert_eq!(args.lookahead, Some(LookaheadArg::Horizon));
        assert_eq!(args.format, Some(FormatArg::Json));
    }

    #[test]
    fn sample_and_tree_conflict() {
        let result = Cli::try_parse_from([
            "failset", "run", "--sample", "uniform", "--tree", "t.yaml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_sample_is_rejected() {
        assert!(Cli::try_parse_from(["failset", "run", "--sample", "forest"]).is_err());
    }

    #[test]
    fn cli_flags_override_config() {
        let cli = parse(&["failset", "run", "-k", "5", "--no-verify"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        let mut config = FailSetConfig::default();
        config.selection.l = 4;
        args.apply_to(&mut config);
        assert_eq!(config.selection.k, 5);
        assert_eq!(config.selection.l, 4);
        assert!(!config.output.verify);
    }

    #[test]
    fn run_reference_as_json() {
        let cli = parse(&["failset", "run", "--format", "json"]);
        let out = execute(&cli, FailSetConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["selected"], serde_json::json!(["b", "root"]));
        assert_eq!(value["guarantee_holds"], true);
    }

    #[test]
    fn run_text_includes_tree_and_summary() {
        let cli = parse(&["failset", "run", "--sample", "uniform"]);
        let out = execute(&cli, FailSetConfig::default()).unwrap();
        assert!(out.starts_with("a:\n"));
        assert!(out.contains("selected:"));
        assert!(out.contains("surviving:"));
    }

    #[test]
    fn run_rejects_bad_parameters() {
        let cli = parse(&["failset", "run", "-k", "0"]);
        let err = execute(&cli, FailSetConfig::default()).unwrap_err();
        assert!(matches!(err, FailSetError::InvalidParameter { name: "k", .. }));

        let cli = parse(&["failset", "run", "-l", "-1"]);
        let err = execute(&cli, FailSetConfig::default()).unwrap_err();
        assert!(matches!(err, FailSetError::InvalidParameter { name: "l", .. }));
    }

    #[test]
    fn run_reads_tree_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chain.yaml");
        std::fs::write(
            &path,
            "name: r\nchildren:\n  - name: x\n    children:\n      - name: y\n",
        )
        .unwrap();
        let cli = Cli::try_parse_from([
            "failset",
            "run",
            "--tree",
            path.to_str().unwrap(),
            "-k",
            "3",
            "-l",
            "0",
            "--format",
            "json",
        ])
        .unwrap();
        let out = execute(&cli, FailSetConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["selected"], serde_json::json!(["r"]));
    }

    #[test]
    fn neighborhood_by_name_and_label() {
        let cli = parse(&["failset", "neighborhood", "--sample", "reference", "--node", "b1", "-d", "1"]);
        let out = execute(&cli, FailSetConfig::default()).unwrap();
        assert!(out.contains("3 nodes within 1 of b1"));
        assert!(out.contains("  b1 (distance 0)"));
        assert!(out.contains("  b (distance 1)"));
        assert!(out.contains("  b11 (distance 1)"));

        let cli = parse(&["failset", "nb", "--sample", "uniform", "--node", "2a", "-d", "0"]);
        let out = execute(&cli, FailSetConfig::default()).unwrap();
        assert!(out.contains("1 nodes within 0 of 2a"));
    }

    #[test]
    fn neighborhood_unknown_node() {
        let cli = parse(&["failset", "neighborhood", "--node", "zzz"]);
        let err = execute(&cli, FailSetConfig::default()).unwrap_err();
        assert!(matches!(err, FailSetError::UnknownNode(ref n) if n == "zzz"));
    }

    #[test]
    fn samples_lists_every_tree() {
        let out = execute(&parse(&["failset", "samples"]), FailSetConfig::default()).unwrap();
        for sample in SampleTree::ALL {
            assert!(out.contains(sample.as_str()));
            assert!(out.contains(sample.description()));
        }
    }
}
