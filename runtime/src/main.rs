use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vc_hunter::cli;
use vc_hunter::config::AnalysisConfig;

#[derive(Parser)]
#[command(name = "vc-hunter", version, about = "Match founders to VC firms by embedding similarity")]
struct Cli {
    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Only print results
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Print details and info-level logs
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct ClusterArgs {
    /// Smallest cluster count to try
    #[arg(long)]
    min_k: Option<usize>,

    /// Largest cluster count to try
    #[arg(long)]
    max_k: Option<usize>,

    /// k-means restarts per cluster count
    #[arg(long)]
    restarts: Option<usize>,

    /// Seed for k-means initialization
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full analysis: matches, clusters, relationships, gaps
    Analyze {
        /// Run document (JSON), or - for stdin
        input: PathBuf,
        #[command(flatten)]
        cluster: ClusterArgs,
        /// Matches to display
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Portfolio companies to keep in the similar-entity list
        #[arg(long)]
        entities: Option<usize>,
    },
    /// Rank VC firms and portfolio companies against the founder
    Match {
        input: PathBuf,
        /// Matches to display
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Portfolio companies to keep in the similar-entity list
        #[arg(long)]
        entities: Option<usize>,
    },
    /// Group VC firms into thematic clusters
    Clusters {
        input: PathBuf,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
    /// Build the VC relationship graph from portfolio overlap
    Relationships { input: PathBuf },
    /// Rank clusters near the founder by coverage
    Gaps {
        input: PathBuf,
        #[command(flatten)]
        cluster: ClusterArgs,
    },
}

fn apply(config: &mut AnalysisConfig, args: &ClusterArgs) {
    if let Some(v) = args.min_k {
        config.cluster.min_k = v;
    }
    if let Some(v) = args.max_k {
        config.cluster.max_k = v;
    }
    if let Some(v) = args.restarts {
        config.cluster.n_init = v;
    }
    if let Some(v) = args.seed {
        config.cluster.seed = v;
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if args.json {
        std::env::set_var("VC_HUNTER_JSON", "1");
    }
    if args.quiet {
        std::env::set_var("VC_HUNTER_QUIET", "1");
    }
    if args.verbose {
        std::env::set_var("VC_HUNTER_VERBOSE", "1");
    }
    if args.no_color {
        std::env::set_var("VC_HUNTER_NO_COLOR", "1");
    }

    let level = if args.verbose { "vc_hunter=info" } else { "vc_hunter=warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?),
        )
        .init();

    let mut config = AnalysisConfig::from_env();

    match args.command {
        Command::Analyze {
            input,
            cluster,
            top,
            entities,
        } => {
            apply(&mut config, &cluster);
            cli::analyze_cmd::run(&input, config.with_top_entities(entities), top)
        }
        Command::Match {
            input,
            top,
            entities,
        } => cli::match_cmd::run(&input, &config.with_top_entities(entities), top),
        Command::Clusters { input, cluster } => {
            apply(&mut config, &cluster);
            cli::clusters_cmd::run(&input, &config)
        }
        Command::Relationships { input } => cli::relationships_cmd::run(&input),
        Command::Gaps { input, cluster } => {
            apply(&mut config, &cluster);
            cli::gaps_cmd::run(&input, &config)
        }
    }
}
