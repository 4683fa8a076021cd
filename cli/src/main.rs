//! Threatgraph CLI: analyze event graphs from the command line
//!
//! `analyze` runs the pipeline over a JSON graph file and prints the report;
//! `serve` starts the HTTP analysis API.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::{Path, PathBuf};
use threatgraph::{AnalysisConfig, AnalysisReport, Analyzer, GraphInput, HttpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "threatgraph", version, about = "Event graph risk analysis")]
struct Cli {
    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a graph file ({"nodes": [...], "edges": [...]})
    Analyze {
        /// Path to the graph JSON file
        graph: PathBuf,

        /// Analysis configuration (YAML or JSON)
        #[arg(long, env = "THREATGRAPH_CONFIG")]
        config: Option<PathBuf>,

        /// Rows to show per table
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Start the HTTP analysis API
    Serve {
        #[arg(long, default_value_t = 8080, env = "THREATGRAPH_PORT")]
        port: u16,

        /// Default analysis configuration (YAML or JSON)
        #[arg(long, env = "THREATGRAPH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze { graph, config, top } => {
            run_analyze(&graph, config.as_deref(), top, &cli.format).await
        }
        Commands::Serve { port, config } => run_serve(port, config.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

async fn run_analyze(
    graph: &Path,
    config: Option<&Path>,
    top: usize,
    format: &OutputFormat,
) -> Result<()> {
    let config = load_config(config)?;
    let file = std::fs::File::open(graph)
        .with_context(|| format!("opening graph file {}", graph.display()))?;
    let input = GraphInput::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("parsing graph file {}", graph.display()))?;

    if input.nodes.is_empty() && input.edges.is_empty() {
        bail!("graph file {} has no nodes or edges", graph.display());
    }

    let report = tokio::task::spawn_blocking(move || Analyzer::new(config).analyze_input(&input))
        .await
        .context("analysis task panicked")??;

    match format {
        OutputFormat::Json => println!("{}", report.to_json_pretty()?),
        OutputFormat::Table => print_report(&report, top),
    }

    Ok(())
}

async fn run_serve(port: u16, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    info!("Starting threatgraph {} API on port {}", threatgraph::version(), port);
    HttpServer::new(config, port).start().await?;
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}

fn print_report(report: &AnalysisReport, top: usize) {
    let overview = &report.overview;
    println!("Nodes:            {}", overview.total_nodes);
    println!("Edges:            {}", overview.total_edges);
    println!("Density:          {:.4}", overview.graph_density);
    println!("Avg path length:  {:.4}", overview.avg_path_length);
    println!(
        "Anomalies:        {} (threshold {:.4})",
        overview.anomaly_count, overview.anomaly_threshold
    );

    let mut types = new_table(&["Type", "Count"]);
    for (node_type, count) in &overview.node_type_distribution {
        types.add_row(vec![node_type.to_string(), count.to_string()]);
    }
    println!("{}", types);

    if report.anomalies.is_empty() {
        println!("(no anomalies)");
    } else {
        let mut anomalies = new_table(&["Node", "Type", "Score", "Reasons"]);
        for anomaly in report.top_anomalies(top) {
            anomalies.add_row(vec![
                anomaly.node_id.clone(),
                anomaly.node_type.to_string(),
                format!("{:.3}", anomaly.score),
                anomaly.reasons.join(", "),
            ]);
        }
        println!("{}", anomalies);
    }

    if !report.threat_paths.is_empty() {
        let mut paths = new_table(&["Source", "Target", "Path", "Distance", "Risk"]);
        for path in report.threat_paths.iter().take(top) {
            paths.add_row(vec![
                path.source.clone(),
                path.target.clone(),
                path.path.join(" -> "),
                format!("{:.2}", path.distance),
                format!("{:.3}", path.risk_score),
            ]);
        }
        println!("{}", paths);
        println!("{} threat path(s)", report.threat_paths.len());
    }

    if report.system_health.total_servers > 0 {
        let mut servers = new_table(&["Server", "Status", "Alerts", "Anomaly", "DREAD"]);
        for (id, health) in report.system_health.servers.iter().take(top) {
            servers.add_row(vec![
                id.clone(),
                format!("{:?}", health.status),
                health.alert_count.to_string(),
                format!("{:.3}", health.anomaly_score),
                format!("{:.1}", health.dread_score),
            ]);
        }
        println!("{}", servers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_serve_options_read_environment() {
        let command = Cli::command();
        let serve = command.find_subcommand("serve").unwrap();
        let env_of = |name: &str| {
            serve
                .get_arguments()
                .find(|a| a.get_id() == name)
                .and_then(|a| a.get_env())
                .map(|e| e.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("port").as_deref(), Some("THREATGRAPH_PORT"));
        assert_eq!(env_of("config").as_deref(), Some("THREATGRAPH_CONFIG"));
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::try_parse_from(["threatgraph", "--format", "json", "analyze", "g.json", "--top", "3"])
            .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        match cli.command {
            Commands::Analyze { graph, top, .. } => {
                assert_eq!(graph, PathBuf::from("g.json"));
                assert_eq!(top, 3);
            }
            Commands::Serve { .. } => panic!("expected analyze"),
        }
    }
}
