//! k8s-diagram - render a Mermaid dependency diagram of a cluster
//!
//! Lists the cluster's namespaces, services, workloads and their owner
//! chains, rebuilds the ownership/selector graph, and prints a Mermaid
//! flowchart to stdout (or a file).

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use k8s_diagram::{cli, config, graph, kube, parser, NamespaceFilter};

/// Render a Mermaid dependency diagram of a Kubernetes cluster's workloads
#[derive(Parser, Debug)]
#[command(name = "k8s-diagram")]
#[command(about = "Render a Mermaid dependency diagram of a Kubernetes cluster", long_about = None)]
struct Args {
    /// Only include these namespaces (repeatable; wins over --exclude-namespace)
    #[arg(long = "include-namespace", short = 'n')]
    include_namespaces: Vec<String>,

    /// Exclude these namespaces (repeatable)
    #[arg(long = "exclude-namespace", short = 'x')]
    exclude_namespaces: Vec<String>,

    /// Write the diagram here instead of stdout
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = cli::init_logging(args.debug);
    if let Some(ref log_path) = log_file {
        eprintln!("Debug logging enabled. Logs written to: {}", log_path.display());
    }

    let file_config = config::load().context("Failed to load configuration")?;

    // CLI flags override the config file
    let included = if args.include_namespaces.is_empty() {
        file_config.included_namespaces
    } else {
        args.include_namespaces
    };
    let excluded = if args.exclude_namespaces.is_empty() {
        file_config.excluded_namespaces
    } else {
        args.exclude_namespaces
    };
    let filter = NamespaceFilter::new(&included, &excluded);
    let output = args.output.or(file_config.output);

    tracing::debug!("Initializing Kubernetes client");
    let client = kube::create_client()
        .await
        .context("Failed to connect to the Kubernetes API")?;

    let snapshot = kube::fetch_snapshot(&client)
        .await
        .context("Failed to list cluster resources")?;

    let diagram_graph = parser::parse_snapshot(&snapshot, &filter)
        .context("Failed to build the resource graph")?;
    let text = graph::mermaid::to_mermaid(&diagram_graph);

    match output {
        Some(path) => {
            std::fs::write(&path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Diagram written to {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}
