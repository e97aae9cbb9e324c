use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use exoworks_rs::exoworks::config::AppConfig;
use exoworks_rs::exoworks::mock::MockSolana;
use exoworks_rs::exoworks::server;
use exoworks_rs::exoworks::workflow::context::ExecutionContext;
use exoworks_rs::exoworks::workflow::factory::launch_workflow;
use exoworks_rs::exoworks::workflow::graph::{ExecutionEngine, Workflow};
use exoworks_rs::exoworks::workflow::loader::WorkflowLoader;
use exoworks_rs::exoworks::workflow::log::LogEntry;
use exoworks_rs::exoworks::workflow::transactions::{confirm_all, pending_transactions};

use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workflow from a YAML or JSON file
    Run {
        /// Path to the workflow file
        #[arg(short, long)]
        file: String,

        /// Context variable as key=value (value parsed as JSON when possible)
        #[arg(short, long = "var")]
        vars: Vec<String>,
    },
    /// Check a workflow file for structural errors
    Validate {
        /// Path to the workflow file
        #[arg(short, long)]
        file: String,
    },
    /// Run the sample token launch workflow
    Demo,
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides EXO_SERVER_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("Failed to read configuration")?;

    match args.command {
        Commands::Run { file, vars } => {
            let workflow = WorkflowLoader::new()
                .load_workflow(&file)
                .with_context(|| format!("Failed to load workflow from {}", file))?;

            let mut context = ExecutionContext::new(&workflow.id);
            for var in &vars {
                let Some((key, value)) = ExecutionContext::parse_assignment(var) else {
                    bail!("Invalid variable '{}', expected key=value", var);
                };
                context.set(key, value);
            }

            execute(&config, &workflow, context).await?;
        }
        Commands::Validate { file } => {
            let workflow = WorkflowLoader::new()
                .load_workflow(&file)
                .with_context(|| format!("Failed to load workflow from {}", file))?;

            let report = workflow.validate();
            if !report.valid {
                for error in &report.errors {
                    println!("  - {}", error);
                }
                bail!("Workflow '{}' is invalid", workflow.name);
            }

            let entry: Vec<&str> = workflow
                .entry_nodes()
                .iter()
                .map(|n| n.id.as_str())
                .collect();
            println!(
                "Workflow '{}' is valid: {} nodes, {} edges, entry nodes [{}]",
                workflow.name,
                workflow.nodes().len(),
                workflow.edges().len(),
                entry.join(", ")
            );
        }
        Commands::Demo => {
            let workflow = launch_workflow();
            let context = ExecutionContext::new(&workflow.id);
            execute(&config, &workflow, context).await?;
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            server::serve(&config).await?;
        }
    }

    Ok(())
}

/// Run a workflow, printing entries as they arrive and the transactions after
async fn execute(
    config: &AppConfig,
    workflow: &Workflow,
    context: ExecutionContext,
) -> anyhow::Result<()> {
    let engine = ExecutionEngine::with_simulator(Arc::new(MockSolana::new(config.simulator)));

    println!("Running workflow: {}", workflow.name);
    let (tx, mut rx) = mpsc::channel::<LogEntry>(100);
    let printer = tokio::spawn(async move {
        while let Some(entry) = rx.recv().await {
            println!("{}", entry);
        }
    });

    let result = engine.run_stream(workflow, context, tx).await;
    printer.await.context("Log printer task failed")?;

    let mut transactions = pending_transactions(&result.logs);
    if !transactions.is_empty() {
        println!("\nTransactions:");
        for tx in &transactions {
            println!("  {:<12} {} ({})", tx.kind, tx.id, tx.status);
        }
        // The mock chain confirms everything it reports
        confirm_all(&mut transactions);
        println!("{} transactions confirmed", transactions.len());
    }

    if !result.success {
        bail!(
            "Workflow failed: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        );
    }
    Ok(())
}
