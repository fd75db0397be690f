//! atms CLI: replay and inspect truth maintenance scenarios.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use atms::export::TmsExport;
use atms::identifier::Identifier;
use atms::label::Label;
use atms::scenario::Scenario;
use atms::tms::Tms;

#[derive(Parser)]
#[command(name = "atms", version, about = "Assumption-based truth maintenance")]
struct Cli {
    /// Log engine activity at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print every node with its label.
    Run {
        /// Path to the TOML scenario.
        scenario: PathBuf,

        /// Print a JSON snapshot instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Replay a scenario file and explain one node.
    Explain {
        /// Path to the TOML scenario.
        scenario: PathBuf,

        /// Node identifier.
        node: String,
    },

    /// Parse a label, drop subsumed environments and print it back.
    Normalize {
        /// Label text, e.g. "{ {A,B}, {A} }".
        label: String,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run { scenario, json } => {
            let tms = replay(&scenario)?;
            if json {
                let export = TmsExport::from_tms(&tms);
                let json = serde_json::to_string_pretty(&export).into_diagnostic()?;
                println!("{json}");
            } else {
                let nodes = tms.nodes();
                if nodes.is_empty() {
                    println!("No nodes.");
                }
                let width = nodes.iter().map(|n| n.id.as_str().chars().count()).max().unwrap_or(0);
                for node in nodes {
                    println!(
                        "  {:<width$}  {:<13}  {}",
                        node.id.as_str(),
                        node.kind.to_string(),
                        node.label,
                    );
                }
            }
        }

        Commands::Explain { scenario, node } => {
            let tms = replay(&scenario)?;
            let id = Identifier::new(node);
            let record = tms.node(&id)?;

            println!("{} ({})", record.id, record.kind);
            println!("  label:       {}", record.label);
            println!("  environment: {}", tms.environment(&id)?);
            println!(
                "  out={} in={} true={} false={}",
                tms.is_out(&id)?,
                tms.is_in(&id)?,
                tms.is_true(&id)?,
                tms.is_false(&id)?,
            );

            let justifications = tms.justifications_for(&id);
            if justifications.is_empty() {
                println!("  no justifications");
            } else {
                println!("  justifications ({}):", justifications.len());
                for j in justifications {
                    println!("    {j}");
                }
            }
        }

        Commands::Normalize { label } => {
            let mut parsed: Label = label.parse()?;
            parsed.remove_subsumed();
            println!("{parsed}");
        }
    }

    Ok(())
}

fn replay(path: &std::path::Path) -> Result<Tms> {
    let scenario = Scenario::load(path)?;
    let recorder = scenario.apply()?;
    Ok(recorder.into_tms())
}
