// SPDX-License-Identifier: MIT OR Apache-2.0
//! `gatesim` - headless logic circuit simulator
//!
//! Loads a circuit document, sets switches, propagates signals and prints
//! the indicators:
//!
//! ```bash
//! gatesim run adder.ron --set a=1 --set b=1
//! gatesim table adder.ron
//! ```
//!
//! ## Architecture
//!
//! The binary stands in for the interactive editor: it edits a circuit only
//! through the mutation methods of `gatesim_graph` and reads signals only
//! after a complete propagation run.

mod document;
mod report;
mod settings;

use clap::{Parser, Subcommand};
use document::{CircuitDocument, DocumentError, Labels};
use gatesim_graph::{Circuit, CircuitError, Simulator};
use report::{ReportError, TruthTable};
use settings::{Settings, SettingsError};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logic gate circuit simulator
#[derive(Parser, Debug)]
#[command(name = "gatesim", author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to gatesim.ron next to the circuit)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fixed number of propagation passes (default: one per node)
    #[arg(long, global = true, value_name = "PASSES")]
    budget: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Propagate a circuit and print its indicators
    Run {
        /// Circuit document
        #[arg(value_name = "CIRCUIT_FILE")]
        file: PathBuf,

        /// Set a switch before propagating (repeatable)
        #[arg(long = "set", value_name = "LABEL=0|1", value_parser = parse_assignment)]
        set: Vec<(String, bool)>,

        /// Also print every port value
        #[arg(long)]
        ports: bool,
    },

    /// Print the truth table over every switch combination
    Table {
        /// Circuit document
        #[arg(value_name = "CIRCUIT_FILE")]
        file: PathBuf,
    },

    /// Rewrite a circuit document in canonical form
    Normalize {
        /// Circuit document
        #[arg(value_name = "CIRCUIT_FILE")]
        file: PathBuf,

        /// Write here instead of standard output
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the effective settings
    Config {
        /// Write them to this file instead
        #[arg(long, value_name = "FILE")]
        write: Option<PathBuf>,
    },
}

impl Command {
    fn document(&self) -> Option<&Path> {
        match self {
            Self::Run { file, .. } | Self::Table { file } | Self::Normalize { file, .. } => Some(file),
            Self::Config { .. } => None,
        }
    }
}

/// Error reported by the binary
#[derive(Debug, thiserror::Error)]
enum AppError {
    /// Settings could not be loaded
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Document could not be loaded or built
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Report could not be produced
    #[error(transparent)]
    Report(#[from] ReportError),

    /// `--set` named something that is not a switch
    #[error("No switch labelled '{label}' (switches: {known})")]
    UnknownSwitch {
        /// Requested label
        label: String,
        /// Available switch labels
        known: String,
    },

    /// Switch write was rejected
    #[error("Cannot set '{label}': {source}")]
    Switch {
        /// Requested label
        label: String,
        /// Underlying error
        #[source]
        source: CircuitError,
    },
}

/// Parse `LABEL=VALUE` where VALUE is 0/1, true/false or on/off
fn parse_assignment(s: &str) -> Result<(String, bool), String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got '{s}'"))?;
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" => true,
        "0" | "false" | "off" => false,
        other => return Err(format!("invalid switch value '{other}'")),
    };
    Ok((label.trim().to_string(), value))
}

fn main() {
    let cli = Cli::parse();

    let settings = load_settings(&cli);
    let filter = settings
        .as_ref()
        .map_or(settings::DEFAULT_LOG_FILTER, |s| s.log_filter.as_str());
    init_logging(filter);

    tracing::debug!("Starting gatesim v{}", env!("CARGO_PKG_VERSION"));

    let result = settings
        .map_err(AppError::from)
        .and_then(|settings| execute(&cli, &settings));
    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn init_logging(fallback: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings, SettingsError> {
    let mut settings = match (&cli.config, cli.command.document()) {
        (Some(path), _) => Settings::load(path)?,
        (None, Some(document)) => Settings::load_or_default(&Settings::path_for_document(document))?,
        (None, None) => Settings::load_or_default(Path::new(settings::SETTINGS_FILE_NAME))?,
    };
    if let Some(budget) = cli.budget {
        settings.budget = Some(budget);
    }
    Ok(settings)
}

fn execute(cli: &Cli, settings: &Settings) -> Result<(), AppError> {
    match &cli.command {
        Command::Run { file, set, ports } => run(file, set, *ports || settings.show_ports, settings),
        Command::Table { file } => table(file, settings),
        Command::Normalize { file, output } => normalize(file, output.as_deref()),
        Command::Config { write: Some(path) } => {
            settings.save(path)?;
            tracing::info!("Wrote settings to {:?}", path);
            Ok(())
        }
        Command::Config { write: None } => {
            print!("{}", settings.to_ron()?);
            Ok(())
        }
    }
}

fn load_circuit(file: &Path) -> Result<(Circuit, Labels), AppError> {
    let (circuit, labels) = CircuitDocument::load(file)?.build()?;
    if labels.is_empty() {
        tracing::warn!("Circuit {:?} has no nodes", file);
    } else {
        tracing::debug!("Loaded {} labelled node(s) from {:?}", labels.len(), file);
    }
    Ok((circuit, labels))
}

fn switch_labels(circuit: &Circuit, labels: &Labels) -> String {
    labels
        .iter()
        .filter(|(_, id)| circuit.switch(*id).is_some())
        .map(|(label, _)| label)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run(
    file: &Path,
    assignments: &[(String, bool)],
    show_ports: bool,
    settings: &Settings,
) -> Result<(), AppError> {
    let (circuit, labels) = load_circuit(file)?;
    let mut simulator = Simulator::with_config(circuit, settings.propagation());

    for (label, value) in assignments {
        let id = labels.get(label).ok_or_else(|| AppError::UnknownSwitch {
            label: label.clone(),
            known: switch_labels(simulator.circuit(), &labels),
        })?;
        simulator
            .set_input_value(id, *value)
            .map_err(|source| AppError::Switch {
                label: label.clone(),
                source,
            })?;
    }

    let stats = simulator.last_run();
    tracing::info!(
        "Propagated {} node(s) over {} wire(s) in {} pass(es)",
        simulator.circuit().node_count(),
        stats.connections,
        stats.passes
    );

    print!("{}", report::render_indicators(simulator.circuit(), &labels));
    if show_ports {
        print!("{}", report::render_ports(simulator.circuit(), &labels));
    }
    Ok(())
}

fn table(file: &Path, settings: &Settings) -> Result<(), AppError> {
    let (circuit, labels) = load_circuit(file)?;
    let table = TruthTable::build(&circuit, &labels, settings.propagation(), settings.table_limit())?;
    print!("{}", table.render());
    Ok(())
}

fn normalize(file: &Path, output: Option<&Path>) -> Result<(), AppError> {
    let (circuit, _) = load_circuit(file)?;
    let document = CircuitDocument::from_circuit(&circuit);
    match output {
        Some(path) => document.save(path)?,
        None => print!("{}", document.to_ron()?),
    }
    Ok(())
}
