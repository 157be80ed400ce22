//! WireGraph CLI - replay transaction scripts and check graph snapshots.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use wiregraph::{
    load_script, load_snapshot, Engine, EngineOptions, GraphDelta, GraphState, InvariantViolation,
    Transaction, WireGraphError,
};

const EXIT_OK: i32 = 0;
const EXIT_INVALID: i32 = 1;
const EXIT_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "wiregraph")]
#[command(about = "Schematic wire and PCB trace connectivity engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON transaction script against an empty graph
    Replay {
        /// Path to a JSON array of transactions
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Engine options (JSON)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,

        /// Also print the delta of every transaction
        #[arg(long)]
        deltas: bool,
    },

    /// Check a saved graph snapshot for structural problems
    Check {
        /// Path to a JSON graph snapshot
        #[arg(value_name = "STATE")]
        state: PathBuf,

        /// Engine options (JSON)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Replay {
            script,
            options,
            format,
            deltas,
        } => handle_replay(&script, options.as_deref(), format, deltas),
        Commands::Check {
            state,
            options,
            format,
        } => handle_check(&state, options.as_deref(), format),
    };

    process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn engine_options(path: Option<&Path>) -> Result<EngineOptions, WireGraphError> {
    match path {
        Some(path) => EngineOptions::load(path),
        None => Ok(EngineOptions::default()),
    }
}

/// One executed transaction, for `--deltas`.
struct Step {
    name: String,
    delta: GraphDelta,
}

fn handle_replay(script: &Path, options: Option<&Path>, format: OutputFormat, deltas: bool) -> i32 {
    let options = match engine_options(options) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };
    let transactions = match load_script(script) {
        Ok(transactions) => transactions,
        Err(e) => {
            eprintln!("Error: {}: {}", script.display(), e);
            return EXIT_ERROR;
        }
    };
    tracing::info!("Replaying {} transactions from {}", transactions.len(), script.display());

    let mut engine = Engine::new(options);
    let mut steps = Vec::new();
    for tx in &transactions {
        let delta = engine.execute(tx);
        if deltas {
            steps.push(Step {
                name: tx.name().to_string(),
                delta,
            });
        }
    }

    let state = engine.state();
    let violations = state.check_invariants();
    match format {
        OutputFormat::Human => output_replay_human(state, &steps, &violations),
        OutputFormat::Json => output_replay_json(state, &steps, &violations, deltas),
    }

    if violations.is_empty() {
        EXIT_OK
    } else {
        EXIT_INVALID
    }
}

fn handle_check(path: &Path, options: Option<&Path>, format: OutputFormat) -> i32 {
    let options = match engine_options(options) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };
    let snapshot = match load_snapshot(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            return EXIT_ERROR;
        }
    };

    let stored_edges = snapshot.edges.len();
    let state = GraphState::from(snapshot);
    let dropped = stored_edges - state.edge_count();
    let violations = state.check_invariants();

    let mut engine = Engine::new(options);
    engine.replace_state(state.clone());
    let pending = engine.normalize_all();
    let normalized = pending.is_empty();

    match format {
        OutputFormat::Human => {
            println!("\nState: {}", path.display());
            println!("{}", "─".repeat(60));
            print_counts(&state);
            println!("  Dropped invalid edges: {}", dropped);
            print_violations(&violations);
            if normalized {
                println!("  Normalized: yes");
            } else {
                println!("  Normalized: no ({} pending changes)", pending.len());
            }
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "file": path.display().to_string(),
                "vertices": state.vertex_count(),
                "edges": state.edge_count(),
                "nets": state.components().len(),
                "dropped_edges": dropped,
                "violations": violations,
                "normalized": normalized,
                "pending": &pending,
            });
            print_json(&output);
        }
    }

    if dropped == 0 && violations.is_empty() && normalized {
        EXIT_OK
    } else {
        EXIT_INVALID
    }
}

fn print_counts(state: &GraphState) {
    println!("  Vertices: {}", state.vertex_count());
    println!("  Edges:    {}", state.edge_count());
    println!("  Nets:     {}", state.components().len());
    for (group, name) in state.group_names() {
        println!("    {} = {}", group, name);
    }
}

fn print_violations(violations: &[InvariantViolation]) {
    if violations.is_empty() {
        println!("  Invariants: ok");
        return;
    }
    println!("  Invariants: {} violated", violations.len());
    for violation in violations {
        println!("    - {}", violation);
    }
}

fn output_replay_human(state: &GraphState, steps: &[Step], violations: &[InvariantViolation]) {
    for (index, step) in steps.iter().enumerate() {
        let delta = &step.delta;
        println!("#{} {}: {} changes", index, step.name, delta.len());
        if delta.is_empty() {
            continue;
        }
        println!(
            "    vertices +{} -{} ~{}  edges +{} -{} ~{}",
            delta.created_vertices.len(),
            delta.deleted_vertices.len(),
            delta.moved_vertices.len(),
            delta.created_edges.len(),
            delta.deleted_edges.len(),
            delta.rewired_edges.len()
        );
    }

    println!("\nFinal graph");
    println!("{}", "─".repeat(60));
    print_counts(state);
    print_violations(violations);
}

fn output_replay_json(
    state: &GraphState,
    steps: &[Step],
    violations: &[InvariantViolation],
    deltas: bool,
) {
    let mut output = serde_json::json!({
        "state": state,
        "violations": violations,
    });
    if deltas {
        output["deltas"] = steps
            .iter()
            .map(|step| {
                serde_json::json!({
                    "op": step.name,
                    "delta": step.delta,
                })
            })
            .collect();
    }
    print_json(&output);
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}
