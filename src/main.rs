use clap::Parser;
use log::info;
use schemashift::engine::Edit;
use schemashift::error::Result;
use schemashift::options::ReconcileOptions;
use schemashift::schema::BaselineSchema;
use schemashift::session::Workspace;
use schemashift::{logger, summary};
use std::fs;
use std::path::PathBuf;
use std::process;

/// Replay schema-editor events against a snapshot and print the resulting rename plan.
#[derive(Debug, Parser)]
#[command(name = "schemashift", version)]
struct Cli {
    /// Schema snapshot (JSON)
    schema: PathBuf,

    /// Edit log (JSON array of events)
    #[arg(short, long)]
    edits: Option<PathBuf>,

    /// Reconciliation options (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a text summary instead of the executor request
    #[arg(long, conflicts_with = "preview")]
    summary: bool,

    /// Print the schema as it would look after the plan
    #[arg(long)]
    preview: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(short = 'l', long, env = "SCHEMASHIFT_LOG", default_value = "warn")]
    log_level: String,
}

fn run(cli: &Cli) -> Result<String> {
    let schema = BaselineSchema::from_json(&fs::read_to_string(&cli.schema)?)?;
    let options = match &cli.config {
        Some(path) => ReconcileOptions::load(path)?,
        None => ReconcileOptions::default(),
    };
    let edits: Vec<Edit> = match &cli.edits {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    info!(
        "{} table(s), replaying {} edit(s)",
        schema.tables.len(),
        edits.len()
    );

    let mut workspace = Workspace::with_options(schema, options);
    workspace.apply_all(&edits);

    if cli.summary {
        return Ok(summary::describe(workspace.plan()));
    }
    let mut output = if cli.preview {
        serde_json::to_string_pretty(&workspace.preview())?
    } else {
        workspace.submit().to_json()?
    };
    output.push('\n');
    Ok(output)
}

fn main() {
    let cli = Cli::parse();

    let level = logger::parse_level(&cli.log_level).unwrap_or_else(|| {
        eprintln!("Invalid log level: {}", cli.log_level);
        process::exit(1);
    });
    if let Err(e) = logger::init(level) {
        eprintln!("Failed to install logger: {}", e);
    }

    let output = match run(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(e) = fs::write(path, &output) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => print!("{}", output),
    }
}
