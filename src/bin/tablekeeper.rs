//! tablekeeper — CLI for declarative table reconciliation.
//!
//! # Usage
//!
//! ```bash
//! # Check a declaration without touching a database
//! tablekeeper validate users.json
//!
//! # Show the DDL an update would run
//! tablekeeper plan users-v1.json users-v2.json
//!
//! # Reconcile against a database
//! tablekeeper create users.json --database-url postgres://localhost/demo
//! tablekeeper update users-v1.json users-v2.json --dry-run
//! tablekeeper delete users.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use tablekeeper::prelude::*;

#[derive(Parser)]
#[command(name = "tablekeeper")]
#[command(version)]
#[command(about = "Reconcile declarative table schemas against PostgreSQL", long_about = None)]
struct Cli {
    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Don't execute, just show the generated DDL
    #[arg(short, long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a declaration file and print the normalized form
    Validate { spec: PathBuf },
    /// Show the DDL needed to converge from one declaration to another
    Plan { old: PathBuf, new: PathBuf },
    /// Create the declared table
    Create { spec: PathBuf },
    /// Converge an existing table to a new declaration
    Update { old: PathBuf, new: PathBuf },
    /// Drop the declared table
    Delete { spec: PathBuf },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Validate { spec } => {
            let decl = validate(&load_spec(spec)?)?;
            println!("{} {}", "Table:".dimmed(), decl.table_name.white());
            println!("{}", "Columns:".dimmed());
            for column in &decl.columns {
                println!("  {} {}", column.name.white(), column.type_name.cyan());
            }
            println!(
                "{} {}",
                "Primary key:".dimmed(),
                decl.primary_key.join(", ").yellow()
            );
            Ok(())
        }
        Commands::Plan { old, new } => {
            let old = validate(&load_spec(old)?)?;
            let new = validate(&load_spec(new)?)?;
            let ops = diff(&old, &new)?;
            print_plan(&ops);
            Ok(())
        }
        Commands::Create { spec } => {
            let raw = load_spec(spec)?;
            // Reject a bad declaration before opening any connection.
            let decl = validate(&raw)?;
            if cli.dry_run {
                print_plan(&[SchemaOperation::CreateTable(decl)]);
                return Ok(());
            }
            let (reconciler, executor) = connect(&cli).await?;
            let result = reconciler.handle_create(&resource_name(spec), &raw).await;
            executor.close().await;
            report(result)
        }
        Commands::Update { old, new } => {
            let old_raw = load_spec(old)?;
            let new_raw = load_spec(new)?;
            // Validation and diff rejections fire before opening any connection.
            let ops = diff(&validate(&old_raw)?, &validate(&new_raw)?)?;
            if cli.dry_run {
                print_plan(&ops);
                return Ok(());
            }
            let (reconciler, executor) = connect(&cli).await?;
            let result = reconciler
                .handle_update(&resource_name(new), &old_raw, &new_raw)
                .await;
            executor.close().await;
            report(result)
        }
        Commands::Delete { spec } => {
            let raw = load_spec(spec)?;
            let table = tablekeeper::spec::validate_name(&raw)?;
            if cli.dry_run {
                print_plan(&[SchemaOperation::DropTable(table)]);
                return Ok(());
            }
            let (reconciler, executor) = connect(&cli).await?;
            let result = reconciler.handle_delete(&resource_name(spec), &raw).await;
            executor.close().await;
            report(result)
        }
    }
}

fn load_spec(path: &Path) -> anyhow::Result<TableSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let spec = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(spec)
}

fn resource_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

async fn connect(cli: &Cli) -> anyhow::Result<(Reconciler<PgExecutor>, PgExecutor)> {
    let url = cli
        .database_url
        .as_deref()
        .context("no database URL; use --database-url or set DATABASE_URL")?;
    let executor = PgExecutor::connect(url).await?;
    let reconciler = Reconciler::new(executor.clone(), Box::new(TracingSink));
    Ok((reconciler, executor))
}

fn print_plan(ops: &[SchemaOperation]) {
    if ops.is_empty() {
        println!("{}", "(no changes)".dimmed());
        return;
    }
    println!("{}", "Planned DDL:".green().bold());
    for op in ops {
        println!("{}", op.to_sql().white());
    }
}

fn report(result: ReconcileResult<ReconciliationOutcome>) -> anyhow::Result<()> {
    match result {
        Ok(outcome) => {
            println!("{} {}", "✓".green(), outcome.operation.to_string().green());
            Ok(())
        }
        Err(e) => {
            let kind = match e.classification() {
                Classification::Permanent => "permanent".red(),
                Classification::Transient => "transient, retryable".yellow(),
            };
            Err(anyhow::anyhow!("{e} ({kind})"))
        }
    }
}
