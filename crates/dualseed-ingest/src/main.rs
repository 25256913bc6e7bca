//! dualseed-ingest - distinct value extraction and document seed generation

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use dualseed_common::logging::{init_logging, LogConfig, LogLevel};
use dualseed_common::user_ids::{parse_user_ids, parse_user_ids_file};
use dualseed_common::ProgressMode;
use dualseed_ingest::distinct::{self, DistinctJob, DistinctPlan, DistinctReport};
use dualseed_ingest::resolve::resolve_sql_connection_string;
use dualseed_ingest::{generate_document_seeds, IngestConfig, PgKeyResolver};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "dualseed-ingest")]
#[command(author, version, about = "Seed artifact generation from CSV extracts")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract distinct values from selected CSV columns
    Distinct {
        /// Path to the input CSV file
        #[arg(long, required_unless_present = "plan", conflicts_with = "plan")]
        csv_path: Option<PathBuf>,

        /// Comma-separated list of column names to extract distinct values from
        #[arg(long, required_unless_present = "plan", conflicts_with = "plan")]
        columns: Option<String>,

        /// Path to the output folder
        #[arg(long, required_unless_present = "plan", conflicts_with = "plan")]
        output_path: Option<PathBuf>,

        /// CSV file encoding: a WHATWG label such as utf-8, latin1 or cp1252
        /// (latin-1, utf_8 and utf-8-sig are accepted too)
        #[arg(long, default_value = "utf-8")]
        encoding: String,

        /// TOML plan listing several extraction jobs
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Progress display mode
        #[arg(long, value_enum, default_value_t = ProgressMode::Linear)]
        progress: ProgressMode,
    },

    /// Generate NoSQL JSON seed documents
    #[command(group(ArgGroup::new("ids").required(true).args(["user_ids", "user_ids_file"])))]
    Documents {
        /// Comma-separated list of app_user IDs (e.g., 14,20,33)
        #[arg(long)]
        user_ids: Option<String>,

        /// File containing app_user IDs (comma or newline separated)
        #[arg(long)]
        user_ids_file: Option<PathBuf>,

        /// PostgreSQL connection string (falls back to SQL_DATABASE_URL)
        #[arg(long)]
        sql_connection_string: Option<String>,

        /// Output directory for generated JSON files
        #[arg(long, default_value = dualseed_ingest::config::DEFAULT_DOCUMENT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Directory holding profiles.csv, ratings.csv and favs.csv
        #[arg(long, default_value = dualseed_ingest::config::DEFAULT_DATASETS_DIR)]
        datasets_dir: PathBuf,

        /// Progress display mode
        #[arg(long, value_enum, default_value_t = ProgressMode::Detailed)]
        progress: ProgressMode,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    let log_config = LogConfig::new("dualseed-ingest").with_level(level);
    let log_config = match log_config.clone().with_env_overrides() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring logging overrides: {e}");
            log_config
        },
    };
    // The tool still works without logging
    let _guard = match init_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e}");
            None
        },
    };

    match cli.command {
        Command::Distinct {
            csv_path,
            columns,
            output_path,
            encoding,
            plan,
            progress,
        } => run_distinct(csv_path, columns, output_path, encoding, plan, progress),
        Command::Documents {
            user_ids,
            user_ids_file,
            sql_connection_string,
            output_dir,
            datasets_dir,
            progress,
        } => {
            let config = IngestConfig::new()
                .with_datasets_dir(datasets_dir)
                .with_output_dir(output_dir)
                .with_progress(progress);
            match run_documents(config, user_ids, user_ids_file, sql_connection_string) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "Document generation failed");
                    eprintln!("Error: {e:#}");
                    ExitCode::FAILURE
                },
            }
        },
    }
}

fn run_distinct(
    csv_path: Option<PathBuf>,
    columns: Option<String>,
    output_path: Option<PathBuf>,
    encoding: String,
    plan: Option<PathBuf>,
    progress: ProgressMode,
) -> ExitCode {
    let plan = match plan {
        Some(path) => {
            let base = path.parent().map(PathBuf::from).unwrap_or_default();
            match DistinctPlan::load(&path) {
                Ok(plan) => plan.relative_to(&base),
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                },
            }
        },
        None => {
            let columns = distinct::parse_columns(columns.as_deref().unwrap_or_default());
            if columns.is_empty() {
                eprintln!("No columns provided.");
                return ExitCode::from(2);
            }
            DistinctPlan {
                jobs: vec![DistinctJob {
                    csv_path: csv_path.unwrap_or_default(),
                    columns,
                    output_dir: output_path.unwrap_or_default(),
                    encoding,
                }],
            }
        },
    };

    report_distinct(&distinct::run_plan(&plan, progress.should_show()))
}

fn report_distinct(report: &DistinctReport) -> ExitCode {
    for path in &report.written {
        println!("Wrote {}", path.display());
    }
    for (column, e) in &report.failures {
        eprintln!("Error: {column}: {e}");
    }
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_documents(
    config: IngestConfig,
    user_ids: Option<String>,
    user_ids_file: Option<PathBuf>,
    sql_connection_string: Option<String>,
) -> anyhow::Result<()> {
    // `.env.local` values take precedence over the inherited environment
    match dotenvy::from_filename_override(".env.local") {
        Err(e) if !e.not_found() => return Err(e).context("Failed to load .env.local"),
        _ => {},
    }

    let ids = match (user_ids_file, user_ids) {
        (Some(path), _) => parse_user_ids_file(&path)?,
        (None, Some(raw)) => parse_user_ids(&raw)?,
        (None, None) => anyhow::bail!("No valid user IDs provided."),
    };
    let url = resolve_sql_connection_string(sql_connection_string.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let report = runtime.block_on(async {
        let resolver = PgKeyResolver::connect(&url).await?;
        generate_document_seeds(&config, &resolver, &ids).await
    })?;

    println!("Generated users JSON: {}", report.paths.users.display());
    println!("Generated ratings JSON: {}", report.paths.ratings.display());
    println!("Generated manifest JSON: {}", report.paths.manifest.display());
    println!(
        "Total: {} user documents, {} rating documents",
        report.manifest.users_count, report.manifest.ratings_count
    );
    Ok(())
}
