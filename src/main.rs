use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use order_audit::config::Config;
use order_audit::infra::{read_export, write_batch_outputs};
use order_audit::logging;
use order_audit::pipeline::combine::run_combine;
use order_audit::pipeline::AuditTransform;

#[derive(Parser)]
#[command(name = "order_audit")]
#[command(about = "Order change-log audit trail and metadata builder")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform one audit export into trail, meta and dropped tables
    Transform {
        /// Audit export CSV
        #[arg(long)]
        input: PathBuf,
        /// Directory for the output tables
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
        /// TOML configuration (defaults to $ORDER_AUDIT_CONFIG or ./order_audit.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Combine transformed tables into the full trail and meta tables
    Combine {
        /// Trail CSVs, in order
        #[arg(long, num_args = 1.., required = true)]
        trail: Vec<PathBuf>,
        /// Meta CSVs, in order
        #[arg(long, num_args = 1.., required = true)]
        meta: Vec<PathBuf>,
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,
        /// Also write CSV copies of the combined tables
        #[arg(long)]
        csv: bool,
    },
}

fn base_name(input: &Path) -> Result<String> {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .with_context(|| format!("input path '{}' has no file name", input.display()))
}

fn transform(input: &Path, out_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("loading configuration")?;
    let transform = AuditTransform::from_config(&config).context("building transform")?;

    let batch = read_export(input, &config)
        .with_context(|| format!("reading export '{}'", input.display()))?;
    let output = transform.run(&batch.records);
    let files = write_batch_outputs(out_dir, &base_name(input)?, &output, &config.columns)
        .with_context(|| format!("writing outputs to '{}'", out_dir.display()))?;

    let report = output.report;
    println!("\n📊 Transform results for {}:", input.display());
    println!("   Rows for {}: {}", config.schema.table_name, report.total);
    println!("   Other tables skipped: {}", batch.filtered);
    println!("   Processed: {}", report.processed);
    println!("   Quarantined: {}", report.quarantined);
    println!("   Failed: {}", report.failed);
    println!("   Trail entries: {}", output.trail.len());
    println!("   Meta records: {}", output.meta.len());
    println!("   Trail file: {}", files.trail.display());
    println!("   Meta file: {}", files.meta.display());
    if let Some(dropped) = &files.dropped {
        println!("   Dropped file: {}", dropped.display());
    }

    if !output.failures.is_empty() {
        warn!("{} row stages failed", output.failures.len());
        println!("\n⚠️  Row failures:");
        for failure in &output.failures {
            println!("   - {} [{}]: {}", failure.order_num, failure.stage, failure.error);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Transform {
            input,
            out_dir,
            config,
        } => {
            info!("Transforming {}", input.display());
            transform(&input, &out_dir, config.as_deref())?;
        }
        Commands::Combine {
            trail,
            meta,
            out_dir,
            csv,
        } => {
            info!("Combining {} trail and {} meta files", trail.len(), meta.len());
            let (files, report) = run_combine(&trail, &meta, &out_dir, csv)
                .with_context(|| format!("combining into '{}'", out_dir.display()))?;

            println!("\n📦 Combined tables:");
            println!("   Trail rows: {} -> {}", report.trail_rows, files.trail.display());
            println!("   Meta rows: {} -> {}", report.meta_rows, files.meta.display());
            println!("   Duplicate snapshots dropped: {}", report.duplicates_dropped);
            println!("   Unparseable dates left as-is: {}", report.date_errors);
            if let Some((trail_csv, meta_csv)) = &files.csv {
                println!("   CSV copies: {}, {}", trail_csv.display(), meta_csv.display());
            }
        }
    }

    Ok(())
}
