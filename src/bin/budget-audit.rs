use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use budget_audit::{
    AuditError, AuditOutcome, AuditResponse, AuditWarning, CohereReviewer, ReviewerConfig,
    WarningCode, audit_pdf_bytes, render_text,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "budget-audit",
    version,
    about = "Reconcile a PDF budget document against its stated total"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables, reconcile totals, and request reviewer commentary.
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
struct AuditArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Run the pipeline without calling the reviewer (no API key needed).
    #[arg(long)]
    skip_review: bool,

    /// Emit the JSON report instead of the text report.
    #[arg(long)]
    json: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

enum AuditStatus {
    Completed,
    NothingFound,
}

async fn run_audit(args: &AuditArgs) -> Result<AuditStatus> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;

    let mut outcome = match audit_pdf_bytes(&bytes) {
        Ok(outcome) => outcome,
        Err(AuditError::NoTablesFound) => {
            eprintln!("No tables could be extracted from the PDF.");
            return Ok(AuditStatus::NothingFound);
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to audit '{}'", args.input.display()));
        }
    };

    // Reviewer commentary is an enrichment; losing it must not discard the
    // reconciliation already computed.
    let comment = if args.skip_review {
        None
    } else {
        let reviewer = CohereReviewer::new(ReviewerConfig::from_env()?)?;
        match reviewer.review(&outcome.transcript).await {
            Ok(comment) => Some(comment),
            Err(error) => {
                eprintln!("warning: reviewer call failed; continuing without commentary");
                outcome.warnings.push(AuditWarning::new(
                    WarningCode::ReviewerCallFailed,
                    error.to_string(),
                ));
                None
            }
        }
    };

    log_warnings(&outcome, args.verbose);

    if args.json {
        let response = AuditResponse::from_outcome(&outcome, comment);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_text(&outcome, comment.as_deref()));
    }

    Ok(AuditStatus::Completed)
}

fn log_warnings(outcome: &AuditOutcome, verbose: bool) {
    if outcome.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", outcome.warnings.len());
    if verbose {
        for warning in &outcome.warnings {
            eprintln!("  - {warning}");
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("budget_audit=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Audit(args) => match run_audit(&args).await {
            Ok(AuditStatus::Completed) => ExitCode::SUCCESS,
            Ok(AuditStatus::NothingFound) => ExitCode::from(2),
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
