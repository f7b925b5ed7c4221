use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use signpost_core::{DocumentSource, NormalizedRect, WizardSession};
use signpost_submit::{submit, RecordingService, SubmissionEvent};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub mod plan;

use plan::PlacementPlan;

#[derive(Debug, Parser)]
#[command(name = "signpost-cli")]
#[command(about = "Signpost placement-plan tooling")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay a placement plan through the wizard rules and report it.
    Validate {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },
    /// Print the normalized (fraction-of-page) geometry a plan submits.
    Normalize {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },
    /// Run the submission pipeline against an in-memory service.
    DryRun {
        #[arg(value_name = "PLAN")]
        plan: PathBuf,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    mode: &'static str,
    step: &'static str,
    title: String,
    signer_count: usize,
    annotation_count: usize,
}

#[derive(Debug, Serialize)]
struct NormalizedField {
    kind: &'static str,
    page: u32,
    signer_id: Option<String>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

#[derive(Debug, Serialize)]
struct DryRunOutput {
    document_id: String,
    requests: Vec<DryRunRequest>,
}

#[derive(Debug, Serialize)]
struct DryRunRequest {
    index: usize,
    request_id: String,
    signed: bool,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    init_tracing();

    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Validate { plan } => run_validate(&plan),
        Commands::Normalize { plan } => run_normalize(&plan),
        Commands::DryRun { plan } => run_dry_run(&plan),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_validate(plan_path: &Path) -> Result<()> {
    let session = load_session(plan_path)?;
    let payload = session.payload();

    let output = ValidateOutput {
        mode: payload.mode().map(|mode| mode.label()).unwrap_or("unset"),
        step: session.step().label(),
        title: payload.effective_title().unwrap_or_default().to_owned(),
        signer_count: payload.signers().len(),
        annotation_count: payload.annotations().len(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn run_normalize(plan_path: &Path) -> Result<()> {
    let session = load_session(plan_path)?;

    let fields: Vec<NormalizedField> = session
        .payload()
        .annotations()
        .iter()
        .map(|annotation| {
            let rect = NormalizedRect::from_preview(
                annotation.position(),
                annotation.size(),
                annotation.frame(),
            );
            NormalizedField {
                kind: annotation.kind().label(),
                page: annotation.page(),
                signer_id: annotation.signer().map(|signer| signer.id.to_string()),
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&fields)?);

    Ok(())
}

fn run_dry_run(plan_path: &Path) -> Result<()> {
    let session = load_session(plan_path)?;
    let service = RecordingService::new(session.current_user().clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start async runtime")?;

    let outcome = runtime.block_on(submit(
        session.payload(),
        session.current_user(),
        &service,
        |event| {
            if let SubmissionEvent::UploadProgress { percent } = event {
                tracing::debug!(percent, "upload progress");
            }
        },
    ))?;

    let output = DryRunOutput {
        document_id: outcome.document_id.to_string(),
        requests: outcome
            .requests
            .into_iter()
            .map(|request| DryRunRequest {
                index: request.index,
                request_id: request.request_id.to_string(),
                signed: request.signed,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn load_session(plan_path: &Path) -> Result<WizardSession> {
    let plan = PlacementPlan::load(plan_path)?;

    let document_path = plan.document_path(plan_path);
    ensure_document_exists(&document_path)?;

    let bytes = fs::read(&document_path)
        .with_context(|| format!("failed to read document {}", document_path.display()))?;
    let file_name = document_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_owned();

    tracing::debug!(plan = %plan_path.display(), byte_len = bytes.len(), "plan loaded");

    plan::replay(&plan, DocumentSource::new(file_name, bytes))
}

fn ensure_document_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
