//! arca-fa - Forensic Analysis one-shot runner
//!
//! Runs the full analysis pipeline for a single case: reads a frozen
//! declaration document, optionally fetches the submitted artifact and an
//! evidence manifest, and prints the JSON-serialized stage outputs. The
//! HTTP transport and the durable case store live in other services; this
//! binary exists for operators and pipeline debugging.

use anyhow::{bail, Context, Result};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

use arca_common::{Declaration, EvidenceManifest};
use arca_fa::config::AnalysisConfig;
use arca_fa::store::MemoryCaseStore;
use arca_fa::types::FileReference;
use arca_fa::Pipeline;

const USAGE: &str = "Usage: arca-fa <declaration.json> [--file <url-or-path>] \
                     [--manifest <manifest.json>] [--config <config.toml>]";

struct Args {
    declaration_path: String,
    file_ref: Option<FileReference>,
    manifest_path: Option<String>,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut declaration_path = None;
    let mut file_ref = None;
    let mut manifest_path = None;
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => {
                let value = args.next().context("--file requires a value")?;
                file_ref = Some(FileReference::parse(&value));
            }
            "--manifest" => {
                manifest_path = Some(args.next().context("--manifest requires a value")?);
            }
            "--config" => {
                config_path = Some(args.next().context("--config requires a value")?);
            }
            "--help" | "-h" => bail!("{}", USAGE),
            other if declaration_path.is_none() => {
                declaration_path = Some(other.to_string());
            }
            other => bail!("Unexpected argument '{}'\n{}", other, USAGE),
        }
    }

    let Some(declaration_path) = declaration_path else {
        bail!("{}", USAGE);
    };

    Ok(Args {
        declaration_path,
        file_ref,
        manifest_path,
        config_path,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting arca-fa (Forensic Analysis) one-shot runner");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = parse_args()?;

    let config = AnalysisConfig::load(args.config_path.as_deref())
        .context("Failed to load configuration")?;

    let declaration_json = std::fs::read_to_string(&args.declaration_path)
        .with_context(|| format!("Cannot read declaration {}", args.declaration_path))?;
    let declaration: Declaration = serde_json::from_str(&declaration_json)
        .context("Declaration document is not valid JSON")?;
    declaration
        .validate()
        .context("Declaration failed validation")?;

    let manifest = match &args.manifest_path {
        Some(path) => {
            let manifest_json = std::fs::read_to_string(path)
                .with_context(|| format!("Cannot read manifest {}", path))?;
            serde_json::from_str(&manifest_json).context("Manifest is not valid JSON")?
        }
        None => EvidenceManifest::default(),
    };

    let case_id = Uuid::new_v4();
    let store = Arc::new(MemoryCaseStore::new());
    let pipeline = Pipeline::new(&config).with_store(store);

    let analysis = pipeline
        .run_case(case_id, &declaration, args.file_ref.as_ref(), &manifest)
        .await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
