//! Command implementations for the `doc-capture` binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use doc_capture::machine::{CaptureStateMachine, SelectedFile, UploadOutcome};
use doc_capture::settings::{store, Settings};
use tracing::info;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Options shared by every command.
pub struct Context {
    pub config: PathBuf,
    pub still: Option<PathBuf>,
    pub output: PathBuf,
}

impl Context {
    fn settings(&self) -> Result<Settings, Box<dyn std::error::Error>> {
        Ok(store::load_with_env(&self.config)?)
    }

    fn machine(&self) -> Result<CaptureStateMachine, Box<dyn std::error::Error>> {
        let settings = self.settings()?;
        let camera = doc_capture::create_camera_backend(self.still.as_deref());
        info!(camera = camera.name(), endpoint = %settings.service.api_url, "Starting");
        Ok(doc_capture::create_machine(&settings, camera)?)
    }
}

/// Submit an image file and save the crop.
pub async fn upload_file(ctx: &Context, file: &Path) -> CliResult {
    let mut machine = ctx.machine()?;
    machine.select_file(SelectedFile::from_path(file).await?);

    let outcome = machine.upload().await?;
    if outcome == UploadOutcome::Detected {
        println!("Document detected in {}", file.display());
    }
    write_candidate(&machine, &ctx.output).await
}

/// Take one frame from the camera, optionally submitting it.
pub async fn capture_frame(ctx: &Context, submit: bool) -> CliResult {
    let mut machine = ctx.machine()?;
    machine.open_camera().await?;
    machine.capture_now()?;

    if let Some(label) = machine.candidate().and_then(|c| c.capture_time_label()) {
        println!("Frame captured at {label}");
    }
    if submit {
        machine.upload().await?;
        println!("Document detected");
    }
    write_candidate(&machine, &ctx.output).await
}

/// Poll the camera until the service finds a document or time runs out.
pub async fn auto_detect(ctx: &Context, timeout_secs: u64) -> CliResult {
    let mut machine = ctx.machine()?;
    let run = machine.start_auto_detect().await?;
    println!("Auto-detecting ({run}), press Ctrl+C to stop");

    let detected = tokio::select! {
        found = tokio::time::timeout(Duration::from_secs(timeout_secs), machine.wait_for_detection()) => {
            found.unwrap_or(false)
        }
        _ = tokio::signal::ctrl_c() => false,
    };
    machine.stop_camera();

    let stats = machine.stats();
    println!(
        "{} ticks, {} frames submitted, {} without document, {} errors",
        stats.ticks, stats.frames_submitted, stats.not_detected, stats.transport_errors
    );

    if !detected {
        return Err("no document detected".into());
    }
    if let Some(ms) = stats.detected_after_ms {
        println!("Document detected after {:.1}s", ms as f64 / 1000.0);
    }
    write_candidate(&machine, &ctx.output).await
}

/// Write a settings file with default values.
pub fn init_config(ctx: &Context, force: bool) -> CliResult {
    if ctx.config.exists() && !force {
        return Err(format!("{} already exists; use --force", ctx.config.display()).into());
    }
    store::save(&ctx.config, &Settings::default())?;
    println!("Settings written to {}", ctx.config.display());
    Ok(())
}

/// Print the effective settings, environment overrides applied.
pub fn show_config(ctx: &Context) -> CliResult {
    let settings = ctx.settings()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

async fn write_candidate(machine: &CaptureStateMachine, output: &Path) -> CliResult {
    let candidate = machine.candidate().ok_or("no image to write")?;
    tokio::fs::write(output, candidate.bytes()).await?;
    println!(
        "Saved {} ({} bytes) to {}",
        candidate.name(),
        candidate.bytes().len(),
        output.display()
    );
    Ok(())
}
